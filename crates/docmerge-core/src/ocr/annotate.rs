//! Inserting recognized text after embedded images in generated HTML.

use base64::Engine;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::policy::IgnorePolicy;
use super::review::{ImageReviewer, ReviewDecision, ReviewImage};
use crate::cache::{CacheStore, ImageRecord};
use crate::error::{PipelineError, PipelineResult};
use crate::markup::{escape_text, find_inline_images};
use crate::pipeline::hash::{pad_base64, Hasher};
use crate::status::{ImageOutcome, StatusEvent, StatusSink};
use crate::tools::TextRecognizer;

/// A decoded embedded image. Only its checksum -> result mapping outlives the pass.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    pub bytes: Vec<u8>,
    pub checksum: u32,
    pub width: u32,
    pub height: u32,
    pub ignore: bool,
    pub text: Option<String>,
}

impl ImageArtifact {
    /// Decode a base64 payload and read its pixel dimensions.
    pub fn decode(payload: &str, checksum: u32) -> Option<Self> {
        let compact: String = pad_base64(payload)
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .ok()?;
        let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()?;
        Some(Self {
            bytes,
            checksum,
            width,
            height,
            ignore: false,
            text: None,
        })
    }
}

/// File extension matching the encoded image format, if recognized.
pub fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
}

/// Text fragment inserted after an image element.
pub fn format_annotation(text: &str) -> String {
    format!(" OCR text: '{}'", escape_text(text))
}

/// Resolves every embedded image of a document against the image cache.
pub struct ImageAnnotator {
    recognizer: Arc<dyn TextRecognizer>,
    policy: IgnorePolicy,
    reviewer: Option<Box<dyn ImageReviewer>>,
    image_output_dir: Option<PathBuf>,
    status: Arc<dyn StatusSink>,
}

impl ImageAnnotator {
    /// Annotator with the default threshold policy and no operator review.
    pub fn new(recognizer: Arc<dyn TextRecognizer>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            recognizer,
            policy: IgnorePolicy::default(),
            reviewer: None,
            image_output_dir: None,
            status,
        }
    }

    pub fn with_policy(mut self, policy: IgnorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Ask `reviewer` about every image the policy keeps.
    pub fn with_reviewer(mut self, reviewer: Box<dyn ImageReviewer>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Write each newly decoded image to `dir` as `<checksum>.<ext>`.
    pub fn with_image_output_dir(mut self, dir: PathBuf) -> Self {
        self.image_output_dir = Some(dir);
        self
    }

    /// Whether the operator is still being asked.
    pub fn reviewing(&self) -> bool {
        self.reviewer.is_some()
    }

    /// Rewrite the HTML file at `path` in place. Returns the number of images found.
    pub async fn annotate_file(
        &mut self,
        path: &Path,
        cache: &mut CacheStore,
    ) -> PipelineResult<usize> {
        let html = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        let html = String::from_utf8_lossy(&html);

        let images = find_inline_images(&html).len();
        self.status.report(StatusEvent::OcrStarted {
            document: path.to_path_buf(),
            images,
        });
        if images == 0 {
            return Ok(0);
        }

        let annotated = self.annotate(&html, cache).await?;
        tokio::fs::write(path, annotated)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        Ok(images)
    }

    /// Return `html` with recognized text inserted after each embedded image.
    ///
    /// Matches are handled from last to first so that inserting text never
    /// moves an offset that is still to be processed.
    pub async fn annotate(&mut self, html: &str, cache: &mut CacheStore) -> PipelineResult<String> {
        let images = find_inline_images(html);
        let mut document = html.to_string();

        for (index, image) in images.iter().enumerate().rev() {
            let text = self.resolve(index, image.payload, cache).await?;
            if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
                document.insert_str(image.end(), &format_annotation(&text));
            }
        }

        Ok(document)
    }

    /// Text for one payload, or `None` when it is ignored.
    async fn resolve(
        &mut self,
        index: usize,
        payload: &str,
        cache: &mut CacheStore,
    ) -> PipelineResult<Option<String>> {
        let checksum = Hasher::image_checksum(payload);

        if let Some(record) = cache.lookup_image(checksum) {
            if record.ignore {
                self.report(index, ImageOutcome::CachedIgnored);
                return Ok(None);
            }
            let text = record.text.clone();
            self.report(index, ImageOutcome::Cached);
            return Ok(Some(text));
        }

        let Some(mut artifact) = ImageArtifact::decode(payload, checksum) else {
            tracing::warn!("Embedded image {checksum} could not be decoded, ignoring it");
            cache.record_image(checksum, ImageRecord::ignored(false))?;
            self.report(index, ImageOutcome::Undecodable);
            return Ok(None);
        };
        self.dump_image(&artifact);

        artifact.ignore = self.policy.should_ignore(artifact.width, artifact.height);
        let seen = !artifact.ignore && self.reviewer.is_some();
        if seen {
            self.review(&mut artifact, cache)?;
        }

        if artifact.ignore {
            cache.record_image(checksum, ImageRecord::ignored(seen))?;
            self.report(
                index,
                ImageOutcome::Ignored {
                    width: artifact.width,
                    height: artifact.height,
                },
            );
            return Ok(None);
        }

        let text = self.recognizer.extract(&artifact.bytes).await?;
        tracing::debug!(
            "Recognized {} char(s) in image {checksum} ({}x{})",
            text.len(),
            artifact.width,
            artifact.height
        );
        cache.record_image(checksum, ImageRecord::recognized(text.clone(), seen))?;
        self.report(index, ImageOutcome::Recognized { chars: text.len() });
        artifact.text = Some(text);
        Ok(artifact.text)
    }

    fn review(&mut self, artifact: &mut ImageArtifact, cache: &CacheStore) -> PipelineResult<()> {
        let Some(reviewer) = self.reviewer.as_mut() else {
            return Ok(());
        };
        let decision = reviewer.review(&ReviewImage {
            checksum: artifact.checksum,
            width: artifact.width,
            height: artifact.height,
            bytes: &artifact.bytes,
        });
        match decision {
            ReviewDecision::Keep => {}
            ReviewDecision::Ignore => artifact.ignore = true,
            ReviewDecision::Exit => {
                artifact.ignore = true;
                cache.persist()?;
                self.reviewer = None;
                tracing::info!("Image review stopped for the rest of this run");
            }
        }
        Ok(())
    }

    fn dump_image(&self, artifact: &ImageArtifact) {
        let Some(dir) = &self.image_output_dir else {
            return;
        };
        let extension = image_extension(&artifact.bytes).unwrap_or("bin");
        let path = dir.join(format!("{}.{extension}", artifact.checksum));
        let written =
            std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, &artifact.bytes));
        if let Err(e) = written {
            tracing::warn!("Failed to save image {:?}: {e}", path);
        }
    }

    fn report(&self, index: usize, outcome: ImageOutcome) {
        self.status
            .report(StatusEvent::ImageResolved { index, outcome });
    }
}
