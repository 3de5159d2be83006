//! Pipeline orchestration: cache checks, conversion chains and annotation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::ocr::{IgnorePolicy, ImageAnnotator, ImageReviewer};
use crate::status::{StatusEvent, StatusSink};
use crate::tools::{ConverterRegistry, TesseractRecognizer};
use crate::types::{ConversionOutcome, DocumentKind, OutcomeSource};

use super::chain;
use super::hash::Hasher;

/// Routes input files through converter chains, backed by the cache.
///
/// Holds the run's [`CacheStore`]; every lookup and mutation goes through
/// here, one file at a time.
pub struct Orchestrator {
    cache: CacheStore,
    converters: ConverterRegistry,
    annotator: Option<ImageAnnotator>,
    work_dir: PathBuf,
    status: Arc<dyn StatusSink>,
}

impl Orchestrator {
    /// Orchestrator without image annotation.
    pub fn new(
        cache: CacheStore,
        converters: ConverterRegistry,
        work_dir: impl Into<PathBuf>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            cache,
            converters,
            annotator: None,
            work_dir: work_dir.into(),
            status,
        }
    }

    /// Orchestrator wired from configuration: external command converters,
    /// and the tesseract annotator when OCR is enabled.
    pub fn from_config(config: &Config, cache: CacheStore, status: Arc<dyn StatusSink>) -> Self {
        let converters = ConverterRegistry::from_config(&config.converters, &config.limits);
        let mut orchestrator = Self::new(cache, converters, config.work_dir(), status.clone());

        if config.ocr.enabled {
            let recognizer = Arc::new(TesseractRecognizer::new(
                config.ocr.tesseract.clone(),
                config.limits.ocr_timeout_ms,
            ));
            let mut annotator = ImageAnnotator::new(recognizer, status)
                .with_policy(IgnorePolicy::from_config(&config.ocr.policy));
            if let Some(dir) = config.image_output_dir() {
                annotator = annotator.with_image_output_dir(dir);
            }
            orchestrator = orchestrator.with_annotator(annotator);
        }

        orchestrator
    }

    /// Run image annotation on every markup output.
    pub fn with_annotator(mut self, annotator: ImageAnnotator) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Attach an operator reviewer to the annotator, if there is one.
    pub fn set_reviewer(&mut self, reviewer: Box<dyn ImageReviewer>) {
        if let Some(annotator) = self.annotator.take() {
            self.annotator = Some(annotator.with_reviewer(reviewer));
        }
    }

    /// Whether markup outputs get recognized text inserted.
    pub fn annotates(&self) -> bool {
        self.annotator.is_some()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Default output directory for [`Orchestrator::convert`].
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Give the cache back, e.g. to print final counters.
    pub fn into_cache(self) -> CacheStore {
        self.cache
    }

    /// Convert `input` into the work directory.
    pub async fn convert(
        &mut self,
        input: &Path,
        desired: DocumentKind,
    ) -> PipelineResult<ConversionOutcome> {
        let output_dir = self.work_dir.clone();
        self.convert_into(input, &output_dir, desired).await
    }

    /// Convert `input` to `desired`, writing to `output_dir` on a cache miss.
    ///
    /// The result is `<output_dir>/<input file name>.<target ext>`. A cached
    /// result is returned as is, wherever it was originally written.
    pub async fn convert_into(
        &mut self,
        input: &Path,
        output_dir: &Path,
        desired: DocumentKind,
    ) -> PipelineResult<ConversionOutcome> {
        let start = std::time::Instant::now();
        let input = canonical_input(input).await?;
        tracing::debug!("Processing: {:?}", input);

        if let Some(output) = self.cache.lookup_by_path(&input) {
            if usable_output(output, desired) {
                return Ok(self.cached(input, output.to_path_buf(), OutcomeSource::PathCache));
            }
            tracing::debug!("Recorded output {:?} is gone or not {desired}, reconverting", output);
        }

        let kind = DocumentKind::from_path(&input).ok_or_else(|| PipelineError::UnsupportedFormat {
            path: input.clone(),
            format: input
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;

        let digest = Hasher::content_hash(&input).map_err(|e| PipelineError::io(&input, e))?;
        tracing::trace!("  Content hash: {digest} ({:?})", start.elapsed());

        if let Some(output) = self.cache.lookup_by_content(&digest) {
            if usable_output(output, desired) {
                let output = output.to_path_buf();
                self.cache.record_mapping(&input, &digest, &output)?;
                return Ok(self.cached(input, output, OutcomeSource::ContentCache));
            }
        }

        let hops = chain::resolve(kind, desired).ok_or_else(|| {
            PipelineError::UnsupportedConversion {
                path: input.clone(),
                from: kind.to_string(),
                to: desired.to_string(),
            }
        })?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| PipelineError::io(output_dir, e))?;
        let output_dir = tokio::fs::canonicalize(output_dir)
            .await
            .map_err(|e| PipelineError::io(output_dir, e))?;

        let output = self.run_chain(&input, &output_dir, &hops).await?;
        tracing::trace!("  Chain: {:?}", start.elapsed());

        if desired == DocumentKind::Markup {
            if let Some(annotator) = self.annotator.as_mut() {
                annotator.annotate_file(&output, &mut self.cache).await?;
                tracing::trace!("  OCR: {:?}", start.elapsed());
            }
        }

        self.cache.record_mapping(&input, &digest, &output)?;
        self.status.report(StatusEvent::Converted {
            file: input.clone(),
            output: output.clone(),
        });
        tracing::debug!("Converted {:?} in {:?}", input, start.elapsed());

        Ok(ConversionOutcome {
            input,
            output,
            source: OutcomeSource::Converted,
        })
    }

    /// Run every hop, deleting each intermediate once the next hop has consumed it.
    async fn run_chain(
        &self,
        input: &Path,
        output_dir: &Path,
        hops: &[chain::Hop],
    ) -> PipelineResult<PathBuf> {
        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let mut current = input.to_path_buf();
        for hop in hops {
            let target = output_dir.join(format!("{file_name}.{}", hop.to.extension()));
            let converter = self.converters.get(hop).ok_or_else(|| {
                PipelineError::UnsupportedConversion {
                    path: input.to_path_buf(),
                    from: hop.from.to_string(),
                    to: hop.to.to_string(),
                }
            })?;

            self.status.report(StatusEvent::Converting {
                file: input.to_path_buf(),
                from: hop.from,
                to: hop.to,
            });
            tracing::debug!("  {hop} via {}", converter.name());
            let result = converter.convert(&current, &target).await;

            if current != input {
                self.remove_intermediate(&current).await;
            }
            if let Err(e) = result {
                if target.exists() {
                    self.remove_intermediate(&target).await;
                }
                return Err(e);
            }
            current = target;
        }

        Ok(current)
    }

    async fn remove_intermediate(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            let message = format!("Could not delete intermediate {:?}: {e}", path);
            tracing::warn!("{message}");
            self.status.report(StatusEvent::Warning { message });
        }
    }

    fn cached(&self, input: PathBuf, output: PathBuf, source: OutcomeSource) -> ConversionOutcome {
        self.status
            .report(StatusEvent::AlreadyProcessed { file: input.clone() });
        ConversionOutcome {
            input,
            output,
            source,
        }
    }
}

/// A recorded output counts as a hit only if it still exists and is of the kind asked for.
fn usable_output(output: &Path, desired: DocumentKind) -> bool {
    DocumentKind::from_path(output) == Some(desired) && output.exists()
}

async fn canonical_input(input: &Path) -> PipelineResult<PathBuf> {
    match tokio::fs::canonicalize(input).await {
        Ok(path) => Ok(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PipelineError::FileNotFound(input.to_path_buf()))
        }
        Err(e) => Err(PipelineError::io(input, e)),
    }
}
