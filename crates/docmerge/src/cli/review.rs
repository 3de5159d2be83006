//! Terminal prompt asking the operator whether an image is worth recognizing.

use console::Style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use docmerge_core::ocr::image_extension;
use docmerge_core::{ImageReviewer, ReviewDecision, ReviewImage};
use indicatif::ProgressBar;
use std::path::PathBuf;

use super::handle_interrupt;
use super::theme::docmerge_theme;

/// Saves a preview of each image and prompts `Ignore? (*/N/exit)`.
pub struct DialoguerReviewer {
    theme: ColorfulTheme,
    preview_dir: PathBuf,
    progress: Option<ProgressBar>,
}

impl DialoguerReviewer {
    pub fn new(preview_dir: PathBuf) -> Self {
        Self {
            theme: docmerge_theme(),
            preview_dir,
            progress: None,
        }
    }

    /// Hide `bar` while the prompt is shown.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    fn save_preview(&self, image: &ReviewImage<'_>) -> Option<PathBuf> {
        let extension = image_extension(image.bytes).unwrap_or("bin");
        let path = self
            .preview_dir
            .join(format!("{}.{extension}", image.checksum));
        let written = std::fs::create_dir_all(&self.preview_dir)
            .and_then(|_| std::fs::write(&path, image.bytes));
        match written {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::debug!("Could not save preview {:?}: {e}", path);
                None
            }
        }
    }

    fn ask(&self, image: &ReviewImage<'_>) -> anyhow::Result<ReviewDecision> {
        let cyan = Style::new().for_stderr().cyan();
        let dim = Style::new().for_stderr().dim();

        eprintln!();
        eprintln!(
            "  {} {}x{} px, {} bytes {}",
            cyan.apply_to("Image"),
            image.width,
            image.height,
            image.bytes.len(),
            dim.apply_to(format!("(#{})", image.checksum))
        );
        if let Some(path) = self.save_preview(image) {
            eprintln!("    preview: {}", path.display());
        }

        let response = handle_interrupt(
            Input::<String>::with_theme(&self.theme)
                .with_prompt("Ignore? (*/N/exit)")
                .allow_empty(true)
                .interact_text(),
        )?;

        // Ctrl+C stops reviewing rather than aborting the run.
        Ok(response
            .map(|text| ReviewDecision::from_response(&text))
            .unwrap_or(ReviewDecision::Exit))
    }
}

impl ImageReviewer for DialoguerReviewer {
    fn review(&mut self, image: &ReviewImage<'_>) -> ReviewDecision {
        let ask = || tokio::task::block_in_place(|| self.ask(image));
        let result = match &self.progress {
            Some(bar) => bar.suspend(ask),
            None => ask(),
        };
        result.unwrap_or_else(|e| {
            tracing::warn!("Image review failed, not asking again: {e}");
            ReviewDecision::Exit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_saved_by_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let reviewer = DialoguerReviewer::new(dir.path().join("previews"));
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let image = ReviewImage {
            checksum: 42,
            width: 300,
            height: 200,
            bytes: &png,
        };

        let path = reviewer.save_preview(&image).unwrap();
        assert_eq!(path, dir.path().join("previews/42.png"));
        assert_eq!(std::fs::read(path).unwrap(), png);
    }
}
