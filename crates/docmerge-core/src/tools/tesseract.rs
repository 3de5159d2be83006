//! Text recognition through the `tesseract` command-line tool.

use async_trait::async_trait;
use std::io::Write;

use super::process::run_tool;
use super::TextRecognizer;
use crate::error::{PipelineError, PipelineResult};
use crate::ocr::image_extension;

/// Runs `tesseract <image> stdout` on a temporary copy of the image.
pub struct TesseractRecognizer {
    program: String,
    timeout_ms: u64,
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            program: program.into(),
            timeout_ms,
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn extract(&self, image: &[u8]) -> PipelineResult<String> {
        let extension = image_extension(image).unwrap_or("png");

        let mut file = tempfile::Builder::new()
            .prefix("docmerge-ocr-")
            .suffix(&format!(".{extension}"))
            .tempfile()
            .map_err(|e| PipelineError::Ocr {
                message: format!("cannot create temp image: {e}"),
            })?;
        file.write_all(image)
            .and_then(|_| file.flush())
            .map_err(|e| PipelineError::Ocr {
                message: format!("cannot write temp image: {e}"),
            })?;

        let args = vec![file.path().to_string_lossy().into_owned(), "stdout".to_string()];
        let output = run_tool(&self.program, &args, self.timeout_ms, "ocr", file.path()).await?;

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}
