//! Configuration validation.

use crate::error::ConfigError;
use crate::types::DocumentKind;

use super::{CommandSpec, Config};

impl Config {
    /// Validate configuration values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.kind.parse::<DocumentKind>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "output.kind '{}' is not one of pptx, pdf, docx, html",
                self.output.kind
            )));
        }
        if self.discovery.input_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "discovery.input_formats must not be empty".into(),
            ));
        }
        if self.limits.converter_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.converter_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.ocr_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.ocr_timeout_ms must be > 0".into(),
            ));
        }
        if self.general.cache_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.cache_file must not be empty".into(),
            ));
        }
        let commands: [(&str, &CommandSpec); 4] = [
            ("pptx_to_pdf", &self.converters.pptx_to_pdf),
            ("pdf_to_docx", &self.converters.pdf_to_docx),
            ("docx_to_pdf", &self.converters.docx_to_pdf),
            ("docx_to_html", &self.converters.docx_to_html),
        ];
        for (name, spec) in commands {
            if spec.program.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "converters.{name}.program must not be empty"
                )));
            }
        }
        if self.ocr.enabled && self.ocr.tesseract.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ocr.tesseract must be set when OCR is enabled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_output_kind() {
        let mut config = Config::default();
        config.output.kind = "txt".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.kind"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.converter_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("converter_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_empty_program() {
        let mut config = Config::default();
        config.converters.pdf_to_docx.program = " ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pdf_to_docx"));
    }

    #[test]
    fn test_validate_rejects_no_input_formats() {
        let mut config = Config::default();
        config.discovery.input_formats.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("input_formats"));
    }

    #[test]
    fn test_tesseract_only_required_with_ocr() {
        let mut config = Config::default();
        config.ocr.tesseract.clear();
        assert!(config.validate().is_err());
        config.ocr.enabled = false;
        assert!(config.validate().is_ok());
    }
}
