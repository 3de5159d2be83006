//! External collaborators: format converters and text recognition.
//!
//! The pipeline only sees the traits defined here. Command-line backed
//! implementations live in the submodules; tests plug in fakes.

mod command;
mod process;
mod tesseract;

pub use command::{CommandConverter, CopyConverter};
pub use tesseract::TesseractRecognizer;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::{ConvertersConfig, LimitsConfig};
use crate::error::PipelineResult;
use crate::pipeline::chain::Hop;
use crate::types::DocumentKind;

/// Converts one file into another format. One implementation per direct pair.
///
/// Uses `async_trait` because the registry stores `Arc<dyn FormatConverter>`.
#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// Converter name for logging (e.g., "pdf2docx").
    fn name(&self) -> &str;

    /// Read `input` and write the converted document to exactly `output`.
    async fn convert(&self, input: &Path, output: &Path) -> PipelineResult<()>;
}

/// Extracts text from an encoded image (PNG, JPEG, ...).
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognizer name for logging.
    fn name(&self) -> &str;

    /// Recognize text in the image bytes.
    async fn extract(&self, image: &[u8]) -> PipelineResult<String>;
}

/// Converters keyed by the hop they implement.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<Hop, Arc<dyn FormatConverter>>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry backed by the configured external commands, plus identity copies.
    pub fn from_config(converters: &ConvertersConfig, limits: &LimitsConfig) -> Self {
        use DocumentKind::*;

        let timeout = limits.converter_timeout_ms;
        let mut registry = Self::new().with_identity_copies();
        registry.register(
            Hop::new(Presentation, PageDescription),
            Arc::new(CommandConverter::new(converters.pptx_to_pdf.clone(), timeout)),
        );
        registry.register(
            Hop::new(PageDescription, WordProcessor),
            Arc::new(CommandConverter::new(converters.pdf_to_docx.clone(), timeout)),
        );
        registry.register(
            Hop::new(WordProcessor, PageDescription),
            Arc::new(CommandConverter::new(converters.docx_to_pdf.clone(), timeout)),
        );
        registry.register(
            Hop::new(WordProcessor, Markup),
            Arc::new(CommandConverter::new(converters.docx_to_html.clone(), timeout)),
        );
        registry
    }

    /// Register a [`CopyConverter`] for every same-kind hop.
    pub fn with_identity_copies(mut self) -> Self {
        for kind in DocumentKind::ALL {
            self.register(Hop::new(kind, kind), Arc::new(CopyConverter));
        }
        self
    }

    /// Register (or replace) the converter for a hop.
    pub fn register(&mut self, hop: Hop, converter: Arc<dyn FormatConverter>) {
        self.converters.insert(hop, converter);
    }

    /// Converter for a hop, if registered.
    pub fn get(&self, hop: &Hop) -> Option<&Arc<dyn FormatConverter>> {
        self.converters.get(hop)
    }
}
