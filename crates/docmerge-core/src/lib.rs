//! Docmerge Core - document conversion cache and merge pipeline.
//!
//! Docmerge converts office documents (presentations, PDFs, word-processor
//! files) into HTML through chains of external converters, inserts
//! recognized text after embedded images, and merges each directory's
//! results into one document.
//!
//! # Architecture
//!
//! ```text
//! Discover → Cache check → Convert chain → OCR annotate → Record → Merge
//! ```
//!
//! Two content-addressed caches avoid repeated work: whole files by path
//! and BLAKE3 digest, embedded images by checksum. Both live in one JSON
//! file that is rewritten after every change.
//!
//! # Usage
//!
//! ```rust,ignore
//! use docmerge_core::{CacheStore, Config, DocumentKind, Orchestrator, tracing_sink};
//!
//! #[tokio::main]
//! async fn main() -> docmerge_core::Result<()> {
//!     let config = Config::load()?;
//!     let status = tracing_sink();
//!     let cache = CacheStore::open(&config.cache_file(), status.clone())?;
//!     let mut orchestrator = Orchestrator::from_config(&config, cache, status);
//!
//!     let outcome = orchestrator.convert("./slides.pptx".as_ref(), DocumentKind::Markup).await?;
//!     println!("{:?}", outcome.output);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod cache;
pub mod config;
pub mod error;
pub mod markup;
pub mod merge;
pub mod ocr;
pub mod pipeline;
pub mod status;
pub mod tools;
pub mod types;

// Re-exports for convenient access
pub use cache::{CacheRecord, CacheStore, ImageRecord};
pub use config::Config;
pub use error::{CacheError, ConfigError, DocmergeError, PipelineError, PipelineResult, Result};
pub use merge::{imageless_path, MergeReport, Merger};
pub use ocr::{
    IgnorePolicy, ImageAnnotator, ImageFilter, ImageReviewer, ReviewDecision, ReviewImage,
};
pub use pipeline::{
    BatchRunner, DiscoveredFile, DiscoveredGroup, FileDiscovery, Hasher, Orchestrator,
};
pub use status::{
    tracing_sink, ImageOutcome, RecordingStatus, StatusEvent, StatusSink, TracingStatus,
};
pub use tools::{ConverterRegistry, FormatConverter, TextRecognizer};
pub use types::{BatchReport, ConversionOutcome, DocumentKind, OutcomeSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
