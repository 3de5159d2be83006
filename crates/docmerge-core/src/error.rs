//! Error types for the docmerge conversion pipeline.
//!
//! Errors are organized by component so the batch runner can tell a per-file
//! failure (skip and continue) from a fatal one (stop the run).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for docmerge operations.
#[derive(Error, Debug)]
pub enum DocmergeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cache store errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while loading or persisting the cache file.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache file holds data that cannot be parsed. Never auto-repaired.
    #[error(
        "Cache file {path} is corrupt: {message}\n  \
         Fix or move the file aside before running again; it was left untouched."
    )]
    Corrupt { path: PathBuf, message: String },

    /// Reading or writing the cache file failed
    #[error("Cache I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the cache record failed
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Per-file pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file kind is not one the pipeline understands
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// No chain of converters connects the two kinds
    #[error("No conversion from {from} to {to} for {path}")]
    UnsupportedConversion {
        path: PathBuf,
        from: String,
        to: String,
    },

    /// Input file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// An external converter or tool failed
    #[error("{tool} failed for {path}: {message}")]
    ExternalTool {
        tool: String,
        path: PathBuf,
        message: String,
    },

    /// An external tool exceeded its time limit
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// Text recognition failed
    #[error("OCR error: {message}")]
    Ocr { message: String },

    /// Filesystem error tied to a specific path
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache failure surfaced while processing a file
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl PipelineError {
    /// Whether the batch may skip this file and keep going.
    ///
    /// Everything except cache failures is local to one file.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PipelineError::Cache(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for docmerge results.
pub type Result<T> = std::result::Result<T, DocmergeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_errors_are_not_recoverable() {
        let err = PipelineError::Cache(CacheError::Corrupt {
            path: PathBuf::from("/tmp/cache.json"),
            message: "expected value".to_string(),
        });
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_tool_failures_are_recoverable() {
        let err = PipelineError::ExternalTool {
            tool: "pdf2docx".to_string(),
            path: PathBuf::from("notes.pdf"),
            message: "exit status 1".to_string(),
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("pdf2docx"));
    }

    #[test]
    fn test_corrupt_message_names_file() {
        let err = CacheError::Corrupt {
            path: PathBuf::from("/data/cache.json"),
            message: "trailing characters".to_string(),
        };
        assert!(err.to_string().contains("/data/cache.json"));
    }
}
