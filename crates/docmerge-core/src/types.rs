//! Core data types shared across the conversion pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Document families the pipeline can route between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Slide decks (`pptx`)
    Presentation,
    /// Page-description documents (`pdf`)
    PageDescription,
    /// Word-processor documents (`docx`)
    WordProcessor,
    /// Markup (`html`)
    Markup,
}

impl DocumentKind {
    /// All kinds, in routing-table order.
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Presentation,
        DocumentKind::PageDescription,
        DocumentKind::WordProcessor,
        DocumentKind::Markup,
    ];

    /// Parse a kind from a file extension (case-insensitive, leading dot allowed).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pptx" => Some(Self::Presentation),
            "pdf" => Some(Self::PageDescription),
            "docx" => Some(Self::WordProcessor),
            "html" | "htm" => Some(Self::Markup),
            _ => None,
        }
    }

    /// Determine the kind of a file from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical file extension written for this kind.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Presentation => "pptx",
            Self::PageDescription => "pdf",
            Self::WordProcessor => "docx",
            Self::Markup => "html",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unknown document kind '{s}'"))
    }
}

/// Result of running one file through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// Canonical absolute input path
    pub input: PathBuf,
    /// Path of the converted document
    pub output: PathBuf,
    /// How the output was obtained
    pub source: OutcomeSource,
}

impl ConversionOutcome {
    /// True if no converter ran for this file.
    pub fn from_cache(&self) -> bool {
        !matches!(self.source, OutcomeSource::Converted)
    }
}

/// Where a conversion result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    /// The exact input path was already mapped
    PathCache,
    /// Another path with identical bytes was already converted
    ContentCache,
    /// Converters ran for this file
    Converted,
}

/// Counters for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Groups that produced a merged document
    pub groups_merged: usize,
    /// Files converted in this run
    pub converted: usize,
    /// Files satisfied from the cache
    pub cached: usize,
    /// Files skipped for unsupported kinds
    pub unsupported: usize,
    /// Files whose conversion failed
    pub failed: usize,
    /// Merged documents written
    pub merged_documents: Vec<PathBuf>,
}

impl BatchReport {
    /// Total files seen.
    pub fn total(&self) -> usize {
        self.converted + self.cached + self.unsupported + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(
            DocumentKind::from_extension("PPTX"),
            Some(DocumentKind::Presentation)
        );
        assert_eq!(
            DocumentKind::from_extension(".pdf"),
            Some(DocumentKind::PageDescription)
        );
        assert_eq!(DocumentKind::from_extension("htm"), Some(DocumentKind::Markup));
        assert_eq!(DocumentKind::from_extension("txt"), None);
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            DocumentKind::from_path(Path::new("course1/notes.docx")),
            Some(DocumentKind::WordProcessor)
        );
        assert_eq!(DocumentKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_kind_parse_and_display() {
        let kind: DocumentKind = "html".parse().unwrap();
        assert_eq!(kind.to_string(), "html");
        assert!("odt".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_outcome_from_cache() {
        let outcome = ConversionOutcome {
            input: PathBuf::from("/a.pdf"),
            output: PathBuf::from("/w/a.pdf.html"),
            source: OutcomeSource::ContentCache,
        };
        assert!(outcome.from_cache());
    }
}
