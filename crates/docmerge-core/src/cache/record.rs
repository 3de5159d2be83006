//! On-disk shape of the cache file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of resolving one embedded image. Written once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Recognized text (empty when ignored)
    pub text: String,
    /// Excluded from recognition
    pub ignore: bool,
    /// Shown to the operator for review
    pub seen: bool,
}

impl ImageRecord {
    /// A record for an image that was skipped.
    pub fn ignored(seen: bool) -> Self {
        Self {
            text: String::new(),
            ignore: true,
            seen,
        }
    }

    /// A record holding recognized text.
    pub fn recognized(text: impl Into<String>, seen: bool) -> Self {
        Self {
            text: text.into(),
            ignore: false,
            seen,
        }
    }
}

/// The three persisted maps.
///
/// `BTreeMap` keeps the serialized file stable between runs, which makes
/// diffs of the cache file readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheRecord {
    /// Image checksum (decimal) -> recognition result
    pub ocr_map: BTreeMap<String, ImageRecord>,
    /// Absolute input path -> absolute output path
    pub file_path_map: BTreeMap<PathBuf, PathBuf>,
    /// Content digest (hex) -> absolute output path
    pub processed_file_hashes: BTreeMap<String, PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_on_disk() {
        let mut record = CacheRecord::default();
        record
            .ocr_map
            .insert("42".into(), ImageRecord::recognized("hello", false));
        record
            .file_path_map
            .insert(PathBuf::from("/in/a.pdf"), PathBuf::from("/out/a.pdf.html"));
        record
            .processed_file_hashes
            .insert("abc".into(), PathBuf::from("/out/a.pdf.html"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["ocr_map"]["42"]["text"], "hello");
        assert_eq!(json["ocr_map"]["42"]["ignore"], false);
        assert_eq!(json["ocr_map"]["42"]["seen"], false);
        assert_eq!(json["file_path_map"]["/in/a.pdf"], "/out/a.pdf.html");
        assert_eq!(json["processed_file_hashes"]["abc"], "/out/a.pdf.html");
    }

    #[test]
    fn test_missing_maps_default_to_empty() {
        let record: CacheRecord = serde_json::from_str(r#"{"ocr_map": {}}"#).unwrap();
        assert!(record.file_path_map.is_empty());
        assert!(record.processed_file_hashes.is_empty());
    }
}
