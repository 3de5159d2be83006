//! Durable conversion cache.
//!
//! One JSON file holds three maps: input path -> output path, content digest
//! -> output path, and image checksum -> OCR result. The store loads it at
//! startup, is mutated while files are processed, and writes the whole record
//! back after every mutation so an interrupted run loses at most the file or
//! image in flight.

mod record;

pub use record::{CacheRecord, ImageRecord};

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CacheError;
use crate::status::{StatusEvent, StatusSink};

/// Owner of the [`CacheRecord`] for one run.
pub struct CacheStore {
    path: Option<PathBuf>,
    record: CacheRecord,
}

impl CacheStore {
    /// Open the cache file at `path`.
    ///
    /// A missing file yields an empty cache. A file that does not parse is
    /// reset only when it is blank; any other unreadable content is reported
    /// as [`CacheError::Corrupt`] and left on disk untouched.
    pub fn open(path: &Path, status: Arc<dyn StatusSink>) -> Result<Self, CacheError> {
        let record = match std::fs::read(path) {
            Ok(bytes) => Self::parse(path, &bytes, status.as_ref())?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No cache at {:?}, starting empty", path);
                CacheRecord::default()
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        tracing::debug!(
            "Cache loaded: {} path(s), {} digest(s), {} image(s)",
            record.file_path_map.len(),
            record.processed_file_hashes.len(),
            record.ocr_map.len()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            record,
        })
    }

    /// A cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            record: CacheRecord::default(),
        }
    }

    fn parse(
        path: &Path,
        bytes: &[u8],
        status: &dyn StatusSink,
    ) -> Result<CacheRecord, CacheError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            let message = format!("Cache file {path:?} is empty, starting with an empty cache");
            tracing::warn!("{message}");
            status.report(StatusEvent::Warning { message });
            return Ok(CacheRecord::default());
        }

        // Anything else that does not parse, invalid UTF-8 included, is corrupt.
        serde_json::from_slice::<CacheRecord>(bytes).map_err(|e| CacheError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read-only view of the whole record.
    pub fn record(&self) -> &CacheRecord {
        &self.record
    }

    /// Output previously produced for this exact input path.
    pub fn lookup_by_path(&self, path: &Path) -> Option<&Path> {
        self.record.file_path_map.get(path).map(PathBuf::as_path)
    }

    /// Output previously produced for a file with this content digest.
    pub fn lookup_by_content(&self, digest: &str) -> Option<&Path> {
        self.record
            .processed_file_hashes
            .get(digest)
            .map(PathBuf::as_path)
    }

    /// Remember that `path` (with content `digest`) converted to `output`, then persist.
    pub fn record_mapping(
        &mut self,
        path: &Path,
        digest: &str,
        output: &Path,
    ) -> Result<(), CacheError> {
        self.record
            .file_path_map
            .insert(path.to_path_buf(), output.to_path_buf());
        self.record
            .processed_file_hashes
            .insert(digest.to_string(), output.to_path_buf());
        self.persist()
    }

    /// Cached result for an image checksum.
    pub fn lookup_image(&self, checksum: u32) -> Option<&ImageRecord> {
        self.record.ocr_map.get(&checksum.to_string())
    }

    /// Store an image result and persist immediately.
    ///
    /// Existing entries are never replaced; returns `false` in that case.
    pub fn record_image(&mut self, checksum: u32, record: ImageRecord) -> Result<bool, CacheError> {
        let key = checksum.to_string();
        if self.record.ocr_map.contains_key(&key) {
            tracing::debug!("Image {key} already cached, keeping first result");
            return Ok(false);
        }
        self.record.ocr_map.insert(key, record);
        self.persist()?;
        Ok(true)
    }

    /// Drop every path and digest mapping (image results are kept).
    pub fn clear_files(&mut self) {
        self.record.file_path_map.clear();
        self.record.processed_file_hashes.clear();
    }

    /// Drop every image result.
    pub fn clear_images(&mut self) {
        self.record.ocr_map.clear();
    }

    /// Number of path-map entries.
    pub fn path_entries(&self) -> usize {
        self.record.file_path_map.len()
    }

    /// Number of content-digest entries.
    pub fn content_entries(&self) -> usize {
        self.record.processed_file_hashes.len()
    }

    /// Number of image entries.
    pub fn image_entries(&self) -> usize {
        self.record.ocr_map.len()
    }

    /// Write the full record to disk.
    ///
    /// Goes through a temp file in the same directory and an atomic rename,
    /// so a crash mid-write leaves the previous cache intact.
    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| CacheError::Io {
            path: path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(&self.record)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        tracing::trace!("Cache persisted to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{RecordingStatus, TracingStatus};

    fn sink() -> Arc<dyn StatusSink> {
        Arc::new(TracingStatus)
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(&dir.path().join("cache.json"), sink()).unwrap();
        assert_eq!(store.path_entries(), 0);
        assert_eq!(store.image_entries(), 0);
    }

    #[test]
    fn test_empty_file_resets_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "").unwrap();

        let status = RecordingStatus::shared();
        let store = CacheStore::open(&path, status.clone()).unwrap();
        assert_eq!(store.content_entries(), 0);
        assert_eq!(
            status.count(|e| matches!(e, StatusEvent::Warning { .. })),
            1
        );
    }

    #[test]
    fn test_whitespace_file_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "  \n\t").unwrap();
        assert!(CacheStore::open(&path, sink()).is_ok());
    }

    #[test]
    fn test_non_empty_garbage_is_fatal_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{\"ocr_map\": {\"1\": ").unwrap();

        let err = CacheStore::open(&path, sink()).err().unwrap();
        assert!(matches!(err, CacheError::Corrupt { .. }));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"ocr_map\": {\"1\": "
        );
    }

    #[test]
    fn test_binary_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, b'{']).unwrap();

        let err = CacheStore::open(&path, sink()).err().unwrap();
        assert!(matches!(err, CacheError::Corrupt { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xff, 0xfe, 0x00, b'{']);
    }

    #[test]
    fn test_mapping_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        let mut store = CacheStore::open(&path, sink()).unwrap();
        store
            .record_mapping(
                Path::new("/in/notes.pdf"),
                "digest-1",
                Path::new("/work/notes.pdf.html"),
            )
            .unwrap();

        let reopened = CacheStore::open(&path, sink()).unwrap();
        assert_eq!(
            reopened.lookup_by_path(Path::new("/in/notes.pdf")),
            Some(Path::new("/work/notes.pdf.html"))
        );
        assert_eq!(
            reopened.lookup_by_content("digest-1"),
            Some(Path::new("/work/notes.pdf.html"))
        );
        assert!(reopened.lookup_by_path(Path::new("/in/other.pdf")).is_none());
    }

    #[test]
    fn test_record_image_persists_eagerly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut store = CacheStore::open(&path, sink()).unwrap();
        assert!(store
            .record_image(7, ImageRecord::recognized("Total: 42", true))
            .unwrap());

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("Total: 42"));
    }

    #[test]
    fn test_record_image_never_overwrites() {
        let mut store = CacheStore::in_memory();
        assert!(store
            .record_image(9, ImageRecord::recognized("first", false))
            .unwrap());
        assert!(!store.record_image(9, ImageRecord::ignored(true)).unwrap());

        let cached = store.lookup_image(9).unwrap();
        assert_eq!(cached.text, "first");
        assert!(!cached.ignore);
    }

    #[test]
    fn test_in_memory_persist_is_noop() {
        let store = CacheStore::in_memory();
        assert!(store.persist().is_ok());
        assert!(store.path().is_none());
    }

    #[test]
    fn test_clear_files_keeps_images() {
        let mut store = CacheStore::in_memory();
        store
            .record_mapping(Path::new("/a.pdf"), "d", Path::new("/a.html"))
            .unwrap();
        store.record_image(1, ImageRecord::ignored(false)).unwrap();

        store.clear_files();
        assert_eq!(store.path_entries(), 0);
        assert_eq!(store.content_entries(), 0);
        assert_eq!(store.image_entries(), 1);
    }
}
