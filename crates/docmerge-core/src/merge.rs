//! Concatenating converted documents into one merged document.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};
use crate::markup::strip_inline_images;
use crate::status::{StatusEvent, StatusSink};

/// What a merge wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Merged document
    pub destination: PathBuf,
    /// Number of inputs concatenated
    pub files_merged: usize,
    /// Bytes written to the merged document
    pub bytes_written: u64,
    /// Imageless sibling, when one was written
    pub imageless: Option<PathBuf>,
}

/// Sibling path for the imageless variant: `<stem> (Imageless).<ext>`.
pub fn imageless_path(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match destination.extension() {
        Some(ext) => format!("{stem} (Imageless).{}", ext.to_string_lossy()),
        None => format!("{stem} (Imageless)"),
    };
    destination.with_file_name(name)
}

/// Writes merged documents.
pub struct Merger {
    imageless: bool,
    status: Arc<dyn StatusSink>,
}

impl Merger {
    pub fn new(status: Arc<dyn StatusSink>) -> Self {
        Self {
            imageless: false,
            status,
        }
    }

    /// Also write a copy with every inline image removed.
    pub fn with_imageless(mut self, imageless: bool) -> Self {
        self.imageless = imageless;
        self
    }

    /// Replace `destination` with the concatenation of `ordered_outputs`.
    ///
    /// The destination is truncated first, so merging the same inputs twice
    /// yields the same file.
    pub fn merge(
        &self,
        ordered_outputs: &[PathBuf],
        destination: &Path,
    ) -> PipelineResult<MergeReport> {
        self.status.report(StatusEvent::Merging {
            destination: destination.to_path_buf(),
            files: ordered_outputs.len(),
        });

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }

        let file = File::create(destination).map_err(|e| PipelineError::io(destination, e))?;
        let mut writer = BufWriter::new(file);
        let mut stripped = self.imageless.then(String::new);
        let mut bytes_written = 0u64;

        for output in ordered_outputs {
            let content = std::fs::read(output).map_err(|e| PipelineError::io(output, e))?;
            writer
                .write_all(&content)
                .map_err(|e| PipelineError::io(destination, e))?;
            bytes_written += content.len() as u64;

            if let Some(buffer) = stripped.as_mut() {
                buffer.push_str(&strip_inline_images(&String::from_utf8_lossy(&content)));
            }
        }
        writer
            .flush()
            .map_err(|e| PipelineError::io(destination, e))?;

        let imageless = match stripped {
            Some(buffer) => {
                let path = imageless_path(destination);
                std::fs::write(&path, buffer).map_err(|e| PipelineError::io(&path, e))?;
                Some(path)
            }
            None => None,
        };

        tracing::debug!(
            "Merged {} file(s), {} bytes into {:?}",
            ordered_outputs.len(),
            bytes_written,
            destination
        );

        Ok(MergeReport {
            destination: destination.to_path_buf(),
            files_merged: ordered_outputs.len(),
            bytes_written,
            imageless,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::TracingStatus;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_imageless_path() {
        assert_eq!(
            imageless_path(Path::new("/out/course1.html")),
            PathBuf::from("/out/course1 (Imageless).html")
        );
        assert_eq!(
            imageless_path(Path::new("merged")),
            PathBuf::from("merged (Imageless)")
        );
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let b = write(dir.path(), "b.html", "<p>B</p>");
        let a = write(dir.path(), "a.html", "<p>A</p>");
        let dest = dir.path().join("out").join("merged.html");

        let report = Merger::new(Arc::new(TracingStatus))
            .merge(&[b, a], &dest)
            .unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "<p>B</p><p>A</p>");
        assert_eq!(report.files_merged, 2);
        assert_eq!(report.bytes_written, 16);
        assert!(report.imageless.is_none());
    }

    #[test]
    fn test_merge_truncates_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.html", "one");
        let dest = write(dir.path(), "merged.html", "stale content that is longer");
        let merger = Merger::new(Arc::new(TracingStatus));

        merger.merge(std::slice::from_ref(&a), &dest).unwrap();
        merger.merge(std::slice::from_ref(&a), &dest).unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "one");
    }

    #[test]
    fn test_imageless_variant_strips_inline_images() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(
            dir.path(),
            "a.html",
            r#"<p>x</p><img src="data:image/png;base64,QUJD" /> OCR text: 'hi'"#,
        );
        let dest = dir.path().join("merged.html");

        let report = Merger::new(Arc::new(TracingStatus))
            .with_imageless(true)
            .merge(&[a], &dest)
            .unwrap();

        let imageless = report.imageless.unwrap();
        assert_eq!(imageless, dir.path().join("merged (Imageless).html"));
        assert_eq!(
            std::fs::read_to_string(imageless).unwrap(),
            "<p>x</p> OCR text: 'hi'"
        );
        assert!(std::fs::read_to_string(&dest).unwrap().contains("<img"));
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Merger::new(Arc::new(TracingStatus))
            .merge(&[dir.path().join("gone.html")], &dir.path().join("m.html"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
