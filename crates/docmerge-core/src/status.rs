//! Status reporting shared by the cache, orchestrator, annotator and merger.
//!
//! A single [`StatusSink`] is built by the caller and handed to every
//! component as `Arc<dyn StatusSink>`. The core never prints directly; the
//! CLI renders events with a progress bar, tests record them.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::types::DocumentKind;

/// Something observable happened in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// A new group (directory) is being processed
    GroupStarted { name: String, files: usize },
    /// A file was satisfied from the cache
    AlreadyProcessed { file: PathBuf },
    /// One hop of a conversion chain is running
    Converting {
        file: PathBuf,
        from: DocumentKind,
        to: DocumentKind,
    },
    /// A file finished converting
    Converted { file: PathBuf, output: PathBuf },
    /// A file was skipped or failed
    FileFailed { file: PathBuf, reason: String },
    /// Image annotation began for a document
    OcrStarted { document: PathBuf, images: usize },
    /// One embedded image was resolved
    ImageResolved { index: usize, outcome: ImageOutcome },
    /// Merged output is being written
    Merging { destination: PathBuf, files: usize },
    /// Non-fatal condition worth surfacing
    Warning { message: String },
}

/// How an embedded image was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Cached text reused
    Cached,
    /// Cached as ignored
    CachedIgnored,
    /// Ignored by policy or operator
    Ignored { width: u32, height: u32 },
    /// Text recognized now
    Recognized { chars: usize },
    /// Payload could not be decoded
    Undecodable,
}

/// Receiver for pipeline status events.
pub trait StatusSink: Send + Sync {
    /// Handle one event.
    fn report(&self, event: StatusEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatus;

impl StatusSink for TracingStatus {
    fn report(&self, event: StatusEvent) {
        match event {
            StatusEvent::GroupStarted { name, files } => {
                tracing::info!("Group {name}: {files} file(s)")
            }
            StatusEvent::AlreadyProcessed { file } => {
                tracing::info!("Already processed: {:?}", file)
            }
            StatusEvent::Converting { file, from, to } => {
                tracing::debug!("Converting {:?} ({from} -> {to})", file)
            }
            StatusEvent::Converted { file, output } => {
                tracing::info!("Converted {:?} -> {:?}", file, output)
            }
            StatusEvent::FileFailed { file, reason } => {
                tracing::warn!("Skipped {:?}: {reason}", file)
            }
            StatusEvent::OcrStarted { document, images } => {
                tracing::debug!("OCR pass over {:?}: {images} image(s)", document)
            }
            StatusEvent::ImageResolved { index, outcome } => {
                tracing::trace!("  image {index}: {:?}", outcome)
            }
            StatusEvent::Merging { destination, files } => {
                tracing::info!("Merging {files} file(s) into {:?}", destination)
            }
            StatusEvent::Warning { message } => tracing::warn!("{message}"),
        }
    }
}

/// Collects events in memory; useful for tests and summaries.
#[derive(Debug, Default)]
pub struct RecordingStatus {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingStatus {
    /// Create an empty recorder behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Count events matching a predicate.
    pub fn count(&self, pred: impl Fn(&StatusEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl StatusSink for RecordingStatus {
    fn report(&self, event: StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Default sink used when the caller doesn't supply one.
pub fn tracing_sink() -> Arc<dyn StatusSink> {
    Arc::new(TracingStatus)
}
