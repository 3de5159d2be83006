//! Command implementations.

pub mod cache;
pub mod config;
pub mod convert;
pub mod merge;
pub mod progress;
pub mod review;
pub mod run;
pub mod theme;

use anyhow::Context;
use docmerge_core::{CacheError, CacheStore, StatusSink};
use std::path::Path;
use std::sync::Arc;

/// Open the cache file, explaining what to do when it is corrupt.
pub(crate) fn open_cache(path: &Path, status: Arc<dyn StatusSink>) -> anyhow::Result<CacheStore> {
    match CacheStore::open(path, status) {
        Ok(cache) => Ok(cache),
        Err(e @ CacheError::Corrupt { .. }) => Err(e).with_context(|| {
            format!(
                "The cache file could not be read. Fix or remove {} \
                 (or run `docmerge cache clear`) and try again.",
                path.display()
            )
        }),
        Err(e) => Err(e.into()),
    }
}

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}
