//! Conversion pipeline components.
//!
//! - **hash**: content digests and image checksums
//! - **chain**: shortest conversion chain between two document kinds
//! - **orchestrator**: cache checks, converter chains and OCR for one file
//! - **discovery**: finding groups and input files
//! - **runner**: batch runs over every group under a root

pub mod chain;
pub mod discovery;
pub mod hash;
pub mod orchestrator;
pub mod runner;

// Re-exports for convenient access
pub use chain::{resolve, Hop, DIRECT_CONVERSIONS};
pub use discovery::{DiscoveredFile, DiscoveredGroup, FileDiscovery};
pub use hash::Hasher;
pub use orchestrator::Orchestrator;
pub use runner::BatchRunner;
