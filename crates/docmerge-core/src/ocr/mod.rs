//! Embedded image handling: ignore policy, operator review, and annotation.

pub mod annotate;
pub mod policy;
pub mod review;

pub use annotate::{format_annotation, image_extension, ImageAnnotator, ImageArtifact};
pub use policy::{IgnorePolicy, ImageFilter};
pub use review::{ImageReviewer, ReviewDecision, ReviewImage};
