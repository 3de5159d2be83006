//! Deciding which embedded images skip text recognition.

use std::fmt;
use std::sync::Arc;

use crate::config::{IgnorePolicyConfig, PolicyKind};

/// Custom ignore rule supplied through the library API.
pub trait ImageFilter: Send + Sync {
    /// True if an image of this size should not be recognized.
    fn should_ignore(&self, width: u32, height: u32) -> bool;
}

/// Ignore policy, resolved once from configuration.
#[derive(Clone)]
pub enum IgnorePolicy {
    /// Ignore images at or below any of the limits
    Threshold {
        width_limit: u32,
        height_limit: u32,
        area_limit: u64,
    },
    /// Recognize every image
    AlwaysOcr,
    /// Recognize nothing
    AlwaysIgnore,
    /// Caller-provided rule
    Custom(Arc<dyn ImageFilter>),
}

impl IgnorePolicy {
    /// Build the policy described by the config section.
    pub fn from_config(config: &IgnorePolicyConfig) -> Self {
        match config.kind {
            PolicyKind::Threshold => Self::Threshold {
                width_limit: config.width_limit,
                height_limit: config.height_limit,
                area_limit: config.area_limit,
            },
            PolicyKind::AlwaysOcr => Self::AlwaysOcr,
            PolicyKind::AlwaysIgnore => Self::AlwaysIgnore,
        }
    }

    /// True if an image of this size should not be recognized.
    pub fn should_ignore(&self, width: u32, height: u32) -> bool {
        match self {
            Self::Threshold {
                width_limit,
                height_limit,
                area_limit,
            } => {
                width <= *width_limit
                    || height <= *height_limit
                    || u64::from(width) * u64::from(height) <= *area_limit
            }
            Self::AlwaysOcr => false,
            Self::AlwaysIgnore => true,
            Self::Custom(filter) => filter.should_ignore(width, height),
        }
    }
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self::from_config(&IgnorePolicyConfig::default())
    }
}

impl fmt::Debug for IgnorePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threshold {
                width_limit,
                height_limit,
                area_limit,
            } => f
                .debug_struct("Threshold")
                .field("width_limit", width_limit)
                .field("height_limit", height_limit)
                .field("area_limit", area_limit)
                .finish(),
            Self::AlwaysOcr => f.write_str("AlwaysOcr"),
            Self::AlwaysIgnore => f.write_str("AlwaysIgnore"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_edges() {
        let policy = IgnorePolicy::default();
        assert!(policy.should_ignore(20, 1000));
        assert!(policy.should_ignore(1000, 20));
        assert!(!policy.should_ignore(21, 1000));
        // 96 x 124 = 11904: exactly on the area limit
        assert!(policy.should_ignore(96, 124));
        assert!(!policy.should_ignore(97, 124));
    }

    #[test]
    fn test_always_variants() {
        assert!(!IgnorePolicy::AlwaysOcr.should_ignore(1, 1));
        assert!(IgnorePolicy::AlwaysIgnore.should_ignore(4000, 4000));
    }

    #[test]
    fn test_custom_filter() {
        struct WideOnly;
        impl ImageFilter for WideOnly {
            fn should_ignore(&self, width: u32, height: u32) -> bool {
                width < height
            }
        }
        let policy = IgnorePolicy::Custom(Arc::new(WideOnly));
        assert!(policy.should_ignore(10, 20));
        assert!(!policy.should_ignore(20, 10));
    }

    #[test]
    fn test_from_config_kinds() {
        let mut config = IgnorePolicyConfig::default();
        config.kind = PolicyKind::AlwaysIgnore;
        assert!(matches!(
            IgnorePolicy::from_config(&config),
            IgnorePolicy::AlwaysIgnore
        ));
    }
}
