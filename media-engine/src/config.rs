//! Gallery configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | MEDIA_PRODUCT_MAX_ITEMS | 10 | Images per product |
//! | MEDIA_BRAND_MAX_ITEMS | 5 | Images per brand |
//! | MEDIA_CATEGORY_MAX_ITEMS | 5 | Images per category |
//! | MEDIA_MAX_UPLOAD_BYTES | 1048576 | Re-encode files above this size |
//! | MEDIA_MAX_DIMENSION | 1920 | Longest edge in pixels |
//! | MEDIA_JPEG_QUALITY | 85 | JPEG quality for re-encoded files |

use shared::ImageOwner;

use crate::compress::ImageConstraints;

/// Per-owner gallery limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConfig {
    pub max_items: usize,
    pub constraints: ImageConstraints,
}

impl MediaConfig {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            constraints: ImageConstraints::default(),
        }
    }

    /// Built-in limits for `owner`
    pub fn for_owner(owner: ImageOwner) -> Self {
        Self::new(default_max_items(owner))
    }

    /// Limits for `owner`, overridable through environment variables
    pub fn from_env(owner: ImageOwner) -> Self {
        let defaults = ImageConstraints::default();
        let key = format!("MEDIA_{}_MAX_ITEMS", owner.as_str().to_uppercase());
        Self {
            max_items: env_or(&key, default_max_items(owner)),
            constraints: ImageConstraints {
                max_bytes: env_or("MEDIA_MAX_UPLOAD_BYTES", defaults.max_bytes),
                max_dimension: env_or("MEDIA_MAX_DIMENSION", defaults.max_dimension),
                jpeg_quality: env_or("MEDIA_JPEG_QUALITY", defaults.jpeg_quality),
            },
        }
    }

    pub fn with_constraints(mut self, constraints: ImageConstraints) -> Self {
        self.constraints = constraints;
        self
    }
}

fn default_max_items(owner: ImageOwner) -> usize {
    match owner {
        ImageOwner::Product => 10,
        ImageOwner::Brand | ImageOwner::Category => 5,
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
