//! Shared types for the storefront back-office
//!
//! Catalog image models and the unified error system used by the media
//! engine and the HTTP client.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ApiResponse, AppError, ErrorCode};
pub use http;
pub use models::{CatalogImage, ImageOwner, ImageUploadResponse, OwnerRef};
pub use serde::{Deserialize, Serialize};
