//! Data models
//!
//! Shared between the media engine, the HTTP client and the frontend (via API).

pub mod image;

// Re-exports
pub use image::*;
