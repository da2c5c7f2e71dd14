//! Media Client - HTTP client for the storefront gallery API
//!
//! Implements the engine's remote gallery seam over HTTP, so a
//! [`media_engine::MediaSession`] can commit straight to the storefront.

pub mod config;
pub mod error;
pub mod http;
pub mod media;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use media::HttpMediaRemote;

// Re-export shared types for convenience
pub use shared::{ApiResponse, CatalogImage, OwnerRef};
