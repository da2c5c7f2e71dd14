//! Remote gallery seam
//!
//! The storefront exposes an owner's gallery as an ordered collection
//! addressed by integer position. These three calls are the only way to
//! change it.

#[cfg(any(test, feature = "test-util"))]
mod memory;

use async_trait::async_trait;
use shared::{CatalogImage, OwnerRef};

use crate::item::StagedFile;

#[cfg(any(test, feature = "test-util"))]
pub use memory::{FailPoint, MemoryRemote, RemoteCall};

/// Error returned by a remote gallery implementation
pub type RemoteError = Box<dyn std::error::Error + Send + Sync>;

/// Remote, position-addressed image gallery
#[async_trait]
pub trait MediaRemote: Send + Sync {
    /// Delete the image currently at `position`; later images shift down
    ///
    /// Not idempotent: repeating a call after a successful delete removes a
    /// different image.
    async fn delete_at(&self, owner: &OwnerRef, position: usize) -> Result<(), RemoteError>;

    /// Append `files`, returning one record per file in submission order
    ///
    /// `cover_index` marks one of the new images as cover.
    async fn upload(
        &self,
        owner: &OwnerRef,
        files: &[&StagedFile],
        cover_index: Option<usize>,
    ) -> Result<Vec<CatalogImage>, RemoteError>;

    /// Make the image at `position` the cover; the previous cover is cleared
    async fn set_cover(&self, owner: &OwnerRef, position: usize) -> Result<(), RemoteError>;
}
