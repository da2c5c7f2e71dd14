//! Preview handles for staged images
//!
//! Every staged image owns exactly one [`PreviewHandle`] from the moment it
//! is added until it is removed, uploaded or the session closes. Handles are
//! not `Clone` and [`PreviewAllocator::release`] takes them by value, so a
//! handle cannot be released twice.

use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::item::StagedFile;

/// Locally created preview resource (object URL, data URL, temp file, ...)
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    url: String,
}

impl PreviewHandle {
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Creates and frees preview resources
pub trait PreviewAllocator: Send + Sync {
    fn allocate(&self, file: &StagedFile) -> PreviewHandle;

    fn release(&self, handle: PreviewHandle);
}

/// Inline `data:` URL previews
///
/// Nothing is held outside the handle itself, so release only drops it.
#[derive(Debug, Default)]
pub struct DataUrlPreviews {
    next_id: AtomicU64,
}

impl DataUrlPreviews {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewAllocator for DataUrlPreviews {
    fn allocate(&self, file: &StagedFile) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!(
            "data:{};base64,{}",
            file.mime_type(),
            STANDARD.encode(&file.bytes)
        );
        PreviewHandle::new(id, url)
    }

    fn release(&self, handle: PreviewHandle) {
        tracing::trace!(preview_id = handle.id, "Preview released");
    }
}
