//! Image references held by an editing session

use serde::{Deserialize, Serialize};
use shared::CatalogImage;
use uuid::Uuid;

use crate::preview::PreviewHandle;

/// Session-unique image identifier
///
/// Persisted images reuse the canonical record id, staged images get a
/// fresh local id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a locally staged image
    pub(crate) fn staged() -> Self {
        Self(format!("staged-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Raw image bytes picked by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Original file name (extension drives format detection)
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercased file extension, empty when missing
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default()
    }

    /// MIME type guessed from the file name
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .to_string()
    }
}

/// Where an image currently lives
#[derive(Debug)]
pub enum Origin {
    /// Stored remotely; `record.position` is the remote position at session
    /// start and is never renumbered locally.
    Persisted { record: CatalogImage },
    /// Local bytes plus the preview handle the UI renders from.
    Staged {
        file: StagedFile,
        preview: PreviewHandle,
    },
}

/// One slot of the unified gallery view
#[derive(Debug)]
pub struct ImageItem {
    pub(crate) id: ItemId,
    pub(crate) origin: Origin,
    pub(crate) marked_for_deletion: bool,
    pub(crate) is_cover: bool,
}

impl ImageItem {
    pub(crate) fn persisted(record: CatalogImage) -> Self {
        Self {
            id: ItemId::new(record.id.clone()),
            is_cover: record.is_cover,
            origin: Origin::Persisted { record },
            marked_for_deletion: false,
        }
    }

    pub(crate) fn staged(file: StagedFile, preview: PreviewHandle) -> Self {
        Self {
            id: ItemId::staged(),
            origin: Origin::Staged { file, preview },
            marked_for_deletion: false,
            is_cover: false,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self.origin, Origin::Persisted { .. })
    }

    pub fn is_staged(&self) -> bool {
        matches!(self.origin, Origin::Staged { .. })
    }

    /// Remote position recorded at session start (persisted images only)
    pub fn position(&self) -> Option<usize> {
        match &self.origin {
            Origin::Persisted { record } => Some(record.position),
            Origin::Staged { .. } => None,
        }
    }

    /// URL the UI should render for this image
    pub fn display_url(&self) -> &str {
        match &self.origin {
            Origin::Persisted { record } => &record.storage_locator,
            Origin::Staged { preview, .. } => preview.url(),
        }
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    pub fn is_cover(&self) -> bool {
        self.is_cover
    }
}
