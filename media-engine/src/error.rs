//! Media engine error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::compress::ImageRejection;
use crate::item::ItemId;
use crate::remote::RemoteError;

/// Errors raised by the gallery editing session
///
/// Local variants reject the operation before any state is touched; the
/// `Remote*` variants abort a commit and leave the local edits in place.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Gallery holds at most {max} images ({requested} requested)")]
    CapacityExceeded { max: usize, requested: usize },

    #[error("Image {0} is marked for deletion and cannot be cover")]
    CoverOnDeletedItem(ItemId),

    #[error("Image not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Duplicate image id: {0}")]
    DuplicateItem(ItemId),

    #[error("Index {index} out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Image changes are already being saved")]
    CommitInFlight,

    #[error("Image editing session has ended")]
    SessionClosed,

    #[error("Image {name} rejected: {reason}")]
    InvalidImage {
        name: String,
        #[source]
        reason: ImageRejection,
    },

    #[error("Failed to delete image at position {position}: {source}")]
    RemoteDeleteFailed {
        position: usize,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to upload images: {source}")]
    RemoteUploadFailed {
        #[source]
        source: RemoteError,
    },

    #[error("Failed to set cover at position {position}: {source}")]
    RemoteCoverFailed {
        position: usize,
        #[source]
        source: RemoteError,
    },
}

impl MediaError {
    /// Whether the failure happened against the remote gallery
    ///
    /// A remote failure may leave the remote collection partway between the
    /// old and the intended state.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            MediaError::RemoteDeleteFailed { .. }
                | MediaError::RemoteUploadFailed { .. }
                | MediaError::RemoteCoverFailed { .. }
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MediaError::CapacityExceeded { .. } => ErrorCode::ImageLimitExceeded,
            MediaError::CoverOnDeletedItem(_) => ErrorCode::CoverOnDeletedImage,
            MediaError::ItemNotFound(_) => ErrorCode::ImageNotFound,
            MediaError::DuplicateItem(_) => ErrorCode::AlreadyExists,
            MediaError::IndexOutOfRange { .. } => ErrorCode::ImagePositionInvalid,
            MediaError::CommitInFlight => ErrorCode::MediaCommitInProgress,
            MediaError::SessionClosed => ErrorCode::MediaSessionClosed,
            MediaError::InvalidImage { reason, .. } => reason.code(),
            MediaError::RemoteDeleteFailed { .. } => ErrorCode::ImageDeleteFailed,
            MediaError::RemoteUploadFailed { .. } => ErrorCode::ImageUploadFailed,
            MediaError::RemoteCoverFailed { .. } => ErrorCode::ImageCoverFailed,
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            MediaError::CapacityExceeded { max, requested } => app
                .with_detail("max", max)
                .with_detail("requested", requested),
            MediaError::CoverOnDeletedItem(id)
            | MediaError::ItemNotFound(id)
            | MediaError::DuplicateItem(id) => app.with_detail("image_id", id.to_string()),
            MediaError::IndexOutOfRange { index, len } => {
                app.with_detail("index", index).with_detail("len", len)
            }
            MediaError::InvalidImage { name, .. } => app.with_detail("file", name),
            MediaError::RemoteDeleteFailed { position, .. }
            | MediaError::RemoteCoverFailed { position, .. } => app
                .with_detail("position", position)
                .with_detail("partial", true),
            MediaError::RemoteUploadFailed { .. } => app.with_detail("partial", true),
            MediaError::CommitInFlight | MediaError::SessionClosed => app,
        }
    }
}

/// Result type for media engine operations
pub type MediaResult<T> = Result<T, MediaError>;
