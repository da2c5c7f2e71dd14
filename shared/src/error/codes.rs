//! Unified error codes for the storefront back-office
//!
//! This module defines all error codes shared by the media engine, the HTTP
//! client and the frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 65xx: Media errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,

    // ==================== 65xx: Media ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// Empty file provided
    EmptyFile = 6505,
    /// Image processing failed
    ImageProcessingFailed = 6508,
    /// Gallery already holds the maximum number of images
    ImageLimitExceeded = 6520,
    /// A deletion-marked image cannot become cover
    CoverOnDeletedImage = 6521,
    /// Image not part of the editing session
    ImageNotFound = 6522,
    /// Target index outside the gallery
    ImagePositionInvalid = 6523,
    /// A commit is already running for this gallery
    MediaCommitInProgress = 6524,
    /// The editing session has already ended
    MediaSessionClosed = 6525,
    /// Remote image deletion failed
    ImageDeleteFailed = 6530,
    /// Remote image upload failed
    ImageUploadFailed = 6531,
    /// Remote cover assignment failed
    ImageCoverFailed = 6532,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            ErrorCode::NotAuthenticated => "Authentication required",

            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::EmptyFile => "Empty file",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::ImageLimitExceeded => "Image limit exceeded",
            ErrorCode::CoverOnDeletedImage => "Cannot set a deleted image as cover",
            ErrorCode::ImageNotFound => "Image not found",
            ErrorCode::ImagePositionInvalid => "Invalid image position",
            ErrorCode::MediaCommitInProgress => "Image changes are being saved",
            ErrorCode::MediaSessionClosed => "Image editing session has ended",
            ErrorCode::ImageDeleteFailed => "Failed to delete image",
            ErrorCode::ImageUploadFailed => "Failed to upload images",
            ErrorCode::ImageCoverFailed => "Failed to set cover image",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),

            // Media
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6505 => Ok(ErrorCode::EmptyFile),
            6508 => Ok(ErrorCode::ImageProcessingFailed),
            6520 => Ok(ErrorCode::ImageLimitExceeded),
            6521 => Ok(ErrorCode::CoverOnDeletedImage),
            6522 => Ok(ErrorCode::ImageNotFound),
            6523 => Ok(ErrorCode::ImagePositionInvalid),
            6524 => Ok(ErrorCode::MediaCommitInProgress),
            6525 => Ok(ErrorCode::MediaSessionClosed),
            6530 => Ok(ErrorCode::ImageDeleteFailed),
            6531 => Ok(ErrorCode::ImageUploadFailed),
            6532 => Ok(ErrorCode::ImageCoverFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
