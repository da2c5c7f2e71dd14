//! Image validation and compression
//!
//! Runs before staging: rejects files the storefront cannot store and
//! shrinks oversized ones to JPEG so uploads stay within the configured
//! byte and dimension limits.

use std::io::Cursor;

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use shared::ErrorCode;
use thiserror::Error;

use crate::error::{MediaError, MediaResult};
use crate::item::StagedFile;

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Hard input limit, checked before decoding (20MB)
pub const MAX_INPUT_SIZE: usize = 20 * 1024 * 1024;

/// JPEG quality for catalog images
pub const JPEG_QUALITY: u8 = 85;

/// Lowest quality tried when a re-encoded image is still over `max_bytes`
const MIN_JPEG_QUALITY: u8 = 45;

/// Target size and shape for stored images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageConstraints {
    /// Files above this size are re-encoded
    pub max_bytes: usize,
    /// Longest edge in pixels
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageConstraints {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_dimension: 1920,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

/// Why a picked file cannot be staged
#[derive(Debug, Error)]
pub enum ImageRejection {
    #[error("empty file")]
    Empty,

    #[error("unsupported format '{0}', supported: png, jpg, jpeg, webp")]
    UnsupportedFormat(String),

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("not a valid image: {0}")]
    Undecodable(String),

    #[error("failed to compress image: {0}")]
    EncodeFailed(String),
}

impl ImageRejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            ImageRejection::Empty => ErrorCode::EmptyFile,
            ImageRejection::UnsupportedFormat(_) => ErrorCode::UnsupportedFileFormat,
            ImageRejection::TooLarge { .. } => ErrorCode::FileTooLarge,
            ImageRejection::Undecodable(_) => ErrorCode::InvalidImageFile,
            ImageRejection::EncodeFailed(_) => ErrorCode::ImageProcessingFailed,
        }
    }
}

/// Validate and compress a batch of picked files
///
/// Files already within `constraints` pass through byte-for-byte. The first
/// rejected file fails the whole batch.
pub fn compress(files: Vec<StagedFile>, constraints: &ImageConstraints) -> MediaResult<Vec<StagedFile>> {
    files
        .into_iter()
        .map(|file| {
            let name = file.name.clone();
            compress_one(file, constraints).map_err(|reason| MediaError::InvalidImage { name, reason })
        })
        .collect()
}

fn compress_one(file: StagedFile, constraints: &ImageConstraints) -> Result<StagedFile, ImageRejection> {
    if file.is_empty() {
        return Err(ImageRejection::Empty);
    }

    let ext = file.extension();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(ImageRejection::UnsupportedFormat(ext));
    }

    if file.len() > MAX_INPUT_SIZE {
        return Err(ImageRejection::TooLarge {
            size: file.len(),
            max: MAX_INPUT_SIZE,
        });
    }

    let img = image::load_from_memory(&file.bytes)
        .map_err(|e| ImageRejection::Undecodable(e.to_string()))?;

    let oversized = img.width() > constraints.max_dimension || img.height() > constraints.max_dimension;
    if !oversized && file.len() <= constraints.max_bytes {
        return Ok(file);
    }

    let img = if oversized {
        img.resize(
            constraints.max_dimension,
            constraints.max_dimension,
            FilterType::Lanczos3,
        )
    } else {
        img
    };

    let mut quality = constraints.jpeg_quality.clamp(1, 100);
    let mut bytes = encode_jpeg(&img, quality)?;
    while bytes.len() > constraints.max_bytes && quality > MIN_JPEG_QUALITY {
        quality = quality.saturating_sub(10).max(MIN_JPEG_QUALITY);
        bytes = encode_jpeg(&img, quality)?;
    }

    tracing::debug!(
        file = %file.name,
        before = file.len(),
        after = bytes.len(),
        width = img.width(),
        height = img.height(),
        quality,
        "Image compressed"
    );

    Ok(StagedFile::new(jpeg_name(&file.name), bytes))
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageRejection> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| ImageRejection::EncodeFailed(e.to_string()))?;
    }
    Ok(buffer)
}

fn jpeg_name(name: &str) -> String {
    std::path::Path::new(name)
        .with_extension("jpg")
        .to_string_lossy()
        .into_owned()
}
