// ABOUTME: Storage of recipe images uploaded as base64 data URLs
// ABOUTME: Decodes, writes under the media root with a random name and builds public URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

use std::path::{Component, Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::environment::MediaConfig;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Subdirectory of the media root holding recipe images
const RECIPE_IMAGE_DIR: &str = "recipes";

/// Image formats accepted in uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `image/gif`
    Gif,
    /// `image/webp`
    Webp,
}

impl ImageFormat {
    fn from_mime_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Whether `bytes` starts with this format's file signature
    #[must_use]
    pub fn matches_signature(&self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Webp => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        }
    }

    /// File extension
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Decoded upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Detected format
    pub format: ImageFormat,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

fn invalid_image(message: impl Into<String>) -> AppError {
    AppError::field(ErrorCode::InvalidFormat, "image", message)
}

/// Parse a `data:image/<ext>;base64,<payload>` URL
///
/// # Errors
///
/// Returns a field-tagged `InvalidFormat` error for anything else
pub fn decode_data_url(data_url: &str) -> AppResult<DecodedImage> {
    let rest = data_url
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| invalid_image("Image must be a data:image/...;base64 URL"))?;
    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid_image("Image must be base64 encoded"))?;
    let format = ImageFormat::from_mime_subtype(subtype)
        .ok_or_else(|| invalid_image(format!("Unsupported image type: image/{subtype}")))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid_image(format!("Invalid base64 image data: {e}")))?;
    if bytes.is_empty() {
        return Err(invalid_image("Image is empty"));
    }
    if !format.matches_signature(&bytes) {
        return Err(invalid_image(format!(
            "Image data is not a valid image/{subtype} file"
        )));
    }

    Ok(DecodedImage { format, bytes })
}

/// File-system store for uploaded media
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    /// Create a store rooted at the configured media directory
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.root.clone(),
            url_prefix: config.url_prefix.clone(),
        }
    }

    /// Decode and store a recipe image, returning its media-relative path
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for a bad data URL or `StorageError` if the file
    /// cannot be written
    pub async fn save_recipe_image(&self, data_url: &str) -> AppResult<String> {
        let image = decode_data_url(data_url)?;
        let relative = format!(
            "{RECIPE_IMAGE_DIR}/{}.{}",
            Uuid::new_v4().simple(),
            image.format.extension()
        );

        let directory = self.root.join(RECIPE_IMAGE_DIR);
        fs::create_dir_all(&directory).await.map_err(|e| {
            AppError::storage(format!(
                "Failed to create media directory {}: {e}",
                directory.display()
            ))
        })?;

        let target = self.root.join(&relative);
        fs::write(&target, &image.bytes).await.map_err(|e| {
            AppError::storage(format!("Failed to write image {}: {e}", target.display()))
        })?;

        debug!(path = %relative, bytes = image.bytes.len(), "Stored recipe image");
        Ok(relative)
    }

    /// Public URL of a stored file
    #[must_use]
    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.url_prefix, relative.trim_start_matches('/'))
    }

    /// Delete a stored file; failures are logged, not returned
    pub async fn remove(&self, relative: &str) {
        // Never follow paths out of the media root
        let safe = Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            warn!(path = %relative, "Refusing to delete media outside the media root");
            return;
        }

        if let Err(e) = fs::remove_file(self.root.join(relative)).await {
            warn!(path = %relative, "Failed to delete media file: {e}");
        }
    }
}
