// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for exported cards and card textures

use crate::errors::{PhotoError, PhotoResult};
use crate::pipelines::photo::EncodedCard;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default directory for downloaded cards (`<pictures>/photobooth`)
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("photobooth")
}

/// Write `card` into `dir` under its suggested file name
pub async fn save_card(dir: &Path, card: &EncodedCard) -> PhotoResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(&card.file_name);
    tokio::fs::write(&path, &card.data[..]).await?;

    info!(path = %path.display(), bytes = card.data.len(), "Card saved");
    Ok(path)
}

/// Load a paper texture image
///
/// Decoding runs on the blocking pool.
pub async fn load_texture(path: PathBuf) -> PhotoResult<RgbaImage> {
    debug!(path = %path.display(), "Loading card texture");

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("{}: {}", path.display(), e)))?;
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes)
            .map(|img| img.to_rgba8())
            .map_err(PhotoError::from)
    })
    .await
    .map_err(|e| PhotoError::EncodingFailed(format!("Texture decode task error: {}", e)))?
}
