// SPDX-License-Identifier: GPL-3.0-only

//! Card encoding
//!
//! Cards are exported as lossless PNG. Encoding runs on the blocking pool.

use crate::constants::export;
use crate::errors::{PhotoError, PhotoResult};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::sync::Arc;
use tracing::{debug, info};

/// Encoded card ready for a download or share target
#[derive(Debug, Clone)]
pub struct EncodedCard {
    /// PNG bytes; identical for every export target
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// Suggested file name (`polaroid-<unix millis>.png`)
    pub file_name: String,
}

impl EncodedCard {
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

/// Suggested file name for a card exported now
pub fn card_file_name() -> String {
    format!(
        "{}-{}.png",
        export::FILE_PREFIX,
        chrono::Utc::now().timestamp_millis()
    )
}

/// Encode RGBA pixels as PNG
pub fn encode_png(image: &RgbaImage) -> PhotoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    debug!(bytes = buffer.len(), "PNG encoded");
    Ok(buffer)
}

/// Encode a composed card in a background task
pub async fn encode_card(card: RgbaImage) -> PhotoResult<EncodedCard> {
    let (width, height) = card.dimensions();
    info!(width, height, "Encoding card");

    let data = tokio::task::spawn_blocking(move || encode_png(&card))
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {}", e)))??;

    Ok(EncodedCard {
        data: Arc::from(data),
        width,
        height,
        file_name: card_file_name(),
    })
}
