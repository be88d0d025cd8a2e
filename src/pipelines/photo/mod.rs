// SPDX-License-Identifier: MPL-2.0

//! Capture/composite pipeline
//!
//! ```text
//! Live Frame → Capture (mirror) → Composite (card) → Encode (PNG) → Export
//!                   ↓                                                 ↓
//!            caption from catalog                        share or download
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: copy the live frame into a still, mirrored for the front camera
//! 2. **Composite**: cover-fit the still into the card and draw the caption
//! 3. **Encoding**: PNG, on the blocking pool
//! 4. **Export**: download to disk, or share with download fallback

pub mod capture;
pub mod captions;
pub mod composite;
pub mod encoding;
pub mod export;

pub use capture::{CapturedImage, capture_still};
pub use captions::{CAPTIONS, IndexSource, RngSource, pick_caption};
pub use composite::{CardLayout, CoverFit, Rect, compose_card, cover_fit};
pub use encoding::{EncodedCard, encode_card};
pub use export::{ExportOutcome, Exporter, ShareError, ShareTarget, SystemShare};

use crate::errors::{PhotoError, PhotoResult};
use image::RgbaImage;
use std::sync::Arc;
use tracing::info;

/// Renders captured stills into encoded cards
///
/// Rendering depends only on the still, its caption, the layout and the
/// texture, so every export target gets identical bytes.
#[derive(Clone, Default)]
pub struct PhotoPipeline {
    layout: CardLayout,
    texture: Option<Arc<RgbaImage>>,
}

impl PhotoPipeline {
    /// Pipeline with the standard card layout and no texture
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: CardLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Blend `texture` over the card background
    pub fn with_texture(mut self, texture: RgbaImage) -> Self {
        self.texture = Some(Arc::new(texture));
        self
    }

    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    /// Compose the card pixels for `captured`
    pub fn compose(&self, captured: &CapturedImage) -> RgbaImage {
        compose_card(
            &captured.image,
            &captured.caption,
            &self.layout,
            self.texture.as_deref(),
        )
    }

    /// Compose and encode `captured` in a background task
    pub async fn render(&self, captured: &CapturedImage) -> PhotoResult<EncodedCard> {
        info!(caption = %captured.caption, "Rendering card");

        let pipeline = self.clone();
        let captured = captured.clone();
        let card = tokio::task::spawn_blocking(move || pipeline.compose(&captured))
            .await
            .map_err(|e| PhotoError::CaptureFailed(format!("Composite task error: {}", e)))?;

        encode_card(card).await
    }
}
