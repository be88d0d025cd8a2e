// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera acquisition

//! Shared types for camera devices and streams

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Which physical camera is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// User-facing (selfie) camera
    #[default]
    Front,
    /// Environment-facing camera
    Back,
}

impl FacingMode {
    /// The other camera
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::Front => FacingMode::Back,
            FacingMode::Back => FacingMode::Front,
        }
    }

    /// Whether preview and capture are shown mirrored for this camera.
    ///
    /// The selfie camera previews like a mirror, so the saved still is flipped to match.
    pub fn is_mirrored(self) -> bool {
        matches!(self, FacingMode::Front)
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Front => write!(f, "front"),
            FacingMode::Back => write!(f, "back"),
        }
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(FacingMode::Front),
            "back" | "rear" | "environment" => Ok(FacingMode::Back),
            other => Err(format!("Unknown facing mode: {}", other)),
        }
    }
}

/// Parameters for opening a camera stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: FacingMode,
    /// Preferred width; devices may deliver something else
    pub ideal_width: u32,
    /// Preferred height; devices may deliver something else
    pub ideal_height: u32,
    /// Audio is never requested by the photobooth
    pub audio: bool,
}

impl StreamRequest {
    pub fn video(facing: FacingMode, ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            facing,
            ideal_width,
            ideal_height,
            audio: false,
        }
    }
}

impl std::fmt::Display for StreamRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} camera @ {}x{}",
            self.facing, self.ideal_width, self.ideal_height
        )
    }
}

/// A single RGBA video frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// When the frame was grabbed
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }
}
