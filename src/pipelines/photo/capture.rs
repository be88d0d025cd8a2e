// SPDX-License-Identifier: MPL-2.0

//! Still capture from a live frame
//!
//! Turns the current stream frame into an owned RGBA still. Stills from the
//! front camera are mirrored so the saved photo matches the mirrored preview.

use crate::backends::camera::types::{CameraFrame, FacingMode};
use crate::errors::{PhotoError, PhotoResult};
use chrono::{DateTime, Local};
use image::{RgbaImage, imageops};
use tracing::debug;

/// A captured still and its editable caption
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub image: RgbaImage,
    pub caption: String,
    /// Camera the still came from
    pub facing: FacingMode,
    pub captured_at: DateTime<Local>,
}

impl CapturedImage {
    /// Replace the caption; any text is accepted
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }
}

/// Copy a frame into a tightly packed RGBA image, dropping row padding
pub fn frame_to_image(frame: &CameraFrame) -> PhotoResult<RgbaImage> {
    let row_bytes = (frame.width * 4) as usize;
    let stride = frame.stride as usize;
    if frame.width == 0 || frame.height == 0 || stride < row_bytes {
        return Err(PhotoError::NoFrameAvailable);
    }

    let needed = stride * (frame.height as usize - 1) + row_bytes;
    if frame.data.len() < needed {
        return Err(PhotoError::CaptureFailed(format!(
            "Frame data too small: expected {}, got {}",
            needed,
            frame.data.len()
        )));
    }

    let pixels = if stride == row_bytes {
        frame.data[..row_bytes * frame.height as usize].to_vec()
    } else {
        frame
            .data
            .chunks(stride)
            .take(frame.height as usize)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    };

    RgbaImage::from_raw(frame.width, frame.height, pixels)
        .ok_or_else(|| PhotoError::CaptureFailed("Failed to build image from frame".to_string()))
}

/// Produce the still for `frame` as seen in the preview for `facing`
pub fn capture_still(frame: &CameraFrame, facing: FacingMode) -> PhotoResult<RgbaImage> {
    let mut image = frame_to_image(frame)?;
    if facing.is_mirrored() {
        imageops::flip_horizontal_in_place(&mut image);
    }

    debug!(
        width = frame.width,
        height = frame.height,
        facing = %facing,
        "Still captured"
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn gradient(width: u32, height: u32) -> CameraFrame {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        CameraFrame::from_rgba(width, height, data)
    }

    #[test]
    fn front_capture_is_mirrored() {
        let frame = gradient(5, 3);
        let still = capture_still(&frame, FacingMode::Front).unwrap();

        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(still.get_pixel(x, y).0, [(4 - x) as u8, y as u8, 0, 255]);
            }
        }
    }

    #[test]
    fn back_capture_is_unmirrored() {
        let frame = gradient(5, 3);
        let still = capture_still(&frame, FacingMode::Back).unwrap();

        assert_eq!(still.as_raw().as_slice(), &frame.data[..]);
    }

    #[test]
    fn row_padding_is_dropped() {
        let mut data = Vec::new();
        for y in 0..2u8 {
            data.extend_from_slice(&[1, y, 0, 255, 2, y, 0, 255]);
            data.extend_from_slice(&[0xaa; 8]);
        }
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(data),
            stride: 16,
            captured_at: std::time::Instant::now(),
        };

        let image = frame_to_image(&frame).unwrap();
        assert_eq!(image.get_pixel(1, 1).0, [2, 1, 0, 255]);
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let mut frame = gradient(4, 4);
        frame.data = Arc::from(vec![0u8; 10]);

        assert!(matches!(
            frame_to_image(&frame),
            Err(PhotoError::CaptureFailed(_))
        ));
    }
}
