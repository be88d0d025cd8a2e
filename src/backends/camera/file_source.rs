// SPDX-License-Identifier: GPL-3.0-only

//! Image file used as a camera
//!
//! Every frame of the stream is the decoded file. Both facings read the same
//! image, which makes the front-camera mirroring visible in the output.

use super::types::{CameraFrame, FacingMode, StreamRequest};
use super::{MediaDevice, VideoStream};
use crate::errors::{CameraError, CameraResult};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Camera device backed by a still image
pub struct ImageFileDevice {
    path: PathBuf,
    image: Arc<RgbaImage>,
    in_use: Arc<AtomicBool>,
}

impl ImageFileDevice {
    /// Decode `path` into the frame every stream will deliver
    pub fn open_path(path: &Path) -> CameraResult<Self> {
        if !path.exists() {
            return Err(CameraError::NotFound);
        }

        let image = image::open(path)
            .map_err(|e| CameraError::Other(format!("{}: {}", path.display(), e)))?
            .to_rgba8();
        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Loaded image file as camera source"
        );

        Ok(Self::from_image(path.to_path_buf(), image))
    }

    /// Wrap an already decoded image
    pub fn from_image(path: PathBuf, image: RgbaImage) -> Self {
        Self {
            path,
            image: Arc::new(image),
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl MediaDevice for ImageFileDevice {
    fn open(&self, request: &StreamRequest) -> CameraResult<Box<dyn VideoStream>> {
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(CameraError::Busy);
        }
        debug!(path = %self.path.display(), facing = %request.facing, "File stream opened");

        Ok(Box::new(ImageFileStream {
            facing: request.facing,
            image: Arc::clone(&self.image),
            in_use: Some(Arc::clone(&self.in_use)),
        }))
    }

    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("image-file")
    }
}

struct ImageFileStream {
    facing: FacingMode,
    image: Arc<RgbaImage>,
    in_use: Option<Arc<AtomicBool>>,
}

impl VideoStream for ImageFileStream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn grab_frame(&mut self) -> CameraResult<CameraFrame> {
        if self.in_use.is_none() {
            return Err(CameraError::Other("Stream stopped".to_string()));
        }
        let (width, height) = self.image.dimensions();
        Ok(CameraFrame::from_rgba(width, height, self.image.as_raw().clone()))
    }

    fn stop(&mut self) {
        if let Some(flag) = self.in_use.take() {
            flag.store(false, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.in_use.is_some()
    }
}

impl Drop for ImageFileStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let err = ImageFileDevice::open_path(Path::new("/nonexistent/photobooth.png"))
            .err()
            .unwrap();
        assert_eq!(err, CameraError::NotFound);
    }

    #[test]
    fn frames_match_source_image() {
        let image = RgbaImage::from_fn(3, 2, |x, y| image::Rgba([x as u8, y as u8, 7, 255]));
        let device = ImageFileDevice::from_image(PathBuf::from("mem.png"), image.clone());

        let mut stream = device
            .open(&StreamRequest::video(FacingMode::Back, 1920, 1080))
            .unwrap();
        let frame = stream.grab_frame().unwrap();

        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(&frame.data[..], image.as_raw().as_slice());
    }
}
