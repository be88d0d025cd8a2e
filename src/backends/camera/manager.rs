// SPDX-License-Identifier: GPL-3.0-only

//! Camera stream lifecycle manager
//!
//! The manager provides:
//! - At most one open stream; the previous one is released before a new request
//! - Idempotent release, also run on drop
//! - Camera switching as release, settle delay, acquire

use super::types::*;
use super::{MediaDevice, VideoStream};
use crate::constants;
use crate::errors::{CameraError, CameraResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Owns the single active camera stream of a capture session
pub struct MediaAcquisition {
    device: Arc<dyn MediaDevice>,
    stream: Option<Box<dyn VideoStream>>,
    ideal_width: u32,
    ideal_height: u32,
    /// Settle time between release and re-acquire when switching cameras
    switch_delay: Duration,
    /// Wait before the one retry made when the device is busy right after a release
    retry_delay: Duration,
}

impl MediaAcquisition {
    /// Create a manager with the default resolution and timing
    pub fn new(device: Arc<dyn MediaDevice>) -> Self {
        info!(device = device.name(), "Creating media acquisition");

        Self {
            device,
            stream: None,
            ideal_width: constants::camera::IDEAL_WIDTH,
            ideal_height: constants::camera::IDEAL_HEIGHT,
            switch_delay: constants::camera::SWITCH_DELAY,
            retry_delay: constants::camera::RETRY_DELAY,
        }
    }

    /// Override the preferred stream resolution
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.ideal_width = width;
        self.ideal_height = height;
        self
    }

    /// Override the switch and retry delays
    pub fn with_timing(mut self, switch_delay: Duration, retry_delay: Duration) -> Self {
        self.switch_delay = switch_delay;
        self.retry_delay = retry_delay;
        self
    }

    /// Open a stream on the requested camera.
    ///
    /// Any stream already held is released first so two handles are never open.
    pub async fn acquire(&mut self, facing: FacingMode) -> CameraResult<()> {
        let released = self.release();
        self.open(facing, released).await
    }

    /// Switch to `facing`: release, wait for the device to settle, then acquire.
    pub async fn switch_to(&mut self, facing: FacingMode) -> CameraResult<()> {
        info!(facing = %facing, "Switching camera");

        let released = self.release();
        if released {
            tokio::time::sleep(self.switch_delay).await;
        }
        self.open(facing, released).await
    }

    /// Stop the active stream, if any.
    ///
    /// Returns whether a stream was actually released. Safe to call repeatedly.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                debug!(facing = %stream.facing(), "Releasing camera stream");
                stream.stop();
                true
            }
            None => false,
        }
    }

    /// Whether a stream is currently held
    pub fn is_live(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    /// Camera of the active stream
    pub fn facing(&self) -> Option<FacingMode> {
        self.stream.as_ref().map(|s| s.facing())
    }

    /// Grab a frame from the active stream
    pub fn grab_frame(&mut self) -> CameraResult<CameraFrame> {
        match self.stream.as_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(CameraError::Other("No active stream".to_string())),
        }
    }

    async fn open(&mut self, facing: FacingMode, just_released: bool) -> CameraResult<()> {
        let request = StreamRequest::video(facing, self.ideal_width, self.ideal_height);
        debug!(request = %request, "Requesting camera stream");

        let stream = match self.device.open(&request) {
            Ok(stream) => stream,
            // The device can stay busy for a moment after the previous handle closes
            Err(CameraError::Busy) if just_released => {
                warn!(
                    delay_ms = self.retry_delay.as_millis() as u64,
                    "Camera still busy after release, retrying once"
                );
                tokio::time::sleep(self.retry_delay).await;
                self.device.open(&request)?
            }
            Err(e) => {
                warn!(error = %e, "Camera acquisition failed");
                return Err(e);
            }
        };

        let (width, height) = stream.resolution();
        info!(facing = %facing, width, height, "Camera stream live");
        self.stream = Some(stream);
        Ok(())
    }
}

impl Drop for MediaAcquisition {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for MediaAcquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAcquisition")
            .field("device", &self.device.name())
            .field("facing", &self.facing())
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::TestPatternDevice;

    fn manager(device: &Arc<TestPatternDevice>) -> MediaAcquisition {
        MediaAcquisition::new(device.clone())
            .with_resolution(64, 48)
            .with_timing(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn acquire_replaces_previous_stream() {
        let device = Arc::new(TestPatternDevice::new());
        let mut media = manager(&device);

        media.acquire(FacingMode::Front).await.unwrap();
        media.acquire(FacingMode::Front).await.unwrap();

        assert_eq!(device.active_streams(), 1);
        assert_eq!(device.open_count(), 2);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let device = Arc::new(TestPatternDevice::new());
        let mut media = manager(&device);

        media.acquire(FacingMode::Back).await.unwrap();
        assert!(media.release());
        assert!(!media.release());
        assert!(!media.is_live());
        assert_eq!(device.active_streams(), 0);
    }

    #[tokio::test]
    async fn switching_leaves_exactly_one_stream() {
        let device = Arc::new(TestPatternDevice::new());
        let mut media = manager(&device);

        media.acquire(FacingMode::Front).await.unwrap();
        media.switch_to(FacingMode::Back).await.unwrap();
        media.switch_to(FacingMode::Front).await.unwrap();

        assert_eq!(device.active_streams(), 1);
        assert_eq!(media.facing(), Some(FacingMode::Front));
    }

    #[tokio::test]
    async fn busy_after_release_is_retried_once() {
        let device = Arc::new(TestPatternDevice::new());
        let mut media = manager(&device);
        media.acquire(FacingMode::Front).await.unwrap();

        device.fail_next(CameraError::Busy);
        media.switch_to(FacingMode::Back).await.unwrap();

        assert_eq!(media.facing(), Some(FacingMode::Back));
    }

    #[tokio::test]
    async fn failures_are_not_retried_without_prior_release() {
        let device = Arc::new(TestPatternDevice::new());
        let mut media = manager(&device);

        device.fail_next(CameraError::PermissionDenied);
        let err = media.acquire(FacingMode::Front).await.unwrap_err();

        assert_eq!(err, CameraError::PermissionDenied);
        assert_eq!(device.open_count(), 1);
        assert!(!media.is_live());
    }

    #[tokio::test]
    async fn drop_releases_stream() {
        let device = Arc::new(TestPatternDevice::new());
        {
            let mut media = manager(&device);
            media.acquire(FacingMode::Front).await.unwrap();
            assert_eq!(device.active_streams(), 1);
        }
        assert_eq!(device.active_streams(), 0);
    }
}
