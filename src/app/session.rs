// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state machine
//!
//! ```text
//! Idle ──start──▶ Acquiring ──ok──▶ Live ──capture──▶ Captured
//!   ▲                 │                                   │
//!   └──── error ──────┘◀──────────────── reset ───────────┘
//! ```
//!
//! The session owns the only camera stream. It is released when a still is
//! captured, on reset and stop, and when the session is dropped.

use crate::backends::camera::{FacingMode, MediaAcquisition, MediaDevice};
use crate::bridge::CounterClient;
use crate::config::Config;
use crate::constants::countdown;
use crate::errors::{CameraResult, PhotoError, PhotoResult};
use crate::pipelines::photo::{CapturedImage, IndexSource, RngSource, capture_still, pick_caption};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifecycle phase of a [`CaptureSession`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No camera open
    #[default]
    Idle,
    /// Waiting for the camera
    Acquiring,
    /// Stream open, preview running
    Live,
    /// A still has been taken and the camera released
    Captured,
}

/// One photobooth session: camera, countdown, captured still and capture tally
pub struct CaptureSession {
    camera: MediaAcquisition,
    phase: SessionPhase,
    facing: FacingMode,
    countdown: Option<u8>,
    captured: Option<CapturedImage>,
    capture_count: u64,
    bridge: Option<CounterClient>,
    captions: Box<dyn IndexSource>,
    tick: Duration,
}

impl CaptureSession {
    pub fn new(camera: MediaAcquisition) -> Self {
        Self {
            camera,
            phase: SessionPhase::Idle,
            facing: FacingMode::default(),
            countdown: None,
            captured: None,
            capture_count: 0,
            bridge: None,
            captions: Box::new(RngSource::from_entropy()),
            tick: countdown::TICK,
        }
    }

    /// Session on `device` set up from `config`.
    ///
    /// A counter client that cannot be built is logged and left out; the
    /// session then only keeps a local tally.
    pub fn from_config(device: Arc<dyn MediaDevice>, config: &Config) -> Self {
        let camera = MediaAcquisition::new(device)
            .with_resolution(config.camera.ideal_width, config.camera.ideal_height)
            .with_timing(config.camera.switch_delay(), config.camera.retry_delay());

        let session = Self::new(camera).with_facing(config.camera.facing);
        match CounterClient::from_config(&config.client) {
            Ok(client) => session.with_bridge(client),
            Err(e) => {
                warn!(error = %e, "Counter client unavailable, counting locally");
                session
            }
        }
    }

    pub fn with_facing(mut self, facing: FacingMode) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_bridge(mut self, bridge: CounterClient) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Replace the random source used to pick captions
    pub fn with_captions(mut self, source: Box<dyn IndexSource>) -> Self {
        self.captions = source;
        self
    }

    /// Interval between countdown ticks
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Current countdown value while a countdown runs
    pub fn countdown(&self) -> Option<u8> {
        self.countdown
    }

    pub fn captured(&self) -> Option<&CapturedImage> {
        self.captured.as_ref()
    }

    /// Last known global count, or the local tally when the service is unreachable
    pub fn capture_count(&self) -> u64 {
        self.capture_count
    }

    pub fn is_live(&self) -> bool {
        self.phase == SessionPhase::Live && self.camera.is_live()
    }

    /// Open the camera for the session's facing mode.
    ///
    /// On failure the session goes back to idle; the error's
    /// [`user_message`](crate::errors::CameraError::user_message) is what the
    /// user should see.
    pub async fn start(&mut self) -> CameraResult<()> {
        self.countdown = None;
        self.phase = SessionPhase::Acquiring;
        let result = self.camera.acquire(self.facing).await;
        self.settle(result)
    }

    /// Toggle front/back. A live session reopens the camera on the other side.
    pub async fn switch_camera(&mut self) -> CameraResult<()> {
        self.facing = self.facing.toggled();
        if self.phase != SessionPhase::Live {
            debug!(facing = %self.facing, "Facing changed while not live");
            return Ok(());
        }

        self.phase = SessionPhase::Acquiring;
        let result = self.camera.switch_to(self.facing).await;
        self.settle(result)
    }

    fn settle(&mut self, result: CameraResult<()>) -> CameraResult<()> {
        match result {
            Ok(()) => {
                self.phase = SessionPhase::Live;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "{}", e.user_message());
                self.camera.release();
                self.phase = SessionPhase::Idle;
                Err(e)
            }
        }
    }

    /// Fetch the global count from the counter service.
    ///
    /// Failures are logged and leave the current value untouched.
    pub async fn load_count(&mut self) -> u64 {
        if let Some(bridge) = &self.bridge {
            match bridge.fetch_count().await {
                Ok(count) => self.capture_count = count,
                Err(e) => warn!(error = %e, "Failed to load capture count"),
            }
        }
        self.capture_count
    }

    /// Take a still from the live stream.
    ///
    /// Picks a fresh caption, releases the camera and reports the capture to
    /// the counter service. Refused while a countdown is running.
    pub async fn capture(&mut self) -> PhotoResult<&CapturedImage> {
        if self.countdown.is_some() {
            return Err(PhotoError::CountdownInProgress);
        }
        if self.phase != SessionPhase::Live {
            return Err(PhotoError::NotLive);
        }

        let frame = self
            .camera
            .grab_frame()
            .map_err(|e| PhotoError::CaptureFailed(e.to_string()))?;
        let image = capture_still(&frame, self.facing)?;
        let caption = pick_caption(self.captions.as_mut());

        self.camera.release();
        self.phase = SessionPhase::Captured;
        self.captured = Some(CapturedImage {
            image,
            caption: caption.to_string(),
            facing: self.facing,
            captured_at: Local::now(),
        });
        info!(caption, "Photo captured");

        self.record_capture().await;
        self.captured.as_ref().ok_or(PhotoError::NothingCaptured)
    }

    /// Count down from 3, calling `on_tick` once per tick, then capture
    pub async fn countdown_and_capture<F>(&mut self, mut on_tick: F) -> PhotoResult<&CapturedImage>
    where
        F: FnMut(u8),
    {
        if self.countdown.is_some() {
            return Err(PhotoError::CountdownInProgress);
        }
        if self.phase != SessionPhase::Live {
            return Err(PhotoError::NotLive);
        }

        for value in (1..=countdown::START).rev() {
            self.countdown = Some(value);
            on_tick(value);
            tokio::time::sleep(self.tick).await;
        }
        self.countdown = None;

        self.capture().await
    }

    /// Abandon a countdown left behind by a dropped capture future
    pub fn cancel_countdown(&mut self) {
        self.countdown = None;
    }

    /// Edit the caption of the captured still
    pub fn set_caption(&mut self, caption: impl Into<String>) -> PhotoResult<()> {
        let captured = self.captured.as_mut().ok_or(PhotoError::NothingCaptured)?;
        captured.set_caption(caption);
        Ok(())
    }

    /// Discard the still and return to idle
    pub fn reset(&mut self) {
        self.camera.release();
        self.countdown = None;
        self.captured = None;
        self.phase = SessionPhase::Idle;
        debug!("Session reset");
    }

    /// Close the camera, keeping any captured still
    pub fn stop(&mut self) {
        self.camera.release();
        self.countdown = None;
        if self.phase != SessionPhase::Captured {
            self.phase = SessionPhase::Idle;
        }
    }

    async fn record_capture(&mut self) {
        let reported = match &self.bridge {
            Some(bridge) => match bridge.increment().await {
                Ok(count) => Some(count),
                Err(e) => {
                    warn!(error = %e, "Failed to report capture, counting locally");
                    None
                }
            },
            None => None,
        };

        self.capture_count = reported.unwrap_or_else(|| self.capture_count.saturating_add(1));
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("phase", &self.phase)
            .field("facing", &self.facing)
            .field("countdown", &self.countdown)
            .field("capture_count", &self.capture_count)
            .field("has_capture", &self.captured.is_some())
            .finish_non_exhaustive()
    }
}
