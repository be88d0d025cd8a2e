// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic camera producing a deterministic test pattern
//!
//! Behaves like an exclusive hardware camera: only one stream may be open at a
//! time and opening a second one reports [`CameraError::Busy`]. Failures can be
//! scripted to exercise acquisition error paths.

use super::types::{CameraFrame, FacingMode, StreamRequest};
use super::{MediaDevice, VideoStream};
use crate::errors::{CameraError, CameraResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Test-pattern camera device
pub struct TestPatternDevice {
    active: Arc<AtomicUsize>,
    opened: AtomicUsize,
    scripted_failures: Mutex<VecDeque<CameraError>>,
    /// Fixed output size; the request's ideal size is used when unset
    size: Option<(u32, u32)>,
}

impl TestPatternDevice {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
            scripted_failures: Mutex::new(VecDeque::new()),
            size: None,
        }
    }

    /// Always deliver frames of this size regardless of the request
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Make the next `open` fail with `error`
    pub fn fail_next(&self, error: CameraError) {
        if let Ok(mut failures) = self.scripted_failures.lock() {
            failures.push_back(error);
        }
    }

    /// Number of streams currently holding the device
    pub fn active_streams(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of `open` attempts, successful or not
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Pixel value the pattern carries at `(x, y)` for `facing`
    pub fn pattern_pixel(facing: FacingMode, x: u32, y: u32) -> [u8; 4] {
        let tint = match facing {
            FacingMode::Front => 0x40,
            FacingMode::Back => 0xc0,
        };
        [(x % 256) as u8, (y % 256) as u8, tint, 0xff]
    }
}

impl Default for TestPatternDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDevice for TestPatternDevice {
    fn open(&self, request: &StreamRequest) -> CameraResult<Box<dyn VideoStream>> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .scripted_failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.pop_front());
        if let Some(error) = scripted {
            return Err(error);
        }

        if self.active.load(Ordering::SeqCst) > 0 {
            return Err(CameraError::Busy);
        }

        let (width, height) = self
            .size
            .unwrap_or((request.ideal_width, request.ideal_height));
        self.active.fetch_add(1, Ordering::SeqCst);
        debug!(facing = %request.facing, width, height, "Test pattern stream opened");

        Ok(Box::new(TestPatternStream {
            facing: request.facing,
            width,
            height,
            active: Some(Arc::clone(&self.active)),
        }))
    }

    fn name(&self) -> &str {
        "test-pattern"
    }
}

struct TestPatternStream {
    facing: FacingMode,
    width: u32,
    height: u32,
    /// Device-wide counter; `None` once stopped
    active: Option<Arc<AtomicUsize>>,
}

impl VideoStream for TestPatternStream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> CameraResult<CameraFrame> {
        if self.active.is_none() {
            return Err(CameraError::Other("Stream stopped".to_string()));
        }

        let mut data = Vec::with_capacity((self.width * self.height * 4) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                data.extend_from_slice(&TestPatternDevice::pattern_pixel(self.facing, x, y));
            }
        }
        Ok(CameraFrame::from_rgba(self.width, self.height, data))
    }

    fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for TestPatternStream {
    fn drop(&mut self) {
        self.stop();
    }
}
