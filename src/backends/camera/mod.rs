// SPDX-License-Identifier: MPL-2.0

//! Camera acquisition
//!
//! The platform camera is reached only through the [`MediaDevice`] capability,
//! so the capture session can run against a real device, an image file, or a
//! synthetic test pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   Capture Session   │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  MediaAcquisition   │  ← one stream at a time, release before acquire
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  MediaDevice Trait  │
//! └──────────┬──────────┘
//!            │
//!      ┌─────┼─────────────┐
//!      ▼     ▼             ▼
//! ┌──────┐ ┌──────┐ ┌───────────┐
//! │ V4L2 │ │ File │ │ Synthetic │
//! └──────┘ └──────┘ └───────────┘
//! ```

pub mod file_source;
pub mod format_converters;
pub mod manager;
pub mod synthetic;
pub mod types;
pub mod v4l2;

pub use file_source::ImageFileDevice;
pub use manager::MediaAcquisition;
pub use synthetic::TestPatternDevice;
pub use types::*;
pub use v4l2::V4l2Device;

use crate::errors::CameraResult;

/// An open camera stream
///
/// Implementations own the underlying device handle until [`VideoStream::stop`]
/// is called or the stream is dropped.
pub trait VideoStream: Send {
    /// Camera this stream was opened on
    fn facing(&self) -> FacingMode;

    /// Actual delivered resolution
    fn resolution(&self) -> (u32, u32);

    /// Grab the current frame
    fn grab_frame(&mut self) -> CameraResult<CameraFrame>;

    /// Stop all tracks and release the device.
    ///
    /// Calling this more than once is a no-op.
    fn stop(&mut self);

    /// Whether the stream still holds the device
    fn is_active(&self) -> bool;
}

/// Capability for opening camera streams
pub trait MediaDevice: Send + Sync {
    /// Open a stream matching `request` as closely as the device allows
    ///
    /// # Returns
    /// * `Ok(stream)` - Stream is live
    /// * `Err(CameraError::PermissionDenied)` - Access refused
    /// * `Err(CameraError::NotFound)` - No matching camera
    /// * `Err(CameraError::Busy)` - Device held elsewhere
    fn open(&self, request: &StreamRequest) -> CameraResult<Box<dyn VideoStream>>;

    /// Human readable device name for logs
    fn name(&self) -> &str;
}
