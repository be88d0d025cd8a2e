// SPDX-License-Identifier: MPL-2.0

//! Photobooth - capture a still, frame it as a captioned polaroid card and
//! share it, with a small service keeping a global capture count.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Capture session state machine and countdown
//! - [`backends`]: Camera device abstraction and stream lifecycle
//! - [`pipelines`]: Still capture, card compositing, encoding and export
//! - [`counter`]: Global capture counter service (store, service, HTTP)
//! - [`bridge`]: HTTP client for the counter service
//! - [`config`]: User configuration handling
//! - [`storage`]: Output directory and file handling
//!
//! # Example
//!
//! ```ignore
//! // Run the counter service, then take a picture from a still image:
//! // photobooth serve
//! // photobooth snap --source face.png
//! ```

pub mod app;
pub mod backends;
pub mod bridge;
pub mod config;
pub mod constants;
pub mod counter;
pub mod errors;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::{CaptureSession, SessionPhase};
pub use backends::camera::{FacingMode, MediaAcquisition, MediaDevice};
pub use bridge::CounterClient;
pub use config::Config;
pub use counter::CounterService;
pub use errors::{AppError, AppResult, CameraError, CounterError, PhotoError};
pub use pipelines::photo::{CapturedImage, EncodedCard, Exporter, PhotoPipeline};
