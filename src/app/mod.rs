// SPDX-License-Identifier: GPL-3.0-only

//! Photobooth application flow
//!
//! [`CaptureSession`] drives the camera through idle, live and captured
//! phases and keeps the capture tally in sync with the counter service.

pub mod session;

pub use session::{CaptureSession, SessionPhase};
