// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera acquisition
//!
//! # Modules
//!
//! - [`camera`]: `MediaDevice` capability, stream lifecycle manager, and the
//!   file-backed and synthetic devices

pub mod camera;
