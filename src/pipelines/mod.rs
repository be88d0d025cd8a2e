// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines
//!
//! # Modules
//!
//! - [`photo`]: still capture, card composition, encoding and export

pub mod photo;
