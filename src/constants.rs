// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Key under which the global capture tally is stored
pub const COUNTER_KEY: &str = "global_capture_count";

/// Default path prefix for the counter service routes
pub const DEFAULT_PATH_PREFIX: &str = "/photobooth";

/// Default bind address for the counter service
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Public API key accepted by a default-configured counter service.
///
/// Callers must present a bearer credential, but this is not a trust boundary.
pub const DEFAULT_PUBLIC_API_KEY: &str = "photobooth-public-anon-key";

/// Camera acquisition timing
pub mod camera {
    use super::Duration;

    /// Preferred stream width
    pub const IDEAL_WIDTH: u32 = 1920;
    /// Preferred stream height
    pub const IDEAL_HEIGHT: u32 = 1080;
    /// Wait between releasing a stream and opening the other camera
    pub const SWITCH_DELAY: Duration = Duration::from_millis(200);
    /// Wait before the single retry when the device is still busy after a release
    pub const RETRY_DELAY: Duration = Duration::from_millis(100);
    /// Video device opened when none is configured
    pub const DEFAULT_DEVICE: &str = "/dev/video0";
}

/// Countdown before a capture
pub mod countdown {
    use super::Duration;

    /// First value shown; counts down to 1
    pub const START: u8 = 3;
    /// Time between ticks
    pub const TICK: Duration = Duration::from_secs(1);
}

/// Polaroid card layout, in output pixels
pub mod card {
    /// Card width
    pub const WIDTH: u32 = 1750;
    /// Card height
    pub const HEIGHT: u32 = 2188;
    /// Border around the photo region
    pub const PADDING: u32 = 145;
    /// Gap between the photo region and the caption line
    pub const SPACING: u32 = 58;
    /// Corner radius of the photo region
    pub const BORDER_RADIUS: u32 = 16;
    /// Caption glyph height
    pub const FONT_SIZE: u32 = 136;
    /// Paper texture opacity over the white background
    pub const TEXTURE_ALPHA: f32 = 0.3;

    /// Card background
    pub const BACKGROUND: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
    /// Backing colour behind the photo (visible only if the photo is transparent)
    pub const PHOTO_BACKING: [u8; 4] = [0xf3, 0xf4, 0xf6, 0xff];
    /// Caption colour
    pub const CAPTION_COLOR: [u8; 4] = [0x33, 0x33, 0x33, 0xff];
}

/// Exported card files
pub mod export {
    /// File name prefix; the unix timestamp in milliseconds follows
    pub const FILE_PREFIX: &str = "polaroid";
    /// Title handed to the platform share mechanism
    pub const SHARE_TITLE: &str = "My Polaroid Memory";
}
