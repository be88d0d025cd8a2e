// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::FacingMode;
use crate::constants;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Counter service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
    /// Prefix mounted in front of every route
    pub path_prefix: String,
    /// Bearer credential callers must present
    pub api_key: String,
    /// JSON file backing the store; in-memory when unset
    pub store_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: constants::DEFAULT_BIND_ADDR.to_string(),
            path_prefix: constants::DEFAULT_PATH_PREFIX.to_string(),
            api_key: constants::DEFAULT_PUBLIC_API_KEY.to_string(),
            store_path: None,
        }
    }
}

/// Settings for reaching the counter service from the capture side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service base URL including the path prefix
    pub base_url: String,
    /// Bearer credential sent with every request
    pub api_key: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: format!(
                "http://{}{}",
                constants::DEFAULT_BIND_ADDR,
                constants::DEFAULT_PATH_PREFIX
            ),
            api_key: constants::DEFAULT_PUBLIC_API_KEY.to_string(),
            timeout_secs: 5,
        }
    }
}

/// Camera acquisition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera opened first
    pub facing: FacingMode,
    /// Preferred stream width
    pub ideal_width: u32,
    /// Preferred stream height
    pub ideal_height: u32,
    /// Delay between release and re-acquire when switching cameras
    pub switch_delay_ms: u64,
    /// Delay before retrying an acquisition that failed right after a release
    pub retry_delay_ms: u64,
    /// Video device for the front camera
    pub device: PathBuf,
    /// Video device for the back camera; the front device serves both when unset
    pub back_device: Option<PathBuf>,
}

impl CameraConfig {
    pub fn switch_delay(&self) -> Duration {
        Duration::from_millis(self.switch_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::default(),
            ideal_width: constants::camera::IDEAL_WIDTH,
            ideal_height: constants::camera::IDEAL_HEIGHT,
            switch_delay_ms: constants::camera::SWITCH_DELAY.as_millis() as u64,
            retry_delay_ms: constants::camera::RETRY_DELAY.as_millis() as u64,
            device: PathBuf::from(constants::camera::DEFAULT_DEVICE),
            back_device: None,
        }
    }
}

/// Capture and export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Run the 3-2-1 countdown before capturing
    pub countdown: bool,
    /// Where downloaded cards are written; defaults to the pictures directory
    pub output_dir: Option<PathBuf>,
    /// Optional paper texture blended over the card background
    pub texture_path: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            countdown: true,
            output_dir: None,
            texture_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub camera: CameraConfig,
    pub capture: CaptureConfig,
}

impl Config {
    /// Default config file location (`<config_dir>/photobooth/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photobooth").join("config.json"))
    }

    /// Load the config from `path`, or from the default location.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
