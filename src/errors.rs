// SPDX-License-Identifier: MPL-2.0

//! Error types for the photobooth

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for camera acquisition
pub type CameraResult<T> = Result<T, CameraError>;

/// Result type alias for the capture/composite pipeline
pub type PhotoResult<T> = Result<T, PhotoError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera acquisition errors
    Camera(CameraError),
    /// Capture/composite errors
    Photo(PhotoError),
    /// Counter service errors (local store or remote calls)
    Counter(CounterError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera acquisition failures surfaced to the caller
///
/// Each variant maps to its own user-facing message. Nothing here is retried
/// automatically; the user re-triggers acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The user or platform refused camera access
    PermissionDenied,
    /// No camera device matched the request
    NotFound,
    /// The device is held by another application
    Busy,
    /// Anything else reported by the device
    Other(String),
}

impl CameraError {
    /// Message shown to the user when acquisition fails
    pub fn user_message(&self) -> String {
        match self {
            CameraError::PermissionDenied => "Camera permission denied. Please allow camera access \
                 in your system settings and try again."
                .to_string(),
            CameraError::NotFound => "No camera found on this device.".to_string(),
            CameraError::Busy => "Camera is already in use by another application.".to_string(),
            CameraError::Other(msg) => format!("Unable to access camera: {}", msg),
        }
    }
}

/// Capture/composite errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// Capture requested while no live stream is held
    NotLive,
    /// The stream produced no usable frame
    NoFrameAvailable,
    /// A countdown is already running
    CountdownInProgress,
    /// Nothing has been captured yet
    NothingCaptured,
    /// Capture failed
    CaptureFailed(String),
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

/// Counter service errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    /// The key-value store failed
    Store(String),
    /// The HTTP call could not be completed
    Transport(String),
    /// The service rejected the bearer credential
    Unauthorized,
    /// The response body did not carry a count
    InvalidResponse(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Counter(e) => write!(f, "Counter error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => write!(f, "Permission denied"),
            CameraError::NotFound => write!(f, "No camera found"),
            CameraError::Busy => write!(f, "Camera is busy"),
            CameraError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NotLive => write!(f, "Camera is not live"),
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::CountdownInProgress => write!(f, "Countdown already in progress"),
            PhotoError::NothingCaptured => write!(f, "No photo has been captured"),
            PhotoError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for CounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterError::Store(msg) => write!(f, "Store error: {}", msg),
            CounterError::Transport(msg) => write!(f, "Request failed: {}", msg),
            CounterError::Unauthorized => write!(f, "Unauthorized"),
            CounterError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for PhotoError {}
impl std::error::Error for CounterError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<CounterError> for AppError {
    fn from(err: CounterError) -> Self {
        AppError::Counter(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}

impl From<reqwest::Error> for CounterError {
    fn from(err: reqwest::Error) -> Self {
        CounterError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_errors_have_distinct_messages() {
        let messages = [
            CameraError::PermissionDenied.user_message(),
            CameraError::NotFound.user_message(),
            CameraError::Busy.user_message(),
            CameraError::Other("boom".into()).user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(messages[3].contains("boom"));
    }
}
