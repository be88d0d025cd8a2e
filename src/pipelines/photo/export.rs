// SPDX-License-Identifier: MPL-2.0

//! Export destinations for finished cards
//!
//! Download writes the card to the output directory. Share hands it to a
//! platform mechanism; when that is unavailable or fails for any reason other
//! than the user cancelling, the card is downloaded instead. Both destinations
//! receive the same bytes.

use super::encoding::EncodedCard;
use crate::constants::export;
use crate::errors::{PhotoError, PhotoResult};
use crate::storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a share attempt ended without sharing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// The user dismissed the share sheet
    Cancelled,
    /// The mechanism failed
    Failed(String),
}

impl std::fmt::Display for ShareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShareError::Cancelled => write!(f, "Share cancelled"),
            ShareError::Failed(msg) => write!(f, "Share failed: {}", msg),
        }
    }
}

impl std::error::Error for ShareError {}

/// Platform share mechanism for image attachments
pub trait ShareTarget: Send + Sync {
    /// Whether this target accepts `card` as an attachment
    fn can_share(&self, card: &EncodedCard) -> bool;

    /// Hand the card over under `title`.
    ///
    /// May block; [`Exporter`] calls it on the blocking pool.
    fn share(&self, card: &EncodedCard, title: &str) -> Result<(), ShareError>;
}

/// Shares by staging the card on disk and opening it with the desktop's
/// default handler for PNG files. The share title names the staged file.
pub struct SystemShare {
    staging_dir: PathBuf,
}

impl SystemShare {
    pub fn new(staging_dir: PathBuf) -> Self {
        Self { staging_dir }
    }
}

impl Default for SystemShare {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("photobooth-share"))
    }
}

impl ShareTarget for SystemShare {
    fn can_share(&self, card: &EncodedCard) -> bool {
        card.mime_type() == "image/png"
    }

    fn share(&self, card: &EncodedCard, title: &str) -> Result<(), ShareError> {
        std::fs::create_dir_all(&self.staging_dir)
            .map_err(|e| ShareError::Failed(e.to_string()))?;
        let path = self.staging_dir.join(staged_file_name(title, &card.file_name));
        std::fs::write(&path, &card.data[..]).map_err(|e| ShareError::Failed(e.to_string()))?;

        info!(path = %path.display(), title, "Opening card with system handler");
        open::that_detached(&path).map_err(|e| ShareError::Failed(e.to_string()))
    }
}

/// `<title> - <file name>`, with path separators and control characters
/// removed from the title
fn staged_file_name(title: &str, file_name: &str) -> String {
    let title: String = title
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | ':'))
        .collect();
    let title = title.trim();
    if title.is_empty() {
        file_name.to_string()
    } else {
        format!("{} - {}", title, file_name)
    }
}

/// Where an export ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Handed to the share mechanism
    Shared,
    /// The user cancelled the share; nothing else happens
    Cancelled,
    /// Written to disk
    Downloaded(PathBuf),
}

/// Routes encoded cards to download or share destinations
pub struct Exporter {
    download_dir: PathBuf,
    share: Option<Arc<dyn ShareTarget>>,
}

impl Exporter {
    /// Exporter without a share mechanism; sharing always downloads
    pub fn new(download_dir: PathBuf) -> Self {
        Self {
            download_dir,
            share: None,
        }
    }

    pub fn with_share_target(mut self, target: Arc<dyn ShareTarget>) -> Self {
        self.share = Some(target);
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Save the card to the download directory
    pub async fn download(&self, card: &EncodedCard) -> PhotoResult<PathBuf> {
        storage::save_card(&self.download_dir, card).await
    }

    /// Offer the card to the share mechanism, falling back to download.
    ///
    /// Cancellation is silent. Any other share failure, or no usable share
    /// mechanism, downloads the card.
    pub async fn share(&self, card: &EncodedCard) -> PhotoResult<ExportOutcome> {
        if let Some(target) = self.share.as_ref().filter(|t| t.can_share(card)) {
            let target = Arc::clone(target);
            let shared = card.clone();
            let result = tokio::task::spawn_blocking(move || {
                target.share(&shared, export::SHARE_TITLE)
            })
            .await
            .map_err(|e| PhotoError::SaveFailed(format!("Share task error: {}", e)))?;

            match result {
                Ok(()) => {
                    info!(file = %card.file_name, "Card shared");
                    return Ok(ExportOutcome::Shared);
                }
                Err(ShareError::Cancelled) => {
                    debug!("Share cancelled by user");
                    return Ok(ExportOutcome::Cancelled);
                }
                Err(e) => {
                    warn!(error = %e, "Share failed, downloading instead");
                }
            }
        } else {
            debug!("No share mechanism for this card, downloading");
        }

        self.download(card).await.map(ExportOutcome::Downloaded)
    }
}
