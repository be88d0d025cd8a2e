// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Running the counter service
//! - Reading the global capture count
//! - Taking a photo and exporting it as a polaroid card

use photobooth::backends::camera::{ImageFileDevice, MediaDevice, TestPatternDevice, V4l2Device};
use photobooth::pipelines::photo::{ExportOutcome, Exporter, PhotoPipeline, SystemShare};
use photobooth::{CaptureSession, Config, CounterClient, PhotoError, counter, storage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Per-invocation options for [`snap`] that have no config file equivalent
pub struct SnapOptions {
    pub source: Option<PathBuf>,
    pub test_pattern: bool,
    pub caption: Option<String>,
    pub share: bool,
}

/// Run the counter service until Ctrl-C
pub fn serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(counter::serve(&config.server))?;
    Ok(())
}

/// Print the global capture count
pub fn print_count(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let count = rt.block_on(async {
        let client = CounterClient::from_config(&config.client)?;
        client.fetch_count().await
    })?;

    println!("{}", count);
    Ok(())
}

/// Acquire the camera, capture, compose the card and export it
pub fn snap(config: &Config, options: SnapOptions) -> Result<(), Box<dyn std::error::Error>> {
    let device: Arc<dyn MediaDevice> = match &options.source {
        Some(path) => Arc::new(ImageFileDevice::open_path(path)?),
        None if options.test_pattern => Arc::new(TestPatternDevice::new()),
        None => Arc::new(
            V4l2Device::new(&config.camera.device).with_back(config.camera.back_device.clone()),
        ),
    };
    println!("Using camera: {}", device.name());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut session = CaptureSession::from_config(device, config);
        session.load_count().await;

        if let Err(e) = session.start().await {
            return Err(e.user_message().into());
        }

        if config.capture.countdown {
            session
                .countdown_and_capture(|value| println!("{}...", value))
                .await?;
        } else {
            session.capture().await?;
        }

        if let Some(caption) = options.caption {
            session.set_caption(caption)?;
        }
        let captured = session.captured().ok_or(PhotoError::NothingCaptured)?;
        println!("Caption: {}", captured.caption);

        let mut pipeline = PhotoPipeline::new();
        if let Some(path) = &config.capture.texture_path {
            match storage::load_texture(path.clone()).await {
                Ok(texture) => pipeline = pipeline.with_texture(texture),
                Err(e) => warn!(error = %e, path = %path.display(), "Texture not loaded"),
            }
        }
        let card = pipeline.render(captured).await?;

        let output_dir = config
            .capture
            .output_dir
            .clone()
            .unwrap_or_else(storage::default_output_dir);
        let mut exporter = Exporter::new(output_dir);
        if options.share {
            exporter = exporter.with_share_target(Arc::new(SystemShare::default()));
        }

        match exporter.share(&card).await? {
            ExportOutcome::Shared => println!("Card shared"),
            ExportOutcome::Cancelled => println!("Share cancelled"),
            ExportOutcome::Downloaded(path) => println!("Card saved: {}", path.display()),
        }
        println!("Photos taken: {}", session.capture_count());

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
