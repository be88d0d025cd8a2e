// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photobooth::FacingMode;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Snap a captioned polaroid card and keep a global capture count")]
#[command(version)]
struct Cli {
    /// Configuration file (default: <config dir>/photobooth/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture counter service
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<String>,

        /// JSON file to persist the count in (in memory when omitted)
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Print the global capture count
    Count,

    /// Take a photo and turn it into a polaroid card
    Snap {
        /// Image file to use as the camera instead of a video device
        #[arg(long, conflicts_with_all = ["device", "test_pattern"])]
        source: Option<PathBuf>,

        /// Video device to capture from (default: /dev/video0)
        #[arg(short, long)]
        device: Option<PathBuf>,

        /// Capture a synthetic test pattern instead of a video device
        #[arg(long, conflicts_with = "device")]
        test_pattern: bool,

        /// Camera to use: front or back
        #[arg(short, long)]
        facing: Option<FacingMode>,

        /// Caption to use instead of a random one
        #[arg(long)]
        caption: Option<String>,

        /// Capture immediately, without the 3-2-1 countdown
        #[arg(long)]
        no_countdown: bool,

        /// Hand the card to the system share mechanism instead of saving it
        #[arg(long)]
        share: bool,

        /// Output directory (default: ~/Pictures/photobooth)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set RUST_LOG to control log level, e.g. RUST_LOG=photobooth=debug
    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let mut config = photobooth::Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind, store } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if store.is_some() {
                config.server.store_path = store;
            }
            cli::serve(&config)
        }
        Commands::Count => cli::print_count(&config),
        Commands::Snap {
            source,
            device,
            test_pattern,
            facing,
            caption,
            no_countdown,
            share,
            output,
        } => {
            if let Some(device) = device {
                config.camera.device = device;
            }
            if let Some(facing) = facing {
                config.camera.facing = facing;
            }
            if no_countdown {
                config.capture.countdown = false;
            }
            if output.is_some() {
                config.capture.output_dir = output;
            }
            cli::snap(
                &config,
                cli::SnapOptions {
                    source,
                    test_pattern,
                    caption,
                    share,
                },
            )
        }
    }
}
