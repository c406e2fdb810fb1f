// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photostudio::backends::camera::Rotation;
use photostudio::filter::FilterTag;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photostudio")]
#[command(about = "Capture photos and edit them with stacked color filters")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: <config dir>/photostudio/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory captured photos are written to
    #[arg(long, global = true)]
    photos_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an image file as a new capture
    Capture {
        /// Image files to capture
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Device orientation in degrees (0, 90, 180 or 270)
        #[arg(short, long, default_value = "0")]
        rotation: Rotation,
    },

    /// List captured images
    List,

    /// Show the filter stack of an image
    Filters {
        /// Image id (from 'photostudio list')
        id: i64,
    },

    /// Append a filter to an image's stack
    AddFilter {
        id: i64,

        /// saturation, brightness, contrast, warmth or sepia
        kind: FilterTag,

        /// Parameter value (defaults to the neutral value)
        #[arg(short, long, allow_hyphen_values = true)]
        value: Option<f32>,

        /// Filter name (default: numbered after its kind)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Remove the filter at a stack position
    RemoveFilter { id: i64, index: usize },

    /// Reset the filter at a stack position to neutral
    ResetFilter { id: i64, index: usize },

    /// Write an image with its filter stack applied
    Export {
        id: i64,

        /// Output file (.jpg or .png)
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photostudio=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let args = Cli::parse();
    let ctx = cli::Context::open(args.config, args.db, args.photos_dir)?;

    match args.command {
        Commands::Capture { inputs, rotation } => cli::capture(&ctx, &inputs, rotation),
        Commands::List => cli::list_images(&ctx),
        Commands::Filters { id } => cli::show_filters(&ctx, id),
        Commands::AddFilter {
            id,
            kind,
            value,
            name,
        } => cli::add_filter(&ctx, id, kind, value, name),
        Commands::RemoveFilter { id, index } => cli::remove_filter(&ctx, id, index),
        Commands::ResetFilter { id, index } => cli::reset_filter(&ctx, id, index),
        Commands::Export { id, output } => cli::export(&ctx, id, &output),
    }
}
