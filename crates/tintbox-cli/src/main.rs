//! tintbox - apply photo filter looks from the command line
//!
//! Presets and brightness/contrast/saturation sliders are folded into one
//! color matrix, previewed or exported through the same backends an
//! interactive editor uses.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::apply::ApplyArgs;
use commands::matrix::MatrixArgs;
use commands::presets::PresetsArgs;
use commands::preview::PreviewArgs;
use commands::thumbnails::ThumbnailsArgs;

#[derive(Parser)]
#[command(name = "tintbox")]
#[command(author, version, about = "Photo filter looks as composed color matrices")]
#[command(long_about = "
Applies filter presets and brightness/contrast/saturation adjustments to
photos. Every look reduces to a single 4x5 color matrix.

Examples:
  tintbox presets                                   # List built-in presets
  tintbox apply photo.jpg --filter sepia -o out.png
  tintbox apply photo.jpg --brightness 0.2 --saturation -0.5
  tintbox preview photo.jpg -o preview.png --gpu
  tintbox thumbnails photo.jpg -o strip/
  tintbox matrix --filter noir --contrast 0.3       # Print coefficients
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config file (JSON); TINTBOX_* env vars override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available filter presets
    #[command(visible_alias = "ls")]
    Presets(PresetsArgs),

    /// Apply a look and export at full resolution
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// Render a downscaled preview (CPU or GPU)
    Preview(PreviewArgs),

    /// Render one thumbnail per preset
    #[command(visible_alias = "thumbs")]
    Thumbnails(ThumbnailsArgs),

    /// Print the combined color matrix as JSON
    Matrix(MatrixArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Apply(args) => commands::apply::run(args, config),
        Commands::Preview(args) => commands::preview::run(args, config),
        Commands::Thumbnails(args) => commands::thumbnails::run(args, config),
        Commands::Matrix(args) => commands::matrix::run(args),
    }
}
