//! `thumbnails` command: one small image per preset, for a filter strip.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tintbox_core::SourceImage;
use tintbox_core::thumbnails::render_thumbnails;

use super::{PresetArgs, SliderArgs, load_config, registry_or_builtin, write_image};

/// Arguments for the `thumbnails` command.
#[derive(Args)]
pub struct ThumbnailsArgs {
    /// Input photo
    pub input: PathBuf,

    /// Output directory; files are named `<preset-id>.png`
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub sliders: SliderArgs,

    #[command(flatten)]
    pub presets: PresetArgs,

    /// Longest thumbnail side (overrides config)
    #[arg(long)]
    pub size: Option<u32>,
}

pub fn run(args: ThumbnailsArgs, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let custom = args.presets.load()?;
    let registry = registry_or_builtin(&custom);

    let source = SourceImage::open(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let size = args.size.unwrap_or(config.thumbnail_max_dimension);
    let thumbnails = render_thumbnails(&source, registry, &args.sliders.adjustments()?, size);

    for thumb in &thumbnails {
        let path = args.output.join(format!("{}.png", thumb.preset_id));
        write_image(&thumb.image, &path, &config.export)?;
        println!("{:12} {}", thumb.preset_id, path.display());
    }
    tracing::info!(count = thumbnails.len(), dir = %args.output.display(), "thumbnails written");
    Ok(())
}
