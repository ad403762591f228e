//! `preview` command: render the live-preview image through a chosen backend.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tintbox_core::{EditCommand, EditSession, PreviewRenderer, Renderer, SourceImage};
use tintbox_gpu::{GpuContext, GpuPreviewRenderer};

use super::{PresetArgs, SliderArgs, load_config, registry_or_builtin, write_image};

/// Arguments for the `preview` command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Input photo
    pub input: PathBuf,

    /// Output file (.png, .jpg)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Filter preset id
    #[arg(short, long)]
    pub filter: Option<String>,

    #[command(flatten)]
    pub sliders: SliderArgs,

    #[command(flatten)]
    pub presets: PresetArgs,

    /// Render on the GPU instead of the CPU
    #[arg(long)]
    pub gpu: bool,

    /// Longest preview side (overrides config)
    #[arg(long)]
    pub max_size: Option<u32>,
}

pub fn run(args: PreviewArgs, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let custom = args.presets.load()?;
    let registry = registry_or_builtin(&custom);
    let max_dimension = args.max_size.unwrap_or(config.preview_max_dimension);

    let mut session = EditSession::new(registry).with_preview_max_dimension(max_dimension);
    session
        .apply(EditCommand::LoadPhoto {
            path: args.input.clone(),
        })
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    if let Some(id) = args.filter {
        session.apply(EditCommand::SelectFilter { id })?;
    }
    for (slider, value) in args.sliders.values() {
        session.apply(EditCommand::SetSlider { slider, value })?;
    }

    let mut renderer: Box<dyn Renderer<Output = SourceImage>> = if args.gpu {
        let context = GpuContext::new_blocking().context("GPU preview unavailable")?;
        let gpu = GpuPreviewRenderer::with_max_dimension(context, max_dimension);
        tracing::info!(adapter = %gpu.context().adapter_info.name, "rendering preview on GPU");
        Box::new(gpu)
    } else {
        Box::new(PreviewRenderer::new(max_dimension))
    };

    let frame = session
        .render_preview(renderer.as_mut())?
        .context("Preview was superseded before it could be shown")?;

    let written = write_image(&frame.image, &args.output, &config.export)?;
    tracing::info!(width = written.width, height = written.height, "preview written");
    println!("{}", written.uri);
    Ok(())
}
