//! `apply` command: load a photo, dial in a look, export full resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tintbox_core::{EditCommand, EditSession, ExportRenderer, ExportTarget, SessionEvent};

use super::{PresetArgs, SliderArgs, load_config, registry_or_builtin};

/// Arguments for the `apply` command.
#[derive(Args)]
pub struct ApplyArgs {
    /// Input photo
    pub input: PathBuf,

    /// Output file (.png, .jpg); defaults to a generated name in the output dir
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filter preset id
    #[arg(short, long)]
    pub filter: Option<String>,

    #[command(flatten)]
    pub sliders: SliderArgs,

    #[command(flatten)]
    pub presets: PresetArgs,
}

pub fn run(args: ApplyArgs, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let custom = args.presets.load()?;
    let registry = registry_or_builtin(&custom);

    let mut session =
        EditSession::new(registry).with_preview_max_dimension(config.preview_max_dimension);
    if let SessionEvent::PhotoLoaded { width, height } = session
        .apply(EditCommand::LoadPhoto {
            path: args.input.clone(),
        })
        .with_context(|| format!("Failed to load {}", args.input.display()))?
    {
        tracing::info!(width, height, input = %args.input.display(), "photo loaded");
    }

    if let Some(id) = args.filter {
        session.apply(EditCommand::SelectFilter { id })?;
    }
    for (slider, value) in args.sliders.values() {
        session.apply(EditCommand::SetSlider { slider, value })?;
    }

    let target = args.output.map_or(ExportTarget::Generated, ExportTarget::Path);
    let mut renderer = ExportRenderer::new(config.export).with_target(target);
    let exported = session.confirm(&mut renderer).context("Export failed")?;

    println!("{}", exported.uri);
    Ok(())
}
