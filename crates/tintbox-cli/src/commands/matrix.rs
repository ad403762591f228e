//! `matrix` command: print the combined transform without touching an image.

use anyhow::Result;
use clap::Args;
use tintbox_core::combine;
use tintbox_core::presets::ORIGINAL_ID;

use super::{PresetArgs, SliderArgs, registry_or_builtin};

/// Arguments for the `matrix` command.
#[derive(Args)]
pub struct MatrixArgs {
    /// Filter preset id
    #[arg(short, long, default_value = ORIGINAL_ID)]
    pub filter: String,

    #[command(flatten)]
    pub sliders: SliderArgs,

    #[command(flatten)]
    pub presets: PresetArgs,

    /// Print one row of five coefficients per line
    #[arg(long)]
    pub rows: bool,
}

pub fn run(args: MatrixArgs) -> Result<()> {
    let custom = args.presets.load()?;
    let registry = registry_or_builtin(&custom);
    let preset = registry.get(&args.filter)?;
    let matrix = combine(preset.matrix(), &args.sliders.adjustments()?);

    if args.rows {
        for row in matrix.rows() {
            println!("{}", serde_json::to_string(&row)?);
        }
    } else {
        println!("{}", serde_json::to_string(&matrix)?);
    }
    Ok(())
}
