//! `presets` command: list the filter registry.

use anyhow::Result;
use clap::Args;

use super::{PresetArgs, registry_or_builtin};

/// Arguments for the `presets` command.
#[derive(Args)]
pub struct PresetsArgs {
    #[command(flatten)]
    pub presets: PresetArgs,

    /// Print full presets (with matrices) as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PresetsArgs) -> Result<()> {
    let custom = args.presets.load()?;
    let registry = registry_or_builtin(&custom);

    if args.json {
        let presets: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }

    let width = registry.ids().map(str::len).max().unwrap_or(0);
    for preset in registry.iter() {
        println!("{:width$}  {}", preset.id(), preset.label());
    }
    Ok(())
}
