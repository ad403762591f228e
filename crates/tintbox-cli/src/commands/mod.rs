//! Subcommand implementations and the arguments they share.

pub mod apply;
pub mod matrix;
pub mod presets;
pub mod preview;
pub mod thumbnails;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tintbox_core::{
    AdjustmentState, ColorMatrix, EngineConfig, ExportConfig, ExportRenderer, ExportTarget,
    ExportedImage, PresetRegistry, Renderer, Slider, SourceImage,
};

/// Brightness, contrast and saturation, each in `[-1, 1]`.
#[derive(Args, Debug, Clone, Copy)]
pub struct SliderArgs {
    /// Brightness offset (-1 = darker, 1 = brighter)
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub brightness: f64,

    /// Contrast around mid-gray (-1 = flat, 1 = doubled)
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub contrast: f64,

    /// Saturation (-1 = grayscale, 1 = doubled)
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub saturation: f64,
}

impl SliderArgs {
    pub fn values(&self) -> [(Slider, f64); 3] {
        Slider::ALL.map(|slider| (slider, self.value(slider)))
    }

    fn value(&self, slider: Slider) -> f64 {
        match slider {
            Slider::Brightness => self.brightness,
            Slider::Contrast => self.contrast,
            Slider::Saturation => self.saturation,
        }
    }

    /// Rejects non-finite input; finite values are clamped into range.
    pub fn adjustments(&self) -> Result<AdjustmentState> {
        let mut state = AdjustmentState::default();
        for (slider, value) in self.values() {
            state.set(slider, value)?;
        }
        Ok(state)
    }
}

/// Optional preset file replacing the built-in registry.
#[derive(Args, Debug, Clone, Default)]
pub struct PresetArgs {
    /// JSON preset file (array of {id, label, matrix})
    #[arg(long = "presets", value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl PresetArgs {
    /// Load the custom registry, if one was given.
    pub fn load(&self) -> Result<Option<PresetRegistry>> {
        self.file
            .as_deref()
            .map(|path| {
                PresetRegistry::load_json(path)
                    .with_context(|| format!("Failed to load presets: {}", path.display()))
            })
            .transpose()
    }
}

/// The custom registry when loaded, the built-in one otherwise.
pub fn registry_or_builtin(custom: &Option<PresetRegistry>) -> &PresetRegistry {
    match custom {
        Some(registry) => registry,
        None => PresetRegistry::builtin(),
    }
}

/// Resolve engine config from an optional file plus env overrides.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::resolve(path).context("Failed to load engine config")
}

/// Write an already-processed image to `path` unchanged.
pub fn write_image(
    image: &SourceImage,
    path: &Path,
    export: &ExportConfig,
) -> Result<ExportedImage> {
    let mut renderer = ExportRenderer::new(export.clone())
        .with_target(ExportTarget::Path(path.to_path_buf()));
    renderer
        .render(image, &ColorMatrix::IDENTITY)
        .with_context(|| format!("Failed to write {}", path.display()))
}
