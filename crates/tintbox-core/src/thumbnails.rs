//! Per-preset thumbnails for the filter strip.

use rayon::prelude::*;

use crate::grading::adjustments::AdjustmentState;
use crate::image::SourceImage;
use crate::presets::PresetRegistry;
use crate::render::apply_matrix;
use crate::transform::combine::combine;

/// One rendered entry of the filter strip.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub preset_id: String,
    pub label: String,
    pub image: SourceImage,
}

/// Render every preset of `registry`, in registry order, combined with the
/// current `adjustments`. The source is downscaled once.
pub fn render_thumbnails(
    source: &SourceImage,
    registry: &PresetRegistry,
    adjustments: &AdjustmentState,
    max_dimension: u32,
) -> Vec<Thumbnail> {
    let small = source.downscaled(max_dimension);
    let presets: Vec<_> = registry.iter().collect();
    presets
        .par_iter()
        .map(|preset| Thumbnail {
            preset_id: preset.id().to_string(),
            label: preset.label().to_string(),
            image: apply_matrix(&small, &combine(preset.matrix(), adjustments)),
        })
        .collect()
}
