//! tintbox core: color matrix engine for photo filters.
//!
//! Filter presets and brightness/contrast/saturation sliders are composed
//! into a single 4×5 color matrix, which preview and export backends apply
//! to a decoded photo. No GPU or UI dependencies.

pub mod config;
pub mod error;
pub mod grading;
pub mod image;
pub mod presets;
pub mod render;
pub mod session;
pub mod thumbnails;
pub mod transform;

// Re-exports for convenience.
pub use config::{EngineConfig, ExportConfig};
pub use error::{DecodeError, ExportError, PresetError, RenderError, SessionError};
pub use grading::{
    AdjustmentState, Slider, matrix_for_brightness, matrix_for_contrast, matrix_for_saturation,
};
pub use crate::image::SourceImage;
pub use presets::{FilterId, FilterPreset, PresetRegistry};
pub use render::{
    ExportRenderer, ExportTarget, ExportedImage, PreviewRenderer, PreviewSlot, Renderer,
    apply_matrix,
};
pub use session::{EditCommand, EditSession, SessionEvent, SessionState};
pub use transform::combine::{combine, combine_filter_with_adjustments};
pub use transform::matrix::ColorMatrix;
