//! Grading tools: slider matrices and the caller-owned adjustment state.

pub mod adjustments;
pub mod sliders;

pub use adjustments::{AdjustmentState, Slider};
pub use sliders::{LUMA_BT601, matrix_for_brightness, matrix_for_contrast, matrix_for_saturation};
