//! Builds the single combined transform for a filter preset plus sliders.

use crate::grading::adjustments::AdjustmentState;
use crate::grading::sliders::{matrix_for_brightness, matrix_for_contrast, matrix_for_saturation};
use crate::transform::matrix::ColorMatrix;

/// Combine a filter matrix with the three slider adjustments.
///
/// The result applies, in order: the filter, brightness, contrast, then
/// saturation. Each adjustment is left-composed onto the running result.
/// Steps whose value is exactly `0` are skipped; their matrix is the
/// identity so the output is unaffected.
///
/// ```text
/// M = Sat × Contrast × Brightness × Filter
/// ```
pub fn combine_filter_with_adjustments(
    filter: &ColorMatrix,
    brightness: f64,
    contrast: f64,
    saturation: f64,
) -> ColorMatrix {
    let mut combined = *filter;
    if brightness != 0.0 {
        combined = ColorMatrix::compose(&matrix_for_brightness(brightness), &combined);
    }
    if contrast != 0.0 {
        combined = ColorMatrix::compose(&matrix_for_contrast(contrast), &combined);
    }
    if saturation != 0.0 {
        combined = ColorMatrix::compose(&matrix_for_saturation(saturation), &combined);
    }
    combined
}

/// [`combine_filter_with_adjustments`] taking the caller's slider state.
pub fn combine(filter: &ColorMatrix, adjustments: &AdjustmentState) -> ColorMatrix {
    combine_filter_with_adjustments(
        filter,
        adjustments.brightness(),
        adjustments.contrast(),
        adjustments.saturation(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn sepia() -> ColorMatrix {
        ColorMatrix::from_rows([
            [0.393, 0.769, 0.189, 0.0, 0.0],
            [0.349, 0.686, 0.168, 0.0, 0.0],
            [0.272, 0.534, 0.131, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn test_identity_with_neutral_sliders_is_identity() {
        let m = combine_filter_with_adjustments(&ColorMatrix::IDENTITY, 0.0, 0.0, 0.0);
        assert_eq!(m, ColorMatrix::IDENTITY);
    }

    #[test]
    fn test_neutral_sliders_return_filter_unchanged() {
        assert_eq!(combine(&sepia(), &AdjustmentState::default()), sepia());
    }

    #[test]
    fn test_skipping_zero_steps_matches_explicit_composition() {
        let (b, c, s) = (0.3, 0.0, -0.4);
        let skipped = combine_filter_with_adjustments(&sepia(), b, c, s);
        let explicit = ColorMatrix::compose(
            &matrix_for_saturation(s),
            &ColorMatrix::compose(
                &matrix_for_contrast(c),
                &ColorMatrix::compose(&matrix_for_brightness(b), &sepia()),
            ),
        );
        assert!(skipped.approx_eq(&explicit, EPSILON));
    }

    #[test]
    fn test_order_is_filter_brightness_contrast_saturation() {
        let (b, c, s) = (0.6, 0.8, 0.9);
        let color = [0.7, 0.2, 0.1, 1.0];
        let brightened = matrix_for_brightness(b).transform(sepia().transform(color));
        let contrasted = matrix_for_contrast(c).transform(brightened);
        let expected = matrix_for_saturation(s).transform(contrasted);
        let out = combine_filter_with_adjustments(&sepia(), b, c, s).transform(color);
        for ch in 0..4 {
            assert!(
                (out[ch] - expected[ch]).abs() < EPSILON,
                "ch{ch}: {} vs {}",
                out[ch],
                expected[ch]
            );
        }
    }

    #[test]
    fn test_reordering_changes_result_at_extremes() {
        let color = [0.9, 0.3, 0.1, 1.0];
        let defined =
            combine_filter_with_adjustments(&ColorMatrix::IDENTITY, 1.0, 1.0, 1.0).transform(color);
        let swapped =
            matrix_for_brightness(1.0).transform(matrix_for_contrast(1.0).transform(color));
        let swapped = matrix_for_saturation(1.0).transform(swapped);
        assert!((defined[0] - swapped[0]).abs() > 1e-3);
    }
}
