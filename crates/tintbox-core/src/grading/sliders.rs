//! Slider adjustments expressed as color matrices (brightness, contrast, saturation).
//!
//! Every slider takes a value in `[-1, 1]` where `0` is neutral, and every
//! builder returns exactly [`ColorMatrix::IDENTITY`] at `0`. The alpha row is
//! never touched.

use crate::transform::matrix::ColorMatrix;

/// ITU-R BT.601 luma weights.
pub const LUMA_BT601: [f64; 3] = [0.299, 0.587, 0.114];

/// Lower bound of every slider.
pub const SLIDER_MIN: f64 = -1.0;
/// Upper bound of every slider.
pub const SLIDER_MAX: f64 = 1.0;

/// Clamp a slider value into `[-1, 1]`. NaN maps to neutral.
pub fn clamp_slider(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(SLIDER_MIN, SLIDER_MAX)
    }
}

/// Additive brightness offset on R, G and B.
///
/// ```text
/// out = in + value × 0.5
/// ```
pub fn matrix_for_brightness(value: f64) -> ColorMatrix {
    let offset = clamp_slider(value) * 0.5;
    ColorMatrix::from_rows([
        [1.0, 0.0, 0.0, 0.0, offset],
        [0.0, 1.0, 0.0, 0.0, offset],
        [0.0, 0.0, 1.0, 0.0, offset],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// Contrast scale pivoting around mid-gray.
///
/// ```text
/// c   = 1 + value          (c ∈ [0, 2])
/// out = in × c + (1 − c) / 2
/// ```
///
/// A channel at `0.5` is unchanged for every `c`.
pub fn matrix_for_contrast(value: f64) -> ColorMatrix {
    let c = 1.0 + clamp_slider(value);
    let t = (1.0 - c) / 2.0;
    ColorMatrix::from_rows([
        [c, 0.0, 0.0, 0.0, t],
        [0.0, c, 0.0, 0.0, t],
        [0.0, 0.0, c, 0.0, t],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// Saturation blend between BT.601 gray and the original color.
///
/// ```text
/// s   = 1 + value
/// out = (1 − s) × dot(in, luma) + s × in
/// ```
///
/// `s = 0` collapses every pixel to its luma gray; `s > 1` oversaturates.
pub fn matrix_for_saturation(value: f64) -> ColorMatrix {
    let s = 1.0 + clamp_slider(value);
    let inv = 1.0 - s;
    let [wr, wg, wb] = LUMA_BT601;
    ColorMatrix::from_rows([
        [inv * wr + s, inv * wg, inv * wb, 0.0, 0.0],
        [inv * wr, inv * wg + s, inv * wb, 0.0, 0.0],
        [inv * wr, inv * wg, inv * wb + s, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_zero_sliders_are_exact_identity() {
        assert_eq!(matrix_for_brightness(0.0), ColorMatrix::IDENTITY);
        assert_eq!(matrix_for_contrast(0.0), ColorMatrix::IDENTITY);
        assert_eq!(matrix_for_saturation(0.0), ColorMatrix::IDENTITY);
    }

    #[test]
    fn test_brightness_offsets_rgb_only() {
        let m = matrix_for_brightness(0.4);
        let out = m.transform([0.1, 0.2, 0.3, 0.5]);
        assert!((out[0] - 0.3).abs() < EPSILON);
        assert!((out[1] - 0.4).abs() < EPSILON);
        assert!((out[2] - 0.5).abs() < EPSILON);
        assert_eq!(out[3], 0.5);
    }

    #[test]
    fn test_contrast_midpoint_is_invariant() {
        for step in 0..=20 {
            let v = -1.0 + step as f64 * 0.1;
            let out = matrix_for_contrast(v).transform([0.5, 0.5, 0.5, 1.0]);
            for c in 0..3 {
                assert!(
                    (out[c] - 0.5).abs() < EPSILON,
                    "contrast {v}: channel {c} = {}",
                    out[c]
                );
            }
        }
    }

    #[test]
    fn test_contrast_minus_one_flattens_to_mid_gray() {
        let out = matrix_for_contrast(-1.0).transform([0.0, 0.9, 0.2, 1.0]);
        for c in 0..3 {
            assert!((out[c] - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn test_full_desaturation_produces_bt601_gray() {
        let m = matrix_for_saturation(-1.0);
        let colors = [
            [1.0, 0.0, 0.0, 1.0],
            [0.2, 0.7, 0.4, 1.0],
            [0.9, 0.1, 0.6, 0.3],
        ];
        for rgba in colors {
            let luma = rgba[0] * LUMA_BT601[0] + rgba[1] * LUMA_BT601[1] + rgba[2] * LUMA_BT601[2];
            let out = m.transform(rgba);
            for c in 0..3 {
                assert!((out[c] - luma).abs() < EPSILON, "{rgba:?} ch{c}: {}", out[c]);
            }
            assert_eq!(out[3], rgba[3]);
        }
    }

    #[test]
    fn test_saturation_preserves_gray() {
        let out = matrix_for_saturation(0.8).transform([0.4, 0.4, 0.4, 1.0]);
        for c in 0..3 {
            assert!((out[c] - 0.4).abs() < EPSILON);
        }
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        assert_eq!(matrix_for_brightness(3.0), matrix_for_brightness(1.0));
        assert_eq!(matrix_for_contrast(-7.0), matrix_for_contrast(-1.0));
        assert_eq!(matrix_for_saturation(f64::NAN), ColorMatrix::IDENTITY);
    }
}
