//! Caller-owned slider state for one photo in the edit flow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AdjustmentError;
use crate::grading::sliders::clamp_slider;

/// One of the three continuous adjustment sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slider {
    Brightness,
    Contrast,
    Saturation,
}

impl Slider {
    /// All sliders in composition order.
    pub const ALL: [Slider; 3] = [Slider::Brightness, Slider::Contrast, Slider::Saturation];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Brightness, contrast and saturation, each in `[-1, 1]` with `0` neutral.
///
/// Deserialized values are clamped the same way [`AdjustmentState::new`]
/// clamps them; missing fields are neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAdjustmentState")]
pub struct AdjustmentState {
    brightness: f64,
    contrast: f64,
    saturation: f64,
}

/// Unchecked wire form of [`AdjustmentState`].
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawAdjustmentState {
    brightness: f64,
    contrast: f64,
    saturation: f64,
}

impl From<RawAdjustmentState> for AdjustmentState {
    fn from(raw: RawAdjustmentState) -> Self {
        Self::new(raw.brightness, raw.contrast, raw.saturation)
    }
}

impl AdjustmentState {
    /// Build a state from raw values, clamping each into range.
    pub fn new(brightness: f64, contrast: f64, saturation: f64) -> Self {
        Self {
            brightness: clamp_slider(brightness),
            contrast: clamp_slider(contrast),
            saturation: clamp_slider(saturation),
        }
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn contrast(&self) -> f64 {
        self.contrast
    }

    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Current value of `slider`.
    pub fn get(&self, slider: Slider) -> f64 {
        match slider {
            Slider::Brightness => self.brightness,
            Slider::Contrast => self.contrast,
            Slider::Saturation => self.saturation,
        }
    }

    /// Set `slider`, clamping into `[-1, 1]`.
    ///
    /// Non-finite values are rejected and the previous value is kept.
    /// Returns `true` if the stored value changed.
    pub fn set(&mut self, slider: Slider, value: f64) -> Result<bool, AdjustmentError> {
        if !value.is_finite() {
            return Err(AdjustmentError::NotFinite { slider, value });
        }
        let value = clamp_slider(value);
        let field = match slider {
            Slider::Brightness => &mut self.brightness,
            Slider::Contrast => &mut self.contrast,
            Slider::Saturation => &mut self.saturation,
        };
        let changed = *field != value;
        *field = value;
        Ok(changed)
    }

    /// Return every slider to neutral.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether every slider is exactly neutral.
    pub fn is_neutral(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0 && self.saturation == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        assert!(AdjustmentState::default().is_neutral());
    }

    #[test]
    fn test_set_clamps_into_range() {
        let mut state = AdjustmentState::default();
        assert!(state.set(Slider::Contrast, 4.0).unwrap());
        assert_eq!(state.contrast(), 1.0);
        assert!(state.set(Slider::Saturation, -2.5).unwrap());
        assert_eq!(state.saturation(), -1.0);
    }

    #[test]
    fn test_set_same_value_reports_unchanged() {
        let mut state = AdjustmentState::new(0.3, 0.0, 0.0);
        assert!(!state.set(Slider::Brightness, 0.3).unwrap());
    }

    #[test]
    fn test_non_finite_is_rejected_and_keeps_value() {
        let mut state = AdjustmentState::new(0.2, 0.0, 0.0);
        let err = state.set(Slider::Brightness, f64::INFINITY).unwrap_err();
        assert!(matches!(err, AdjustmentError::NotFinite { slider: Slider::Brightness, .. }));
        assert_eq!(state.brightness(), 0.2);
    }

    #[test]
    fn test_reset_returns_to_neutral() {
        let mut state = AdjustmentState::new(0.5, -0.5, 1.0);
        state.reset();
        assert!(state.is_neutral());
    }

    #[test]
    fn test_deserialize_missing_fields_default_to_zero() {
        let state: AdjustmentState = serde_json::from_str(r#"{"contrast": 0.25}"#).unwrap();
        assert_eq!(state, AdjustmentState::new(0.0, 0.25, 0.0));
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_values() {
        let state: AdjustmentState =
            serde_json::from_str(r#"{"brightness": 9.0, "saturation": -3.0}"#).unwrap();
        assert_eq!(state, AdjustmentState::new(1.0, 0.0, -1.0));
        assert_eq!(state.get(Slider::Brightness), 1.0);
        assert!(!state.is_neutral());
    }

    #[test]
    fn test_serialize_round_trips_through_clamping() {
        let state = AdjustmentState::new(0.5, -0.25, 0.0);
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(serde_json::from_str::<AdjustmentState>(&json).unwrap(), state);
    }
}
