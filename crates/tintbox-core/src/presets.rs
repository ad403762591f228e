//! Filter preset registry.
//!
//! A preset pairs a stable id and a display label with a fixed
//! [`ColorMatrix`]. Registries are immutable once built; the built-in one is
//! created on first use and lives for the rest of the process.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::PresetError;
use crate::grading::sliders::{LUMA_BT601, matrix_for_contrast, matrix_for_saturation};
use crate::transform::matrix::ColorMatrix;

/// Id of the identity preset every registry must contain.
pub const ORIGINAL_ID: &str = "original";

/// A named, fixed color transform offered as a one-tap filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    id: String,
    label: String,
    matrix: ColorMatrix,
}

impl FilterPreset {
    pub fn new(id: impl Into<String>, label: impl Into<String>, matrix: ColorMatrix) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            matrix,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matrix(&self) -> &ColorMatrix {
        &self.matrix
    }
}

/// Identifiers of the built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterId {
    Original,
    Grayscale,
    Sepia,
    Vivid,
    Warm,
    Cool,
    Vintage,
    Noir,
    Fade,
    Invert,
}

impl FilterId {
    /// Built-in presets in display order.
    pub const ALL: [FilterId; 10] = [
        FilterId::Original,
        FilterId::Grayscale,
        FilterId::Sepia,
        FilterId::Vivid,
        FilterId::Warm,
        FilterId::Cool,
        FilterId::Vintage,
        FilterId::Noir,
        FilterId::Fade,
        FilterId::Invert,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Original => ORIGINAL_ID,
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Vivid => "vivid",
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Vintage => "vintage",
            Self::Noir => "noir",
            Self::Fade => "fade",
            Self::Invert => "invert",
        }
    }

    /// Human-readable label for the thumbnail strip.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Grayscale => "Grayscale",
            Self::Sepia => "Sepia",
            Self::Vivid => "Vivid",
            Self::Warm => "Warm",
            Self::Cool => "Cool",
            Self::Vintage => "Vintage",
            Self::Noir => "Noir",
            Self::Fade => "Fade",
            Self::Invert => "Invert",
        }
    }

    fn matrix(self) -> ColorMatrix {
        let [wr, wg, wb] = LUMA_BT601;
        let grayscale = ColorMatrix::from_rows([
            [wr, wg, wb, 0.0, 0.0],
            [wr, wg, wb, 0.0, 0.0],
            [wr, wg, wb, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ]);
        match self {
            Self::Original => ColorMatrix::IDENTITY,
            Self::Grayscale => grayscale,
            Self::Sepia => ColorMatrix::from_rows([
                [0.393, 0.769, 0.189, 0.0, 0.0],
                [0.349, 0.686, 0.168, 0.0, 0.0],
                [0.272, 0.534, 0.131, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ]),
            Self::Vivid => {
                ColorMatrix::compose(&matrix_for_contrast(0.15), &matrix_for_saturation(0.5))
            }
            Self::Warm => ColorMatrix::from_rows([
                [1.1, 0.0, 0.0, 0.0, 0.02],
                [0.0, 1.0, 0.0, 0.0, 0.01],
                [0.0, 0.0, 0.85, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ]),
            Self::Cool => ColorMatrix::from_rows([
                [0.9, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0, 0.01],
                [0.0, 0.0, 1.1, 0.0, 0.03],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ]),
            Self::Vintage => ColorMatrix::from_rows([
                [0.6279, 0.3202, -0.0397, 0.0, 0.0378],
                [0.0258, 0.6441, 0.0326, 0.0, 0.0293],
                [0.0466, -0.0851, 0.5242, 0.0, 0.0202],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ]),
            Self::Noir => ColorMatrix::compose(&matrix_for_contrast(0.4), &grayscale),
            Self::Fade => {
                ColorMatrix::compose(&matrix_for_saturation(-0.25), &matrix_for_contrast(-0.2))
            }
            Self::Invert => ColorMatrix::from_rows([
                [-1.0, 0.0, 0.0, 0.0, 1.0],
                [0.0, -1.0, 0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0, 0.0, 1.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ]),
        }
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterId {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PresetError::NotFound(s.to_string()))
    }
}

static BUILTIN: LazyLock<PresetRegistry> = LazyLock::new(|| {
    let presets = FilterId::ALL
        .into_iter()
        .map(|id| FilterPreset::new(id.as_str(), id.label(), id.matrix()))
        .collect::<Vec<_>>();
    let index = build_index(&presets);
    PresetRegistry { presets, index }
});

/// Ordered, immutable collection of filter presets.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: Vec<FilterPreset>,
    index: HashMap<String, usize>,
}

impl PresetRegistry {
    /// The process-wide built-in registry.
    pub fn builtin() -> &'static PresetRegistry {
        &BUILTIN
    }

    /// Build a caller-supplied registry.
    ///
    /// Ids must be non-empty, made of `[a-z0-9_-]`, and unique. An
    /// `"original"` entry holding the identity matrix is required.
    pub fn from_presets(presets: Vec<FilterPreset>) -> Result<Self, PresetError> {
        let mut seen = HashMap::with_capacity(presets.len());
        for (i, preset) in presets.iter().enumerate() {
            validate_id(&preset.id)?;
            if seen.insert(preset.id.clone(), i).is_some() {
                return Err(PresetError::Duplicate(preset.id.clone()));
            }
        }

        match seen.get(ORIGINAL_ID) {
            Some(&i) if presets[i].matrix.is_identity() => {}
            _ => return Err(PresetError::MissingOriginal),
        }

        Ok(Self {
            presets,
            index: seen,
        })
    }

    /// Parse a JSON array of `{ "id", "label", "matrix": [20 numbers] }`.
    pub fn from_json_str(json: &str) -> Result<Self, PresetError> {
        let presets: Vec<FilterPreset> = serde_json::from_str(json)?;
        Self::from_presets(presets)
    }

    /// Load a registry from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, PresetError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), count = registry.len(), "loaded preset registry");
        Ok(registry)
    }

    /// Look up a preset by id.
    pub fn get(&self, id: &str) -> Result<&FilterPreset, PresetError> {
        self.index
            .get(id)
            .map(|&i| &self.presets[i])
            .ok_or_else(|| PresetError::NotFound(id.to_string()))
    }

    /// Look up a built-in id. Fails only for custom registries that omit it.
    pub fn get_builtin(&self, id: FilterId) -> Result<&FilterPreset, PresetError> {
        self.get(id.as_str())
    }

    /// The identity preset.
    pub fn original(&self) -> &FilterPreset {
        // Every constructor guarantees the entry exists.
        &self.presets[self.index[ORIGINAL_ID]]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterPreset> {
        self.presets.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn build_index(presets: &[FilterPreset]) -> HashMap<String, usize> {
    presets
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.clone(), i))
        .collect()
}

fn validate_id(id: &str) -> Result<(), PresetError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(PresetError::InvalidId(id.to_string()))
    }
}
