//! Engine configuration: preview sizing and export defaults.
//!
//! Values come from an optional JSON file, then environment overrides:
//!
//! | Variable               | Field                      |
//! |------------------------|----------------------------|
//! | `TINTBOX_PREVIEW_MAX`  | `preview_max_dimension`    |
//! | `TINTBOX_OUTPUT_DIR`   | `export.output_dir`        |
//! | `TINTBOX_JPEG_QUALITY` | `export.jpeg_quality`      |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::export::OutputFormat;
use crate::render::preview::DEFAULT_PREVIEW_MAX_DIMENSION;

/// Default longest side of preset thumbnails.
const DEFAULT_THUMBNAIL_MAX_DIMENSION: u32 = 160;
/// Default JPEG quality.
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest side of live previews, in pixels.
    pub preview_max_dimension: u32,
    /// Longest side of preset thumbnails, in pixels.
    pub thumbnail_max_dimension: u32,
    pub export: ExportConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview_max_dimension: DEFAULT_PREVIEW_MAX_DIMENSION,
            thumbnail_max_dimension: DEFAULT_THUMBNAIL_MAX_DIMENSION,
            export: ExportConfig::default(),
        }
    }
}

/// Export defaults used for generated target paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// JPEG quality, `1..=100`.
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("tintbox"),
            format: OutputFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load `path` if given, otherwise defaults, then apply environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "resolved engine config");
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("TINTBOX_PREVIEW_MAX") {
            self.preview_max_dimension = parse_override("TINTBOX_PREVIEW_MAX", &raw)?;
        }
        if let Some(raw) = lookup("TINTBOX_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("TINTBOX_JPEG_QUALITY") {
            self.export.jpeg_quality = parse_override("TINTBOX_JPEG_QUALITY", &raw)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_max_dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "preview_max_dimension",
                reason: "must be greater than zero".into(),
            });
        }
        if self.thumbnail_max_dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "thumbnail_max_dimension",
                reason: "must be greater than zero".into(),
            });
        }
        if !(1..=100).contains(&self.export.jpeg_quality) {
            return Err(ConfigError::Invalid {
                key: "export.jpeg_quality",
                reason: format!("{} is outside 1..=100", self.export.jpeg_quality),
            });
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}
