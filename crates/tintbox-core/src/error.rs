//! Error types for decoding, presets, rendering, export and configuration.

use std::path::PathBuf;

use crate::grading::adjustments::Slider;

/// The source image could not be turned into pixels.
///
/// Terminal for that image instance: nothing is retried and no transform
/// runs. Callers keep showing whatever they displayed before.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected} for the given dimensions")]
    BufferSize { expected: usize, actual: usize },
}

/// The final image could not be encoded or written.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported output extension: {0:?}")]
    UnsupportedFormat(String),
    #[error("export task failed: {0}")]
    Task(String),
}

/// Preset lookup and registry construction failures.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("unknown filter preset: {0:?}")]
    NotFound(String),
    #[error("duplicate filter preset id: {0:?}")]
    Duplicate(String),
    #[error("invalid filter preset id: {0:?}")]
    InvalidId(String),
    #[error("preset registry must contain an identity \"original\" entry")]
    MissingOriginal,
    #[error("failed to read preset file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse presets: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AdjustmentError {
    #[error("{slider} must be a finite number, got {value}")]
    NotFinite { slider: Slider, value: f64 },
}

/// Failure of a single render through any backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("render backend error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Anything an [`EditSession`](crate::session::EditSession) command can fail with.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no photo loaded")]
    NoPhoto,
}
