//! Error type for the GPU preview backend.

use thiserror::Error;
use tintbox_core::{DecodeError, RenderError};

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(String),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(String),

    #[error("GPU poll failed: {0}")]
    Poll(String),

    #[error("failed to map readback buffer: {0}")]
    Map(String),

    #[error("readback produced an invalid image")]
    Readback(#[from] DecodeError),

    #[error("{pixels} pixels exceed the GPU limit of {limit}")]
    TooLarge { pixels: u64, limit: u64 },
}

impl From<GpuError> for RenderError {
    fn from(err: GpuError) -> Self {
        RenderError::Backend(err.to_string())
    }
}
