//! tintbox GPU: wgpu compute backend for live color matrix previews.
//!
//! Implements [`tintbox_core::Renderer`] so an edit session can swap the CPU
//! preview for this one without touching any matrix math.

pub mod buffers;
pub mod context;
pub mod error;
pub mod matrix_applicator;
pub mod preview;
pub mod readback;

pub use context::GpuContext;
pub use error::GpuError;
pub use preview::GpuPreviewRenderer;
