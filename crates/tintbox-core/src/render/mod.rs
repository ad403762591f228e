//! Rendering backends that apply a [`ColorMatrix`] to a [`SourceImage`].
//!
//! Preview and export are two backends for the same logical operation. Both
//! consume the same combined matrix, so composition math lives only in
//! [`crate::transform`].

pub mod export;
pub mod preview;

use rayon::prelude::*;

use crate::error::RenderError;
use crate::image::SourceImage;
use crate::transform::matrix::ColorMatrix;

pub use export::{ExportRenderer, ExportTarget, ExportedImage, OutputFormat, export_async};
pub use preview::{PreviewFrame, PreviewRenderer, PreviewSlot, PreviewTicket};

/// A backend that applies a color matrix to an image.
pub trait Renderer {
    /// What a successful render produces (an image, a written file, ...).
    type Output;

    fn render(
        &mut self,
        source: &SourceImage,
        matrix: &ColorMatrix,
    ) -> Result<Self::Output, RenderError>;
}

/// Apply `matrix` to every pixel, producing a new image of identical size.
///
/// Channels are normalized to `[0, 1]`, transformed, clamped, and rounded
/// back to 8 bits. The identity matrix is a byte-exact pass-through.
pub fn apply_matrix(source: &SourceImage, matrix: &ColorMatrix) -> SourceImage {
    if matrix.is_identity() {
        return source.clone();
    }

    let mut pixels = source.as_rgba().clone();
    let row_bytes = pixels.width() as usize * 4;
    pixels
        .par_chunks_mut(row_bytes)
        .for_each(|row| apply_row(row, matrix));

    SourceImage::from_valid(pixels)
}

/// Apply `matrix` in place to interleaved RGBA8 bytes.
pub fn apply_row(row: &mut [u8], matrix: &ColorMatrix) {
    for px in row.chunks_exact_mut(4) {
        let rgba = [
            px[0] as f64 / 255.0,
            px[1] as f64 / 255.0,
            px[2] as f64 / 255.0,
            px[3] as f64 / 255.0,
        ];
        let out = matrix.transform(rgba);
        for c in 0..4 {
            px[c] = to_u8(out[c]);
        }
    }
}

#[inline]
fn to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}
