//! Live preview rendering with last-write-wins delivery.
//!
//! Every slider drag or filter tap asks for a new preview. Requests are
//! numbered by a [`PreviewSlot`]; a frame is only accepted if it is newer
//! than the frame already shown, so stale in-flight work is simply dropped.
//!
//! ```text
//!   UI ──request()──→ ticket(gen N) ──render──→ frame(gen N) ──publish()──→ slot
//!                                                              (dropped if N ≤ shown)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::RenderError;
use crate::image::SourceImage;
use crate::render::{Renderer, apply_matrix};
use crate::transform::matrix::ColorMatrix;

/// Default longest side of a CPU preview, in pixels.
pub const DEFAULT_PREVIEW_MAX_DIMENSION: u32 = 1080;

/// CPU preview backend. Downscales large sources before applying the matrix.
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    max_dimension: u32,
}

impl PreviewRenderer {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_MAX_DIMENSION)
    }
}

impl Renderer for PreviewRenderer {
    type Output = SourceImage;

    fn render(
        &mut self,
        source: &SourceImage,
        matrix: &ColorMatrix,
    ) -> Result<SourceImage, RenderError> {
        let (width, height) = source.dimensions();
        if width.max(height) <= self.max_dimension {
            return Ok(apply_matrix(source, matrix));
        }
        Ok(apply_matrix(&source.downscaled(self.max_dimension), matrix))
    }
}

/// A rendered preview tagged with the request it answers.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub generation: u64,
    pub matrix: ColorMatrix,
    pub image: SourceImage,
}

/// A pending preview request.
#[derive(Debug, Clone, Copy)]
pub struct PreviewTicket {
    pub generation: u64,
    pub matrix: ColorMatrix,
}

impl PreviewTicket {
    /// Render this request through any image-producing backend.
    pub fn render_with<R>(
        &self,
        renderer: &mut R,
        source: &SourceImage,
    ) -> Result<PreviewFrame, RenderError>
    where
        R: Renderer<Output = SourceImage> + ?Sized,
    {
        let image = renderer.render(source, &self.matrix)?;
        Ok(PreviewFrame {
            generation: self.generation,
            matrix: self.matrix,
            image,
        })
    }
}

/// Last-write-wins mailbox between the UI and preview workers.
///
/// Cloning shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct PreviewSlot {
    inner: Arc<SlotInner>,
}

#[derive(Debug, Default)]
struct SlotInner {
    requested: AtomicU64,
    latest: Mutex<Option<PreviewFrame>>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new request, superseding every earlier one.
    pub fn request(&self, matrix: ColorMatrix) -> PreviewTicket {
        let generation = self.inner.requested.fetch_add(1, Ordering::AcqRel) + 1;
        PreviewTicket { generation, matrix }
    }

    /// Whether `ticket` is still the newest request. Workers may skip
    /// superseded tickets before doing any pixel work.
    pub fn is_current(&self, ticket: &PreviewTicket) -> bool {
        self.inner.requested.load(Ordering::Acquire) == ticket.generation
    }

    /// Offer a finished frame. Returns `false` and drops it if a newer frame
    /// is already shown.
    pub fn publish(&self, frame: PreviewFrame) -> bool {
        let mut latest = self.inner.latest.lock();
        if let Some(shown) = latest.as_ref() {
            if shown.generation >= frame.generation {
                tracing::trace!(
                    stale = frame.generation,
                    shown = shown.generation,
                    "dropping stale preview frame"
                );
                return false;
            }
        }
        *latest = Some(frame);
        true
    }

    /// The newest published frame.
    pub fn latest(&self) -> Option<PreviewFrame> {
        self.inner.latest.lock().clone()
    }

    /// Generation of the newest published frame, `0` if none.
    pub fn shown_generation(&self) -> u64 {
        self.inner
            .latest
            .lock()
            .as_ref()
            .map_or(0, |frame| frame.generation)
    }

    /// Forget the shown frame (e.g. when the photo is discarded).
    pub fn clear(&self) {
        *self.inner.latest.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::sliders::matrix_for_brightness;

    fn source(width: u32, height: u32) -> SourceImage {
        let bytes = [100u8, 150, 200, 255].repeat((width * height) as usize);
        SourceImage::from_rgba8(width, height, bytes).unwrap()
    }

    #[test]
    fn test_preview_downscales_large_sources() {
        let mut renderer = PreviewRenderer::new(64);
        let out = renderer.render(&source(256, 128), &ColorMatrix::IDENTITY).unwrap();
        assert_eq!(out.dimensions(), (64, 32));
    }

    #[test]
    fn test_preview_keeps_small_sources_full_size() {
        let mut renderer = PreviewRenderer::new(64);
        let src = source(8, 8);
        let out = renderer.render(&src, &ColorMatrix::IDENTITY).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_stale_frame_is_dropped() {
        let slot = PreviewSlot::new();
        let mut renderer = PreviewRenderer::default();
        let src = source(4, 4);

        let first = slot.request(matrix_for_brightness(0.1));
        let second = slot.request(matrix_for_brightness(0.2));
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));

        let newer = second.render_with(&mut renderer, &src).unwrap();
        let older = first.render_with(&mut renderer, &src).unwrap();
        assert!(slot.publish(newer));
        assert!(!slot.publish(older));

        let shown = slot.latest().unwrap();
        assert_eq!(shown.generation, second.generation);
        assert_eq!(shown.matrix, matrix_for_brightness(0.2));
    }

    #[test]
    fn test_generations_increase_across_clones() {
        let slot = PreviewSlot::new();
        let other = slot.clone();
        let a = slot.request(ColorMatrix::IDENTITY);
        let b = other.request(ColorMatrix::IDENTITY);
        assert!(b.generation > a.generation);
    }

    #[test]
    fn test_concurrent_publishers_keep_newest() {
        let slot = PreviewSlot::new();
        let src = source(2, 2);
        let tickets: Vec<_> = (0..16).map(|_| slot.request(ColorMatrix::IDENTITY)).collect();
        let newest = tickets.last().map(|t| t.generation).unwrap();

        std::thread::scope(|scope| {
            for ticket in &tickets {
                let slot = slot.clone();
                let src = &src;
                scope.spawn(move || {
                    let mut renderer = PreviewRenderer::default();
                    let frame = ticket.render_with(&mut renderer, src).unwrap();
                    slot.publish(frame);
                });
            }
        });

        assert_eq!(slot.shown_generation(), newest);
    }

    #[test]
    fn test_clear_forgets_frame() {
        let slot = PreviewSlot::new();
        let ticket = slot.request(ColorMatrix::IDENTITY);
        let frame = ticket.render_with(&mut PreviewRenderer::default(), &source(1, 1)).unwrap();
        slot.publish(frame);
        slot.clear();
        assert!(slot.latest().is_none());
        assert_eq!(slot.shown_generation(), 0);
    }
}
