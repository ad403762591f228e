//! Live preview backend running the color matrix on the GPU.

use tintbox_core::render::preview::DEFAULT_PREVIEW_MAX_DIMENSION;
use tintbox_core::{ColorMatrix, RenderError, Renderer, SourceImage};

use crate::buffers::{BYTES_PER_PIXEL, GpuImageHandle};
use crate::context::GpuContext;
use crate::matrix_applicator::MatrixApplicator;
use crate::readback::Readback;
use crate::GpuError;

/// Downscaled preview of the source with the given [`SourceImage::id`].
struct UploadedSource {
    source_id: u64,
    handle: GpuImageHandle,
}

/// GPU counterpart of [`tintbox_core::PreviewRenderer`].
///
/// Produces the same output type from the same matrix, so sessions can use
/// either backend interchangeably. The downscaled source stays resident on
/// the GPU for as long as renders keep passing the same [`SourceImage`] (or a
/// clone of it), so a matrix change costs one dispatch and one readback.
pub struct GpuPreviewRenderer {
    context: GpuContext,
    applicator: MatrixApplicator,
    readback: Readback,
    max_dimension: u32,
    uploaded: Option<UploadedSource>,
}

impl GpuPreviewRenderer {
    pub fn new(context: GpuContext) -> Self {
        Self::with_max_dimension(context, DEFAULT_PREVIEW_MAX_DIMENSION)
    }

    pub fn with_max_dimension(context: GpuContext, max_dimension: u32) -> Self {
        let applicator = MatrixApplicator::new(&context.device);
        Self {
            context,
            applicator,
            readback: Readback::new(),
            max_dimension,
            uploaded: None,
        }
    }

    /// Request a default device and build a renderer on it.
    pub fn new_blocking() -> Result<Self, GpuError> {
        Ok(Self::new(GpuContext::new_blocking()?))
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    fn render_gpu(
        &mut self,
        source: &SourceImage,
        matrix: &ColorMatrix,
    ) -> Result<SourceImage, GpuError> {
        if matrix.is_identity() {
            return Ok(source.downscaled(self.max_dimension));
        }

        let Self {
            context,
            applicator,
            readback,
            max_dimension,
            uploaded,
        } = self;
        let input = upload_if_changed(&context.device, uploaded, source, *max_dimension)?;

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tintbox_preview_encoder"),
            });
        let output =
            applicator.apply(&context.device, &context.queue, input, matrix, &mut encoder)?;
        readback.download(&context.device, &context.queue, encoder, output)
    }
}

/// Keep the resident upload while `source` is the same photo; otherwise
/// downscale and upload it.
fn upload_if_changed<'a>(
    device: &wgpu::Device,
    slot: &'a mut Option<UploadedSource>,
    source: &SourceImage,
    max_dimension: u32,
) -> Result<&'a GpuImageHandle, GpuError> {
    if slot.as_ref().is_some_and(|up| up.source_id == source.id()) {
        return Ok(&slot.as_ref().expect("checked above").handle);
    }
    *slot = None;

    let preview = source.downscaled(max_dimension);
    let limit = device.limits().max_storage_buffer_binding_size as u64 / BYTES_PER_PIXEL;
    let pixels = preview.width() as u64 * preview.height() as u64;
    if pixels > limit {
        return Err(GpuError::TooLarge { pixels, limit });
    }

    tracing::debug!(
        width = preview.width(),
        height = preview.height(),
        "uploading preview source"
    );
    let uploaded = slot.insert(UploadedSource {
        source_id: source.id(),
        handle: GpuImageHandle::upload(device, &preview),
    });
    Ok(&uploaded.handle)
}

impl Renderer for GpuPreviewRenderer {
    type Output = SourceImage;

    fn render(
        &mut self,
        source: &SourceImage,
        matrix: &ColorMatrix,
    ) -> Result<SourceImage, RenderError> {
        self.render_gpu(source, matrix).map_err(|err| {
            tracing::warn!(error = %err, "gpu preview failed");
            RenderError::from(err)
        })
    }
}
