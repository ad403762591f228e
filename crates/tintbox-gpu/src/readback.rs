//! GPU-to-CPU image download.

use tintbox_core::SourceImage;

use crate::GpuError;
use crate::buffers::GpuImageHandle;

/// Staging buffer for copying a processed image back to the CPU.
///
/// Reallocated only when the image size changes.
pub struct Readback {
    staging: Option<wgpu::Buffer>,
}

impl Readback {
    pub fn new() -> Self {
        Self { staging: None }
    }

    /// Copy `image` into the staging buffer, wait for the GPU, and return
    /// the pixels as a [`SourceImage`].
    pub fn download(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mut encoder: wgpu::CommandEncoder,
        image: &GpuImageHandle,
    ) -> Result<SourceImage, GpuError> {
        let size = image.byte_size();
        let staging = match self.staging.take() {
            Some(buffer) if buffer.size() == size => buffer,
            _ => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("tintbox_image_staging"),
                size,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            }),
        };

        encoder.copy_buffer_to_buffer(&image.buffer, 0, &staging, 0, size);
        queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = std::sync::mpsc::channel();
        staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::Poll(e.to_string()))?;
        rx.recv()
            .map_err(|e| GpuError::Map(e.to_string()))?
            .map_err(|e| GpuError::Map(e.to_string()))?;

        let bytes = staging.slice(..).get_mapped_range().to_vec();
        staging.unmap();
        self.staging = Some(staging);

        Ok(SourceImage::from_rgba8(image.width, image.height, bytes)?)
    }
}

impl Default for Readback {
    fn default() -> Self {
        Self::new()
    }
}
