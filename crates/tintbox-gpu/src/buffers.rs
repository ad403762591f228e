//! GPU storage buffers holding packed RGBA8 pixels.

use tintbox_core::SourceImage;
use wgpu::util::DeviceExt;

/// Bytes per packed RGBA8 pixel (one `u32` in the shader).
pub const BYTES_PER_PIXEL: u64 = 4;

/// Handle to a GPU image stored as a storage buffer of packed `u32` pixels.
pub struct GpuImageHandle {
    pub buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
}

impl GpuImageHandle {
    /// Upload a [`SourceImage`] as a storage buffer.
    ///
    /// The RGBA8 bytes are copied as-is; on a little-endian GPU each pixel
    /// reads back as one `u32` that `unpack4x8unorm` splits into channels.
    pub fn upload(device: &wgpu::Device, image: &SourceImage) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tintbox_image_upload"),
            contents: image.as_raw(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            width: image.width(),
            height: image.height(),
        }
    }

    /// Create an uninitialized output buffer for a `width` x `height` image.
    pub fn create_output(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tintbox_image_output"),
            size: (width as u64) * (height as u64) * BYTES_PER_PIXEL,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    pub fn byte_size(&self) -> u64 {
        self.pixel_count() as u64 * BYTES_PER_PIXEL
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
