//! Decoded source images for the filter pipeline.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::DecodeError;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A decoded RGBA8 photo with non-zero dimensions.
///
/// Channels are stored as encoded 8-bit values; color matrices operate on
/// them after normalizing to `[0, 1]`.
///
/// Equality compares pixels only. [`id`](Self::id) is shared by clones and
/// fresh for every decoded or derived image.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
    id: u64,
}

impl PartialEq for SourceImage {
    fn eq(&self, other: &Self) -> bool {
        self.pixels == other.pixels
    }
}

impl SourceImage {
    /// Decode an in-memory image, guessing the format from its header.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let decoded = image::load_from_memory(bytes)?;
        Self::from_image(decoded.to_rgba8())
    }

    /// Read and decode an image file.
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes)
    }

    /// Wrap raw RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, DecodeError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        let actual = bytes.len();
        match RgbaImage::from_raw(width, height, bytes) {
            Some(pixels) if actual == expected => Ok(Self::from_valid(pixels)),
            _ => Err(DecodeError::BufferSize { expected, actual }),
        }
    }

    /// Wrap an already decoded buffer.
    pub fn from_image(pixels: RgbaImage) -> Result<Self, DecodeError> {
        check_dimensions(pixels.width(), pixels.height())?;
        Ok(Self::from_valid(pixels))
    }

    /// Wrap a buffer already known to have non-zero dimensions.
    pub(crate) fn from_valid(pixels: RgbaImage) -> Self {
        debug_assert!(pixels.width() > 0 && pixels.height() > 0);
        Self {
            pixels,
            id: next_id(),
        }
    }

    /// Cheap identity of this pixel buffer, for caching uploads and
    /// proxies without comparing pixels.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Pixel at `x`, `y` as `[r, g, b, a]`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Raw interleaved RGBA8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Aspect-preserving downscale so the longest side is at most
    /// `max_dimension`. Returns a clone when already small enough.
    pub fn downscaled(&self, max_dimension: u32) -> Self {
        let (width, height) = self.dimensions();
        let longest = width.max(height);
        if max_dimension == 0 || longest <= max_dimension {
            return self.clone();
        }

        let scale = max_dimension as f64 / longest as f64;
        let new_width = ((width as f64 * scale).round() as u32).max(1);
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        let pixels =
            image::imageops::resize(&self.pixels, new_width, new_height, FilterType::Triangle);
        Self::from_valid(pixels)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }
    Ok(())
}
