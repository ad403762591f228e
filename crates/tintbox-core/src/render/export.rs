//! One-shot full-resolution export to an image file.

use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError};
use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::error::{ExportError, RenderError};
use crate::image::SourceImage;
use crate::render::{Renderer, apply_matrix};
use crate::transform::matrix::ColorMatrix;

/// Sequence number appended to generated file names.
static EXPORT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless; identity exports are byte-exact.
    #[default]
    Png,
    /// Lossy, alpha dropped.
    Jpeg,
}

impl OutputFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Infer the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(ExportError::UnsupportedFormat(ext)),
        }
    }
}

/// Where an export is written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportTarget {
    /// `<output_dir>/tintbox-<millis>-<seq>.<ext>` using the configured format.
    #[default]
    Generated,
    /// Exactly this path; the format comes from its extension.
    Path(PathBuf),
}

/// A successfully written export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub path: PathBuf,
    /// `file://` URI of `path`.
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

/// CPU export backend.
#[derive(Debug, Clone)]
pub struct ExportRenderer {
    config: ExportConfig,
    target: ExportTarget,
}

impl ExportRenderer {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            target: ExportTarget::Generated,
        }
    }

    /// Set where the next render is written.
    pub fn with_target(mut self, target: ExportTarget) -> Self {
        self.target = target;
        self
    }

    pub fn target(&self) -> &ExportTarget {
        &self.target
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn resolve_target(&self) -> Result<(PathBuf, OutputFormat), ExportError> {
        match &self.target {
            ExportTarget::Path(path) => Ok((path.clone(), OutputFormat::from_path(path)?)),
            ExportTarget::Generated => {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis())
                    .unwrap_or_default();
                let seq = EXPORT_COUNTER.fetch_add(1, Ordering::Relaxed);
                let format = self.config.format;
                let name = format!("tintbox-{millis}-{seq}.{}", format.extension());
                Ok((self.config.output_dir.join(name), format))
            }
        }
    }

    fn write(
        &self,
        image: &SourceImage,
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), ExportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let write_err = |source: ImageError| ExportError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(|e| write_err(ImageError::IoError(e)))?;
        let result = self.encode(image, BufWriter::new(file), format).map_err(write_err);
        if result.is_err() {
            // Never leave a truncated file behind a failed export.
            if let Err(err) = std::fs::remove_file(path) {
                tracing::debug!(
                    path = %path.display(),
                    error = %err,
                    "could not remove partial export"
                );
            }
        }
        result
    }

    /// Encode into `writer` and flush it, so a full device or a failed final
    /// write surfaces as an error instead of being lost on drop.
    fn encode(
        &self,
        image: &SourceImage,
        mut writer: BufWriter<File>,
        format: OutputFormat,
    ) -> Result<(), ImageError> {
        let (width, height) = image.dimensions();
        match format {
            OutputFormat::Png => PngEncoder::new(&mut writer).write_image(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )?,
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(image.as_rgba().clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut writer, self.config.jpeg_quality)
                    .encode_image(&rgb)?;
            }
        }
        writer
            .into_inner()
            .map_err(|e| ImageError::IoError(e.into_error()))?;
        Ok(())
    }
}

impl Renderer for ExportRenderer {
    type Output = ExportedImage;

    fn render(
        &mut self,
        source: &SourceImage,
        matrix: &ColorMatrix,
    ) -> Result<ExportedImage, RenderError> {
        let (path, format) = self.resolve_target()?;
        let output = apply_matrix(source, matrix);

        if let Err(err) = self.write(&output, &path, format) {
            tracing::warn!(path = %path.display(), error = %err, "export failed");
            return Err(err.into());
        }

        let (width, height) = output.dimensions();
        tracing::info!(path = %path.display(), width, height, "exported image");
        Ok(ExportedImage {
            uri: file_uri(&path),
            path,
            width,
            height,
            format,
        })
    }
}

/// Run an export on the blocking thread pool and await its single result.
///
/// Not cancellable: dropping the future does not stop the write.
pub async fn export_async(
    mut renderer: ExportRenderer,
    source: SourceImage,
    matrix: ColorMatrix,
) -> Result<ExportedImage, RenderError> {
    tokio::task::spawn_blocking(move || renderer.render(&source, &matrix))
        .await
        .map_err(|e| RenderError::Export(ExportError::Task(e.to_string())))?
}

/// `file://` URI for `path`, percent-encoding each segment.
fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let display = absolute.to_string_lossy().replace('\\', "/");
    let encoded = display
        .split('/')
        .enumerate()
        .map(|(i, segment)| {
            // Keep a Windows drive prefix (`C:`) readable.
            if i == 0 && segment.ends_with(':') {
                Cow::Borrowed(segment)
            } else {
                urlencoding::encode(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}
