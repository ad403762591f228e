//! Edit session for the photo preview / edit flow.
//!
//! The session is the only owner of the `(filter, brightness, contrast,
//! saturation)` tuple. Commands mutate it; the engine functions only ever
//! see it by reference.
//!
//! ```text
//!            LoadPhoto                confirm() ok / Discard
//!   Empty ─────────────→ Editing ─────────────────────────→ Empty
//!                        │    ↑
//!                        └────┘  SelectFilter / SetSlider / Reset /
//!                                LoadPhoto / failed confirm()
//! ```

use std::path::PathBuf;

use crate::error::{DecodeError, SessionError};
use crate::grading::adjustments::{AdjustmentState, Slider};
use crate::image::SourceImage;
use crate::presets::{FilterPreset, PresetRegistry};
use crate::render::export::{ExportRenderer, ExportedImage, export_async};
use crate::render::preview::{DEFAULT_PREVIEW_MAX_DIMENSION, PreviewFrame, PreviewSlot};
use crate::render::Renderer;
use crate::transform::combine::combine;
use crate::transform::matrix::ColorMatrix;

/// Commands issued by the UI host.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    LoadPhoto { path: PathBuf },
    SelectFilter { id: String },
    SetSlider { slider: Slider, value: f64 },
    /// Sliders back to neutral; the selected filter is kept.
    Reset,
    /// Drop the photo and its edit state without exporting.
    Discard,
}

/// What a command changed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhotoLoaded { width: u32, height: u32 },
    /// The combined transform changed; the preview is stale.
    ParamsChanged { matrix: ColorMatrix },
    Unchanged,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Editing,
}

#[derive(Debug, Clone)]
struct Photo {
    source: SourceImage,
    preview_source: SourceImage,
    filter_id: String,
    adjustments: AdjustmentState,
}

/// Photo edit state between loading a photo and confirming or discarding it.
///
/// The session owns the [`PreviewSlot`] its previews are published to.
/// Loading, discarding or confirming a photo clears it.
#[derive(Debug)]
pub struct EditSession<'r> {
    registry: &'r PresetRegistry,
    preview_max_dimension: u32,
    photo: Option<Photo>,
    preview: PreviewSlot,
}

impl<'r> EditSession<'r> {
    pub fn new(registry: &'r PresetRegistry) -> Self {
        Self {
            registry,
            preview_max_dimension: DEFAULT_PREVIEW_MAX_DIMENSION,
            photo: None,
            preview: PreviewSlot::new(),
        }
    }

    /// Size the cached preview proxy built on every photo load.
    pub fn with_preview_max_dimension(mut self, max_dimension: u32) -> Self {
        self.preview_max_dimension = max_dimension;
        self
    }

    pub fn registry(&self) -> &'r PresetRegistry {
        self.registry
    }

    /// Slot the current photo's previews are published to. Clone it to hand
    /// to a display thread.
    pub fn preview_slot(&self) -> &PreviewSlot {
        &self.preview
    }

    pub fn state(&self) -> SessionState {
        if self.photo.is_some() {
            SessionState::Editing
        } else {
            SessionState::Empty
        }
    }

    /// Full-resolution source of the current photo.
    pub fn source(&self) -> Option<&SourceImage> {
        self.photo.as_ref().map(|p| &p.source)
    }

    pub fn adjustments(&self) -> Option<&AdjustmentState> {
        self.photo.as_ref().map(|p| &p.adjustments)
    }

    pub fn selected_filter(&self) -> Option<&FilterPreset> {
        let photo = self.photo.as_ref()?;
        self.registry.get(&photo.filter_id).ok()
    }

    /// Combined transform for the current filter and sliders.
    pub fn combined_matrix(&self) -> Option<ColorMatrix> {
        let photo = self.photo.as_ref()?;
        let filter = self.registry.get(&photo.filter_id).ok()?;
        Some(combine(filter.matrix(), &photo.adjustments))
    }

    pub fn apply(&mut self, command: EditCommand) -> Result<SessionEvent, SessionError> {
        match command {
            EditCommand::LoadPhoto { path } => {
                let source = SourceImage::open(&path).inspect_err(|err| {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "photo decode failed; keeping previous image"
                    );
                })?;
                Ok(self.load_image(source))
            }
            EditCommand::SelectFilter { id } => {
                let before = self.combined_matrix();
                let photo = self.photo.as_mut().ok_or(SessionError::NoPhoto)?;
                let preset = self.registry.get(&id)?;
                photo.filter_id = preset.id().to_string();
                tracing::debug!(filter = %id, "filter selected");
                Ok(self.changed_since(before))
            }
            EditCommand::SetSlider { slider, value } => {
                let before = self.combined_matrix();
                let photo = self.photo.as_mut().ok_or(SessionError::NoPhoto)?;
                photo.adjustments.set(slider, value)?;
                tracing::debug!(%slider, value = photo.adjustments.get(slider), "slider moved");
                Ok(self.changed_since(before))
            }
            EditCommand::Reset => {
                let before = self.combined_matrix();
                let photo = self.photo.as_mut().ok_or(SessionError::NoPhoto)?;
                photo.adjustments.reset();
                tracing::debug!("adjustments reset");
                Ok(self.changed_since(before))
            }
            EditCommand::Discard => {
                if self.photo.take().is_some() {
                    self.preview.clear();
                    tracing::debug!("photo discarded");
                    Ok(SessionEvent::Discarded)
                } else {
                    Ok(SessionEvent::Unchanged)
                }
            }
        }
    }

    /// Decode `bytes` and start editing them. On failure the previous photo
    /// and its edit state stay untouched.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<SessionEvent, DecodeError> {
        let source = SourceImage::decode(bytes).inspect_err(|err| {
            tracing::warn!(error = %err, "photo decode failed; keeping previous image");
        })?;
        Ok(self.load_image(source))
    }

    /// Start editing an already decoded photo with neutral sliders and the
    /// original filter.
    pub fn load_image(&mut self, source: SourceImage) -> SessionEvent {
        let (width, height) = source.dimensions();
        let preview_source = source.downscaled(self.preview_max_dimension);
        self.photo = Some(Photo {
            source,
            preview_source,
            filter_id: self.registry.original().id().to_string(),
            adjustments: AdjustmentState::default(),
        });
        self.preview.clear();
        tracing::debug!(width, height, "photo loaded");
        SessionEvent::PhotoLoaded { width, height }
    }

    /// Render the current edit through a preview backend and publish it to
    /// [`preview_slot`](Self::preview_slot).
    ///
    /// Returns `Ok(None)` when no photo is loaded, or when another request
    /// superseded this one while it rendered.
    pub fn render_preview<R>(&self, renderer: &mut R) -> Result<Option<PreviewFrame>, SessionError>
    where
        R: Renderer<Output = SourceImage> + ?Sized,
    {
        let (Some(photo), Some(matrix)) = (self.photo.as_ref(), self.combined_matrix()) else {
            return Ok(None);
        };
        let ticket = self.preview.request(matrix);
        let frame = ticket.render_with(renderer, &photo.preview_source)?;
        if !self.preview.is_current(&ticket) {
            tracing::trace!(generation = ticket.generation, "preview superseded while rendering");
            return Ok(None);
        }
        if self.preview.publish(frame.clone()) {
            Ok(Some(frame))
        } else {
            Ok(None)
        }
    }

    /// Export the current edit at full resolution.
    ///
    /// Success ends the edit. Failure keeps the photo and sliders so the
    /// caller can retry.
    pub fn confirm<R>(&mut self, renderer: &mut R) -> Result<R::Output, SessionError>
    where
        R: Renderer + ?Sized,
    {
        let (photo, matrix) = self.current()?;
        let output = renderer.render(&photo.source, &matrix).inspect_err(|err| {
            tracing::warn!(error = %err, "export failed; keeping edit state");
        })?;
        self.finish();
        Ok(output)
    }

    /// [`confirm`](Self::confirm) on the blocking pool.
    pub async fn confirm_async(
        &mut self,
        renderer: ExportRenderer,
    ) -> Result<ExportedImage, SessionError> {
        let (photo, matrix) = self.current()?;
        let source = photo.source.clone();
        let exported = export_async(renderer, source, matrix).await.inspect_err(|err| {
            tracing::warn!(error = %err, "export failed; keeping edit state");
        })?;
        self.finish();
        Ok(exported)
    }

    fn finish(&mut self) {
        self.photo = None;
        self.preview.clear();
    }

    fn current(&self) -> Result<(&Photo, ColorMatrix), SessionError> {
        let photo = self.photo.as_ref().ok_or(SessionError::NoPhoto)?;
        let filter = self.registry.get(&photo.filter_id)?;
        Ok((photo, combine(filter.matrix(), &photo.adjustments)))
    }

    fn changed_since(&self, before: Option<ColorMatrix>) -> SessionEvent {
        match self.combined_matrix() {
            Some(matrix) if before != Some(matrix) => SessionEvent::ParamsChanged { matrix },
            _ => SessionEvent::Unchanged,
        }
    }
}
