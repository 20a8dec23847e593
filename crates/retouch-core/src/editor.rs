//! The editor: one loaded file, its history, and the canvas around it.
//!
//! [`Editor`] is the surface a presentation layer talks to. It never blocks
//! and never performs I/O. Work for the processing and RAW preview services
//! is queued as [`ServiceCall`]s; the host performs them and reports back
//! with [`Editor::complete_process`] / [`Editor::complete_raw_preview`].
//! Slider debouncing runs on a clock the host supplies (`now`), and
//! [`Editor::next_deadline`] says when the host should call [`Editor::tick`].
//!
//! Image handles (object URLs or similar) are owned by the host. Whenever the
//! editor stops using one it is queued for [`Editor::take_released_images`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::coordinator::{Completion, Coordinator, ProcessedImage, RawPreview, RequestId, ServiceCall};
use crate::crop::{compose_crop, CropContext, Handle};
use crate::decode::{needs_raw_preview, probe_image, DecodeError};
use crate::error::{EditError, ServiceError, ValidationError};
use crate::geometry::{AspectRatio, Dimensions, DisplayRect, Point, Vector};
use crate::history::History;
use crate::session::{AdjustmentValues, EditParams, EditingSession, ImageHandle, NamedEffect, Slider};
use crate::viewport::Viewport;

/// Result of [`Editor::load_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LoadStatus {
    /// The file is open and editable.
    #[serde(rename_all = "camelCase")]
    Ready {
        original_dimensions: Dimensions,
        base_dimensions: Dimensions,
    },
    /// A RAW file: editing starts once the preview arrives.
    AwaitingRawPreview { request: RequestId },
}

#[derive(Debug, Clone)]
struct PendingLoad {
    request: RequestId,
    filename: String,
}

/// Editing history and coordinate transform engine for one canvas.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    viewport: Viewport,
    container: Option<Dimensions>,
    session: Option<EditingSession>,
    history: History<EditParams>,
    coordinator: Coordinator,
    pending_load: Option<PendingLoad>,
    released: Vec<ImageHandle>,
    error: Option<String>,
    /// Last canvas point of an active pan drag.
    pan_anchor: Option<Point>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::build(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor after checking the configuration.
    pub fn new(config: EditorConfig) -> Result<Self, EditError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EditorConfig) -> Self {
        Self {
            viewport: Viewport::new(config.min_zoom, config.max_zoom, config.zoom_sensitivity),
            container: None,
            session: None,
            history: History::new(config.max_history_length),
            coordinator: Coordinator::new(config.debounce_delay()),
            pending_load: None,
            released: Vec::new(),
            error: None,
            pan_anchor: None,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // File lifecycle
    // ------------------------------------------------------------------

    /// Open a file, replacing whatever was open.
    ///
    /// `source` is the host's displayable handle for `bytes`. JPEG/PNG files
    /// are probed and shown straight away at preview size. RAW files cannot
    /// be displayed directly: `source` is released and a RAW preview request
    /// is queued instead.
    pub fn load_file(
        &mut self,
        bytes: &[u8],
        filename: &str,
        source: ImageHandle,
    ) -> Result<LoadStatus, EditError> {
        self.close_file();

        if needs_raw_preview(bytes, filename) {
            self.released.push(source);
            let request = self.coordinator.request_raw_preview(filename);
            self.pending_load = Some(PendingLoad {
                request,
                filename: filename.to_string(),
            });
            tracing::info!(filename, %request, "loading raw file");
            return Ok(LoadStatus::AwaitingRawPreview { request });
        }

        let info = match probe_image(bytes) {
            Ok(info) => info,
            Err(err) => {
                self.released.push(source);
                return Err(self.fail(err.into()));
            }
        };
        let original = info.oriented_dimensions();
        let base = original.fit_within(self.config.preview_max_edge);
        self.start_session(filename, original, base, source);

        Ok(LoadStatus::Ready {
            original_dimensions: original,
            base_dimensions: base,
        })
    }

    /// Close the current file. In-flight responses will be discarded and the
    /// displayed image is released.
    pub fn close_file(&mut self) {
        self.coordinator.discard_all();
        self.pending_load = None;
        self.pan_anchor = None;
        self.history.clear();
        self.error = None;
        if let Some(session) = self.session.take() {
            tracing::debug!(filename = %session.filename, "closing file");
            self.released.push(session.into_displayed());
        }
    }

    fn start_session(
        &mut self,
        filename: &str,
        original: Dimensions,
        base: Dimensions,
        displayed: ImageHandle,
    ) {
        let session = EditingSession::new(filename, original, base, displayed);
        self.coordinator.discard_all();
        self.history = History::new(self.config.max_history_length);
        self.history.reset(session.snapshot());
        self.session = Some(session);
        self.error = None;
        self.fit_to_container();
        tracing::info!(filename, %original, %base, "file loaded");
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditingSession> {
        self.session.as_ref()
    }

    pub fn history(&self) -> &History<EditParams> {
        &self.history
    }

    // ------------------------------------------------------------------
    // Sliders
    // ------------------------------------------------------------------

    /// Set one slider (clamped to its range) and restart the preview timer.
    pub fn set_slider(&mut self, slider: Slider, value: f64, now: Duration) -> Result<(), EditError> {
        let session = self.session_mut()?;
        session.adjustments.set(slider, value);
        let cropping = session.is_cropping();
        if !cropping {
            self.coordinator.schedule_preview(now);
        }
        Ok(())
    }

    /// [`Editor::set_slider`] by slider name, e.g. `"exposure"`.
    pub fn set_slider_by_name(&mut self, name: &str, value: f64, now: Duration) -> Result<(), EditError> {
        match name.parse::<Slider>() {
            Ok(slider) => self.set_slider(slider, value, now),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Put every slider back to its default; produces one history entry.
    pub fn reset_adjustments(&mut self, now: Duration) -> Result<(), EditError> {
        let session = self.session_mut()?;
        session.adjustments = AdjustmentValues::default();
        let cropping = session.is_cropping();
        if !cropping {
            self.coordinator.schedule_preview(now);
        }
        Ok(())
    }

    /// Fire the slider preview if its quiet period has elapsed. Returns the
    /// id of the issued request.
    pub fn tick(&mut self, now: Duration) -> Option<RequestId> {
        if !self.coordinator.preview_due(now) {
            return None;
        }
        let session = self.session.as_ref().filter(|s| !s.is_cropping())?;
        Some(self.coordinator.request_adjustment_preview(session))
    }

    /// When the host should next call [`Editor::tick`].
    pub fn next_deadline(&self) -> Option<Duration> {
        self.coordinator.next_deadline()
    }

    // ------------------------------------------------------------------
    // Crop
    // ------------------------------------------------------------------

    /// Enter or leave crop mode. Returns whether crop mode is now active.
    ///
    /// Entering selects the whole displayed image shaped to the active ratio.
    /// Leaving without committing discards the selection.
    pub fn toggle_crop_mode(&mut self) -> Result<bool, EditError> {
        let session = self.session_mut()?;
        if session.is_cropping() {
            session.crop.cancel();
            self.pan_anchor = None;
            return Ok(false);
        }
        let (base, original) = (session.base_dimensions, session.original_dimensions);
        session.crop.begin(base, original);
        self.coordinator.cancel_preview();
        Ok(true)
    }

    pub fn set_aspect_ratio(&mut self, aspect: AspectRatio) -> Result<(), EditError> {
        let session = self.session_mut()?;
        let (base, original) = (session.base_dimensions, session.original_dimensions);
        session.crop.set_aspect_ratio(aspect, base, original);
        Ok(())
    }

    /// [`Editor::set_aspect_ratio`] by option name, e.g. `"16:9"`.
    pub fn set_aspect_ratio_by_name(&mut self, option: &str) -> Result<(), EditError> {
        match option.parse::<AspectRatio>() {
            Ok(aspect) => self.set_aspect_ratio(aspect),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Compose the UI crop into original space and request it.
    ///
    /// A selection that ends up below the minimum size is rejected with a
    /// [`ValidationError`]; nothing is sent and crop mode stays active.
    pub fn commit_crop(&mut self) -> Result<RequestId, EditError> {
        let result = self.try_commit_crop();
        self.record(result)
    }

    fn try_commit_crop(&mut self) -> Result<RequestId, EditError> {
        let min_size = self.config.min_crop_size;
        let session = self.session.as_ref().ok_or(ValidationError::NoFileLoaded)?;
        let region = session.crop.region().ok_or(ValidationError::NotCropping)?;
        let crop = compose_crop(
            &region,
            session.base_dimensions,
            session.original_dimensions,
            session.committed_crop.as_ref(),
            min_size,
        )?;
        self.coordinator.cancel_preview();
        Ok(self.coordinator.request_crop(session, crop))
    }

    // ------------------------------------------------------------------
    // Effects and history
    // ------------------------------------------------------------------

    /// Apply a named effect on top of the current state, optionally
    /// overriding some sliders for it.
    pub fn apply_named_effect(
        &mut self,
        effect: NamedEffect,
        overrides: &[(Slider, f64)],
    ) -> Result<RequestId, EditError> {
        let Some(session) = self.session.as_mut() else {
            return Err(self.fail(ValidationError::NoFileLoaded.into()));
        };
        self.coordinator.cancel_preview();
        let request = self.coordinator.request_named_effect(session, effect, overrides);
        self.error = None;
        Ok(request)
    }

    /// [`Editor::apply_named_effect`] with the effect and override sliders
    /// given by name.
    pub fn apply_named_effect_by_name(
        &mut self,
        effect: &str,
        overrides: &[(String, f64)],
    ) -> Result<RequestId, EditError> {
        let parsed = effect.parse::<NamedEffect>().and_then(|effect| {
            let overrides = overrides
                .iter()
                .map(|(name, value)| Ok((name.parse::<Slider>()?, *value)))
                .collect::<Result<Vec<_>, ValidationError>>()?;
            Ok((effect, overrides))
        });
        match parsed {
            Ok((effect, overrides)) => self.apply_named_effect(effect, &overrides),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Step back one history entry and re-render it. `None` at the oldest
    /// entry or without a file.
    pub fn undo(&mut self) -> Option<RequestId> {
        let params = self.history.undo()?.clone();
        Some(self.replay(params))
    }

    /// Step forward one history entry and re-render it. `None` at the newest
    /// entry or without a file.
    pub fn redo(&mut self) -> Option<RequestId> {
        let params = self.history.redo()?.clone();
        Some(self.replay(params))
    }

    fn replay(&mut self, params: EditParams) -> RequestId {
        if let Some(session) = self.session.as_mut() {
            session.restore(&params);
            session.crop.cancel();
        }
        self.coordinator.cancel_preview();
        self.coordinator.request_replay(params)
    }

    pub fn can_undo(&self) -> bool {
        self.session.is_some() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.is_some() && self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Pointer and viewport
    // ------------------------------------------------------------------

    /// Pointer pressed at a canvas position. In crop mode a hit on the crop
    /// rectangle starts a crop drag; anything else starts panning.
    pub fn pointer_down(&mut self, canvas: Point) -> Option<Handle> {
        if let Some(ctx) = self.crop_context() {
            let point = self.viewport.to_image(canvas);
            if let Some(session) = self.session.as_mut() {
                if let Some(handle) = session.crop.pointer_down(point, &ctx) {
                    return Some(handle);
                }
            }
        }
        self.pan_anchor = Some(canvas);
        None
    }

    pub fn pointer_move(&mut self, canvas: Point) {
        if let Some(ctx) = self.crop_context() {
            let point = self.viewport.to_image(canvas);
            if let Some(session) = self.session.as_mut() {
                if session.crop.pointer_move(point, &ctx).is_some() {
                    return;
                }
            }
        }
        if let Some(anchor) = self.pan_anchor {
            self.viewport.pan(canvas - anchor);
            self.pan_anchor = Some(canvas);
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.crop.pointer_up();
        }
        self.pan_anchor = None;
    }

    /// Wheel zoom anchored at the cursor.
    pub fn wheel(&mut self, canvas: Point, delta: f64) {
        self.viewport.zoom_at(canvas, delta);
    }

    /// The canvas changed size: refit the displayed image.
    pub fn resize_container(&mut self, container: Dimensions) {
        self.container = Some(container);
        self.fit_to_container();
    }

    fn fit_to_container(&mut self) {
        if let (Some(session), Some(container)) = (self.session.as_ref(), self.container) {
            self.viewport
                .fit_to_container(session.base_dimensions, container);
        }
    }

    fn crop_context(&self) -> Option<CropContext> {
        let session = self.session.as_ref().filter(|s| s.is_cropping())?;
        Some(CropContext {
            base: session.base_dimensions,
            original: session.original_dimensions,
            zoom: self.viewport.zoom(),
            min_size_screen: self.config.min_crop_size_screen,
            handle_tolerance_screen: self.config.handle_tolerance_screen,
        })
    }

    // ------------------------------------------------------------------
    // Host I/O
    // ------------------------------------------------------------------

    /// Drain the service calls the host should perform.
    pub fn take_service_calls(&mut self) -> Vec<ServiceCall> {
        self.coordinator.take_calls()
    }

    /// Drain image handles the host may now free.
    pub fn take_released_images(&mut self) -> Vec<ImageHandle> {
        std::mem::take(&mut self.released)
    }

    /// Report the outcome of a processing call.
    pub fn complete_process(
        &mut self,
        id: RequestId,
        result: Result<ProcessedImage, ServiceError>,
    ) -> Result<Completion, EditError> {
        let incoming = result.as_ref().ok().map(|image| image.handle.clone());
        let Some(session) = self.session.as_mut() else {
            tracing::warn!(request = %id, "discarding response with no file loaded");
            self.released.extend(incoming);
            return Ok(Completion::Discarded);
        };

        let base_before = session.base_dimensions;
        let outcome = self
            .coordinator
            .complete_process(id, result, session, &mut self.history);
        let displayed = session.displayed().clone();
        let base_changed = session.base_dimensions != base_before;

        match outcome {
            Ok(Completion::Applied {
                released,
                pushed_history,
            }) => {
                self.released.extend(released.clone());
                self.error = None;
                if base_changed {
                    self.fit_to_container();
                }
                Ok(Completion::Applied {
                    released,
                    pushed_history,
                })
            }
            Ok(Completion::Discarded) => {
                // A superseded image was never shown.
                self.released
                    .extend(incoming.filter(|handle| *handle != displayed));
                Ok(Completion::Discarded)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Report the outcome of a RAW preview call. On failure the editor stays
    /// without a file.
    pub fn complete_raw_preview(
        &mut self,
        id: RequestId,
        result: Result<RawPreview, ServiceError>,
    ) -> Result<Completion, EditError> {
        let pending = self.pending_load.as_ref().filter(|load| load.request == id);
        if pending.is_none() || !self.coordinator.settle_raw_preview(id) {
            tracing::warn!(request = %id, "discarding stale raw preview");
            if let Ok(preview) = result {
                self.released.push(preview.handle);
            }
            return Ok(Completion::Discarded);
        }
        let filename = self
            .pending_load
            .take()
            .map(|load| load.filename)
            .unwrap_or_default();

        let preview = match result {
            Ok(preview) => preview,
            Err(err) => {
                return Err(self.fail(DecodeError::RawPreviewFailed(err.to_string()).into()));
            }
        };
        if !preview.original_dimensions.is_valid() || !preview.preview_dimensions.is_valid() {
            self.released.push(preview.handle);
            let err = DecodeError::RawPreviewFailed("preview reported empty dimensions".to_string());
            return Err(self.fail(err.into()));
        }

        self.start_session(
            &filename,
            preview.original_dimensions,
            preview.preview_dimensions,
            preview.handle,
        );
        Ok(Completion::Applied {
            released: None,
            pushed_history: false,
        })
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn pan_offset(&self) -> Vector {
        self.viewport.pan_offset()
    }

    pub fn ui_crop_region(&self) -> Option<DisplayRect> {
        self.session.as_ref().and_then(|s| s.crop.region())
    }

    pub fn adjustments(&self) -> Option<&AdjustmentValues> {
        self.session.as_ref().map(|s| &s.adjustments)
    }

    pub fn is_cropping(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_cropping())
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.session
            .as_ref()
            .map_or(AspectRatio::Freeform, |s| s.crop.aspect_ratio())
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.coordinator.is_busy()
    }

    /// Last user-visible error, cleared by the next successful operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn session_mut(&mut self) -> Result<&mut EditingSession, EditError> {
        match self.session.as_mut() {
            Some(session) => Ok(session),
            None => {
                let err = ValidationError::NoFileLoaded;
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    fn record<T>(&mut self, result: Result<T, EditError>) -> Result<T, EditError> {
        match result {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: EditError) -> EditError {
        tracing::debug!(error = %err, "operation failed");
        self.error = Some(err.to_string());
        err
    }
}
