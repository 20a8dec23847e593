//! Processing coordinator.
//!
//! Turns session state into requests for the external processing service and
//! applies the responses back onto the session and history.
//!
//! # Sequencing
//!
//! Every request gets a fresh [`RequestId`] from a counter that never resets.
//! Only the most recently issued request is "current"; issuing a new one
//! supersedes the old one without cancelling it on the wire. When a response
//! arrives, it is applied only if it belongs to the current request, so a slow
//! stale response can never overwrite newer state.
//!
//! Because a superseded request is never applied, whatever it carried (a crop,
//! a named effect, the crop state of an undo target) must travel with the
//! request that supersedes it. New requests are therefore built on the
//! in-flight request's parameters rather than on the session alone.

mod debounce;
mod request;

pub use debounce::Debouncer;
pub use request::{
    EffectKind, ProcessRequest, ProcessedImage, RawPreview, RawPreviewRequest, RequestId,
    ServiceCall,
};

use std::time::Duration;

use crate::error::ServiceError;
use crate::geometry::{DisplayRect, OriginalRect};
use crate::history::History;
use crate::session::{AdjustmentValues, EditParams, EditingSession, ImageHandle, NamedEffect, Slider};

/// Why a processing request was issued; decides how its response is applied.
#[derive(Debug, Clone, PartialEq)]
enum Purpose {
    /// Debounced slider settle.
    Preview,
    /// `region` is the selection that was committed.
    Crop { region: Option<DisplayRect> },
    /// Named effect. `replaced` holds the slider values its overrides
    /// replaced, restored if the service fails.
    Effect { replaced: Vec<(Slider, f64)> },
    /// Undo/redo re-render.
    Replay,
}

#[derive(Debug, Clone)]
enum Pending {
    Process {
        request: ProcessRequest,
        purpose: Purpose,
    },
    RawPreview,
}

/// Outcome of feeding a response to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The response was current and has been applied.
    Applied {
        /// Previously displayed image, now safe to free.
        released: Option<ImageHandle>,
        pushed_history: bool,
    },
    /// The response was stale or unknown and was dropped.
    Discarded,
}

/// Request sequencing, debounce timer and outbox for one editor.
#[derive(Debug, Clone)]
pub struct Coordinator {
    next_id: u64,
    current: Option<(RequestId, Pending)>,
    outbox: Vec<ServiceCall>,
    debounce: Debouncer,
    /// History index of the entry whose image is on screen.
    shown_index: usize,
}

impl Coordinator {
    pub fn new(debounce_delay: Duration) -> Self {
        Self {
            next_id: 1,
            current: None,
            outbox: Vec::new(),
            debounce: Debouncer::new(debounce_delay),
            shown_index: 0,
        }
    }

    /// Whether the current request is still waiting for its response.
    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_request(&self) -> Option<RequestId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    /// Drain the calls the host should perform.
    pub fn take_calls(&mut self) -> Vec<ServiceCall> {
        std::mem::take(&mut self.outbox)
    }

    /// Forget everything in flight. Late responses will be discarded.
    ///
    /// The history is expected to be reset alongside, so the displayed entry
    /// goes back to index 0.
    pub fn discard_all(&mut self) {
        if let Some((id, _)) = self.current.take() {
            tracing::debug!(request = %id, "discarding in-flight request");
        }
        self.outbox.clear();
        self.debounce.cancel();
        self.shown_index = 0;
    }

    /// History index of the entry currently displayed.
    pub fn shown_index(&self) -> usize {
        self.shown_index
    }

    // ------------------------------------------------------------------
    // Debounce
    // ------------------------------------------------------------------

    /// (Re)start the slider quiet period.
    pub fn schedule_preview(&mut self, now: Duration) {
        self.debounce.schedule(now);
    }

    pub fn cancel_preview(&mut self) {
        self.debounce.cancel();
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.debounce.deadline()
    }

    /// Consume the debounce timer if it has expired.
    pub fn preview_due(&mut self, now: Duration) -> bool {
        self.debounce.fire_if_due(now)
    }

    // ------------------------------------------------------------------
    // Issuing
    // ------------------------------------------------------------------

    /// Parameters a new request starts from: the session's sliders on top of
    /// the crop and effects the in-flight request will produce, or of the
    /// session when nothing is in flight.
    pub fn working_params(&self, session: &EditingSession) -> EditParams {
        match &self.current {
            Some((_, Pending::Process { request, .. })) => {
                let target = &request.params;
                EditParams {
                    adjustments: session.adjustments,
                    committed_crop: target.committed_crop,
                    source_base_dimensions: target
                        .applied_crop
                        .map_or(target.source_base_dimensions, |crop| crop.dimensions()),
                    applied_crop: None,
                    effects: target.effects.clone(),
                }
            }
            _ => session.snapshot(),
        }
    }

    /// Re-render with the session's current sliders; pushes history on success.
    pub fn request_adjustment_preview(&mut self, session: &EditingSession) -> RequestId {
        let params = self.working_params(session);
        self.issue(EffectKind::ApplyAll, params, true, Purpose::Preview)
    }

    /// Apply `crop` (already in original space, composed against the
    /// displayed base) on top of the current state.
    pub fn request_crop(&mut self, session: &EditingSession, crop: OriginalRect) -> RequestId {
        let mut params = self.working_params(session);
        params.committed_crop = Some(crop);
        params.applied_crop = Some(crop);
        params.source_base_dimensions = session.base_dimensions;
        let region = session.crop.region();
        self.issue(EffectKind::Crop, params, true, Purpose::Crop { region })
    }

    /// Apply a named effect, optionally overriding some sliders. The overrides
    /// show on the sliders straight away; the effect itself joins the session
    /// once the service succeeds. The current crop is kept and sent along.
    pub fn request_named_effect(
        &mut self,
        session: &mut EditingSession,
        effect: NamedEffect,
        overrides: &[(Slider, f64)],
    ) -> RequestId {
        let replaced = overrides
            .iter()
            .map(|&(slider, _)| (slider, session.adjustments.get(slider)))
            .collect();
        apply_overrides(&mut session.adjustments, overrides);
        let mut params = self.working_params(session);
        params.effects.push(effect);
        self.issue(effect.into(), params, true, Purpose::Effect { replaced })
    }

    /// Re-render a history entry after undo/redo without growing the stack.
    pub fn request_replay(&mut self, params: EditParams) -> RequestId {
        self.issue(EffectKind::ApplyAll, params, false, Purpose::Replay)
    }

    /// Ask the RAW preview service for a displayable preview.
    pub fn request_raw_preview(&mut self, filename: &str) -> RequestId {
        let id = self.allocate();
        self.outbox.push(ServiceCall::RawPreview(RawPreviewRequest {
            id,
            filename: filename.to_string(),
        }));
        self.supersede(id, Pending::RawPreview);
        tracing::debug!(request = %id, filename, "requested raw preview");
        id
    }

    fn issue(
        &mut self,
        kind: EffectKind,
        params: EditParams,
        should_add_to_history: bool,
        purpose: Purpose,
    ) -> RequestId {
        let id = self.allocate();
        let request = ProcessRequest {
            id,
            kind,
            params,
            should_add_to_history,
        };
        tracing::debug!(request = %id, ?kind, should_add_to_history, "issuing process request");
        self.outbox.push(ServiceCall::Process(request.clone()));
        self.supersede(id, Pending::Process { request, purpose });
        id
    }

    fn allocate(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        id
    }

    fn supersede(&mut self, id: RequestId, pending: Pending) {
        if let Some((old, _)) = self.current.replace((id, pending)) {
            tracing::debug!(request = %old, superseded_by = %id, "request superseded");
        }
    }

    /// Claim the pending entry for `id` if it is the current request.
    fn settle(&mut self, id: RequestId) -> Option<Pending> {
        let current = self.current_request();
        match current {
            Some(current) if current == id => self.current.take().map(|(_, pending)| pending),
            Some(current) => {
                tracing::warn!(request = %id, current = %current, "discarding stale response");
                None
            }
            None => {
                tracing::warn!(request = %id, "discarding response with no pending request");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------

    /// Whether a RAW preview response for `id` should be used.
    pub fn settle_raw_preview(&mut self, id: RequestId) -> bool {
        match self.settle(id) {
            Some(Pending::RawPreview) => true,
            Some(other) => {
                // Ids are unique, so this only happens if the host mixes up
                // services; keep waiting for the real response.
                self.current = Some((id, other));
                false
            }
            None => false,
        }
    }

    /// Apply a processing response.
    ///
    /// Stale responses yield `Ok(Completion::Discarded)` without touching the
    /// session. A service failure for the current request is returned as the
    /// error. History is left as it was, except that a cursor moved by
    /// undo/redo goes back to the displayed entry and the session follows it.
    pub fn complete_process(
        &mut self,
        id: RequestId,
        result: Result<ProcessedImage, ServiceError>,
        session: &mut EditingSession,
        history: &mut History<EditParams>,
    ) -> Result<Completion, ServiceError> {
        let (request, purpose) = match self.settle(id) {
            Some(Pending::Process { request, purpose }) => (request, purpose),
            Some(other) => {
                self.current = Some((id, other));
                return Ok(Completion::Discarded);
            }
            None => return Ok(Completion::Discarded),
        };

        let image = match result {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(request = %id, error = %err, "processing failed");
                if let Purpose::Effect { replaced } = &purpose {
                    apply_overrides(&mut session.adjustments, replaced);
                }
                if history.current_index() != self.shown_index {
                    if let Some(params) = history.seek(self.shown_index) {
                        session.restore(params);
                    }
                }
                return Err(err);
            }
        };

        let dimensions = match (&purpose, request.params.applied_crop) {
            (Purpose::Crop { .. }, Some(crop)) => {
                if image.dimensions != crop.dimensions() {
                    tracing::warn!(
                        request = %id,
                        expected = %crop.dimensions(),
                        received = %image.dimensions,
                        "cropped image size differs from crop rectangle"
                    );
                }
                crop.dimensions()
            }
            _ => image.dimensions,
        };

        let released = session.install_image(image.handle, dimensions, request.params.committed_crop);
        session.effects = request.params.effects.clone();
        if let Purpose::Crop { region } = purpose {
            settle_crop_mode(session, region);
        }

        let pushed_history = request.should_add_to_history;
        if pushed_history {
            history.push(request.params);
        }
        self.shown_index = history.current_index();
        tracing::debug!(request = %id, base = %dimensions, pushed_history, "applied response");

        Ok(Completion::Applied {
            released,
            pushed_history,
        })
    }
}

fn apply_overrides(adjustments: &mut AdjustmentValues, overrides: &[(Slider, f64)]) {
    for &(slider, value) in overrides {
        adjustments.set(slider, value);
    }
}

/// Leave crop mode after a crop lands. A selection made while the request
/// was in flight was drawn on the old base, so it restarts on the new one.
fn settle_crop_mode(session: &mut EditingSession, committed: Option<DisplayRect>) {
    let region = session.crop.region();
    if region.is_none() || region == committed {
        session.crop.cancel();
        return;
    }
    tracing::debug!("selection changed during crop request; reselecting the new base");
    let (base, original) = (session.base_dimensions, session.original_dimensions);
    session.crop.begin(base, original);
}
