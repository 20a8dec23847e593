//! Wire types exchanged with the processing and RAW preview services.
//!
//! The engine never performs I/O: it queues [`ServiceCall`]s for the host to
//! carry out and is told about the outcome by request id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Dimensions;
use crate::session::{EditParams, ImageHandle, NamedEffect};

/// Monotonically increasing request sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operation the processing service should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    /// Re-render from the original with all parameters.
    ApplyAll,
    /// Like `ApplyAll`, with a new crop.
    Crop,
    Grayscale,
    Sepia,
    Invert,
}

impl From<NamedEffect> for EffectKind {
    fn from(effect: NamedEffect) -> Self {
        match effect {
            NamedEffect::Grayscale => EffectKind::Grayscale,
            NamedEffect::Sepia => EffectKind::Sepia,
            NamedEffect::Invert => EffectKind::Invert,
        }
    }
}

/// One call to `process(imageBytes, effectKind, params)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub id: RequestId,
    pub kind: EffectKind,
    pub params: EditParams,
    pub should_add_to_history: bool,
}

/// One call to `generatePreview(rawBytes)` for the file being loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreviewRequest {
    pub id: RequestId,
    pub filename: String,
}

/// Work queued for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "camelCase")]
pub enum ServiceCall {
    Process(ProcessRequest),
    RawPreview(RawPreviewRequest),
}

impl ServiceCall {
    pub fn id(&self) -> RequestId {
        match self {
            ServiceCall::Process(request) => request.id,
            ServiceCall::RawPreview(request) => request.id,
        }
    }
}

/// Successful processing response, already turned into a displayable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedImage {
    pub handle: ImageHandle,
    pub dimensions: Dimensions,
}

/// Successful RAW preview response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreview {
    pub handle: ImageHandle,
    pub preview_dimensions: Dimensions,
    /// Orientation-corrected size of the full sensor image.
    pub original_dimensions: Dimensions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_kind_from_named() {
        assert_eq!(EffectKind::from(NamedEffect::Grayscale), EffectKind::Grayscale);
        assert_eq!(EffectKind::from(NamedEffect::Invert), EffectKind::Invert);
    }

    #[test]
    fn test_request_ids_order() {
        assert!(RequestId(3) > RequestId(2));
        assert_eq!(RequestId(7).to_string(), "#7");
    }

    #[test]
    fn test_service_call_id() {
        let call = ServiceCall::RawPreview(RawPreviewRequest {
            id: RequestId(4),
            filename: "a.arw".to_string(),
        });
        assert_eq!(call.id(), RequestId(4));
    }
}
