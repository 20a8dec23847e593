//! Error types for editing operations.
//!
//! Every failure is recoverable: a failed operation leaves the session and
//! history in their last good state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::decode::DecodeError;

/// Input rejected locally before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The composed crop is smaller than the minimum crop size.
    #[error("Crop region {width}x{height} is smaller than the minimum of {min}px")]
    CropTooSmall { width: u32, height: u32, min: u32 },

    /// Dimensions needed for a conversion are not known yet.
    #[error("Image dimensions are not available")]
    MissingDimensions,

    /// A crop operation was requested outside crop mode.
    #[error("Crop mode is not active")]
    NotCropping,

    /// The operation needs a loaded file.
    #[error("No file is loaded")]
    NoFileLoaded,

    #[error("Unknown slider: {0}")]
    UnknownSlider(String),

    #[error("Unknown aspect ratio: {0}")]
    UnknownAspectRatio(String),

    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    /// Configuration values that cannot work together.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure reported by the processing or RAW preview service.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("Service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be interpreted.
    #[error("Malformed service response: {0}")]
    MalformedResponse(String),
}

/// Umbrella error returned by editor operations.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
