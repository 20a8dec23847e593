//! JavaScript-friendly conversions for the editor bindings.
//!
//! Everything here is plain Rust so it can be unit tested natively; the
//! `JsValue` plumbing lives in the `editor` module.

use std::time::Duration;

use retouch_core::{RequestId, ServiceError};
use serde::Deserialize;

/// Host clock reading (`performance.now()` milliseconds) as a `Duration`.
///
/// Negative or non-finite readings map to zero. Kept at microsecond
/// resolution so deadlines handed back to JS compare exactly.
pub(crate) fn duration_from_ms(ms: f64) -> Duration {
    if !ms.is_finite() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_micros((ms * 1000.0).round() as u64)
}

/// Inverse of [`duration_from_ms`].
pub(crate) fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}

/// Request ids cross the boundary as plain JS numbers.
pub(crate) fn request_id_to_js(id: RequestId) -> f64 {
    id.0 as f64
}

/// Parse a request id coming back from JS.
pub(crate) fn request_id_from_js(value: f64) -> Result<RequestId, String> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(format!("Invalid request id: {value}"));
    }
    Ok(RequestId(value as u64))
}

/// A service outcome as reported by the host:
/// `{ ok: {...} }` or `{ error: { kind: "Network", detail: "..." } }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum ServiceResponse<T> {
    Ok(T),
    Error(ServiceError),
}

impl<T> From<ServiceResponse<T>> for Result<T, ServiceError> {
    fn from(response: ServiceResponse<T>) -> Self {
        match response {
            ServiceResponse::Ok(value) => Ok(value),
            ServiceResponse::Error(err) => Err(err),
        }
    }
}
