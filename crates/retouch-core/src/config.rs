//! Editor configuration.
//!
//! All tunables of the editing engine live in one serde struct so a host can
//! override any subset (missing fields fall back to the defaults).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tunable constants for one editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last slider change before a preview is requested.
    pub debounce_delay_ms: u64,
    /// Maximum number of history entries kept; oldest are evicted first.
    pub max_history_length: usize,
    /// Minimum side of a committed crop, in true-original pixels.
    pub min_crop_size: u32,
    /// Minimum side of the crop rectangle while dragging, in screen pixels.
    pub min_crop_size_screen: f64,
    /// Handle hit radius in screen pixels.
    pub handle_tolerance_screen: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per unit of wheel delta.
    pub zoom_sensitivity: f64,
    /// Longest edge of the in-browser preview for non-RAW files.
    pub preview_max_edge: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 500,
            max_history_length: 50,
            min_crop_size: 20,
            min_crop_size_screen: 20.0,
            handle_tolerance_screen: 10.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            zoom_sensitivity: 0.001,
            preview_max_edge: 2560,
        }
    }
}

impl EditorConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    /// Reject values the engine cannot operate with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_zoom.is_nan() || self.min_zoom <= 0.0 {
            return Err(ValidationError::InvalidConfig(
                "min_zoom must be positive".to_string(),
            ));
        }
        if self.min_zoom > self.max_zoom {
            return Err(ValidationError::InvalidConfig(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_history_length == 0 {
            return Err(ValidationError::InvalidConfig(
                "max_history_length must be at least 1".to_string(),
            ));
        }
        if self.min_crop_size == 0 {
            return Err(ValidationError::InvalidConfig(
                "min_crop_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
