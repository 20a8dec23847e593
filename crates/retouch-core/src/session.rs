//! Editing session state and history snapshots.
//!
//! One [`EditingSession`] exists per loaded file. Everything it holds that
//! must survive undo/redo is captured in an [`EditParams`] snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crop::CropEngine;
use crate::error::ValidationError;
use crate::geometry::{Dimensions, OriginalRect};

/// The seven tone/color sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentValues {
    /// Brightness multiplier (0 to 2)
    pub brightness: f64,
    /// Exposure in EV (-5 to 5)
    pub exposure: f64,
    /// White balance temperature (-100 to 100)
    pub temperature: f64,
    /// Contrast (-100 to 100)
    pub contrast: f64,
    /// Saturation multiplier (0 to 2)
    pub saturation: f64,
    /// Green-magenta tint (-100 to 100)
    pub tint: f64,
    /// Sharpening amount (0 to 100)
    pub sharpness: f64,
}

impl Default for AdjustmentValues {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            exposure: 0.0,
            temperature: 0.0,
            contrast: 0.0,
            saturation: 1.0,
            tint: 0.0,
            sharpness: 0.0,
        }
    }
}

impl AdjustmentValues {
    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn get(&self, slider: Slider) -> f64 {
        match slider {
            Slider::Brightness => self.brightness,
            Slider::Exposure => self.exposure,
            Slider::Temperature => self.temperature,
            Slider::Contrast => self.contrast,
            Slider::Saturation => self.saturation,
            Slider::Tint => self.tint,
            Slider::Sharpness => self.sharpness,
        }
    }

    /// Set a slider, clamping to its range. NaN resets it to the default.
    pub fn set(&mut self, slider: Slider, value: f64) {
        let value = if value.is_nan() {
            slider.default_value()
        } else {
            let (min, max) = slider.range();
            value.clamp(min, max)
        };
        let field = match slider {
            Slider::Brightness => &mut self.brightness,
            Slider::Exposure => &mut self.exposure,
            Slider::Temperature => &mut self.temperature,
            Slider::Contrast => &mut self.contrast,
            Slider::Saturation => &mut self.saturation,
            Slider::Tint => &mut self.tint,
            Slider::Sharpness => &mut self.sharpness,
        };
        *field = value;
    }
}

/// Slider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slider {
    Brightness,
    Exposure,
    Temperature,
    Contrast,
    Saturation,
    Tint,
    Sharpness,
}

impl Slider {
    pub const ALL: [Slider; 7] = [
        Slider::Brightness,
        Slider::Exposure,
        Slider::Temperature,
        Slider::Contrast,
        Slider::Saturation,
        Slider::Tint,
        Slider::Sharpness,
    ];

    /// Inclusive (min, max).
    pub fn range(self) -> (f64, f64) {
        match self {
            Slider::Brightness | Slider::Saturation => (0.0, 2.0),
            Slider::Exposure => (-5.0, 5.0),
            Slider::Temperature | Slider::Contrast | Slider::Tint => (-100.0, 100.0),
            Slider::Sharpness => (0.0, 100.0),
        }
    }

    pub fn default_value(self) -> f64 {
        AdjustmentValues::default().get(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Slider::Brightness => "brightness",
            Slider::Exposure => "exposure",
            Slider::Temperature => "temperature",
            Slider::Contrast => "contrast",
            Slider::Saturation => "saturation",
            Slider::Tint => "tint",
            Slider::Sharpness => "sharpness",
        }
    }
}

impl FromStr for Slider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slider::ALL
            .into_iter()
            .find(|slider| slider.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSlider(s.to_string()))
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-shot effects without crop semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamedEffect {
    Grayscale,
    Sepia,
    Invert,
}

impl NamedEffect {
    pub const ALL: [NamedEffect; 3] = [NamedEffect::Grayscale, NamedEffect::Sepia, NamedEffect::Invert];

    pub fn as_str(self) -> &'static str {
        match self {
            NamedEffect::Grayscale => "grayscale",
            NamedEffect::Sepia => "sepia",
            NamedEffect::Invert => "invert",
        }
    }
}

impl FromStr for NamedEffect {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedEffect::ALL
            .into_iter()
            .find(|effect| effect.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEffect(s.to_string()))
    }
}

/// Opaque reference to a displayable image owned by the host (e.g. an object
/// URL). The host frees it when the engine hands it back as released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(pub String);

impl ImageHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable snapshot of every user-adjustable parameter: one history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditParams {
    pub adjustments: AdjustmentValues,
    /// Cumulative crop in true-original pixels.
    pub committed_crop: Option<OriginalRect>,
    /// Base image size this entry was computed from.
    pub source_base_dimensions: Dimensions,
    /// The crop this particular step applied, if it was a crop.
    pub applied_crop: Option<OriginalRect>,
    /// Named effects applied so far, in order.
    pub effects: Vec<NamedEffect>,
}

/// Live state of the file being edited.
#[derive(Debug, Clone)]
pub struct EditingSession {
    pub filename: String,
    pub adjustments: AdjustmentValues,
    pub committed_crop: Option<OriginalRect>,
    pub effects: Vec<NamedEffect>,
    /// Size of the image currently displayed.
    pub base_dimensions: Dimensions,
    /// Size of the full-resolution source; fixed for the session.
    pub original_dimensions: Dimensions,
    displayed: ImageHandle,
    /// UI crop region and crop-mode flag.
    pub crop: CropEngine,
}

impl EditingSession {
    pub fn new(
        filename: impl Into<String>,
        original_dimensions: Dimensions,
        base_dimensions: Dimensions,
        displayed: ImageHandle,
    ) -> Self {
        Self {
            filename: filename.into(),
            adjustments: AdjustmentValues::default(),
            committed_crop: None,
            effects: Vec::new(),
            base_dimensions,
            original_dimensions,
            displayed,
            crop: CropEngine::new(),
        }
    }

    pub fn is_cropping(&self) -> bool {
        self.crop.is_active()
    }

    pub fn displayed(&self) -> &ImageHandle {
        &self.displayed
    }

    /// Snapshot the current parameters as a non-crop step.
    pub fn snapshot(&self) -> EditParams {
        EditParams {
            adjustments: self.adjustments,
            committed_crop: self.committed_crop,
            source_base_dimensions: self.base_dimensions,
            applied_crop: None,
            effects: self.effects.clone(),
        }
    }

    /// Take the user-adjustable values of a history entry. The crop and base
    /// image follow once the replayed image arrives.
    pub fn restore(&mut self, params: &EditParams) {
        self.adjustments = params.adjustments;
        self.effects = params.effects.clone();
    }

    /// Show a new processed image. Returns the previous handle when it
    /// differs and can be released.
    pub fn install_image(
        &mut self,
        handle: ImageHandle,
        dimensions: Dimensions,
        committed_crop: Option<OriginalRect>,
    ) -> Option<ImageHandle> {
        self.base_dimensions = dimensions;
        self.committed_crop = committed_crop;
        if handle == self.displayed {
            return None;
        }
        Some(std::mem::replace(&mut self.displayed, handle))
    }

    /// Hand back the displayed handle when the session ends.
    pub fn into_displayed(self) -> ImageHandle {
        self.displayed
    }
}
