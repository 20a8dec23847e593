//! Named crop aspect ratios.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Dimensions;
use crate::error::ValidationError;

/// Aspect ratio constraint for the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// No constraint.
    #[default]
    #[serde(rename = "freeform")]
    Freeform,
    /// Same ratio as the true original image.
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 7] = [
        AspectRatio::Freeform,
        AspectRatio::Original,
        AspectRatio::Square,
        AspectRatio::Widescreen,
        AspectRatio::Tall,
        AspectRatio::Standard,
        AspectRatio::StandardPortrait,
    ];

    /// Width / height for fixed ratios; `None` for freeform and original,
    /// which need [`AspectRatio::resolve`].
    pub fn value(self) -> Option<f64> {
        match self {
            AspectRatio::Freeform | AspectRatio::Original => None,
            AspectRatio::Square => Some(1.0),
            AspectRatio::Widescreen => Some(16.0 / 9.0),
            AspectRatio::Tall => Some(9.0 / 16.0),
            AspectRatio::Standard => Some(4.0 / 3.0),
            AspectRatio::StandardPortrait => Some(3.0 / 4.0),
        }
    }

    /// Effective width / height, computing "original" from the true original
    /// dimensions (never from a preview or an already-cropped base).
    pub fn resolve(self, original: Dimensions) -> Option<f64> {
        match self {
            AspectRatio::Original if original.is_valid() => Some(original.aspect_ratio()),
            other => other.value(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Freeform => "freeform",
            AspectRatio::Original => "original",
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::StandardPortrait => "3:4",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownAspectRatio(s.to_string()))
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
