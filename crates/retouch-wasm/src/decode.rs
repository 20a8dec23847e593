//! File probing WASM bindings.
//!
//! Lets the host decide up front how a dropped file will be handled.
//!
//! # Example
//!
//! ```typescript
//! import { is_raw_file, probe_image } from '@retouch/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! if (!is_raw_file(bytes, file.name)) {
//!   const info = probe_image(bytes);
//!   console.log(`${info.width}x${info.height}, orientation ${info.orientation}`);
//! }
//! ```

use retouch_core::decode::{self, ImageInfo};
use wasm_bindgen::prelude::*;

/// Whether the file must go through the RAW preview service, judged by
/// its TIFF header or its extension.
#[wasm_bindgen]
pub fn is_raw_file(bytes: &[u8], filename: &str) -> bool {
    decode::needs_raw_preview(bytes, filename)
}

/// Header information for a JPEG/PNG file.
#[wasm_bindgen]
pub struct JsImageInfo {
    info: ImageInfo,
}

#[wasm_bindgen]
impl JsImageInfo {
    /// Orientation-corrected width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.info.oriented_dimensions().width
    }

    /// Orientation-corrected height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.info.oriented_dimensions().height
    }

    /// EXIF orientation value (1-8)
    #[wasm_bindgen(getter)]
    pub fn orientation(&self) -> u8 {
        self.info.orientation as u8
    }
}

/// Read dimensions and EXIF orientation without decoding pixels.
///
/// # Errors
///
/// Returns an error if the format is not recognized or the header is
/// corrupted.
#[wasm_bindgen]
pub fn probe_image(bytes: &[u8]) -> Result<JsImageInfo, JsValue> {
    decode::probe_image(bytes)
        .map(|info| JsImageInfo { info })
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_core::decode::Orientation;
    use retouch_core::Dimensions;

    #[test]
    fn test_is_raw_file_by_header_or_name() {
        assert!(is_raw_file(&[0x49, 0x49, 0x2A, 0x00], "upload"));
        assert!(is_raw_file(&[0xFF, 0xD8, 0xFF, 0xE0], "IMG_0001.DNG"));
        assert!(!is_raw_file(&[0xFF, 0xD8, 0xFF, 0xE0], "IMG_0001.jpg"));
    }

    #[test]
    fn test_image_info_getters_apply_orientation() {
        let info = JsImageInfo {
            info: ImageInfo {
                stored_dimensions: Dimensions::new(600, 400),
                orientation: Orientation::Rotate90CW,
            },
        };
        assert_eq!(info.width(), 400);
        assert_eq!(info.height(), 600);
        assert_eq!(info.orientation(), 6);
    }
}
