//! Editor WASM bindings.
//!
//! [`JsEditor`] exposes the editing engine to the browser. The host owns the
//! network and the timers:
//!
//! ```typescript
//! const editor = new JsEditor({ debounce_delay_ms: 300 });
//! editor.load_file(bytes, file.name, URL.createObjectURL(file));
//!
//! async function pump() {
//!   for (const call of editor.take_service_calls()) {
//!     const response = await runService(call); // { ok: {...} } | { error: {...} }
//!     if (call.service === 'process') editor.complete_process(call.id, response);
//!     else editor.complete_raw_preview(call.id, response);
//!   }
//!   for (const url of editor.take_released_images()) URL.revokeObjectURL(url);
//! }
//!
//! slider.oninput = (e) => {
//!   editor.set_slider('exposure', e.target.valueAsNumber, performance.now());
//!   const deadline = editor.next_deadline;
//!   if (deadline !== undefined) {
//!     setTimeout(() => { editor.tick(performance.now()); pump(); }, deadline - performance.now());
//!   }
//! };
//! ```

use std::collections::BTreeMap;

use retouch_core::{
    Completion, Dimensions, EditError, Editor, EditorConfig, ImageHandle, Point,
    ProcessedImage, RawPreview, ServiceError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::{
    duration_from_ms, duration_to_ms, request_id_from_js, request_id_to_js, ServiceResponse,
};

/// The editing engine for one canvas.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor. `config` is an optional object of `EditorConfig`
    /// fields in snake_case; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns error if the config cannot be read or is inconsistent
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            from_js(config, "editor config")?
        };
        let inner = Editor::new(config).map_err(to_js_error)?;
        Ok(JsEditor { inner })
    }

    // ------------------------------------------------------------------
    // File lifecycle
    // ------------------------------------------------------------------

    /// Open a file. `source_url` is a displayable URL for `bytes`.
    ///
    /// Returns `{ status: "ready", originalDimensions, baseDimensions }` or
    /// `{ status: "awaitingRawPreview", request }`.
    pub fn load_file(
        &mut self,
        bytes: &[u8],
        filename: &str,
        source_url: String,
    ) -> Result<JsValue, JsValue> {
        let status = self
            .inner
            .load_file(bytes, filename, ImageHandle::new(source_url))
            .map_err(to_js_error)?;
        to_js(&status)
    }

    pub fn close_file(&mut self) {
        self.inner.close_file();
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Set a slider by name. `now_ms` is the host clock (`performance.now()`).
    pub fn set_slider(&mut self, name: &str, value: f64, now_ms: f64) -> Result<(), JsValue> {
        self.inner
            .set_slider_by_name(name, value, duration_from_ms(now_ms))
            .map_err(to_js_error)
    }

    pub fn reset_adjustments(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.inner
            .reset_adjustments(duration_from_ms(now_ms))
            .map_err(to_js_error)
    }

    /// Fire the debounced preview if due. Returns whether a request was queued.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.inner.tick(duration_from_ms(now_ms)).is_some()
    }

    /// Host clock time at which `tick` should next be called.
    #[wasm_bindgen(getter)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.inner.next_deadline().map(duration_to_ms)
    }

    pub fn toggle_crop_mode(&mut self) -> Result<bool, JsValue> {
        self.inner.toggle_crop_mode().map_err(to_js_error)
    }

    /// `"freeform"`, `"original"`, `"1:1"`, `"16:9"`, `"9:16"`, `"4:3"` or `"3:4"`.
    pub fn set_aspect_ratio(&mut self, option: &str) -> Result<(), JsValue> {
        self.inner
            .set_aspect_ratio_by_name(option)
            .map_err(to_js_error)
    }

    /// Commit the crop selection. Returns the request id.
    pub fn commit_crop(&mut self) -> Result<f64, JsValue> {
        self.inner
            .commit_crop()
            .map(request_id_to_js)
            .map_err(to_js_error)
    }

    /// Apply `"grayscale"`, `"sepia"` or `"invert"`, with optional slider
    /// overrides such as `{ saturation: 0 }`. Returns the request id.
    pub fn apply_named_effect(&mut self, kind: &str, overrides: JsValue) -> Result<f64, JsValue> {
        let overrides: BTreeMap<String, f64> = if overrides.is_undefined() || overrides.is_null() {
            BTreeMap::new()
        } else {
            from_js(overrides, "effect overrides")?
        };
        let overrides: Vec<(String, f64)> = overrides.into_iter().collect();
        self.inner
            .apply_named_effect_by_name(kind, &overrides)
            .map(request_id_to_js)
            .map_err(to_js_error)
    }

    /// Returns the replay request id, or `undefined` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<f64> {
        self.inner.undo().map(request_id_to_js)
    }

    /// Returns the replay request id, or `undefined` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<f64> {
        self.inner.redo().map(request_id_to_js)
    }

    // ------------------------------------------------------------------
    // Pointer and viewport
    // ------------------------------------------------------------------

    /// Returns the grabbed crop handle name (for the cursor), if any.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<String> {
        self.inner
            .pointer_down(Point::new(x, y))
            .map(|handle| handle.as_str().to_string())
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta: f64) {
        self.inner.wheel(Point::new(x, y), delta);
    }

    pub fn resize_container(&mut self, width: u32, height: u32) {
        self.inner.resize_container(Dimensions::new(width, height));
    }

    // ------------------------------------------------------------------
    // Host I/O
    // ------------------------------------------------------------------

    /// Drain queued service calls as an array of
    /// `{ service: "process" | "rawPreview", id, ... }` objects.
    pub fn take_service_calls(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.take_service_calls())
    }

    /// Report a processing result: `{ ok: { handle, dimensions } }` or
    /// `{ error: { kind, detail } }`. Returns whether it was applied. A
    /// response that cannot be read counts as a failed request.
    ///
    /// # Errors
    /// Returns the service error message when the current request failed
    pub fn complete_process(&mut self, id: f64, response: JsValue) -> Result<bool, JsValue> {
        let id = request_id_from_js(id).map_err(|e| JsValue::from_str(&e))?;
        let result = service_result::<ProcessedImage>(response, "process response");
        self.inner
            .complete_process(id, result)
            .map(|completion| completion != Completion::Discarded)
            .map_err(to_js_error)
    }

    /// Report a RAW preview result:
    /// `{ ok: { handle, previewDimensions, originalDimensions } }` or
    /// `{ error: { kind, detail } }`. Returns whether it was applied.
    pub fn complete_raw_preview(&mut self, id: f64, response: JsValue) -> Result<bool, JsValue> {
        let id = request_id_from_js(id).map_err(|e| JsValue::from_str(&e))?;
        let result = service_result::<RawPreview>(response, "raw preview response");
        self.inner
            .complete_raw_preview(id, result)
            .map(|completion| completion != Completion::Discarded)
            .map_err(to_js_error)
    }

    /// Image URLs the host may now revoke.
    pub fn take_released_images(&mut self) -> js_sys::Array {
        self.inner
            .take_released_images()
            .into_iter()
            .map(|handle| JsValue::from_str(handle.as_str()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.zoom()
    }

    /// `{ x, y }`
    #[wasm_bindgen(getter)]
    pub fn pan_offset(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.pan_offset())
    }

    /// `{ left, top, width, height }` in displayed-image pixels, or `undefined`.
    #[wasm_bindgen(getter)]
    pub fn ui_crop_region(&self) -> Result<JsValue, JsValue> {
        match self.inner.ui_crop_region() {
            Some(region) => to_js(&region),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Current slider values, or `undefined` without a file.
    #[wasm_bindgen(getter)]
    pub fn adjustments(&self) -> Result<JsValue, JsValue> {
        match self.inner.adjustments() {
            Some(adjustments) => to_js(adjustments),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn aspect_ratio(&self) -> String {
        self.inner.aspect_ratio().as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    #[wasm_bindgen(getter)]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    #[wasm_bindgen(getter)]
    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    #[wasm_bindgen(getter)]
    pub fn is_cropping(&self) -> bool {
        self.inner.is_cropping()
    }

    /// Last user-visible error message.
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.inner.error().map(str::to_string)
    }

    pub fn clear_error(&mut self) {
        self.inner.clear_error();
    }
}

fn to_js_error(err: EditError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Deserialize host input, reporting malformed values on the console.
fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let message = format!("Invalid {what}: {e}");
        web_sys::console::warn_1(&JsValue::from_str(&message));
        JsValue::from_str(&message)
    })
}

/// Read a service response; an unreadable one becomes a malformed-response
/// failure so the request still settles.
fn service_result<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, ServiceError> {
    let response: ServiceResponse<T> = serde_wasm_bindgen::from_value(value).map_err(|e| {
        let message = format!("Invalid {what}: {e}");
        web_sys::console::warn_1(&JsValue::from_str(&message));
        ServiceError::MalformedResponse(message)
    })?;
    response.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[derive(Serialize)]
    struct TestConfig {
        debounce_delay_ms: u64,
        max_history_length: usize,
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::new(width, height)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn loaded() -> JsEditor {
        let mut editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        editor
            .load_file(&png(400, 200), "photo.png", "blob:source".to_string())
            .unwrap();
        editor
    }

    #[wasm_bindgen_test]
    fn test_new_with_partial_config() {
        let config = serde_wasm_bindgen::to_value(&TestConfig {
            debounce_delay_ms: 250,
            max_history_length: 5,
        })
        .unwrap();
        let editor = JsEditor::new(config).unwrap();
        assert!(!editor.is_loaded());
        assert_eq!(editor.next_deadline(), None);
    }

    #[wasm_bindgen_test]
    fn test_new_rejects_bad_config() {
        let config = serde_wasm_bindgen::to_value(&TestConfig {
            debounce_delay_ms: 250,
            max_history_length: 0,
        })
        .unwrap();
        assert!(JsEditor::new(config).is_err());
    }

    #[wasm_bindgen_test]
    fn test_slider_debounce_round_trip() {
        let mut editor = loaded();
        editor.set_slider("exposure", 1.0, 1000.0).unwrap();
        assert_eq!(editor.next_deadline(), Some(1500.0));
        assert!(!editor.tick(1499.0));
        assert!(editor.tick(1500.0));

        let calls = editor.take_service_calls().unwrap();
        let calls: js_sys::Array = calls.into();
        assert_eq!(calls.length(), 1);
        assert!(editor.is_loading());
    }

    #[wasm_bindgen_test]
    fn test_unknown_slider_is_error() {
        let mut editor = loaded();
        assert!(editor.set_slider("clarity", 1.0, 0.0).is_err());
        assert_eq!(editor.error(), Some("Unknown slider: clarity".to_string()));
    }

    #[wasm_bindgen_test]
    fn test_crop_mode_region() {
        let mut editor = loaded();
        assert!(editor.toggle_crop_mode().unwrap());
        assert!(editor.is_cropping());
        assert!(!editor.ui_crop_region().unwrap().is_undefined());
        editor.set_aspect_ratio("1:1").unwrap();
        assert_eq!(editor.aspect_ratio(), "1:1");
        assert!(editor.set_aspect_ratio("2:1").is_err());
    }

    #[wasm_bindgen_test]
    fn test_complete_process_with_malformed_response() {
        let mut editor = loaded();
        editor.set_slider("tint", 5.0, 0.0).unwrap();
        editor.tick(500.0);
        assert!(editor.is_loading());
        let response = JsValue::from_str("not a response");
        assert!(editor.complete_process(1.0, response).is_err());
        assert!(!editor.is_loading());
        let error = editor.error().unwrap();
        assert!(error.starts_with("Malformed service response: Invalid process response"));
    }

    #[wasm_bindgen_test]
    fn test_unknown_aspect_ratio_sets_error() {
        let mut editor = loaded();
        editor.toggle_crop_mode().unwrap();
        assert!(editor.set_aspect_ratio("5:4").is_err());
        assert_eq!(editor.error(), Some("Unknown aspect ratio: 5:4".to_string()));
    }

    #[wasm_bindgen_test]
    fn test_unknown_effect_sets_error() {
        let mut editor = loaded();
        assert!(editor.apply_named_effect("blur", JsValue::UNDEFINED).is_err());
        assert_eq!(editor.error(), Some("Unknown effect: blur".to_string()));
    }

    #[wasm_bindgen_test]
    fn test_close_releases_source() {
        let mut editor = loaded();
        editor.close_file();
        let released = editor.take_released_images();
        assert_eq!(released.length(), 1);
        assert_eq!(released.get(0).as_string(), Some("blob:source".to_string()));
    }
}
