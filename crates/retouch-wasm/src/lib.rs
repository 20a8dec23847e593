//! Retouch WASM - WebAssembly bindings for Retouch
//!
//! This crate exposes the retouch-core editing engine to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor`, the editing engine for one canvas
//! - `decode` - File probing (RAW detection, dimensions, orientation)
//! - `types` - Conversions between JS values and core types
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, is_raw_file } from '@retouch/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsEditor();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const status = editor.load_file(bytes, file.name, URL.createObjectURL(file));
//! console.log(status.status, is_raw_file(bytes, file.name));
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod types;

// Re-export public types
pub use decode::{is_raw_file, probe_image, JsImageInfo};
pub use editor::JsEditor;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
