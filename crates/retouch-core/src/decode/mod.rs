//! File probing for the editor.
//!
//! Before a file can be edited the editor needs its true original size.
//! JPEG/PNG headers are read directly; RAW files are detected and left to
//! the RAW preview service, which reports both preview and sensor size.

mod probe;
mod types;

pub use probe::{is_raw_file, is_raw_filename, needs_raw_preview, probe_image, read_orientation};
pub use types::{DecodeError, ImageInfo, Orientation};
