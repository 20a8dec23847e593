//! Retouch Core - editing history and coordinate transform engine
//!
//! This crate holds everything a browser photo editor needs besides the
//! pixels themselves: the zoom/pan viewport, the interactive crop engine,
//! crop composition across previews and earlier crops, the undo/redo history
//! and the coordinator that turns edits into requests for an external
//! processing service.
//!
//! # Architecture
//!
//! The crate is sans-IO and single-threaded. [`Editor`] queues
//! [`ServiceCall`]s for the host to perform and is told about the results by
//! request id. Time is passed in by the host for slider debouncing.
//!
//! # Module Structure
//!
//! - `geometry` - Points, dimensions, space-tagged rectangles, aspect ratios
//! - `viewport` - Zoom-to-cursor and pan
//! - `crop` - Handle hit-testing, drag constraints, crop composition
//! - `history` - Bounded undo/redo stack
//! - `session` - Slider values, edit snapshots, the live session
//! - `coordinator` - Request sequencing, debounce, service outbox
//! - `editor` - The facade that owns one session
//! - `decode` - RAW detection and header probing
//! - `config` / `error` - Tunables and error types

pub mod config;
pub mod coordinator;
pub mod crop;
pub mod decode;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod session;
pub mod viewport;

pub use config::EditorConfig;
pub use coordinator::{
    Completion, EffectKind, ProcessRequest, ProcessedImage, RawPreview, RawPreviewRequest,
    RequestId, ServiceCall,
};
pub use crop::{compose_crop, Handle};
pub use editor::{Editor, LoadStatus};
pub use error::{DecodeError, EditError, ServiceError, ValidationError};
pub use geometry::{AspectRatio, Dimensions, DisplayRect, OriginalRect, Point, Vector};
pub use history::History;
pub use session::{AdjustmentValues, EditParams, EditingSession, ImageHandle, NamedEffect, Slider};
pub use viewport::Viewport;
