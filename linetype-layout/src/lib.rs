//! # linetype-layout
//!
//! Single-line layout for linetype: ellipsis truncation, vertical extent,
//! alignment inside an optional fixed canvas, and advance-width placement.
//!
//! - [`engine`] — the pure `LayoutEngine` over resolved glyphs
//! - [`bridge`] — `RenderRequest` → resolved glyphs → layout

pub mod bridge;
pub mod engine;

pub use bridge::layout_request;
pub use engine::{
    LayoutEngine, LayoutError, LayoutOptions, LayoutResult, PositionedGlyph, VerticalBounds,
    MAX_CANVAS_PIXELS,
};
