//! # linetype-render
//!
//! Rasterizes a laid-out line of glyphs into an RGBA8 image.
//!
//! ## Pipeline
//!
//! ```text
//!  RenderRequest
//!       │ layout_request (linetype-layout)
//!       ▼
//!  LayoutResult ──▸ RasterBuffer(background)
//!                        │ Compositor::draw_glyph, left to right
//!                        ▼
//!                   output::flip_vertical ──▸ RenderedImage
//! ```
//!
//! - **`buffer`** — the background-filled canvas a render owns.
//! - **`compositor`** — bitmap blending and `tiny-skia` outline fill.
//! - **`output`** — vertical flip into the top-down result.
//! - **`renderer`** — [`TextRenderer`], the public entry point.

pub mod buffer;
pub mod compositor;
pub mod output;
pub mod renderer;

pub use buffer::RasterBuffer;
pub use compositor::Compositor;
pub use renderer::{RenderError, RenderStats, RendererConfig, TextRenderer};

pub use linetype_core::{HorizontalAlign, RenderRequest, RenderedImage, Rgba, VerticalAlign};
pub use linetype_text::{FontError, FontRegistry};
