//! # linetype-text
//!
//! Font registry and glyph resolution for linetype.
//!
//! ## Architecture
//!
//! ```text
//! FontRegistry (name → FontHandle { faces })
//!     │
//!     ▼
//! GlyphResolver(chain, size) ──► Vec<ResolvedGlyph>
//!                                  │  variant: Vector | Bitmap
//!                                  │  min_y, max_y, width (pixels)
//!                                  ▼
//!                           linetype-layout
//! ```
//!
//! - **`face`** — the `FontFace` trait and its `ttf-parser` implementation.
//! - **`fonts`** — font loading and the named registry.
//! - **`resolver`** — codepoint iteration, fallback and metric scaling.

pub mod face;
pub mod fonts;
pub mod resolver;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports for ergonomic use.
pub use face::{FontFace, FontId, GlyphVariant, OutlineBuilder, TtfFace};
pub use fonts::{FontError, FontHandle, FontRegistry};
pub use resolver::{resolve, resolve_utf16, total_width, GlyphResolver, ResolvedGlyph, Utf16Codepoints};
