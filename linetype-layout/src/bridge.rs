//! Request → Layout Bridge
//!
//! Resolves a [`RenderRequest`]'s text (and ellipsis) against the font
//! registry and feeds the glyphs through the [`LayoutEngine`].
//!
//! # Architecture
//!
//! ```text
//!  RenderRequest ──▸ GlyphResolver(fontFamily, fontSize)
//!                        │            │
//!                      text       ellipsis
//!                        ▼            ▼
//!                      LayoutEngine::layout ──▸ LayoutResult
//! ```

use linetype_core::RenderRequest;
use linetype_text::{FontRegistry, GlyphResolver};

use crate::engine::{LayoutEngine, LayoutError, LayoutOptions, LayoutResult};

impl From<&RenderRequest> for LayoutOptions {
    fn from(request: &RenderRequest) -> Self {
        Self {
            width: request.width,
            height: request.height,
            align_horizontal: request.align_horizontal,
            align_vertical: request.align_vertical,
        }
    }
}

/// Resolve and lay out `request`.
///
/// Fails with [`LayoutError::InvalidFontSize`] for a non-positive or
/// non-finite size, [`LayoutError::Font`] for an unregistered family name,
/// and [`LayoutError::NoRenderableGlyphs`] when nothing is left to draw.
pub fn layout_request(
    registry: &FontRegistry,
    request: &RenderRequest,
) -> Result<LayoutResult, LayoutError> {
    if !(request.font_size.is_finite() && request.font_size > 0.0) {
        return Err(LayoutError::InvalidFontSize(request.font_size));
    }

    let resolver = GlyphResolver::new(registry, &request.font_family, request.font_size)?;
    let glyphs = resolver.resolve_str(&request.text);
    let ellipsis = request
        .effective_ellipsis()
        .map(|marker| resolver.resolve_str(marker));

    LayoutEngine::new(LayoutOptions::from(request)).layout(glyphs, ellipsis.as_deref())
}

// ---------------------------------------------------------------
// Tests
// ---------------------------------------------------------------
