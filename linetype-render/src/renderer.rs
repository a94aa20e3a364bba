//! High-level renderer that ties the font registry, layout, and
//! compositor together into a single `render_text()` call.

use linetype_core::{RenderRequest, RenderedImage};
use linetype_layout::{layout_request, LayoutError};
use linetype_text::{FontError, FontRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::buffer::RasterBuffer;
use crate::compositor::Compositor;
use crate::output;

pub const DEFAULT_BITMAP_CACHE_CAPACITY: usize = 256;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Font error: {0}")]
    Font(#[from] FontError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Bitmap glyph decode failed: {0}")]
    BitmapDecode(#[from] image::ImageError),
    #[error("No bitmap image for glyph {glyph_id} in {face}")]
    MissingBitmap { face: String, glyph_id: u16 },
    #[error("Raster buffer of {len} bytes does not match {width}x{height}")]
    BufferSize { width: u32, height: u32, len: usize },
    #[error("Canvas {width}x{height} cannot be allocated")]
    CanvasTooLarge { width: u32, height: u32 },
}

/// Renderer tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    /// Decoded bitmap glyphs kept across renders.
    pub bitmap_cache_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            bitmap_cache_capacity: DEFAULT_BITMAP_CACHE_CAPACITY,
        }
    }
}

/// Statistics returned alongside a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Glyphs drawn, including any ellipsis glyphs.
    pub glyphs: usize,
    pub bitmap_glyphs: usize,
    pub vector_glyphs: usize,
    /// Whether the text was cut to fit the requested width.
    pub truncated: bool,
}

/// Renders single lines of text into RGBA8 images.
///
/// Shares its [`FontRegistry`] with anything else holding the `Arc`; one
/// renderer can serve concurrent calls.
///
/// # Usage
///
/// ```ignore
/// let renderer = TextRenderer::new(Arc::new(FontRegistry::new()));
/// renderer.register_font("fonts/Inter.ttf", "Inter")?;
/// let image = renderer.render_text(&RenderRequest::from_json(json)?)?;
/// ```
pub struct TextRenderer {
    registry: Arc<FontRegistry>,
    compositor: Compositor,
}

impl TextRenderer {
    pub fn new(registry: Arc<FontRegistry>) -> Self {
        Self::with_config(registry, RendererConfig::default())
    }

    pub fn with_config(registry: Arc<FontRegistry>, config: RendererConfig) -> Self {
        Self {
            registry,
            compositor: Compositor::new(config.bitmap_cache_capacity),
        }
    }

    pub fn registry(&self) -> &Arc<FontRegistry> {
        &self.registry
    }

    /// Load a font file and register it under `name`.
    pub fn register_font(&self, path: impl AsRef<Path>, name: &str) -> Result<(), RenderError> {
        self.registry.register_font(path, name)?;
        Ok(())
    }

    /// Render `request` to a top-down RGBA8 image.
    pub fn render_text(&self, request: &RenderRequest) -> Result<RenderedImage, RenderError> {
        self.render_with_stats(request).map(|(image, _)| image)
    }

    /// Like [`render_text`](Self::render_text), also reporting what was drawn.
    pub fn render_with_stats(
        &self,
        request: &RenderRequest,
    ) -> Result<(RenderedImage, RenderStats), RenderError> {
        let started = Instant::now();
        let layout = layout_request(&self.registry, request)?;

        let mut buffer = RasterBuffer::new(
            layout.canvas_width,
            layout.canvas_height,
            request.background_rgba,
        )?;
        let mut stats = RenderStats {
            truncated: layout.truncated,
            ..RenderStats::default()
        };

        for positioned in &layout.glyphs {
            self.compositor.draw_glyph(
                &mut buffer,
                &positioned.glyph,
                request.font_size,
                positioned.x,
                layout.origin_y,
                request.font_color,
            )?;
            stats.glyphs += 1;
            if positioned.glyph.is_bitmap() {
                stats.bitmap_glyphs += 1;
            } else {
                stats.vector_glyphs += 1;
            }
        }

        let image = output::flip_vertical(buffer)?;
        log::debug!(
            "Rendered {} glyphs into {}x{} in {:.2?}",
            stats.glyphs,
            image.width,
            image.height,
            started.elapsed()
        );
        Ok((image, stats))
    }

    /// Number of decoded bitmap glyphs currently cached.
    pub fn cached_bitmaps(&self) -> usize {
        self.compositor.cached_bitmaps()
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(Arc::new(FontRegistry::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linetype_core::Rgba;
    use linetype_text::testing::SyntheticFace;
    use linetype_text::FontHandle;

    fn renderer() -> TextRenderer {
        let registry = Arc::new(FontRegistry::new());
        registry.register_handle(
            "Box",
            FontHandle::single(Arc::new(
                SyntheticFace::new("box", 10)
                    .with_box('A', 10, 0, 10)
                    .with_box(' ', 10, 0, 0),
            )),
        );
        TextRenderer::new(registry)
    }

    fn request(text: &str) -> RenderRequest {
        RenderRequest {
            text: text.into(),
            font_family: vec!["Box".into()],
            font_size: 10.0,
            font_color: Rgba::new(0, 0, 255, 255),
            background_rgba: Rgba::WHITE,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_default() {
        assert_eq!(RendererConfig::default().bitmap_cache_capacity, 256);
    }

    #[test]
    fn test_renderer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TextRenderer>();
    }

    #[test]
    fn test_render_stats() {
        let (image, stats) = renderer().render_with_stats(&request("A A")).unwrap();
        assert_eq!((image.width, image.height), (30, 10));
        assert_eq!(stats.glyphs, 3);
        assert_eq!(stats.vector_glyphs, 3);
        assert_eq!(stats.bitmap_glyphs, 0);
        assert!(!stats.truncated);
    }

    #[test]
    fn test_render_text_fills_glyph() {
        let image = renderer().render_text(&request("A ")).unwrap();
        assert_eq!(image.pixel(5, 5), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel(15, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_register_font_missing_file() {
        let err = renderer()
            .register_font("/definitely/not/here.ttf", "Ghost")
            .unwrap_err();
        assert!(matches!(err, RenderError::Font(FontError::Io { .. })));
    }

    #[test]
    fn test_render_huge_canvas_is_an_error() {
        let req = RenderRequest {
            width: Some(1e9),
            height: Some(1e9),
            ..request("A")
        };
        let err = renderer().render_text(&req).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Layout(LayoutError::CanvasTooLarge { .. })
        ));
    }

    #[test]
    fn test_render_unregistered_family() {
        let req = RenderRequest {
            font_family: vec!["Ghost".into()],
            ..request("A")
        };
        let err = renderer().render_text(&req).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Layout(LayoutError::Font(FontError::NotRegistered(_)))
        ));
    }
}
