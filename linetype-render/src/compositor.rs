//! Glyph compositor — draws resolved glyphs into a [`RasterBuffer`].
//!
//! Two branches, picked by the glyph's [`GlyphVariant`]:
//!
//! ```text
//!  ResolvedGlyph
//!     ├── Bitmap ──▸ raster_image ──▸ decode/resize (LRU) ──▸ blend_bitmap
//!     └── Vector ──▸ outline ──▸ tiny_skia::Path ──▸ fill_path(translate · scale) ──▸ demultiply
//! ```
//!
//! Both write in "font space": y grows upward from the baseline, so the
//! buffer is upside down until the output stage flips it. The buffer holds
//! straight alpha; outline fills go through a premultiplied scratch pixmap.

use image::imageops::{self, FilterType};
use linetype_core::Rgba;
use linetype_text::{FontId, GlyphVariant, OutlineBuilder, ResolvedGlyph};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use tiny_skia::{ColorU8, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Transform};

use crate::buffer::RasterBuffer;
use crate::renderer::RenderError;

type BitmapKey = (FontId, u16, u32);

/// Draws glyphs; owns the decoded-bitmap cache shared by all renders.
pub struct Compositor {
    bitmaps: Mutex<LruCache<BitmapKey, Arc<Vec<u8>>>>,
}

impl Compositor {
    pub fn new(bitmap_cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(bitmap_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            bitmaps: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Draw one glyph with its origin at (`x`, `y`) in buffer space.
    pub fn draw_glyph(
        &self,
        buffer: &mut RasterBuffer,
        glyph: &ResolvedGlyph,
        font_size: f64,
        x: f64,
        y: f64,
        color: Rgba,
    ) -> Result<(), RenderError> {
        log::trace!(
            "draw {:?} ({}) at ({x}, {y})",
            glyph.codepoint,
            if glyph.is_bitmap() { "bitmap" } else { "vector" }
        );
        match glyph.variant {
            GlyphVariant::Bitmap { glyph_id } => {
                let cell = bitmap_cell_size(font_size);
                let source = self.bitmap(glyph, glyph_id, cell)?;
                blend_bitmap(buffer, &source, cell, js_round(x) as i64, js_round(y) as i64);
                Ok(())
            }
            GlyphVariant::Vector { glyph_id, .. } => {
                fill_outline(buffer, glyph, glyph_id, font_size, x, y, color);
                Ok(())
            }
        }
    }

    /// Number of decoded bitmaps currently cached.
    pub fn cached_bitmaps(&self) -> usize {
        self.bitmaps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `cell × cell` RGBA8 pixels of a bitmap glyph, decoded once per key.
    fn bitmap(&self, glyph: &ResolvedGlyph, glyph_id: u16, cell: u32) -> Result<Arc<Vec<u8>>, RenderError> {
        let key = (glyph.face.id(), glyph_id, cell);
        if let Some(hit) = self
            .bitmaps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let ppem = u16::try_from(cell).unwrap_or(u16::MAX);
        let encoded = glyph
            .face
            .raster_image(glyph_id, ppem)
            .ok_or_else(|| RenderError::MissingBitmap {
                face: glyph.face.name().to_string(),
                glyph_id,
            })?;
        let decoded = decode_bitmap(&encoded, cell)?;

        let pixels = Arc::new(decoded);
        self.bitmaps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, Arc::clone(&pixels));
        Ok(pixels)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(crate::renderer::DEFAULT_BITMAP_CACHE_CAPACITY)
    }
}

// ── Bitmap branch ───────────────────────────────────────────────────

/// Side of the square cell a bitmap glyph is scaled into.
pub fn bitmap_cell_size(font_size: f64) -> u32 {
    let rounded = js_round(font_size);
    if rounded >= 1.0 {
        rounded.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// Decode an encoded glyph image to `cell × cell` RGBA8.
pub fn decode_bitmap(encoded: &[u8], cell: u32) -> Result<Vec<u8>, RenderError> {
    let mut image = image::load_from_memory(encoded)?.to_rgba8();
    if image.dimensions() != (cell, cell) {
        image = imageops::resize(&image, cell, cell, FilterType::Lanczos3);
    }
    Ok(image.into_raw())
}

/// Alpha-blend `source` (`cell × cell` RGBA8) into `buffer` at (`x`, `y`).
///
/// Source pixels are walked from the last to the first, so the cell lands
/// rotated by 180°. Bytes whose destination falls outside the buffer are
/// skipped; a row that overruns the right edge spills into the next row.
pub fn blend_bitmap(buffer: &mut RasterBuffer, source: &[u8], cell: u32, x: i64, y: i64) {
    let stride = i64::from(buffer.width()) * 4;
    let row_bytes = i64::from(cell) * 4;
    let len = source.len().min(cell as usize * cell as usize * 4);
    if row_bytes == 0 || len < 4 {
        return;
    }

    let start = stride * y + x * 4;
    let data = buffer.data_mut();
    for i in (0..len - len % 4).step_by(4) {
        let offset = i as i64;
        let dest = start + offset % row_bytes + (offset / row_bytes) * stride;
        let alpha = f64::from(source[len - i - 1]) / 255.0;

        for channel in 0..4 {
            let Some(index) = usize::try_from(dest + channel as i64)
                .ok()
                .filter(|&index| index < data.len())
            else {
                continue;
            };
            let src = f64::from(source[len - i - 4 + channel]);
            data[index] = (f64::from(data[index]) * (1.0 - alpha) + src * alpha).floor() as u8;
        }
    }
}

// ── Vector branch ───────────────────────────────────────────────────

/// Collects a glyph outline into a `tiny_skia::PathBuilder`.
struct PathSink(PathBuilder);

impl OutlineBuilder for PathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

fn fill_outline(
    buffer: &mut RasterBuffer,
    glyph: &ResolvedGlyph,
    glyph_id: u16,
    font_size: f64,
    x: f64,
    y: f64,
    color: Rgba,
) {
    let mut sink = PathSink(PathBuilder::new());
    if !glyph.face.outline(glyph_id, &mut sink) {
        return;
    }
    let Some(path) = sink.0.finish() else {
        return;
    };
    if glyph.units_per_em == 0 {
        return;
    }

    let (width, height) = (buffer.width(), buffer.height());
    // Zero-area canvas: nothing can be covered.
    let Some(mut layer) = Pixmap::new(width, height) else {
        return;
    };

    // tiny-skia blends premultiplied pixels; the buffer stays straight alpha.
    for (dst, px) in layer.pixels_mut().iter_mut().zip(buffer.pixels()) {
        *dst = premultiplied(*px);
    }

    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
    paint.anti_alias = true;

    let scale = (font_size / f64::from(glyph.units_per_em)) as f32;
    let transform = Transform::from_translate(x as f32, y as f32).pre_scale(scale, scale);
    layer.fill_path(&path, &paint, FillRule::Winding, transform, None);

    // Only pixels the fill changed are converted back.
    for (px, filled) in buffer.pixels_mut().iter_mut().zip(layer.pixels()) {
        if *filled != premultiplied(*px) {
            let straight = filled.demultiply();
            *px = [straight.red(), straight.green(), straight.blue(), straight.alpha()];
        }
    }
}

fn premultiplied([r, g, b, a]: [u8; 4]) -> PremultipliedColorU8 {
    ColorU8::from_rgba(r, g, b, a).premultiply()
}

/// `Math.round`: halves go toward +∞.
fn js_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba as Px, RgbaImage};
    use linetype_text::testing::SyntheticFace;
    use linetype_text::FontFace;
    use std::io::Cursor;

    fn png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn resolved(face: SyntheticFace, ch: char, size: f64) -> ResolvedGlyph {
        let face: Arc<dyn FontFace> = Arc::new(face);
        let variant = face.glyph_for(ch).unwrap();
        ResolvedGlyph::new(face, variant, ch, size)
    }

    #[test]
    fn test_js_round_halves_up() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(-2.6), -3.0);
    }

    #[test]
    fn test_bitmap_cell_size() {
        assert_eq!(bitmap_cell_size(16.0), 16);
        assert_eq!(bitmap_cell_size(15.5), 16);
        assert_eq!(bitmap_cell_size(0.2), 1);
    }

    #[test]
    fn test_blend_bitmap_reverses_source() {
        // 2×2 opaque source: pixel k has red = k + 1.
        let source: Vec<u8> = (0..4u8).flat_map(|k| [k + 1, 0, 0, 255]).collect();
        let mut buffer = RasterBuffer::new(2, 2, Rgba::WHITE).unwrap();
        blend_bitmap(&mut buffer, &source, 2, 0, 0);

        assert_eq!(buffer.pixel(0, 0), Some([4, 0, 0, 255]));
        assert_eq!(buffer.pixel(1, 0), Some([3, 0, 0, 255]));
        assert_eq!(buffer.pixel(0, 1), Some([2, 0, 0, 255]));
        assert_eq!(buffer.pixel(1, 1), Some([1, 0, 0, 255]));
    }

    #[test]
    fn test_blend_bitmap_alpha_formula() {
        let source = [200u8, 100, 50, 128];
        let mut buffer = RasterBuffer::new(1, 1, Rgba::new(10, 20, 30, 255)).unwrap();
        blend_bitmap(&mut buffer, &source, 1, 0, 0);

        let alpha = 128.0 / 255.0;
        let blend = |d: f64, s: f64| (d * (1.0 - alpha) + s * alpha).floor() as u8;
        assert_eq!(
            buffer.pixel(0, 0),
            Some([
                blend(10.0, 200.0),
                blend(20.0, 100.0),
                blend(30.0, 50.0),
                blend(255.0, 128.0),
            ])
        );
    }

    #[test]
    fn test_blend_bitmap_transparent_source_keeps_background() {
        let source = vec![255u8, 255, 255, 0].repeat(4);
        let bg = Rgba::new(9, 8, 7, 6);
        let mut buffer = RasterBuffer::new(2, 2, bg).unwrap();
        blend_bitmap(&mut buffer, &source, 2, 0, 0);
        assert!(buffer.pixels().iter().all(|px| *px == bg.0));
    }

    #[test]
    fn test_blend_bitmap_skips_out_of_bounds() {
        let source = vec![1u8, 2, 3, 255].repeat(9);
        let mut buffer = RasterBuffer::new(2, 2, Rgba::TRANSPARENT).unwrap();
        blend_bitmap(&mut buffer, &source, 3, -1, -1);
        blend_bitmap(&mut buffer, &source, 3, 1, 1);
        assert_eq!(buffer.data().len(), 16);
    }

    #[test]
    fn test_decode_bitmap_resizes_to_cell() {
        let image = RgbaImage::from_pixel(8, 8, Px([0, 0, 255, 255]));
        let pixels = decode_bitmap(&png(&image), 4).unwrap();
        assert_eq!(pixels.len(), 4 * 4 * 4);
    }

    #[test]
    fn test_decode_bitmap_rejects_garbage() {
        let err = decode_bitmap(b"definitely not a png", 4).unwrap_err();
        assert!(matches!(err, RenderError::BitmapDecode(_)));
    }

    #[test]
    fn test_draw_bitmap_glyph_uses_cache() {
        let image = RgbaImage::from_pixel(4, 4, Px([0, 255, 0, 255]));
        let glyph = resolved(
            SyntheticFace::new("emoji", 1000).with_bitmap('★', image),
            '★',
            4.0,
        );
        let compositor = Compositor::new(8);
        let mut buffer = RasterBuffer::new(4, 4, Rgba::WHITE).unwrap();

        compositor
            .draw_glyph(&mut buffer, &glyph, 4.0, 0.0, 0.0, Rgba::BLACK)
            .unwrap();
        compositor
            .draw_glyph(&mut buffer, &glyph, 4.0, 0.0, 0.0, Rgba::BLACK)
            .unwrap();

        assert_eq!(compositor.cached_bitmaps(), 1);
        assert!(buffer.pixels().iter().all(|px| *px == [0, 255, 0, 255]));
    }

    #[test]
    fn test_draw_bitmap_glyph_decode_error() {
        let glyph = resolved(
            SyntheticFace::new("broken", 1000).with_encoded_bitmap('★', b"junk".to_vec()),
            '★',
            4.0,
        );
        let mut buffer = RasterBuffer::new(4, 4, Rgba::WHITE).unwrap();
        let err = Compositor::new(8)
            .draw_glyph(&mut buffer, &glyph, 4.0, 0.0, 0.0, Rgba::BLACK)
            .unwrap_err();
        assert!(matches!(err, RenderError::BitmapDecode(_)));
    }

    #[test]
    fn test_draw_vector_glyph_fills_box() {
        let glyph = resolved(SyntheticFace::new("box", 10).with_box('A', 10, 0, 10), 'A', 10.0);
        let mut buffer = RasterBuffer::new(20, 10, Rgba::WHITE).unwrap();
        Compositor::new(1)
            .draw_glyph(&mut buffer, &glyph, 10.0, 0.0, 0.0, Rgba::new(200, 0, 0, 255))
            .unwrap();

        assert_eq!(buffer.pixel(5, 5), Some([200, 0, 0, 255]));
        assert_eq!(buffer.pixel(15, 5), Some([255, 255, 255, 255]));
    }

    /// Channels within `tolerance` of `expected`.
    fn assert_near(actual: Option<[u8; 4]>, expected: [u8; 4], tolerance: u8) {
        let actual = actual.unwrap();
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.abs_diff(e) <= tolerance, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_vector_edge_pixel_is_straight_alpha() {
        let glyph = resolved(SyntheticFace::new("box", 10).with_box('A', 10, 0, 10), 'A', 10.0);
        let mut buffer = RasterBuffer::new(11, 10, Rgba::TRANSPARENT).unwrap();
        Compositor::new(1)
            .draw_glyph(&mut buffer, &glyph, 10.0, 0.5, 0.0, Rgba::new(200, 30, 40, 255))
            .unwrap();

        // Half covered: ink color at half opacity, not darkened.
        for x in [0, 10] {
            let [r, g, b, a] = buffer.pixel(x, 5).unwrap();
            assert!((120..=136).contains(&a), "alpha {a}");
            assert_near(Some([r, g, b, 255]), [200, 30, 40, 255], 3);
        }
        assert_eq!(buffer.pixel(5, 5), Some([200, 30, 40, 255]));
    }

    #[test]
    fn test_vector_translucent_ink_is_straight_alpha() {
        let glyph = resolved(SyntheticFace::new("box", 10).with_box('A', 10, 0, 10), 'A', 10.0);
        let mut buffer = RasterBuffer::new(10, 10, Rgba::TRANSPARENT).unwrap();
        Compositor::new(1)
            .draw_glyph(&mut buffer, &glyph, 10.0, 0.0, 0.0, Rgba::new(200, 30, 40, 128))
            .unwrap();
        assert_near(buffer.pixel(5, 5), [200, 30, 40, 128], 2);
    }

    #[test]
    fn test_vector_fill_keeps_translucent_background_exact() {
        let glyph = resolved(SyntheticFace::new("box", 10).with_box('A', 5, 0, 10), 'A', 10.0);
        let bg = Rgba::new(12, 34, 56, 78);
        let mut buffer = RasterBuffer::new(10, 10, bg).unwrap();
        Compositor::new(1)
            .draw_glyph(&mut buffer, &glyph, 10.0, 0.0, 0.0, Rgba::BLACK)
            .unwrap();
        assert_eq!(buffer.pixel(2, 5), Some([0, 0, 0, 255]));
        for x in 6..10 {
            assert_eq!(buffer.pixel(x, 5), Some(bg.0));
        }
    }

    #[test]
    fn test_draw_vector_glyph_without_outline_is_noop() {
        let glyph = resolved(SyntheticFace::new("space", 10).with_box(' ', 10, 0, 0), ' ', 10.0);
        let mut buffer = RasterBuffer::new(10, 10, Rgba::WHITE).unwrap();
        Compositor::new(1)
            .draw_glyph(&mut buffer, &glyph, 10.0, 0.0, 0.0, Rgba::BLACK)
            .unwrap();
        assert!(buffer.pixels().iter().all(|px| *px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_vector_glyph_zero_area_canvas() {
        let glyph = resolved(SyntheticFace::new("box", 10).with_box('A', 10, 0, 10), 'A', 10.0);
        let mut buffer = RasterBuffer::new(0, 10, Rgba::WHITE).unwrap();
        Compositor::new(1)
            .draw_glyph(&mut buffer, &glyph, 10.0, 0.0, 0.0, Rgba::BLACK)
            .unwrap();
        assert!(buffer.is_empty());
    }
}
