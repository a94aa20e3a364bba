//! Programmatic font faces for tests and benchmarks.
//!
//! [`SyntheticFace`] maps characters to either a filled rectangle outline
//! (a "box" glyph with given advance and vertical extent) or an embedded
//! PNG bitmap, without needing a font file on disk.

use std::collections::HashMap;
use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::face::{FontFace, FontId, GlyphVariant, OutlineBuilder};

#[derive(Clone, Debug)]
enum SyntheticGlyph {
    Box {
        glyph_id: u16,
        advance: u16,
        min_y: i16,
        max_y: i16,
    },
    Bitmap {
        glyph_id: u16,
        png: Vec<u8>,
    },
}

/// An in-memory face built glyph by glyph.
#[derive(Clone, Debug)]
pub struct SyntheticFace {
    id: FontId,
    name: String,
    units_per_em: u16,
    glyphs: HashMap<char, SyntheticGlyph>,
    next_glyph_id: u16,
}

impl SyntheticFace {
    pub fn new(name: &str, units_per_em: u16) -> Self {
        Self {
            id: FontId::new(),
            name: name.to_string(),
            units_per_em,
            glyphs: HashMap::new(),
            next_glyph_id: 1,
        }
    }

    /// Add an outline glyph: a rectangle spanning `0..advance` by
    /// `min_y..max_y` design units.
    pub fn with_box(mut self, ch: char, advance: u16, min_y: i16, max_y: i16) -> Self {
        let glyph_id = self.allocate_id();
        self.glyphs.insert(
            ch,
            SyntheticGlyph::Box {
                glyph_id,
                advance,
                min_y,
                max_y,
            },
        );
        self
    }

    /// Add a bitmap glyph backed by `image`, stored PNG-encoded.
    pub fn with_bitmap(self, ch: char, image: RgbaImage) -> Self {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("encoding an in-memory PNG cannot fail");
        self.with_encoded_bitmap(ch, png)
    }

    /// Add a bitmap glyph with raw encoded bytes, which need not be valid.
    pub fn with_encoded_bitmap(mut self, ch: char, png: Vec<u8>) -> Self {
        let glyph_id = self.allocate_id();
        self.glyphs.insert(ch, SyntheticGlyph::Bitmap { glyph_id, png });
        self
    }

    fn allocate_id(&mut self) -> u16 {
        let id = self.next_glyph_id;
        self.next_glyph_id += 1;
        id
    }

    fn find(&self, glyph_id: u16) -> Option<&SyntheticGlyph> {
        self.glyphs.values().find(|glyph| match glyph {
            SyntheticGlyph::Box { glyph_id: id, .. } | SyntheticGlyph::Bitmap { glyph_id: id, .. } => {
                *id == glyph_id
            }
        })
    }
}

impl FontFace for SyntheticFace {
    fn id(&self) -> FontId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph_for(&self, ch: char) -> Option<GlyphVariant> {
        Some(match self.glyphs.get(&ch)? {
            SyntheticGlyph::Box {
                glyph_id,
                advance,
                min_y,
                max_y,
            } => GlyphVariant::Vector {
                glyph_id: *glyph_id,
                min_y: *min_y,
                max_y: *max_y,
                advance_width: *advance,
            },
            SyntheticGlyph::Bitmap { glyph_id, .. } => GlyphVariant::Bitmap {
                glyph_id: *glyph_id,
            },
        })
    }

    fn outline(&self, glyph_id: u16, builder: &mut dyn OutlineBuilder) -> bool {
        match self.find(glyph_id) {
            Some(SyntheticGlyph::Box {
                advance,
                min_y,
                max_y,
                ..
            }) if *advance > 0 && min_y < max_y => {
                let (x1, y0, y1) = (f32::from(*advance), f32::from(*min_y), f32::from(*max_y));
                builder.move_to(0.0, y0);
                builder.line_to(x1, y0);
                builder.line_to(x1, y1);
                builder.line_to(0.0, y1);
                builder.close();
                true
            }
            _ => false,
        }
    }

    fn raster_image(&self, glyph_id: u16, _pixels_per_em: u16) -> Option<Vec<u8>> {
        match self.find(glyph_id)? {
            SyntheticGlyph::Bitmap { png, .. } => Some(png.clone()),
            SyntheticGlyph::Box { .. } => None,
        }
    }
}
