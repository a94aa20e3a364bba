//! Font faces — the font-parsing seam of the pipeline.
//!
//! Everything downstream talks to a face through the [`FontFace`] trait:
//! coverage queries, glyph classification (outline vs. embedded bitmap),
//! outline extraction and raster image access. [`TtfFace`] implements it
//! on top of `ttf-parser` for TrueType/OpenType files and collections.

use std::fmt;
use std::sync::Arc;

use ttf_parser::{Face, FaceParsingError, GlyphId, RasterImageFormat};
use uuid::Uuid;

pub use ttf_parser::OutlineBuilder;

/// Unique identity of a loaded face. Stable for the lifetime of the face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontId(Uuid);

impl FontId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FontId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A glyph as selected from a face, in font design units.
///
/// The variant is decided once, when the codepoint is resolved; the
/// compositor branches on it instead of probing the face again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphVariant {
    /// Scalable outline glyph.
    Vector {
        glyph_id: u16,
        min_y: i16,
        max_y: i16,
        advance_width: u16,
    },
    /// Embedded raster glyph (sbix / CBDT), drawn as a square cell.
    Bitmap { glyph_id: u16 },
}

impl GlyphVariant {
    pub fn glyph_id(&self) -> u16 {
        match *self {
            GlyphVariant::Vector { glyph_id, .. } | GlyphVariant::Bitmap { glyph_id } => glyph_id,
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, GlyphVariant::Bitmap { .. })
    }
}

/// A single font face.
///
/// Implementations must be immutable once constructed: the same codepoint
/// always maps to the same [`GlyphVariant`].
pub trait FontFace: Send + Sync + fmt::Debug {
    fn id(&self) -> FontId;

    /// Human-readable name, used in log output.
    fn name(&self) -> &str;

    fn units_per_em(&self) -> u16;

    /// Select the glyph for `ch`, or `None` if the face has no coverage.
    fn glyph_for(&self, ch: char) -> Option<GlyphVariant>;

    fn supports(&self, ch: char) -> bool {
        self.glyph_for(ch).is_some()
    }

    /// Feed the glyph outline, in design units, into `builder`.
    ///
    /// Returns `false` when the glyph has no outline (e.g. a space).
    fn outline(&self, glyph_id: u16, builder: &mut dyn OutlineBuilder) -> bool;

    /// Encoded (PNG) image of a bitmap glyph at the best strike for
    /// `pixels_per_em`.
    fn raster_image(&self, glyph_id: u16, pixels_per_em: u16) -> Option<Vec<u8>>;
}

/// A face parsed from TrueType/OpenType data with `ttf-parser`.
///
/// The font bytes are shared between all faces of a collection. The
/// borrowed `ttf_parser::Face` is re-parsed per query, which only reads
/// the table directory.
pub struct TtfFace {
    id: FontId,
    name: String,
    data: Arc<Vec<u8>>,
    index: u32,
    units_per_em: u16,
}

impl TtfFace {
    /// Parse face `index` of `data`.
    pub fn from_data(data: Arc<Vec<u8>>, index: u32) -> Result<Self, FaceParsingError> {
        let face = Face::parse(&data, index)?;
        let units_per_em = face.units_per_em();
        let name = face_name(&face).unwrap_or_else(|| format!("face #{index}"));

        Ok(Self {
            id: FontId::new(),
            name,
            units_per_em,
            data,
            index,
        })
    }

    /// Index of this face inside its file (0 for single-face files).
    pub fn index(&self) -> u32 {
        self.index
    }

    fn with_face<R>(&self, f: impl FnOnce(&Face<'_>) -> Option<R>) -> Option<R> {
        // Already validated in `from_data`.
        let face = Face::parse(&self.data, self.index).ok()?;
        f(&face)
    }
}

impl fmt::Debug for TtfFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtfFace")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontFace for TtfFace {
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
        self.with_face(|face| {
            let glyph = face.glyph_index(ch).filter(|g| g.0 != 0)?;

            let has_png_strike = face
                .glyph_raster_image(glyph, u16::MAX)
                .is_some_and(|img| img.format == RasterImageFormat::PNG);
            if has_png_strike {
                return Some(GlyphVariant::Bitmap { glyph_id: glyph.0 });
            }

            let (min_y, max_y) = face
                .glyph_bounding_box(glyph)
                .map(|bbox| (bbox.y_min, bbox.y_max))
                .unwrap_or((0, 0));
            Some(GlyphVariant::Vector {
                glyph_id: glyph.0,
                min_y,
                max_y,
                advance_width: face.glyph_hor_advance(glyph).unwrap_or(0),
            })
        })
    }

    fn outline(&self, glyph_id: u16, builder: &mut dyn OutlineBuilder) -> bool {
        self.with_face(|face| face.outline_glyph(GlyphId(glyph_id), builder))
            .is_some()
    }

    fn raster_image(&self, glyph_id: u16, pixels_per_em: u16) -> Option<Vec<u8>> {
        self.with_face(|face| {
            let img = face.glyph_raster_image(GlyphId(glyph_id), pixels_per_em)?;
            (img.format == RasterImageFormat::PNG).then(|| img.data.to_vec())
        })
    }
}

/// Full name, falling back to the family name.
fn face_name(face: &Face<'_>) -> Option<String> {
    use ttf_parser::name_id;

    [name_id::FULL_NAME, name_id::FAMILY]
        .into_iter()
        .find_map(|wanted| {
            face.names()
                .into_iter()
                .filter(|name| name.name_id == wanted)
                .find_map(|name| name.to_string())
        })
}
