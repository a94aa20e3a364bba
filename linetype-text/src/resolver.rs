//! Glyph resolution — codepoints → glyphs across a font fallback chain.
//!
//! For every codepoint the chain is scanned in order, and within a
//! collection its faces are scanned in declared order; the first face with
//! coverage wins. Metrics are normalized to the requested pixel size:
//!
//! ```text
//! vector:  min_y = bbox.min_y / upem * size
//!          max_y = bbox.max_y / upem * size
//!          width = advance    / upem * size
//! bitmap:  min_y = 0, max_y = size, width = size   (square cell)
//! ```
//!
//! Codepoints that no face covers are dropped without an error or a
//! placeholder glyph and contribute no width.

use std::fmt;
use std::sync::Arc;

use crate::face::{FontFace, GlyphVariant};
use crate::fonts::{FontError, FontHandle, FontRegistry};

const HIGH_SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u16> = 0xDC00..=0xDFFF;

/// A glyph selected for one codepoint, with metrics in pixels.
#[derive(Clone)]
pub struct ResolvedGlyph {
    /// Face the glyph was selected from.
    pub face: Arc<dyn FontFace>,
    pub variant: GlyphVariant,
    pub codepoint: char,
    pub units_per_em: u16,
    pub min_y: f64,
    pub max_y: f64,
    /// Horizontal advance.
    pub width: f64,
}

impl ResolvedGlyph {
    /// Normalize `variant`'s design-unit metrics to `font_size` pixels.
    pub fn new(face: Arc<dyn FontFace>, variant: GlyphVariant, codepoint: char, font_size: f64) -> Self {
        let units_per_em = face.units_per_em();
        let upem = f64::from(units_per_em);
        let scaled = |value: f64| if upem > 0.0 { value / upem * font_size } else { 0.0 };

        let (min_y, max_y, width) = match variant {
            GlyphVariant::Bitmap { .. } => (0.0, font_size, font_size),
            GlyphVariant::Vector {
                min_y,
                max_y,
                advance_width,
                ..
            } => (
                scaled(f64::from(min_y)),
                scaled(f64::from(max_y)),
                scaled(f64::from(advance_width)),
            ),
        };

        Self {
            face,
            variant,
            codepoint,
            units_per_em,
            min_y: min_y.min(max_y),
            max_y: max_y.max(min_y),
            width: width.max(0.0),
        }
    }

    pub fn is_bitmap(&self) -> bool {
        self.variant.is_bitmap()
    }

    pub fn glyph_id(&self) -> u16 {
        self.variant.glyph_id()
    }
}

impl PartialEq for ResolvedGlyph {
    fn eq(&self, other: &Self) -> bool {
        self.face.id() == other.face.id()
            && self.variant == other.variant
            && self.codepoint == other.codepoint
            && self.units_per_em == other.units_per_em
            && self.min_y == other.min_y
            && self.max_y == other.max_y
            && self.width == other.width
    }
}

impl fmt::Debug for ResolvedGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedGlyph")
            .field("face", &self.face.name())
            .field("codepoint", &self.codepoint)
            .field("variant", &self.variant)
            .field("min_y", &self.min_y)
            .field("max_y", &self.max_y)
            .field("width", &self.width)
            .finish()
    }
}

/// Sum of the advances of `glyphs`.
pub fn total_width(glyphs: &[ResolvedGlyph]) -> f64 {
    glyphs.iter().map(|g| g.width).sum()
}

// ── UTF-16 iteration ────────────────────────────────────────────────

/// Iterates UTF-16 code units by logical codepoint.
///
/// Yields `(cursor, codepoint)`. A high surrogate always consumes two
/// units; when it is not followed by a low surrogate the lone surrogate
/// value is yielded (no face covers it) and the next unit is skipped.
#[derive(Clone, Debug)]
pub struct Utf16Codepoints<'a> {
    units: &'a [u16],
    cursor: usize,
}

impl<'a> Utf16Codepoints<'a> {
    pub fn new(units: &'a [u16]) -> Self {
        Self { units, cursor: 0 }
    }
}

impl Iterator for Utf16Codepoints<'_> {
    type Item = (usize, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor;
        let unit = *self.units.get(start)?;

        if HIGH_SURROGATES.contains(&unit) {
            self.cursor += 2;
            let codepoint = match self.units.get(start + 1) {
                Some(&low) if LOW_SURROGATES.contains(&low) => {
                    0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
                }
                _ => u32::from(unit),
            };
            Some((start, codepoint))
        } else {
            self.cursor += 1;
            Some((start, u32::from(unit)))
        }
    }
}

// ── Resolver ────────────────────────────────────────────────────────

/// Resolves text against a fixed fallback chain at a fixed pixel size.
///
/// The chain is looked up once, up front: an unknown name fails with
/// [`FontError::NotRegistered`] even if no codepoint would have reached it.
#[derive(Clone, Debug)]
pub struct GlyphResolver {
    chain: Vec<Arc<FontHandle>>,
    font_size: f64,
}

impl GlyphResolver {
    pub fn new<S: AsRef<str>>(
        registry: &FontRegistry,
        font_family: &[S],
        font_size: f64,
    ) -> Result<Self, FontError> {
        Ok(Self {
            chain: registry.lookup_chain(font_family)?,
            font_size,
        })
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Resolve one codepoint; `None` if no face in the chain covers it.
    pub fn resolve_char(&self, ch: char) -> Option<ResolvedGlyph> {
        self.chain
            .iter()
            .flat_map(|handle| handle.faces())
            .find_map(|face| {
                face.glyph_for(ch)
                    .map(|variant| ResolvedGlyph::new(Arc::clone(face), variant, ch, self.font_size))
            })
    }

    /// Resolve every `char` of `text`, dropping uncovered codepoints.
    pub fn resolve_str(&self, text: &str) -> Vec<ResolvedGlyph> {
        self.resolve_codepoints(text.chars().map(u32::from))
    }

    /// Resolve UTF-16 `units`, combining surrogate pairs.
    pub fn resolve_utf16(&self, units: &[u16]) -> Vec<ResolvedGlyph> {
        self.resolve_codepoints(Utf16Codepoints::new(units).map(|(_, cp)| cp))
    }

    fn resolve_codepoints(&self, codepoints: impl Iterator<Item = u32>) -> Vec<ResolvedGlyph> {
        codepoints
            .filter_map(|cp| {
                let glyph = char::from_u32(cp).and_then(|ch| self.resolve_char(ch));
                if glyph.is_none() {
                    log::trace!("GlyphResolver: no face covers U+{cp:04X}, dropped");
                }
                glyph
            })
            .collect()
    }
}

/// Resolve `text` against `font_family` at `font_size` pixels.
pub fn resolve<S: AsRef<str>>(
    registry: &FontRegistry,
    text: &str,
    font_family: &[S],
    font_size: f64,
) -> Result<Vec<ResolvedGlyph>, FontError> {
    Ok(GlyphResolver::new(registry, font_family, font_size)?.resolve_str(text))
}

/// Resolve UTF-16 `units` against `font_family` at `font_size` pixels.
pub fn resolve_utf16<S: AsRef<str>>(
    registry: &FontRegistry,
    units: &[u16],
    font_family: &[S],
    font_size: f64,
) -> Result<Vec<ResolvedGlyph>, FontError> {
    Ok(GlyphResolver::new(registry, font_family, font_size)?.resolve_utf16(units))
}

// ===================================================================
// Tests
// ===================================================================
