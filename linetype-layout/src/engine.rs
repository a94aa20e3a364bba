use linetype_core::{HorizontalAlign, VerticalAlign};
use linetype_text::{total_width, FontError, ResolvedGlyph};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Font error: {0}")]
    Font(#[from] FontError),
    #[error("No renderable glyphs")]
    NoRenderableGlyphs,
    #[error("Invalid font size: {0}")]
    InvalidFontSize(f64),
    #[error("Canvas {width}x{height} is too large")]
    CanvasTooLarge { width: f64, height: f64 },
}

/// Largest canvas, in pixels, a layout may ask for (256 MiB of RGBA8).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 26;

/// Canvas constraints and alignment for a single line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutOptions {
    /// Fixed canvas width and truncation budget. `0` and NaN mean unset.
    pub width: Option<f64>,
    /// Fixed canvas height. `0` and NaN mean unset.
    pub height: Option<f64>,
    pub align_horizontal: HorizontalAlign,
    pub align_vertical: VerticalAlign,
}

/// A glyph placed on the line.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedGlyph {
    pub glyph: ResolvedGlyph,
    /// Left edge of the glyph cell, in canvas pixels.
    pub x: f64,
}

/// Vertical extent of a set of glyphs, in pixels relative to the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalBounds {
    pub min_y: f64,
    pub max_y: f64,
}

impl VerticalBounds {
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Output of [`LayoutEngine::layout`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
    pub glyphs: Vec<PositionedGlyph>,
    pub origin_x: f64,
    /// Baseline y shared by every glyph.
    pub origin_y: f64,
    pub render_width: f64,
    pub render_height: f64,
    pub bounds: VerticalBounds,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Whether the text was cut to make room for the ellipsis.
    pub truncated: bool,
}

/// Single-line layout: truncation, vertical extent, alignment, placement.
///
/// Pure over already-resolved glyphs; see [`crate::layout_request`] for the
/// variant that resolves a [`linetype_core::RenderRequest`] first.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options: LayoutOptions {
                width: dimension(options.width),
                height: dimension(options.height),
                ..options
            },
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out `glyphs`, truncating with `ellipsis` when it is given and the
    /// line overflows the configured width.
    pub fn layout(
        &self,
        glyphs: Vec<ResolvedGlyph>,
        ellipsis: Option<&[ResolvedGlyph]>,
    ) -> Result<LayoutResult, LayoutError> {
        let mut render_glyphs = glyphs;
        let origin_width = total_width(&render_glyphs);
        let mut render_width = origin_width;
        let mut truncated = false;

        if let (Some(ellipsis), Some(max_width)) = (ellipsis, self.options.width) {
            if origin_width > max_width {
                let before = render_glyphs.len();
                render_width = truncate(&mut render_glyphs, ellipsis, max_width);
                truncated = true;
                log::debug!(
                    "LayoutEngine: truncated {} → {} glyphs ({:.2}px → {:.2}px, budget {:.2}px)",
                    before,
                    render_glyphs.len(),
                    origin_width,
                    render_width,
                    max_width,
                );
            }
        }

        let bounds = vertical_bounds(&render_glyphs).ok_or(LayoutError::NoRenderableGlyphs)?;
        let render_height = bounds.height();

        let origin_x = horizontal_origin(
            self.options.width,
            render_width,
            self.options.align_horizontal,
        );
        let origin_y = vertical_origin(
            self.options.height,
            bounds,
            self.options.align_vertical,
        );
        let (canvas_width, canvas_height) = canvas_size(
            self.options.width,
            self.options.height,
            render_width,
            render_height,
        )?;

        let glyphs = place(render_glyphs, origin_x);
        log::debug!(
            "LayoutEngine: {} glyphs, render {:.2}x{:.2}, canvas {}x{}, origin ({:.2}, {:.2})",
            glyphs.len(),
            render_width,
            render_height,
            canvas_width,
            canvas_height,
            origin_x,
            origin_y,
        );

        Ok(LayoutResult {
            glyphs,
            origin_x,
            origin_y,
            render_width,
            render_height,
            bounds,
            canvas_width,
            canvas_height,
            truncated,
        })
    }
}

// ---------------------------------------------------------------
// Layout steps
// ---------------------------------------------------------------

/// Drop trailing glyphs until the rest plus `ellipsis` fits `max_width`,
/// then append `ellipsis`. Returns the new line width.
///
/// Stops once `glyphs` is empty even if the ellipsis alone overflows.
pub fn truncate(glyphs: &mut Vec<ResolvedGlyph>, ellipsis: &[ResolvedGlyph], max_width: f64) -> f64 {
    let ellipsis_width = total_width(ellipsis);
    let mut render_width = total_width(glyphs);

    while render_width + ellipsis_width > max_width {
        match glyphs.pop() {
            Some(dropped) => render_width -= dropped.width,
            None => break,
        }
    }

    glyphs.extend_from_slice(ellipsis);
    render_width + ellipsis_width
}

/// `{min(min_y), max(max_y)}` over `glyphs`; `None` when empty.
pub fn vertical_bounds(glyphs: &[ResolvedGlyph]) -> Option<VerticalBounds> {
    let (first, rest) = glyphs.split_first()?;
    Some(rest.iter().fold(
        VerticalBounds {
            min_y: first.min_y,
            max_y: first.max_y,
        },
        |bounds, glyph| VerticalBounds {
            min_y: bounds.min_y.min(glyph.min_y),
            max_y: bounds.max_y.max(glyph.max_y),
        },
    ))
}

pub fn horizontal_origin(width: Option<f64>, render_width: f64, align: HorizontalAlign) -> f64 {
    let Some(width) = width else {
        return 0.0;
    };
    match align {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => (width - render_width) / 2.0,
        HorizontalAlign::Right => width - render_width,
    }
}

/// Baseline y: the lowest glyph extent sits at 0, then aligned in `height`.
pub fn vertical_origin(height: Option<f64>, bounds: VerticalBounds, align: VerticalAlign) -> f64 {
    let base = -bounds.min_y;
    let Some(height) = height else {
        return base;
    };
    match align {
        VerticalAlign::Bottom => base,
        VerticalAlign::Center => base + (height - bounds.height()) / 2.0,
        VerticalAlign::Top => base + (height - bounds.height()),
    }
}

/// Whole-pixel canvas: the fixed dimensions where given, else the rendered
/// extent, rounded up.
///
/// Fails with [`LayoutError::CanvasTooLarge`] past [`MAX_CANVAS_PIXELS`].
pub fn canvas_size(
    width: Option<f64>,
    height: Option<f64>,
    render_width: f64,
    render_height: f64,
) -> Result<(u32, u32), LayoutError> {
    let width = width.unwrap_or(render_width).ceil().max(0.0);
    let height = height.unwrap_or(render_height).ceil().max(0.0);
    let too_large = LayoutError::CanvasTooLarge { width, height };

    if width > f64::from(u32::MAX) || height > f64::from(u32::MAX) {
        return Err(too_large);
    }
    let (w, h) = (width as u32, height as u32);
    match u64::from(w).checked_mul(u64::from(h)) {
        Some(pixels) if pixels <= MAX_CANVAS_PIXELS => Ok((w, h)),
        _ => Err(too_large),
    }
}

/// `0` and NaN behave as an unset dimension.
fn dimension(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Chain advances left to right starting at `origin_x`.
fn place(glyphs: Vec<ResolvedGlyph>, origin_x: f64) -> Vec<PositionedGlyph> {
    let mut x = origin_x;
    let mut previous_width = None;
    glyphs
        .into_iter()
        .map(|glyph| {
            if let Some(advance) = previous_width {
                x += advance;
            }
            previous_width = Some(glyph.width);
            PositionedGlyph { glyph, x }
        })
        .collect()
}

// ===================================================================
// Tests
// ===================================================================
