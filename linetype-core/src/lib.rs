//! # linetype-core
//!
//! Shared data model for the linetype single-line text renderer.
//!
//! ## Architecture
//!
//! ```text
//!  RenderRequest (JSON / struct literal)
//!       │
//!       ▼
//!  linetype-text    ──► resolved glyphs
//!       │
//!       ▼
//!  linetype-layout  ──► positions, canvas size
//!       │
//!       ▼
//!  linetype-render  ──► RenderedImage { width, height, data }
//! ```
//!
//! - **`color`** — RGBA colors with hex / channel-array parsing.
//! - **`request`** — the render request and its alignment options.

pub mod color;
pub mod request;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use color::Rgba;
pub use request::{HorizontalAlign, RenderRequest, VerticalAlign};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Final output of a render: a row-major RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderedImage {
    /// RGBA value at `(x, y)`, row 0 being the top of the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Iterate over every pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_lookup() {
        let image = RenderedImage {
            width: 2,
            height: 2,
            data: vec![
                1, 2, 3, 4, 5, 6, 7, 8, //
                9, 10, 11, 12, 13, 14, 15, 16,
            ],
        };
        assert_eq!(image.pixel(0, 0), Some([1, 2, 3, 4]));
        assert_eq!(image.pixel(1, 1), Some([13, 14, 15, 16]));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.pixels().count(), 4);
    }

    #[test]
    fn test_core_error_display() {
        let err = CoreError::InvalidColor("#zz".into());
        assert_eq!(err.to_string(), "Invalid color: #zz");
    }
}
