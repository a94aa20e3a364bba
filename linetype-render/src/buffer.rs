//! Raster buffer — the RGBA8 canvas a single render writes into.

use linetype_core::Rgba;

use crate::renderer::RenderError;

/// Row-major RGBA8 pixels, straight alpha, filled with a background color.
///
/// Owned by exactly one render call; glyph draws mutate it in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Allocate a `width × height` buffer filled with `background`.
    ///
    /// Fails with [`RenderError::CanvasTooLarge`] when the byte length does
    /// not fit in `usize`.
    pub fn new(width: u32, height: u32, background: Rgba) -> Result<Self, RenderError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(RenderError::CanvasTooLarge { width, height })?;

        let mut data = vec![0u8; len];
        bytemuck::cast_slice_mut::<u8, [u8; 4]>(&mut data).fill(background.0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixels as `[r, g, b, a]` quads.
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels()
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
