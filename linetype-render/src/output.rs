//! Output stage: turn the font-space buffer into the final image.

use image::{imageops, RgbaImage};
use linetype_core::RenderedImage;

use crate::buffer::RasterBuffer;
use crate::renderer::RenderError;

/// Flip `buffer` vertically (baseline-up → top-down rows).
pub fn flip_vertical(buffer: RasterBuffer) -> Result<RenderedImage, RenderError> {
    let (width, height) = (buffer.width(), buffer.height());
    let data = buffer.into_data();
    let len = data.len();

    let mut image = RgbaImage::from_raw(width, height, data).ok_or(RenderError::BufferSize {
        width,
        height,
        len,
    })?;
    imageops::flip_vertical_in_place(&mut image);

    Ok(RenderedImage {
        width,
        height,
        data: image.into_raw(),
    })
}
