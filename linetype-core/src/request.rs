//! Render request — everything a single `render_text` call needs.
//!
//! The JSON form uses camelCase keys:
//!
//! ```json
//! {
//!   "text": "Hello",
//!   "fontFamily": ["Body", "Emoji"],
//!   "fontSize": 24,
//!   "width": 200,
//!   "ellipsis": "...",
//!   "alignHorizontal": "center",
//!   "alignVertical": "bottom",
//!   "fontColor": "#202020",
//!   "backgroundRGBA": [255, 255, 255, 255]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{CoreError, Rgba};

/// Horizontal placement of the text run inside a fixed-width canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of the text run inside a fixed-height canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Bottom,
    Center,
    Top,
}

/// A single-line text render request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderRequest {
    /// Text to render (one line; no wrapping).
    pub text: String,
    /// Registered font names, tried in order for every codepoint.
    pub font_family: Vec<String>,
    /// Font size in pixels.
    pub font_size: f64,
    /// Fixed canvas width; also the truncation budget when `ellipsis` is set.
    pub width: Option<f64>,
    /// Fixed canvas height.
    pub height: Option<f64>,
    /// Marker appended when the text is truncated to fit `width`.
    pub ellipsis: Option<String>,
    #[serde(alias = "alignHorizonal")]
    pub align_horizontal: HorizontalAlign,
    pub align_vertical: VerticalAlign,
    /// Fill color for vector glyphs.
    pub font_color: Rgba,
    /// Canvas background.
    #[serde(rename = "backgroundRGBA")]
    pub background_rgba: Rgba,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: Vec::new(),
            font_size: 16.0,
            width: None,
            height: None,
            ellipsis: None,
            align_horizontal: HorizontalAlign::Left,
            align_vertical: VerticalAlign::Bottom,
            font_color: Rgba::BLACK,
            background_rgba: Rgba::TRANSPARENT,
        }
    }
}

impl RenderRequest {
    /// Parse a request from its camelCase JSON form.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The ellipsis marker, if one is set and non-empty.
    pub fn effective_ellipsis(&self) -> Option<&str> {
        self.ellipsis.as_deref().filter(|e| !e.is_empty())
    }
}
