//! RGBA colors.
//!
//! Colors deserialize from either a CSS-style hex string (`"#rgb"`,
//! `"#rrggbb"`, `"#rrggbbaa"`) or a four-element channel array
//! (`[r, g, b, a]`), and always serialize back to the array form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// An RGBA8 color, straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "[u8; 4]")]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    pub fn a(&self) -> u8 {
        self.0[3]
    }

    pub fn is_opaque(&self) -> bool {
        self.0[3] == 255
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(channels: [u8; 4]) -> Self {
        Self(channels)
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(color: Rgba) -> Self {
        color.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

impl FromStr for Rgba {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        // Short form: each nibble is doubled (#f80 → #ff8800).
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Self([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
            6 => Ok(Self([byte(0)?, byte(2)?, byte(4)?, 255])),
            8 => Ok(Self([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
            _ => Err(invalid()),
        }
    }
}

/// Wire representation accepted when deserializing a color.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels([u8; 4]),
}

impl TryFrom<ColorRepr> for Rgba {
    type Error = CoreError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(s) => s.parse(),
            ColorRepr::Channels(channels) => Ok(Self(channels)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("#ff8800".parse::<Rgba>().unwrap(), Rgba::new(255, 136, 0, 255));
        assert_eq!("#f80".parse::<Rgba>().unwrap(), Rgba::new(255, 136, 0, 255));
        assert_eq!("#10203040".parse::<Rgba>().unwrap(), Rgba::new(16, 32, 48, 64));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("ff8800".parse::<Rgba>().is_err());
        assert!("#ff88".parse::<Rgba>().is_err());
        assert!("#gg0000".parse::<Rgba>().is_err());
        assert!("#".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let color = Rgba::new(1, 2, 3, 4);
        assert_eq!(color.to_string(), "#01020304");
        assert_eq!(color.to_string().parse::<Rgba>().unwrap(), color);
    }

    #[test]
    fn test_deserialize_both_representations() {
        let from_hex: Rgba = serde_json::from_str("\"#000000\"").unwrap();
        let from_array: Rgba = serde_json::from_str("[0, 0, 0, 255]").unwrap();
        assert_eq!(from_hex, from_array);
        assert!(serde_json::from_str::<Rgba>("\"red\"").is_err());
    }

    #[test]
    fn test_serializes_as_array() {
        let json = serde_json::to_string(&Rgba::new(9, 8, 7, 6)).unwrap();
        assert_eq!(json, "[9,8,7,6]");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Rgba::default(), Rgba::BLACK);
        assert!(Rgba::BLACK.is_opaque());
        assert!(!Rgba::TRANSPARENT.is_opaque());
    }
}
