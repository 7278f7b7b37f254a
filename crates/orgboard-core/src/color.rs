//! Color values for node styling and drawings.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` string.
    ///
    /// Returns `None` for anything else; `"transparent"` is accepted as a keyword.
    pub fn from_hex(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }

        let hex = color.strip_prefix('#')?;
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(
            SerializableColor::from_hex("#f0a"),
            Some(SerializableColor::new(255, 0, 170, 255))
        );
    }

    #[test]
    fn test_parse_long_hex() {
        let color = SerializableColor::from_hex("#3b82f6").unwrap();
        assert_eq!(color, SerializableColor::new(0x3b, 0x82, 0xf6, 255));
        assert_eq!(color.to_hex(), "#3b82f6");
    }

    #[test]
    fn test_parse_alpha_hex() {
        let color = SerializableColor::from_hex("#00000080").unwrap();
        assert_eq!(color.a, 0x80);
        assert_eq!(color.to_hex(), "#00000080");
    }

    #[test]
    fn test_invalid_hex() {
        assert!(SerializableColor::from_hex("blue").is_none());
        assert!(SerializableColor::from_hex("#12").is_none());
        assert!(SerializableColor::from_hex("#gggggg").is_none());
    }

    #[test]
    fn test_transparent_keyword() {
        assert_eq!(
            SerializableColor::from_hex("transparent"),
            Some(SerializableColor::transparent())
        );
    }

    #[test]
    fn test_peniko_conversion() {
        let original = SerializableColor::new(12, 34, 56, 200);
        let color: Color = original.into();
        assert_eq!(SerializableColor::from(color), original);
    }
}
