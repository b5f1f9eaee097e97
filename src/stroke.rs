use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// 8-bit-per-channel color stored in the raster buffer
pub type Color = image::Rgb<u8>;

pub const WHITE: Color = image::Rgb([255, 255, 255]);
pub const BLACK: Color = image::Rgb([0, 0, 0]);

/// Parse a `#RRGGBB` (or `RRGGBB`) hex string into a color
pub fn parse_color(value: &str) -> Result<Color> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(EditorError::InvalidColor(value.to_owned()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| EditorError::InvalidColor(value.to_owned()))
    };

    Ok(image::Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

/// Format a color as `#RRGGBB`
pub fn format_color(color: Color) -> String {
    let [r, g, b] = color.0;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Repeating on/off run lengths, in pixels, for dashed strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashPattern {
    pub draw: u32,
    pub gap: u32,
}

impl Default for DashPattern {
    fn default() -> Self {
        Self { draw: 4, gap: 2 }
    }
}

/// How a line segment is laid down on the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Continuous stroke with round caps
    Solid,
    /// Filled circles of diameter `width`, one every `2 * width` pixels
    Dotted,
    /// Solid runs separated by gaps
    Dashed(DashPattern),
}

/// Color and width used to commit a stroke or shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Color,
    pub width: u32,
}

impl Brush {
    pub fn new(color: Color, width: u32) -> Self {
        Self { color, width }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#FF0000").unwrap(), image::Rgb([255, 0, 0]));
        assert_eq!(parse_color("008080").unwrap(), image::Rgb([0, 128, 128]));
        assert_eq!(parse_color(" #ffffff ").unwrap(), WHITE);
    }

    #[test]
    fn test_parse_color_rejects_garbage() {
        assert!(matches!(parse_color("#FFF"), Err(EditorError::InvalidColor(_))));
        assert!(matches!(parse_color("#GG0000"), Err(EditorError::InvalidColor(_))));
        assert!(parse_color("").is_err());
    }

    #[test]
    fn test_format_color() {
        assert_eq!(format_color(image::Rgb([128, 0, 255])), "#8000FF");
        assert_eq!(parse_color(&format_color(BLACK)).unwrap(), BLACK);
    }
}
