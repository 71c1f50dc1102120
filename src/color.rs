//! RGB colours shared by the chart and document layers.

use std::fmt;

/// An opaque 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a colour written the way plotting tools usually accept it.
    ///
    /// Supported forms are the single-letter codes `b g r c m y k w`, a small set of
    /// colour names (`blue`, `orange`, `grey`, ...) and hexadecimal `#RRGGBB`.
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }

        let rgb = match value.as_str() {
            "b" | "blue" => Self::new(0, 0, 255),
            "g" | "green" => Self::new(0, 128, 0),
            "r" | "red" => Self::new(255, 0, 0),
            "c" | "cyan" => Self::new(0, 191, 191),
            "m" | "magenta" => Self::new(191, 0, 191),
            "y" | "yellow" => Self::new(191, 191, 0),
            "k" | "black" => Self::new(0, 0, 0),
            "w" | "white" => Self::new(255, 255, 255),
            "orange" => Self::new(255, 165, 0),
            "purple" => Self::new(128, 0, 128),
            "grey" | "gray" => Self::new(128, 128, 128),
            "navy" => Self::new(0, 0, 128),
            "teal" => Self::new(0, 128, 128),
            _ => return None,
        };
        Some(rgb)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for genpdf::style::Color {
    fn from(rgb: Rgb) -> Self {
        genpdf::style::Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

impl From<Rgb> for plotters::style::RGBColor {
    fn from(rgb: Rgb) -> Self {
        plotters::style::RGBColor(rgb.r, rgb.g, rgb.b)
    }
}

#[cfg(test)]
mod tests {
    use super::Rgb;

    #[test]
    fn parses_single_letter_codes() {
        assert_eq!(Rgb::parse("b"), Some(Rgb::new(0, 0, 255)));
        assert_eq!(Rgb::parse(" K "), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn parses_hex_values() {
        assert_eq!(Rgb::parse("#F7AB34"), Some(Rgb::new(247, 171, 52)));
        assert_eq!(Rgb::parse("#12FG34"), None);
        assert_eq!(Rgb::parse("#123"), None);
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(Rgb::parse("chartreuse-ish"), None);
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Rgb::new(69, 67, 96).to_string(), "#454360");
    }
}
