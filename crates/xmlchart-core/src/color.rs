use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An sRGB colour with 8-bit alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);
    pub const DARK_GRAY: Color = Color::rgb(64, 64, 64);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, ignoring alpha. Pair with [`Color::opacity`] when writing SVG paint.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Scales the RGB channels towards black; used for the side faces of 3-D shapes.
    pub fn darker(self, factor: f64) -> Self {
        let k = factor.clamp(0.0, 1.0);
        let scale = |c: u8| ((f64::from(c) * k).round() as u8);
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "{}", self.to_hex())
        } else {
            write!(f, "{}{:02x}", self.to_hex(), self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Resolution failure for a single colour token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour name or hex value: '{0}'")]
pub struct ColorError(pub String);

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s).ok_or_else(|| ColorError(s.to_string()))
    }
}

/// Resolves a colour name or hex value.
///
/// Accepts the SVG/CSS colour keywords (case-insensitive), `#rgb`, `#rrggbb`, `#rrggbbaa`,
/// `rgb(..)`/`rgba(..)` and the `0xRRGGBB` form.
pub fn parse_color(text: &str) -> Option<Color> {
    let s = text.trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }
    let s = match s.strip_prefix("0x") {
        Some(hex) => format!("#{hex}"),
        None => s,
    };
    let c = svgtypes::Color::from_str(&s).ok()?;
    Some(Color::rgba(c.red, c.green, c.blue, c.alpha))
}

/// Splits a delimited list the way a classic string tokenizer does: every character of
/// `delimiters` separates tokens and empty tokens are dropped. Tokens are trimmed.
pub fn tokenize<'a>(list: &'a str, delimiters: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    list.split(move |c: char| delimiters.contains(c))
        .filter(|t| !t.is_empty())
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(parse_color("Red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color(" WHITE "), Some(Color::WHITE));
    }

    #[test]
    fn resolves_hex_forms() {
        assert_eq!(parse_color("#00ff00"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(parse_color("#00F"), Some(Color::rgb(0, 0, 255)));
        assert_eq!(parse_color("0x336699"), Some(Color::rgb(0x33, 0x66, 0x99)));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!(parse_color("notacolour"), None);
        assert_eq!(parse_color(""), None);
        assert!("bogus".parse::<Color>().is_err());
    }

    #[test]
    fn tokenizer_skips_empty_tokens() {
        let tokens: Vec<_> = tokenize("red,,blue, green ", ",").collect();
        assert_eq!(tokens, vec!["red", "blue", "green"]);

        let tokens: Vec<_> = tokenize("A:red;B:blue", ":;").collect();
        assert_eq!(tokens, vec!["A", "red", "B", "blue"]);
    }

    #[test]
    fn display_includes_alpha_only_when_translucent() {
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "#010203");
        assert_eq!(Color::rgba(151, 151, 151, 128).to_string(), "#97979780");
    }
}
