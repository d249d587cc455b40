use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB color as exchanged with the settings surfaces.
///
/// Accepts `rgb(r, g, b)` (whitespace tolerant) or `#rrggbb`, and always renders the
/// compact `rgb(r,g,b)` form the host view expects in inline styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{input}': expected rgb(r, g, b) or #rrggbb")]
pub struct InvalidColor {
    pub input: String,
}

impl Color {
    pub const WEEKEND: Self = Self::rgb(251, 249, 248);
    pub const ALTERNATE_ROW: Self = Self::rgb(245, 254, 255);
    pub const BOUNDARY_MARKER: Self = Self::rgb(214, 45, 32);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, as consumed by color pickers.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// The bare `r, g, b` triple used inside CSS custom properties.
    #[must_use]
    pub fn channels(self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn parse_rgb(body: &str) -> Option<Self> {
        let mut parts = body.split(',').map(|p| p.trim().parse::<u8>().ok());
        let color = Self::rgb(parts.next()??, parts.next()??, parts.next()??);
        parts.next().is_none().then_some(color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
            Self::parse_hex(hex)
        } else {
            trimmed
                .strip_prefix("rgb(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(Self::parse_rgb)
        };
        parsed.ok_or_else(|| InvalidColor { input: s.to_owned() })
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}
