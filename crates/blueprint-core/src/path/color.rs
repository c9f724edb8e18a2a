//! Serializable stroke color with name/hex text encoding.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("Empty color string")]
    Empty,
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Unknown color name: {0}")]
    UnknownName(String),
}

/// Known color names, matched case-insensitively on input.
/// Values are unique so that writing by name round-trips.
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("Transparent", [255, 255, 255, 0]),
    ("Black", [0, 0, 0, 255]),
    ("White", [255, 255, 255, 255]),
    ("Red", [255, 0, 0, 255]),
    ("Green", [0, 128, 0, 255]),
    ("Lime", [0, 255, 0, 255]),
    ("Blue", [0, 0, 255, 255]),
    ("Yellow", [255, 255, 0, 255]),
    ("Cyan", [0, 255, 255, 255]),
    ("Magenta", [255, 0, 255, 255]),
    ("Orange", [255, 165, 0, 255]),
    ("Purple", [128, 0, 128, 255]),
    ("Navy", [0, 0, 128, 255]),
    ("Maroon", [128, 0, 0, 255]),
    ("Olive", [128, 128, 0, 255]),
    ("Teal", [0, 128, 128, 255]),
    ("Silver", [192, 192, 192, 255]),
    ("Gray", [128, 128, 128, 255]),
    ("DimGray", [105, 105, 105, 255]),
    ("DarkGray", [169, 169, 169, 255]),
    ("LightGray", [211, 211, 211, 255]),
    ("CornflowerBlue", [100, 149, 237, 255]),
    ("SteelBlue", [70, 130, 180, 255]),
];

/// Serializable color representation (RGBA8).
///
/// Serialized as a color name when one matches exactly, `#RRGGBB` when opaque,
/// otherwise `#AARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
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

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Look up a known color by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, [r, g, b, a])| Self::new(*r, *g, *b, *a))
    }

    /// The known name of this color, if it has one.
    pub fn name(&self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, rgba)| *rgba == [self.r, self.g, self.b, self.a])
            .map(|(name, _)| *name)
    }

    /// Hex representation: `#RRGGBB` when opaque, `#AARRGGBB` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }

    fn parse_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidHex(format!("#{hex}"));
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        match hex.len() {
            // Short forms carry no alpha and are treated as opaque.
            1..=6 => Ok(Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8, 255)),
            7 | 8 => Ok(Self::new(
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
                (value >> 24) as u8,
            )),
            _ => Err(invalid()),
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.to_hex()),
        }
    }
}

impl FromStr for SerializableColor {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ColorParseError::Empty);
        }
        match value.strip_prefix('#') {
            Some(hex) => Self::parse_hex(hex),
            None => Self::from_name(value).ok_or_else(|| ColorParseError::UnknownName(value.to_string())),
        }
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
