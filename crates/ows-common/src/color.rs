//! Colour types used by styles and resource limits.
//!
//! Colours are written in configuration either as hex strings
//! (`"#RRGGBB"` / `"#RRGGBBAA"`) or as byte arrays (`[r, g, b]` / `[r, g, b, a]`).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour as it appears in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorRepr {
    Hex(String),
    Array(Vec<u8>),
}

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as floats, for interpolation.
    pub fn to_f64(self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rgba: Rgba = s.parse()?;
        Ok(Rgb::new(rgba.r, rgba.g, rgba.b))
    }
}

impl TryFrom<ColorRepr> for Rgb {
    type Error = ConfigError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        let rgba = Rgba::try_from(repr)?;
        Ok(Rgb::new(rgba.r, rgba.g, rgba.b))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// An RGBA colour with 8-bit alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}

impl FromStr for Rgba {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ConfigError::InvalidColor(s.to_string());
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Rgba::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<ColorRepr> for Rgba {
    type Error = ConfigError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(s) => s.parse(),
            ColorRepr::Array(arr) => match arr.as_slice() {
                [r, g, b] => Ok(Rgba::new(*r, *g, *b, 255)),
                [r, g, b, a] => Ok(Rgba::new(*r, *g, *b, *a)),
                _ => Err(ConfigError::InvalidColor(format!("{:?}", arr))),
            },
        }
    }
}
