//! Outline colors and the named channel palette.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Named display colors, in palette order.
pub const COLOR_NAMES: [&str; 7] = ["Red", "Green", "Blue", "Yellow", "Cyan", "Magenta", "White"];

/// Unit RGB weights matching [`COLOR_NAMES`].
///
/// Channels beyond the third fold onto RGB by cycling through this table.
pub const COLOR_VALS: [[f32; 3]; 7] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// An 8-bit RGB color, as outline colors are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const RED: Rgb8 = Rgb8::new(255, 0, 0);
    pub const GREEN: Rgb8 = Rgb8::new(0, 255, 0);
    pub const BLUE: Rgb8 = Rgb8::new(0, 0, 255);
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color as floats in [0, 1].
    #[must_use]
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Default outline color for the n-th label layer of a figure.
    ///
    /// Primary objects are red, secondary green, tertiary blue; further
    /// layers continue through the palette.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn default_outline(layer_index: usize) -> Self {
        let [r, g, b] = COLOR_VALS[layer_index % COLOR_VALS.len()];
        Self::new((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::RED
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb8 {
    type Err = Error;

    /// Accepts a palette name (case-insensitive) or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                    return Ok(Self::new(r, g, b));
                }
            }
            return Err(Error::UnknownColor(s.to_string()));
        }
        COLOR_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(trimmed))
            .map(Self::default_outline)
            .ok_or_else(|| Error::UnknownColor(s.to_string()))
    }
}
