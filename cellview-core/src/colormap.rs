//! Colormap definitions and lookup.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Piecewise-linear channel: `(position, value)` pairs, positions ascending
/// from 0.0 to 1.0.
type Segment = &'static [(f32, f32)];

/// Per-channel segments of a linear-segmented gradient.
struct Segments {
    red: Segment,
    green: Segment,
    blue: Segment,
}

const GRAY: Segments = Segments {
    red: &[(0.0, 0.0), (1.0, 1.0)],
    green: &[(0.0, 0.0), (1.0, 1.0)],
    blue: &[(0.0, 0.0), (1.0, 1.0)],
};

const GRAY_REVERSED: Segments = Segments {
    red: &[(0.0, 1.0), (1.0, 0.0)],
    green: &[(0.0, 1.0), (1.0, 0.0)],
    blue: &[(0.0, 1.0), (1.0, 0.0)],
};

const JET: Segments = Segments {
    red: &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
    green: &[
        (0.0, 0.0),
        (0.125, 0.0),
        (0.375, 1.0),
        (0.64, 1.0),
        (0.91, 0.0),
        (1.0, 0.0),
    ],
    blue: &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
};

const HOT: Segments = Segments {
    red: &[(0.0, 0.0416), (0.365_079, 1.0), (1.0, 1.0)],
    green: &[(0.0, 0.0), (0.365_079, 0.0), (0.746_032, 1.0), (1.0, 1.0)],
    blue: &[(0.0, 0.0), (0.746_032, 0.0), (1.0, 1.0)],
};

/// Available colormaps for intensity and label display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Colormap {
    /// Black to white.
    Gray,
    /// White to black.
    #[cfg_attr(feature = "serde", serde(rename = "gray_r"))]
    GrayReversed,
    /// Blue to cyan to yellow to red; the default for labels.
    #[default]
    Jet,
    /// Black to red to yellow to white.
    Hot,
    /// Purple to teal to yellow.
    Viridis,
    /// Black to purple to orange to cream.
    Magma,
}

impl Colormap {
    /// Every colormap, in menu order.
    pub const ALL: [Colormap; 6] = [
        Colormap::Gray,
        Colormap::GrayReversed,
        Colormap::Jet,
        Colormap::Hot,
        Colormap::Viridis,
        Colormap::Magma,
    ];

    /// Canonical lowercase name, accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Gray => "gray",
            Colormap::GrayReversed => "gray_r",
            Colormap::Jet => "jet",
            Colormap::Hot => "hot",
            Colormap::Viridis => "viridis",
            Colormap::Magma => "magma",
        }
    }

    fn segments(self) -> Option<&'static Segments> {
        match self {
            Colormap::Gray => Some(&GRAY),
            Colormap::GrayReversed => Some(&GRAY_REVERSED),
            Colormap::Jet => Some(&JET),
            Colormap::Hot => Some(&HOT),
            Colormap::Viridis | Colormap::Magma => None,
        }
    }

    /// Apply the colormap to a normalized value and return RGB in [0, 1].
    ///
    /// Values outside [0, 1] clamp to the end colors; NaN maps to black.
    #[must_use]
    pub fn map(self, t: f32) -> [f32; 3] {
        if t.is_nan() {
            return [0.0, 0.0, 0.0];
        }
        let t = t.clamp(0.0, 1.0);
        match self.segments() {
            Some(segments) => [
                interpolate(segments.red, t),
                interpolate(segments.green, t),
                interpolate(segments.blue, t),
            ],
            None => {
                let gradient = match self {
                    Colormap::Magma => colorous::MAGMA,
                    _ => colorous::VIRIDIS,
                };
                let c = gradient.eval_continuous(f64::from(t));
                [
                    f32::from(c.r) / 255.0,
                    f32::from(c.g) / 255.0,
                    f32::from(c.b) / 255.0,
                ]
            }
        }
    }
}

fn interpolate(segment: Segment, t: f32) -> f32 {
    let mut prev = segment[0];
    for &(pos, value) in &segment[1..] {
        if t <= pos {
            let span = pos - prev.0;
            if span <= 0.0 {
                return value;
            }
            let frac = (t - prev.0) / span;
            return prev.1 + (value - prev.1) * frac;
        }
        prev = (pos, value);
    }
    prev.1
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "gray" | "grey" | "greys_r" | "binary_r" => Ok(Colormap::Gray),
            "gray_r" | "grey_r" | "greys" => Ok(Colormap::GrayReversed),
            "jet" | "default" => Ok(Colormap::Jet),
            "hot" => Ok(Colormap::Hot),
            "viridis" => Ok(Colormap::Viridis),
            "magma" => Ok(Colormap::Magma),
            _ => Err(Error::UnknownColormap(s.to_string())),
        }
    }
}
