//! Per-render display parameters.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;
use crate::error::Error;

/// How raw intensities are stretched before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContrastMode {
    /// Show values as given.
    Raw,
    /// Linear stretch of each channel to [0, 1].
    #[default]
    Normalized,
    /// Log stretch of each channel's positive range to [0, 1].
    Log,
}

impl fmt::Display for ContrastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContrastMode::Raw => write!(f, "raw"),
            ContrastMode::Normalized => write!(f, "normalized"),
            ContrastMode::Log => write!(f, "log"),
        }
    }
}

impl FromStr for ContrastMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(ContrastMode::Raw),
            "normalized" | "normalize" => Ok(ContrastMode::Normalized),
            "log" => Ok(ContrastMode::Log),
            other => Err(Error::ConfigError(format!("unknown contrast mode '{other}'"))),
        }
    }
}

/// Resampling used by the display surface. Not applied by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Interpolation {
    #[default]
    Nearest,
    Linear,
    Cubic,
}

/// Display settings for a single render.
///
/// Passed by value on each call; the compositor keeps nothing between calls.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayParameters {
    /// Contrast stretch (default: normalized).
    pub contrast: ContrastMode,
    /// Lower colormap bound for raw grayscale display.
    pub vmin: Option<f32>,
    /// Upper colormap bound for raw grayscale display.
    pub vmax: Option<f32>,
    /// Per-channel weights for color images (default: `[1, 1, 1]`).
    pub channel_mask: Vec<f32>,
    /// Resampling mode for the display surface.
    pub interpolation: Interpolation,
    /// Colormap for single-channel images (default: gray).
    pub colormap: Colormap,
}

impl Default for DisplayParameters {
    fn default() -> Self {
        Self {
            contrast: ContrastMode::Normalized,
            vmin: None,
            vmax: None,
            channel_mask: vec![1.0, 1.0, 1.0],
            interpolation: Interpolation::Nearest,
            colormap: Colormap::Gray,
        }
    }
}

impl DisplayParameters {
    /// Creates parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contrast mode.
    #[must_use]
    pub fn with_contrast(mut self, contrast: ContrastMode) -> Self {
        self.contrast = contrast;
        self
    }

    /// Sets explicit colormap bounds.
    #[must_use]
    pub fn with_range(mut self, vmin: Option<f32>, vmax: Option<f32>) -> Self {
        self.vmin = vmin;
        self.vmax = vmax;
        self
    }

    /// Sets the channel weights.
    #[must_use]
    pub fn with_channel_mask(mut self, mask: Vec<f32>) -> Self {
        self.channel_mask = mask;
        self
    }

    /// Sets the interpolation mode.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the grayscale colormap.
    #[must_use]
    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DisplayParameters::new();
        assert_eq!(params.contrast, ContrastMode::Normalized);
        assert_eq!(params.channel_mask, vec![1.0, 1.0, 1.0]);
        assert_eq!(params.colormap, Colormap::Gray);
        assert!(params.vmin.is_none() && params.vmax.is_none());
    }

    #[test]
    fn test_builder() {
        let params = DisplayParameters::new()
            .with_contrast(ContrastMode::Log)
            .with_range(Some(1.0), None)
            .with_channel_mask(vec![0.0, 1.0])
            .with_interpolation(Interpolation::Cubic)
            .with_colormap(Colormap::Hot);

        assert_eq!(params.contrast, ContrastMode::Log);
        assert_eq!(params.vmin, Some(1.0));
        assert_eq!(params.channel_mask, vec![0.0, 1.0]);
        assert_eq!(params.interpolation, Interpolation::Cubic);
        assert_eq!(params.colormap, Colormap::Hot);
    }

    #[test]
    fn test_contrast_parse() {
        assert_eq!("LOG".parse::<ContrastMode>().unwrap(), ContrastMode::Log);
        assert_eq!(ContrastMode::Raw.to_string(), "raw");
        assert!("gamma".parse::<ContrastMode>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_partial_fields_use_defaults() {
        let params: DisplayParameters =
            serde_json::from_str(r#"{"contrast": "log", "colormap": "gray_r"}"#).unwrap();
        assert_eq!(params.contrast, ContrastMode::Log);
        assert_eq!(params.colormap, Colormap::GrayReversed);
        assert_eq!(params.channel_mask, vec![1.0, 1.0, 1.0]);
    }
}
