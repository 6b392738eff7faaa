//! Label masks and overlay layers.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Rgb8;
use crate::colormap::Colormap;
use crate::error::{Error, Result};

/// How a label layer is drawn over the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LabelMode {
    /// Object boundaries in the layer's outline color.
    #[default]
    Outline,
    /// Translucent color wash over each object.
    Alpha,
    /// Hidden.
    None,
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelMode::Outline => write!(f, "outline"),
            LabelMode::Alpha => write!(f, "alpha"),
            LabelMode::None => write!(f, "none"),
        }
    }
}

impl FromStr for LabelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outline" | "outlines" => Ok(LabelMode::Outline),
            "alpha" => Ok(LabelMode::Alpha),
            "none" => Ok(LabelMode::None),
            other => Err(Error::ConfigError(format!("unknown label mode '{other}'"))),
        }
    }
}

/// Largest id in a mask, 0 when empty.
#[must_use]
pub fn max_label(mask: &Array2<u32>) -> u32 {
    mask.iter().copied().max().unwrap_or(0)
}

/// A named set of label masks drawn together.
///
/// Masks hold object ids with 0 as background. Several masks in one layer
/// (for example overlapping objects split across planes) share one color
/// range in alpha mode.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayer {
    /// Objects name, for legends and logs.
    pub name: String,
    /// One or more label masks, each the size of the base image.
    pub masks: Vec<Array2<u32>>,
    /// Display mode (default: outline).
    pub mode: LabelMode,
    /// Outline color (default: red).
    pub outline_color: Rgb8,
    /// Outline width in pixels (default: 1).
    pub line_width: f32,
    /// Colormap for alpha mode (default: jet).
    pub colormap: Colormap,
    /// Blend weight of the overlay color in alpha mode (default: 0.25).
    pub alpha: f32,
}

impl LabelLayer {
    /// Creates an outline layer with default styling.
    #[must_use]
    pub fn new(name: impl Into<String>, masks: Vec<Array2<u32>>) -> Self {
        Self {
            name: name.into(),
            masks,
            mode: LabelMode::Outline,
            outline_color: Rgb8::RED,
            line_width: 1.0,
            colormap: Colormap::Jet,
            alpha: 0.25,
        }
    }

    /// Creates a layer with the default outline color for its position
    /// in the figure's layer list.
    #[must_use]
    pub fn for_index(name: impl Into<String>, masks: Vec<Array2<u32>>, index: usize) -> Self {
        Self::new(name, masks).with_outline_color(Rgb8::default_outline(index))
    }

    /// Sets the display mode.
    #[must_use]
    pub fn with_mode(mut self, mode: LabelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the outline color.
    #[must_use]
    pub fn with_outline_color(mut self, color: Rgb8) -> Self {
        self.outline_color = color;
        self
    }

    /// Sets the outline width.
    #[must_use]
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Sets the alpha-mode colormap.
    #[must_use]
    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// Sets the alpha blend value, clamped to [0, 1].
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Sum of every mask's largest id; 0 means nothing to draw.
    #[must_use]
    pub fn total_labels(&self) -> u64 {
        self.masks.iter().map(|m| u64::from(max_label(m))).sum()
    }
}

/// Sparse labeling: one `(i, j, label)` triple per labelled pixel.
///
/// Unlike a dense mask, a pixel may carry several labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ijv {
    pub entries: Vec<(usize, usize, u32)>,
}

impl Ijv {
    #[must_use]
    pub fn new(entries: Vec<(usize, usize, u32)>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn max_label(&self) -> u32 {
        self.entries.iter().map(|&(_, _, v)| v).max().unwrap_or(0)
    }

    /// Shape just large enough to hold every entry; `(1, 1)` when empty.
    #[must_use]
    pub fn inferred_shape(&self) -> (usize, usize) {
        if self.entries.is_empty() {
            return (1, 1);
        }
        let rows = self.entries.iter().map(|&(i, _, _)| i).max().unwrap_or(0) + 1;
        let cols = self.entries.iter().map(|&(_, j, _)| j).max().unwrap_or(0) + 1;
        (rows, cols)
    }

    /// Dense mask; where labels overlap, the last entry wins.
    pub fn to_dense(&self, shape: Option<(usize, usize)>) -> Result<Array2<u32>> {
        let shape = shape.unwrap_or_else(|| self.inferred_shape());
        let mut mask = Array2::zeros(shape);
        for &(i, j, v) in &self.entries {
            let cell = mask.get_mut((i, j)).ok_or(Error::ShapeMismatch {
                expected: shape,
                actual: (i + 1, j + 1),
            })?;
            *cell = v;
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_layer_defaults() {
        let layer = LabelLayer::new("Nuclei", vec![]);
        assert_eq!(layer.mode, LabelMode::Outline);
        assert_eq!(layer.outline_color, Rgb8::RED);
        assert!((layer.line_width - 1.0).abs() < f32::EPSILON);
        assert!((layer.alpha - 0.25).abs() < f32::EPSILON);
        assert_eq!(layer.colormap, Colormap::Jet);
    }

    #[test]
    fn test_for_index_picks_palette_color() {
        let layer = LabelLayer::for_index("Cells", vec![], 1);
        assert_eq!(layer.outline_color, Rgb8::GREEN);
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert!((LabelLayer::new("a", vec![]).with_alpha(3.0).alpha - 1.0).abs() < f32::EPSILON);
        assert!(LabelLayer::new("a", vec![]).with_alpha(-1.0).alpha.abs() < f32::EPSILON);
    }

    #[test]
    fn test_total_labels_sums_maxima() {
        let layer = LabelLayer::new(
            "Cells",
            vec![array![[0, 3], [1, 0]], array![[0, 0], [0, 0]], array![[5, 0], [0, 0]]],
        );
        assert_eq!(layer.total_labels(), 8);
    }

    #[test]
    fn test_ijv_to_dense() {
        let ijv = Ijv::new(vec![(0, 0, 1), (2, 1, 4)]);
        assert_eq!(ijv.inferred_shape(), (3, 2));
        let dense = ijv.to_dense(None).unwrap();
        assert_eq!(dense, array![[1, 0], [0, 0], [0, 4]]);
        assert!(ijv.to_dense(Some((2, 2))).is_err());
        assert_eq!(Ijv::default().inferred_shape(), (1, 1));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("outlines".parse::<LabelMode>().unwrap(), LabelMode::Outline);
        assert_eq!("ALPHA".parse::<LabelMode>().unwrap(), LabelMode::Alpha);
        assert!("fill".parse::<LabelMode>().is_err());
    }
}
