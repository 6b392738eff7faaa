//! Colormap application for single-channel planes.

use cellview_core::{Colormap, ContrastMode, DisplayParameters};
use ndarray::{Array3, ArrayView2};

/// Value bounds mapped onto the ends of a colormap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRange {
    pub vmin: f32,
    pub vmax: f32,
}

impl ColorRange {
    pub const UNIT: ColorRange = ColorRange {
        vmin: 0.0,
        vmax: 1.0,
    };

    #[must_use]
    pub fn new(vmin: f32, vmax: f32) -> Self {
        Self { vmin, vmax }
    }

    /// Position of `value` in the range, clamped to [0, 1].
    ///
    /// A zero-width range maps everything to 0; NaN stays NaN.
    #[must_use]
    pub fn normalize(self, value: f32) -> f32 {
        let span = self.vmax - self.vmin;
        if span <= 0.0 || !span.is_finite() {
            return if value.is_nan() { f32::NAN } else { 0.0 };
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }
}

/// Automatic bounds for a plane.
///
/// Finite min and max, or in log mode the smallest positive value and the
/// largest finite one. `None` when no value qualifies.
#[must_use]
pub fn infer_bounds(data: &ArrayView2<f32>, mode: ContrastMode) -> Option<ColorRange> {
    let max = data
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |m| m.max(v))))?;
    let min = data
        .iter()
        .copied()
        .filter(|&v| v.is_finite() && (mode != ContrastMode::Log || v > 0.0))
        .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |m| m.min(v))))?;
    Some(ColorRange::new(min, max))
}

/// Bounds used to colormap a plane after contrast has been applied.
///
/// Normalized and log contrast already land in [0, 1], so explicit bounds
/// only take effect in raw mode. Missing raw bounds come from the data.
#[must_use]
pub fn resolve_range(params: &DisplayParameters, data: &ArrayView2<f32>) -> ColorRange {
    if params.contrast != ContrastMode::Raw {
        return ColorRange::UNIT;
    }
    let inferred = infer_bounds(data, ContrastMode::Raw).unwrap_or(ColorRange::UNIT);
    ColorRange::new(
        params.vmin.unwrap_or(inferred.vmin),
        params.vmax.unwrap_or(inferred.vmax),
    )
}

/// Map a plane through a colormap, returning `(height, width, 3)` RGB.
///
/// Non-finite values become black.
#[must_use]
pub fn apply_colormap(data: &ArrayView2<f32>, colormap: Colormap, range: ColorRange) -> Array3<f32> {
    let (height, width) = data.dim();
    let mut out = Array3::zeros((height, width, 3));
    for ((y, x), &value) in data.indexed_iter() {
        if !value.is_finite() {
            continue;
        }
        let rgb = colormap.map(range.normalize(value));
        for (c, v) in rgb.into_iter().enumerate() {
            out[[y, x, c]] = v;
        }
    }
    out
}
