//! Intensity stretching applied before colormapping.
//!
//! Degenerate planes (constant, binary, or with no positive values in log
//! mode) are returned unchanged rather than reported as errors.

use cellview_core::{ContrastMode, ImageKind};
use ndarray::{Array2, Array3, ArrayView2, Axis};

/// Linear stretch of a plane to [0, 1].
///
/// Planes with no value strictly between their min and max (binary masks,
/// constant images) pass through, as do empty planes. NaN is ignored when
/// finding the range and stays NaN in the output.
#[must_use]
pub fn auto_contrast(plane: &ArrayView2<f32>) -> Array2<f32> {
    let mut out = plane.to_owned();
    if out.is_empty() {
        return out;
    }
    let (min, max) = out
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let has_interior = out.iter().any(|&v| v > min && v < max);
    if !has_interior {
        return out;
    }
    out.mapv_inplace(|v| v - min);
    let span = max - min;
    if span > 0.0 {
        out.mapv_inplace(|v| v / span);
    }
    out
}

/// Log stretch of the positive range `[min_positive, max_finite]` to [0, 1].
///
/// NaN counts as 0; values outside the range clip to its ends. When the
/// range is empty or degenerate the input plane is returned untouched.
#[must_use]
pub fn log_transform(plane: &ArrayView2<f32>) -> Array2<f32> {
    let cleaned = plane.mapv(|v| if v.is_nan() { 0.0 } else { v });

    let min = cleaned
        .iter()
        .copied()
        .filter(|&v| v > 0.0)
        .fold(f32::INFINITY, f32::min);
    let max = cleaned
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);

    if !(min.is_finite() && max.is_finite() && max > min && max > 0.0) {
        log::debug!("log contrast fallback: positive range [{min}, {max}] is degenerate");
        return plane.to_owned();
    }

    let log_min = min.ln();
    let log_span = max.ln() - log_min;
    cleaned.mapv(|v| (v.clamp(min, max).ln() - log_min) / log_span)
}

fn stretch_plane(plane: &ArrayView2<f32>, mode: ContrastMode) -> Array2<f32> {
    match mode {
        ContrastMode::Raw => plane.to_owned(),
        ContrastMode::Normalized => auto_contrast(plane),
        ContrastMode::Log => log_transform(plane),
    }
}

fn stretch_planes(data: &Array3<f32>, mode: ContrastMode) -> Array3<f32> {
    let mut out = Array3::zeros(data.dim());
    for (src, mut dst) in data.axis_iter(Axis(2)).zip(out.axis_iter_mut(Axis(2))) {
        dst.assign(&stretch_plane(&src, mode));
    }
    out
}

/// Apply the contrast mode to every channel independently.
///
/// The result keeps the input's variant and shape.
#[must_use]
pub fn apply_contrast(image: &ImageKind, mode: ContrastMode) -> ImageKind {
    match image {
        ImageKind::Grayscale(data) => ImageKind::Grayscale(stretch_plane(&data.view(), mode)),
        ImageKind::Rgb(data) => ImageKind::Rgb(stretch_planes(data, mode)),
        ImageKind::MultiChannel(data) => ImageKind::MultiChannel(stretch_planes(data, mode)),
    }
}
