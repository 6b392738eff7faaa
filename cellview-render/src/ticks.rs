//! Colorbar tick positions and labels.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use cellview_core::{ContrastMode, DisplayParameters, ImageKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colorize::infer_bounds;

/// Number of ticks on a colorbar.
pub const TICK_COUNT: usize = 10;

/// A tick at a normalized position along the colorbar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tick {
    /// Position in [0, 1].
    pub position: f32,
    pub label: String,
}

/// Evenly spaced positions with labels in data units.
///
/// Linear and normalized displays label linearly between the bounds; log
/// displays label geometrically. Color images have no colorbar and get no
/// ticks; so does a log display whose bounds are not both positive.
#[must_use]
pub fn colorbar_ticks(image: &ImageKind, params: &DisplayParameters) -> Vec<Tick> {
    let ImageKind::Grayscale(plane) = image else {
        return Vec::new();
    };
    let Some(bounds) = infer_bounds(&plane.view(), params.contrast) else {
        return Vec::new();
    };
    let vmin = f64::from(params.vmin.unwrap_or(bounds.vmin));
    let vmax = f64::from(params.vmax.unwrap_or(bounds.vmax));
    ticks_between(vmin, vmax, params.contrast == ContrastMode::Log)
}

/// Ticks labelling `[vmin, vmax]`, geometric when `log` is set.
#[must_use]
pub fn ticks_between(vmin: f64, vmax: f64, log: bool) -> Vec<Tick> {
    if log && !(vmin > 0.0 && vmax > 0.0) {
        return Vec::new();
    }
    (0..TICK_COUNT)
        .map(|i| {
            let t = i as f64 / (TICK_COUNT - 1) as f64;
            let value = if log {
                vmin * (vmax / vmin).powf(t)
            } else {
                vmin + (vmax - vmin) * t
            };
            Tick {
                position: t as f32,
                label: format!("{value:.1}"),
            }
        })
        .collect()
}
