//! Binned counts of one measurement, or of a pair as a 2-D density grid.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use std::fmt;
use std::str::FromStr;

use cellview_core::Error;
use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 20;

/// Default number of density bins along each axis.
pub const DEFAULT_GRIDSIZE: usize = 100;

/// Scale of the value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum XScale {
    #[default]
    Linear,
    /// Values are log-transformed; non-positive values drop out.
    Log,
}

impl fmt::Display for XScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XScale::Linear => write!(f, "linear"),
            XScale::Log => write!(f, "log"),
        }
    }
}

impl FromStr for XScale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(XScale::Linear),
            "log" => Ok(XScale::Log),
            other => Err(Error::ConfigError(format!("unknown axis scale '{other}'"))),
        }
    }
}

/// Smallest and largest value, widened to `value ± 0.5` when they are equal.
fn value_range(data: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = data.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
        Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
    })?;
    if lo == hi {
        Some((lo - 0.5, hi + 0.5))
    } else {
        Some((lo, hi))
    }
}

/// `bins + 1` equally spaced edges from `lo` to `hi`, both exact.
///
/// Interpolated rather than stepped so that ranges near `f64::MAX` stay
/// finite.
fn bin_edges(lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    (0..=bins)
        .map(|i| {
            let t = i as f64 / bins as f64;
            lo * (1.0 - t) + hi * t
        })
        .collect()
}

/// Bin of `v` in `[lo, hi]`; the top edge belongs to the last bin.
fn bin_index(v: f64, lo: f64, hi: f64, bins: usize) -> usize {
    let n = bins as f64;
    let step = hi / n - lo / n;
    ((v / step - lo / step) as usize).min(bins - 1)
}

/// Equal-width bins: `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin the finite values. `None` when nothing is left to bin.
    ///
    /// On a log scale values are replaced by their natural log. The last
    /// bin includes its upper edge. When every value is equal the bins span
    /// `value ± 0.5`.
    #[must_use]
    pub fn compute(values: &[f64], bins: usize, scale: XScale) -> Option<Self> {
        let bins = bins.max(1);
        let data: Vec<f64> = values
            .iter()
            .copied()
            .filter_map(|v| match scale {
                XScale::Linear => Some(v),
                XScale::Log => (v > 0.0).then(|| v.ln()),
            })
            .filter(|v| v.is_finite())
            .collect();
        let (lo, hi) = value_range(&data)?;

        let mut counts = vec![0u64; bins];
        for v in data {
            counts[bin_index(v, lo, hi, bins)] += 1;
        }
        Some(Self {
            edges: bin_edges(lo, hi, bins),
            counts,
        })
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Point counts on a `gridsize x gridsize` grid over two measurements.
///
/// A log axis bins the base-10 log of its values, so its edges are in
/// log10 units. `counts` is indexed `[y_bin, x_bin]` with `y_bin` 0 at the
/// lowest y.
#[derive(Debug, Clone, PartialEq)]
pub struct Density {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub x_scale: XScale,
    pub y_scale: XScale,
    pub counts: Array2<u64>,
}

impl Density {
    /// Bin `(x, y)` pairs. Pairs with a non-finite coordinate, or a
    /// non-positive one on a log axis, drop out. `None` when nothing is
    /// left to bin.
    #[must_use]
    pub fn compute(points: &[(f64, f64)], gridsize: usize, x_scale: XScale, y_scale: XScale) -> Option<Self> {
        let bins = gridsize.max(1);
        let transform = |v: f64, scale: XScale| match scale {
            XScale::Linear => Some(v),
            XScale::Log => (v > 0.0).then(|| v.log10()),
        };
        let (xs, ys): (Vec<f64>, Vec<f64>) = points
            .iter()
            .filter_map(|&(x, y)| Some((transform(x, x_scale)?, transform(y, y_scale)?)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .unzip();
        let (x_lo, x_hi) = value_range(&xs)?;
        let (y_lo, y_hi) = value_range(&ys)?;

        let mut counts = Array2::zeros((bins, bins));
        for (&x, &y) in xs.iter().zip(&ys) {
            let column = bin_index(x, x_lo, x_hi, bins);
            let row = bin_index(y, y_lo, y_hi, bins);
            counts[[row, column]] += 1;
        }
        Some(Self {
            x_edges: bin_edges(x_lo, x_hi, bins),
            y_edges: bin_edges(y_lo, y_hi, bins),
            x_scale,
            y_scale,
            counts,
        })
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Counts as an image with the highest y in the top row.
    ///
    /// Empty cells are NaN. With `log_counts` the cells hold `log10(N)`.
    #[must_use]
    pub fn image(&self, log_counts: bool) -> Array2<f32> {
        let mut image = self.counts.mapv(|n| match n {
            0 => f32::NAN,
            n if log_counts => (n as f32).log10(),
            n => n as f32,
        });
        image.invert_axis(ndarray::Axis(0));
        image
    }

    /// Axis limits in data units, `([x_min, x_max], [y_min, y_max])`.
    ///
    /// Linear axes are padded by a twentieth of their span on each side,
    /// log axes by a factor of 1.5.
    #[must_use]
    pub fn view_limits(&self) -> ([f64; 2], [f64; 2]) {
        let limits = |edges: &[f64], scale: XScale| {
            let (lo, hi) = (edges[0], edges[edges.len() - 1]);
            match scale {
                XScale::Linear => {
                    let pad = hi / 20.0 - lo / 20.0;
                    [lo - pad, hi + pad]
                }
                XScale::Log => [10f64.powf(lo) / 1.5, 10f64.powf(hi) * 1.5],
            }
        };
        (
            limits(&self.x_edges, self.x_scale),
            limits(&self.y_edges, self.y_scale),
        )
    }
}

/// Axis title for a measurement on the given scale.
#[must_use]
pub fn axis_label(measurement: &str, scale: XScale) -> String {
    let name = if measurement.is_empty() { "?" } else { measurement };
    match scale {
        XScale::Linear => name.to_string(),
        XScale::Log => format!("Log({name})"),
    }
}
