//! Label images drawn in false color.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use cellview_core::{max_label, Colormap, Ijv, Result};
use ndarray::{Array2, Array3, Axis};

use crate::colorize::ColorRange;
use crate::overlay::renumber_for_display;

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Deterministic shuffle of `1..=count` so that neighbouring ids get
/// distant colors. Steps through the ids with a stride near the golden
/// ratio of `count` that is coprime with it.
#[must_use]
pub fn scrambled_order(count: u32) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let m = u64::from(count);
    let mut stride = ((m as f64 * 0.618_033_988_75).round() as u64).max(1);
    while gcd(stride, m) != 1 {
        stride += 1;
    }
    (0..m).map(|k| ((k * stride) % m + 1) as u32).collect()
}

/// Sparse `(i, j, label)` triples as RGB.
///
/// Label `L` gets `colormap(order[L] / max_label)`, where `order` is the
/// identity or, with `renumber`, [`scrambled_order`]. Pixels covered by
/// several labels show the mean of their colors. Entries with label 0 and
/// uncovered pixels are black.
pub fn render_ijv(
    ijv: &Ijv,
    shape: Option<(usize, usize)>,
    colormap: Colormap,
    renumber: bool,
) -> Result<Array3<f32>> {
    let (height, width) = shape.unwrap_or_else(|| ijv.inferred_shape());
    let mut sum = Array3::<f32>::zeros((height, width, 3));
    let mut count = Array2::<u32>::zeros((height, width));
    let top = ijv.max_label();
    if top == 0 {
        return Ok(sum);
    }

    let order = if renumber {
        scrambled_order(top)
    } else {
        (1..=top).collect()
    };
    let range = ColorRange::new(0.0, top as f32);
    for &(i, j, label) in &ijv.entries {
        if label == 0 {
            continue;
        }
        if i >= height || j >= width {
            return Err(cellview_core::Error::ShapeMismatch {
                expected: (height, width),
                actual: (i + 1, j + 1),
            });
        }
        let color = colormap.map(range.normalize(order[label as usize - 1] as f32));
        for (c, v) in color.into_iter().enumerate() {
            sum[[i, j, c]] += v;
        }
        count[[i, j]] += 1;
    }

    for (mut plane, &n) in sum.lanes_mut(Axis(2)).into_iter().zip(count.iter()) {
        if n > 1 {
            plane.mapv_inplace(|v| v / n as f32);
        }
    }
    Ok(sum)
}

/// Dense label mask as RGB, objects colored in id order over `[1, max]`.
#[must_use]
pub fn render_labels(labels: &Array2<u32>, colormap: Colormap) -> Array3<f32> {
    let numbers = renumber_for_display(&labels.view());
    let range = ColorRange::new(1.0, max_label(&numbers) as f32);
    let (height, width) = labels.dim();
    let mut out = Array3::zeros((height, width, 3));
    for ((y, x), &n) in numbers.indexed_iter() {
        if n == 0 {
            continue;
        }
        for (c, v) in colormap.map(range.normalize(n as f32)).into_iter().enumerate() {
            out[[y, x, c]] = v;
        }
    }
    out
}
