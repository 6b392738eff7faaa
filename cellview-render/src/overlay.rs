//! Label layers composited over an RGB image.
#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use cellview_core::{max_label, Error, LabelLayer, LabelMode, Result};
use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};

use crate::colorize::ColorRange;
use crate::outline::outline_alpha;

/// Compact, order-preserving renumbering for display.
///
/// Distinct nonzero ids, sorted ascending, become `1..=n`; background
/// stays 0.
#[must_use]
pub fn renumber_for_display(labels: &ArrayView2<u32>) -> Array2<u32> {
    let mut mapping: BTreeMap<u32, u32> = labels
        .iter()
        .copied()
        .filter(|&v| v != 0)
        .map(|v| (v, 0))
        .collect();
    for (next, id) in mapping.values_mut().zip(1u32..) {
        *next = id;
    }
    labels.mapv(|v| if v == 0 { 0 } else { mapping[&v] })
}

fn check_shape(mask: &Array2<u32>, expected: (usize, usize)) -> Result<()> {
    if mask.dim() == expected {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            expected,
            actual: mask.dim(),
        })
    }
}

/// Blend `color` into `image` with per-pixel weight `alpha`.
fn blend(image: &mut Array3<f32>, alpha: &Array2<f32>, color: [f32; 3]) {
    for (mut plane, c) in image.axis_iter_mut(Axis(2)).zip(color) {
        Zip::from(&mut plane).and(alpha).for_each(|p, &a| {
            if a > 0.0 {
                *p = *p * (1.0 - a) + c * a;
            }
        });
    }
}

fn draw_outlines(image: &mut Array3<f32>, mask: &Array2<u32>, layer: &LabelLayer) {
    let alpha = outline_alpha(&mask.view(), layer.line_width);
    blend(image, &alpha, layer.outline_color.to_unit());
}

fn draw_alpha(image: &mut Array3<f32>, mask: &Array2<u32>, layer: &LabelLayer, offset: u64, total: u64) {
    let numbers = renumber_for_display(&mask.view());
    let range = ColorRange::new(1.0, total as f32);
    let alpha = layer.alpha;
    for ((y, x), &n) in numbers.indexed_iter() {
        if n == 0 {
            continue;
        }
        let color = layer.colormap.map(range.normalize((u64::from(n) + offset) as f32));
        for (c, value) in color.into_iter().enumerate() {
            let p = &mut image[[y, x, c]];
            *p = *p * (1.0 - alpha) + value * alpha;
        }
    }
}

/// Composite label layers, in order, over an RGB image.
///
/// Every mask must match the image's height and width. Layers in
/// [`LabelMode::None`] and layers whose masks are all background are
/// skipped. In alpha mode the masks of one layer share a colormap range:
/// each mask's ids are offset by the maxima of the masks before it. The
/// result is clipped to [0, 1].
pub fn render_layers(base: &Array3<f32>, layers: &[LabelLayer]) -> Result<Array3<f32>> {
    let (height, width, _) = base.dim();
    for layer in layers {
        for mask in &layer.masks {
            check_shape(mask, (height, width))?;
        }
    }

    let mut image = base.to_owned();
    for layer in layers {
        if layer.mode == LabelMode::None {
            continue;
        }
        let total = layer.total_labels();
        if total == 0 {
            log::debug!("skipping label layer '{}': no objects", layer.name);
            continue;
        }
        let mut offset = 0u64;
        for mask in &layer.masks {
            match layer.mode {
                LabelMode::Outline => draw_outlines(&mut image, mask, layer),
                LabelMode::Alpha => draw_alpha(&mut image, mask, layer, offset, total),
                LabelMode::None => {}
            }
            offset += u64::from(max_label(mask));
        }
    }
    image.mapv_inplace(|v| v.clamp(0.0, 1.0));
    Ok(image)
}
