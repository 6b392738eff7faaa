//! Channel visibility and reduction of color stacks to RGB.

use cellview_core::COLOR_VALS;
use ndarray::{s, Array3, Axis};

/// Fit a channel weight mask to `channels` entries.
///
/// Extra weights are dropped; missing weights default to 1 (visible).
#[must_use]
pub fn match_channel_mask(mask: &[f32], channels: usize) -> Vec<f32> {
    let mut matched: Vec<f32> = mask.iter().copied().take(channels).collect();
    matched.resize(channels, 1.0);
    matched
}

/// Weight each channel and reduce the stack to three RGB planes.
///
/// * 1 channel: replicated to gray.
/// * 2 channels: red and green, with a synthesized zero blue plane.
/// * 3 channels: weighted in place.
/// * 4 or more: each channel adds its palette color (red, green, blue,
///   yellow, cyan, magenta, white, then repeating), clipped to [0, 1].
#[must_use]
pub fn composite_channels(data: &Array3<f32>, mask: &[f32]) -> Array3<f32> {
    let (height, width, channels) = data.dim();
    let weights = match_channel_mask(mask, channels);

    let mut weighted = data.to_owned();
    for (mut plane, &weight) in weighted.axis_iter_mut(Axis(2)).zip(&weights) {
        plane.mapv_inplace(|v| v * weight);
    }

    match channels {
        0 => Array3::zeros((height, width, 3)),
        1 => {
            let mut out = Array3::zeros((height, width, 3));
            for mut plane in out.axis_iter_mut(Axis(2)) {
                plane.assign(&weighted.index_axis(Axis(2), 0));
            }
            out
        }
        2 => {
            let mut out = Array3::zeros((height, width, 3));
            out.slice_mut(s![.., .., ..2]).assign(&weighted);
            out
        }
        3 => weighted,
        _ => {
            let mut out = Array3::<f32>::zeros((height, width, 3));
            for (index, plane) in weighted.axis_iter(Axis(2)).enumerate() {
                let color = COLOR_VALS[index % COLOR_VALS.len()];
                for (c, &amount) in color.iter().enumerate() {
                    if amount > 0.0 {
                        out.index_axis_mut(Axis(2), c)
                            .zip_mut_with(&plane, |o, &v| *o += amount * v);
                    }
                }
            }
            out.mapv_inplace(|v| v.clamp(0.0, 1.0));
            out
        }
    }
}
