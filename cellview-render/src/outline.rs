//! Object boundaries and antialiased outline coverage.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use image::{GrayImage, Luma};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use ndarray::{Array2, ArrayView2};

/// Boundary pixels of every labelled object.
///
/// A labelled pixel is on the boundary when any of its 8 neighbours holds a
/// different value, or when it touches the image border. The output keeps
/// the pixel's label; everything else is 0.
#[must_use]
pub fn outline(labels: &ArrayView2<u32>) -> Array2<u32> {
    let (height, width) = labels.dim();
    let mut out = Array2::zeros((height, width));
    for ((y, x), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        let on_border = y == 0 || x == 0 || y + 1 == height || x + 1 == width;
        if on_border || differs_from_neighbour(labels, y, x, label) {
            out[[y, x]] = label;
        }
    }
    out
}

fn differs_from_neighbour(labels: &ArrayView2<u32>, y: usize, x: usize, label: u32) -> bool {
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            if labels[[ny, nx]] != label {
                return true;
            }
        }
    }
    false
}

/// Exact Euclidean distance from every pixel to the nearest `true` pixel.
///
/// Feature pixels get 0. With no feature pixels at all every distance is
/// effectively infinite.
#[must_use]
pub fn distance_to_features(features: &ArrayView2<bool>) -> Array2<f32> {
    let (height, width) = features.dim();
    let mask = GrayImage::from_fn(width as u32, height as u32, |x, y| {
        Luma([if features[[y as usize, x as usize]] { 255 } else { 0 }])
    });
    let squared = euclidean_squared_distance_transform(&mask);
    Array2::from_shape_fn((height, width), |(y, x)| {
        squared.get_pixel(x as u32, y as u32)[0].sqrt() as f32
    })
}

/// Per-pixel outline opacity for a label mask.
///
/// Widths up to 1 give a hard 0/1 mask on the boundary pixels. Wider lines
/// keep the boundary at full opacity and fade pixels whose distance `d`
/// from it satisfies `0.5 < d < width / 2` as `(hw + 0.5 - d) / hw`.
#[must_use]
pub fn outline_alpha(labels: &ArrayView2<u32>, line_width: f32) -> Array2<f32> {
    let boundary = outline(labels).mapv(|v| v != 0);
    if line_width <= 1.0 || !boundary.iter().any(|&b| b) {
        return boundary.mapv(|b| if b { 1.0 } else { 0.0 });
    }

    let half_width = line_width / 2.0;
    let distance = distance_to_features(&boundary.view());
    let mut alpha = Array2::zeros(boundary.dim());
    ndarray::Zip::from(&mut alpha)
        .and(&boundary)
        .and(&distance)
        .for_each(|a, &b, &d| {
            *a = if b {
                1.0
            } else if d > 0.5 && d < half_width {
                ((half_width + 0.5 - d) / half_width).min(1.0)
            } else {
                0.0
            };
        });
    alpha
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn square_4x4() -> Array2<u32> {
        array![[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]]
    }

    #[test]
    fn test_small_square_is_all_boundary() {
        let out = outline(&square_4x4().view());
        assert_eq!(out, square_4x4());
    }

    #[test]
    fn test_interior_pixels_are_not_boundary() {
        let mut labels = Array2::<u32>::zeros((7, 7));
        labels.slice_mut(ndarray::s![1..6, 1..6]).fill(2);
        let out = outline(&labels.view());
        assert_eq!(out[[1, 1]], 2);
        assert_eq!(out[[1, 3]], 2);
        assert_eq!(out[[2, 2]], 0);
        assert_eq!(out[[3, 3]], 0);
        assert_eq!(out[[0, 0]], 0);
    }

    #[test]
    fn test_touching_objects_and_image_border() {
        let labels = array![[1, 1, 1], [1, 1, 2], [1, 1, 2]];
        let out = outline(&labels.view());
        // every pixel of a 3x3 image touches the border except the center,
        // which neighbours label 2
        assert_eq!(out, labels);
    }

    #[test]
    fn test_distance_transform() {
        let mut features = Array2::from_elem((5, 5), false);
        features[[2, 2]] = true;
        let d = distance_to_features(&features.view());
        assert_abs_diff_eq!(d[[2, 2]], 0.0);
        assert_abs_diff_eq!(d[[2, 4]], 2.0);
        assert_abs_diff_eq!(d[[0, 0]], 8.0f32.sqrt(), epsilon = 1e-5);
        assert_abs_diff_eq!(d[[1, 4]], 5.0f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_width_one_is_binary() {
        let alpha = outline_alpha(&square_4x4().view(), 1.0);
        assert!(alpha.iter().all(|&a| a == 0.0 || a == 1.0));
        assert_eq!(alpha[[1, 1]], 1.0);
        assert_eq!(alpha[[0, 0]], 0.0);
    }

    #[test]
    fn test_wide_lines_fade_within_band() {
        let mut labels = Array2::<u32>::zeros((15, 15));
        labels.slice_mut(ndarray::s![5..10, 5..10]).fill(1);
        let width = 5.0;
        let half_width = width / 2.0;
        let alpha = outline_alpha(&labels.view(), width);
        let boundary = outline(&labels.view());
        let distance = distance_to_features(&boundary.mapv(|v| v != 0).view());

        for ((idx, &a), &d) in alpha.indexed_iter().zip(distance.iter()) {
            if boundary[idx] != 0 {
                assert_eq!(a, 1.0);
            } else if d > 0.5 && d < half_width {
                assert!(a > 0.0 && a < 1.0, "{idx:?}: {a}");
            } else {
                assert_eq!(a, 0.0, "{idx:?}");
            }
        }
        // one pixel outside the square: d = 1, alpha = (2.5 + 0.5 - 1) / 2.5
        assert_abs_diff_eq!(alpha[[7, 4]], 0.8, epsilon = 1e-6);
        assert_eq!(alpha[[7, 0]], 0.0);
    }

    #[test]
    fn test_empty_labels_have_no_outline() {
        let labels = Array2::<u32>::zeros((4, 4));
        assert!(outline_alpha(&labels.view(), 3.0).iter().all(|&a| a == 0.0));
    }
}
