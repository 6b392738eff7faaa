//! Measurement values drawn onto an image: text labels at object centers,
//! or objects filled with a color that encodes their value.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use cellview_core::{Colormap, DisplayParameters, Error, ImageKind, Result};
use ndarray::{Array2, Array3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colorize::ColorRange;
use crate::pipeline::display_rgb;

/// Golden angle in radians; successive objects get well-spread directions.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Where the displayed numbers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementSource {
    /// One whole-image measurement, shown at the image center.
    Image { value: f64 },
    /// One value per object, with the object centers.
    Objects {
        values: Vec<f64>,
        center_x: Vec<f64>,
        center_y: Vec<f64>,
    },
}

/// Text at each object, or objects colored by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisplayMode {
    #[default]
    Text,
    Color,
}

/// Settings for a measurement display.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementDisplay {
    /// Text or color display (default: text).
    pub mode: DisplayMode,
    /// Decimal places in text labels (default: 2).
    pub decimals: usize,
    /// Distance in pixels to move text labels off the object center (default: 0).
    pub offset: f64,
    /// Colormap for color mode (default: jet).
    pub colormap: Colormap,
    /// Draw over the image; when false the background is black (default: true).
    pub wants_image: bool,
}

impl Default for MeasurementDisplay {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Text,
            decimals: 2,
            offset: 0.0,
            colormap: Colormap::Jet,
            wants_image: true,
        }
    }
}

impl MeasurementDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    #[must_use]
    pub fn with_wants_image(mut self, wants_image: bool) -> Self {
        self.wants_image = wants_image;
        self
    }
}

/// A formatted value and where to draw it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Per-object values after padding and masking.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValues {
    /// Valid values, in object order.
    pub values: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// `mask[i]` is true when object `i + 1` has a value and a position.
    pub mask: Vec<bool>,
}

/// Unit direction for the n-th label offset. Always points into the lower
/// half-plane (positive y).
fn offset_direction(index: usize) -> (f64, f64) {
    let angle = (index as f64 * GOLDEN_ANGLE) % std::f64::consts::PI;
    (angle.cos(), angle.sin())
}

/// Pad `values` with NaN up to `object_count`, shift centers by the label
/// offset, then drop objects whose value or position is NaN.
pub fn prepare_objects(
    values: &[f64],
    center_x: &[f64],
    center_y: &[f64],
    object_count: usize,
    offset: f64,
) -> Result<ObjectValues> {
    let count = object_count.max(values.len());
    for (name, column) in [("center_x", center_x), ("center_y", center_y)] {
        if column.len() != count {
            return Err(Error::MeasurementLength {
                name,
                expected: count,
                actual: column.len(),
            });
        }
    }

    let mut out = ObjectValues {
        values: Vec::with_capacity(count),
        x: Vec::with_capacity(count),
        y: Vec::with_capacity(count),
        mask: Vec::with_capacity(count),
    };
    for i in 0..count {
        let value = values.get(i).copied().unwrap_or(f64::NAN);
        let (dx, dy) = offset_direction(i);
        let x = center_x[i] + offset * dx;
        let y = center_y[i] + offset * dy;
        let valid = !(value.is_nan() || x.is_nan() || y.is_nan());
        out.mask.push(valid);
        if valid {
            out.values.push(value);
            out.x.push(x);
            out.y.push(y);
        }
    }
    Ok(out)
}

/// Format a value with a fixed number of decimals.
#[must_use]
pub fn format_value(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Text annotations for a measurement source on an image of `dim`.
pub fn annotations(
    source: &MeasurementSource,
    dim: (usize, usize),
    settings: &MeasurementDisplay,
) -> Result<Vec<Annotation>> {
    match source {
        MeasurementSource::Image { value } => {
            let (height, width) = dim;
            let (dx, dy) = offset_direction(0);
            Ok(vec![Annotation {
                x: (width / 2) as f64 + dx,
                y: (height / 2) as f64 + dy,
                text: format_value(*value, settings.decimals),
            }])
        }
        MeasurementSource::Objects {
            values,
            center_x,
            center_y,
        } => {
            let objects = prepare_objects(values, center_x, center_y, center_x.len(), settings.offset)?;
            Ok(objects
                .values
                .iter()
                .zip(objects.x.iter().zip(&objects.y))
                .map(|(&value, (&x, &y))| Annotation {
                    x,
                    y,
                    text: format_value(value, settings.decimals),
                })
                .collect())
        }
    }
}

/// Color each object by its value, scaled by the background intensity.
///
/// Objects without a valid value, pixels with ids beyond the value table,
/// and the background are white before scaling. Returns the image and the
/// value range the colormap spans.
pub fn color_by_measurement(
    gray: &Array2<f32>,
    labels: &Array2<u32>,
    values: &[f64],
    mask: &[bool],
    colormap: Colormap,
) -> Result<(Array3<f32>, Option<(f64, f64)>)> {
    if gray.dim() != labels.dim() {
        return Err(Error::ShapeMismatch {
            expected: gray.dim(),
            actual: labels.dim(),
        });
    }

    let valid: Vec<f64> = values
        .iter()
        .zip(mask)
        .filter(|&(_, &m)| m)
        .map(|(&v, _)| v)
        .collect();
    let range = valid.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
        Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
    });

    // colors[0] is background, colors[i] is object i
    let mut colors = vec![[1.0f32; 3]; mask.len() + 1];
    if let Some((lo, hi)) = range {
        let scale = ColorRange::new(lo as f32, hi as f32);
        for (i, (&value, &m)) in values.iter().zip(mask).enumerate() {
            if m {
                colors[i + 1] = colormap.map(scale.normalize(value as f32));
            }
        }
    }

    let (height, width) = gray.dim();
    let mut out = Array3::zeros((height, width, 3));
    for ((y, x), &label) in labels.indexed_iter() {
        let color = colors.get(label as usize).copied().unwrap_or([1.0; 3]);
        let g = gray[[y, x]];
        for (c, v) in color.into_iter().enumerate() {
            out[[y, x, c]] = v * g;
        }
    }
    Ok((out, range))
}

/// Rendered measurement display.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRender {
    /// RGB image in [0, 1].
    pub image: Array3<f32>,
    /// Text to draw over the image (text mode only).
    pub annotations: Vec<Annotation>,
    /// Value range spanned by the colormap (color mode only).
    pub value_range: Option<(f64, f64)>,
}

/// Render a measurement display.
///
/// Color mode needs per-object values and a label mask; otherwise the
/// display falls back to text. Text mode shows the background through the
/// default grayscale pipeline.
pub fn display_data(
    image: &ImageKind,
    labels: Option<&Array2<u32>>,
    source: &MeasurementSource,
    settings: &MeasurementDisplay,
) -> Result<MeasurementRender> {
    let dim = image.dim();
    let background = if settings.wants_image {
        image.clone()
    } else {
        ImageKind::Grayscale(Array2::zeros(dim))
    };

    if let (DisplayMode::Color, Some(labels), MeasurementSource::Objects { values, center_x, center_y }) =
        (settings.mode, labels, source)
    {
        let object_count = usize::try_from(cellview_core::max_label(labels))
            .unwrap_or(usize::MAX)
            .max(values.len());
        let mut xs = center_x.clone();
        let mut ys = center_y.clone();
        xs.resize(object_count, f64::NAN);
        ys.resize(object_count, f64::NAN);
        let objects = prepare_objects(values, &xs, &ys, object_count, 0.0)?;
        let gray = background.to_gray();
        let (mut rgb, value_range) =
            color_by_measurement(&gray, labels, &pad(values, object_count), &objects.mask, settings.colormap)?;
        rgb.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) });
        return Ok(MeasurementRender {
            image: rgb,
            annotations: Vec::new(),
            value_range,
        });
    }

    let rgb = display_rgb(&background, &DisplayParameters::new());
    Ok(MeasurementRender {
        image: rgb,
        annotations: annotations(source, dim, settings)?,
        value_range: None,
    })
}

fn pad(values: &[f64], count: usize) -> Vec<f64> {
    let mut padded = values.to_vec();
    padded.resize(count, f64::NAN);
    padded
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_short_values_are_padded_and_masked() {
        let objects = prepare_objects(
            &[1.5, f64::NAN],
            &[10.0, 20.0, 30.0],
            &[5.0, 6.0, 7.0],
            3,
            0.0,
        )
        .unwrap();
        assert_eq!(objects.mask, vec![true, false, false]);
        assert_eq!(objects.values, vec![1.5]);
        assert_eq!(objects.x, vec![10.0]);
        assert_eq!(objects.y, vec![5.0]);
    }

    #[test]
    fn test_nan_position_is_masked() {
        let objects = prepare_objects(&[1.0, 2.0], &[f64::NAN, 3.0], &[1.0, 1.0], 2, 0.0).unwrap();
        assert_eq!(objects.mask, vec![false, true]);
    }

    #[test]
    fn test_column_length_mismatch() {
        let result = prepare_objects(&[1.0, 2.0], &[1.0], &[1.0, 2.0], 2, 0.0);
        assert!(matches!(
            result,
            Err(Error::MeasurementLength { name: "center_x", .. })
        ));
    }

    #[test]
    fn test_offset_moves_by_distance() {
        let objects = prepare_objects(&[1.0, 2.0, 3.0], &[0.0; 3], &[0.0; 3], 3, 4.0).unwrap();
        for (x, y) in objects.x.iter().zip(&objects.y) {
            assert_abs_diff_eq!((x * x + y * y).sqrt(), 4.0, epsilon = 1e-9);
            assert!(*y >= 0.0);
        }
    }

    #[test]
    fn test_text_annotations() {
        let source = MeasurementSource::Objects {
            values: vec![1.23456, 2.0],
            center_x: vec![1.0, 2.0],
            center_y: vec![3.0, 4.0],
        };
        let settings = MeasurementDisplay::new().with_decimals(3);
        let notes = annotations(&source, (10, 10), &settings).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "1.235");
        assert_eq!(notes[1].text, "2.000");
        assert_eq!(notes[1].x, 2.0);
    }

    #[test]
    fn test_image_annotation_near_center() {
        let source = MeasurementSource::Image { value: 0.5 };
        let notes = annotations(&source, (20, 40), &MeasurementDisplay::new().with_decimals(0)).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "0");
        let dist = ((notes[0].x - 20.0).powi(2) + (notes[0].y - 10.0).powi(2)).sqrt();
        assert_abs_diff_eq!(dist, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_color_by_measurement() {
        let gray = Array2::from_elem((2, 3), 0.5f32);
        let labels = array![[0, 1, 2], [3, 0, 0]];
        let (rgb, range) = color_by_measurement(
            &gray,
            &labels,
            &[0.0, 10.0, 99.0],
            &[true, true, false],
            Colormap::Gray,
        )
        .unwrap();
        assert_eq!(range, Some((0.0, 10.0)));
        // background: white scaled by gray
        assert_eq!(rgb[[0, 0, 0]], 0.5);
        // lowest value: black
        assert_eq!(rgb[[0, 1, 0]], 0.0);
        // highest value: white * 0.5
        assert_eq!(rgb[[0, 2, 0]], 0.5);
        // masked object: white * 0.5
        assert_eq!(rgb[[1, 0, 0]], 0.5);
    }

    #[test]
    fn test_display_data_color_mode() {
        let image = ImageKind::grayscale(Array2::ones((2, 2))).unwrap();
        let labels = array![[1, 0], [0, 2]];
        let source = MeasurementSource::Objects {
            values: vec![1.0, 2.0],
            center_x: vec![0.0, 1.0],
            center_y: vec![0.0, 1.0],
        };
        let settings = MeasurementDisplay::new()
            .with_mode(DisplayMode::Color)
            .with_colormap(Colormap::Gray);
        let render = display_data(&image, Some(&labels), &source, &settings).unwrap();
        assert!(render.annotations.is_empty());
        assert_eq!(render.value_range, Some((1.0, 2.0)));
        assert_eq!(render.image[[0, 0, 0]], 0.0);
        assert_eq!(render.image[[1, 1, 0]], 1.0);
    }

    #[test]
    fn test_display_data_without_image_is_black() {
        let image = ImageKind::grayscale(array![[0.0, 1.0], [0.5, 0.2]]).unwrap();
        let source = MeasurementSource::Image { value: 7.0 };
        let settings = MeasurementDisplay::new().with_wants_image(false);
        let render = display_data(&image, None, &source, &settings).unwrap();
        assert!(render.image.iter().all(|&v| v == 0.0));
        assert_eq!(render.annotations[0].text, "7.00");
    }
}
