//! Cursor readout: the values under a pixel and the length of a drag.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use cellview_core::ImageKind;

/// One `name: value` pair for a status line.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelField {
    pub name: String,
    pub value: String,
}

impl PixelField {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for PixelField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Whether a fractional coordinate falls on a pixel of `dim`.
#[must_use]
pub fn in_bounds(dim: (usize, usize), x: f64, y: f64) -> bool {
    let (height, width) = dim;
    x >= -0.5 && y >= -0.5 && x + 0.5 < width as f64 && y + 0.5 < height as f64
}

/// Nearest pixel `(row, column)` to a fractional coordinate.
#[must_use]
pub fn pixel_at(dim: (usize, usize), x: f64, y: f64) -> Option<(usize, usize)> {
    if !in_bounds(dim, x, y) {
        return None;
    }
    Some(((y + 0.5) as usize, (x + 0.5) as usize))
}

fn format_value(v: f32) -> String {
    format!("{v:.4}")
}

/// Position and intensity fields under the cursor.
///
/// Grayscale images report one intensity, RGB images one field per color,
/// other stacks one field per channel. Off-image coordinates give nothing.
#[must_use]
pub fn pixel_fields(image: &ImageKind, x: f64, y: f64) -> Vec<PixelField> {
    let Some((row, col)) = pixel_at(image.dim(), x, y) else {
        return Vec::new();
    };
    let mut fields = vec![
        PixelField::new("X", col.to_string()),
        PixelField::new("Y", row.to_string()),
    ];
    match image {
        ImageKind::Grayscale(plane) => {
            fields.push(PixelField::new("Intensity", format_value(plane[[row, col]])));
        }
        ImageKind::Rgb(data) => {
            for (c, name) in ["Red", "Green", "Blue"].into_iter().enumerate() {
                fields.push(PixelField::new(name, format_value(data[[row, col, c]])));
            }
        }
        ImageKind::MultiChannel(data) => {
            for c in 0..data.dim().2 {
                fields.push(PixelField::new(
                    format!("Channel {}", c + 1),
                    format_value(data[[row, col, c]]),
                ));
            }
        }
    }
    fields
}

/// Euclidean length of a drag between two points.
#[must_use]
pub fn measure_length(start: (f64, f64), end: (f64, f64)) -> f64 {
    (end.0 - start.0).hypot(end.1 - start.1)
}

/// Status field for a measured length.
#[must_use]
pub fn length_field(start: (f64, f64), end: (f64, f64)) -> PixelField {
    PixelField::new("Length", format!("{:.1}", measure_length(start, end)))
}
