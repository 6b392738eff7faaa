//! Image variants resolved once at pipeline entry.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Pixel data tagged by channel layout.
///
/// Values are `f32` in whatever scale the caller supplies; the contrast
/// transform decides whether to stretch them.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageKind {
    /// Single intensity plane, `(height, width)`.
    Grayscale(Array2<f32>),
    /// Exactly three color planes, `(height, width, 3)`.
    Rgb(Array3<f32>),
    /// Two planes, or four and more, `(height, width, n)`.
    MultiChannel(Array3<f32>),
}

impl ImageKind {
    /// Wrap a single plane.
    pub fn grayscale(data: Array2<f32>) -> Result<Self> {
        let (height, width) = data.dim();
        if height == 0 || width == 0 {
            return Err(Error::EmptyImage { height, width });
        }
        Ok(Self::Grayscale(data))
    }

    /// Classify a `(height, width, channels)` stack.
    ///
    /// One channel collapses to [`ImageKind::Grayscale`].
    pub fn from_planes(data: Array3<f32>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        if height == 0 || width == 0 {
            return Err(Error::EmptyImage { height, width });
        }
        match channels {
            0 => Err(Error::UnsupportedShape(vec![height, width, channels])),
            1 => Ok(Self::Grayscale(data.index_axis_move(Axis(2), 0))),
            3 => Ok(Self::Rgb(data)),
            _ => Ok(Self::MultiChannel(data)),
        }
    }

    /// Classify an array given as a shape and row-major values.
    pub fn from_shape_vec(shape: &[usize], values: Vec<f32>) -> Result<Self> {
        match *shape {
            [h, w] => {
                let data = Array2::from_shape_vec((h, w), values)
                    .map_err(|_| Error::UnsupportedShape(shape.to_vec()))?;
                Self::grayscale(data)
            }
            [h, w, c] => {
                let data = Array3::from_shape_vec((h, w, c), values)
                    .map_err(|_| Error::UnsupportedShape(shape.to_vec()))?;
                Self::from_planes(data)
            }
            _ => Err(Error::UnsupportedShape(shape.to_vec())),
        }
    }

    /// `(height, width)` of the image.
    #[must_use]
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Self::Grayscale(data) => data.dim(),
            Self::Rgb(data) | Self::MultiChannel(data) => {
                let (h, w, _) = data.dim();
                (h, w)
            }
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.dim().0
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.dim().1
    }

    /// Number of channels (1 for grayscale).
    #[must_use]
    pub fn channels(&self) -> usize {
        match self {
            Self::Grayscale(_) => 1,
            Self::Rgb(data) | Self::MultiChannel(data) => data.dim().2,
        }
    }

    /// True for any layout with more than one plane.
    #[must_use]
    pub fn is_color(&self) -> bool {
        !matches!(self, Self::Grayscale(_))
    }

    /// Short label used in logs and `info` output.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Grayscale(_) => "grayscale",
            Self::Rgb(_) => "rgb",
            Self::MultiChannel(_) => "multichannel",
        }
    }

    /// Mean of all channels, used when a measurement display needs gray.
    #[must_use]
    pub fn to_gray(&self) -> Array2<f32> {
        match self {
            Self::Grayscale(data) => data.clone(),
            Self::Rgb(data) | Self::MultiChannel(data) => data
                .mean_axis(Axis(2))
                .unwrap_or_else(|| Array2::zeros(self.dim())),
        }
    }

    /// Iterate channel planes in order.
    pub fn planes(&self) -> Box<dyn Iterator<Item = ArrayView2<'_, f32>> + '_> {
        match self {
            Self::Grayscale(data) => Box::new(std::iter::once(data.view())),
            Self::Rgb(data) | Self::MultiChannel(data) => Box::new(data.axis_iter(Axis(2))),
        }
    }

    /// Minimum and maximum over finite values, `None` if there are none.
    #[must_use]
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for plane in self.planes() {
            for &v in plane.iter().filter(|v| v.is_finite()) {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
        }
        range
    }
}
