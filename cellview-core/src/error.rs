//! Error types for cellview-core.

use thiserror::Error;

/// Result type alias for cellview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for display compositing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A label mask or overlay does not match the base image.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Image with zero rows or columns.
    #[error("image has no pixels ({height}x{width})")]
    EmptyImage { height: usize, width: usize },

    /// Array layout that cannot be displayed.
    #[error("unsupported image shape: {0:?}")]
    UnsupportedShape(Vec<usize>),

    /// Unknown colormap name.
    #[error("unknown colormap: {0}")]
    UnknownColormap(String),

    /// Unknown outline color name.
    #[error("unknown color: {0}")]
    UnknownColor(String),

    /// Well name that cannot be placed on a plate.
    #[error("invalid well name: {0}")]
    InvalidWell(String),

    /// Measurement columns of different lengths.
    #[error("measurement length mismatch: {name} has {actual} entries, expected {expected}")]
    MeasurementLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
