//! cellview-core: Core types for segmented-image display.
//!
//! This crate provides the data model shared by the compositor, the file
//! readers and the command line: tagged image variants, label layers,
//! display parameters, colormaps and outline colors.
//!

pub mod color;
pub mod colormap;
pub mod error;
pub mod image;
pub mod labels;
pub mod params;

pub use color::{Rgb8, COLOR_NAMES, COLOR_VALS};
pub use colormap::Colormap;
pub use error::{Error, Result};
pub use image::ImageKind;
pub use labels::{max_label, Ijv, LabelLayer, LabelMode};
pub use params::{ContrastMode, DisplayParameters, Interpolation};
