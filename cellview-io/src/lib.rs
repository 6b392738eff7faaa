//! cellview-io: File I/O for cellview.
//!
//! This crate reads images and label masks through the `image` crate,
//! writes composited RGB output, and loads JSON render configurations and
//! CSV measurement, plate and sparse-label tables.
//!

pub mod config;
mod error;
pub mod measurements;
mod reader;
mod writer;

pub use config::{LayerSpec, RenderConfig};
pub use error::{Error, Result};
pub use measurements::{
    read_columns_csv, read_ijv_csv, read_measurements_csv, read_plate_csv, write_annotations_json,
    Measurements, DEFAULT_PLATE,
};
pub use reader::{read_image, read_labels};
pub use writer::{write_labels, write_rgb};
