//! cellview-render: Display compositing for segmented microscopy images.
//!
//! The pipeline turns raw pixels into a displayable RGB array:
//! - **Contrast** - raw, per-plane min/max stretch, or log stretch
//! - **Channels** - weighted RGB composite of color and multi-channel stacks
//! - **Colormap** - single-plane intensities through a gradient
//! - **Overlay** - label outlines or translucent fills, layer by layer
//!
//! Around it sit the measurement display, colorbar ticks, pixel readout,
//! histograms, density grids, plate maps and false-color label rendering.
//!

pub mod channels;
pub mod colorize;
pub mod contrast;
pub mod histogram;
pub mod measurement;
pub mod outline;
pub mod overlay;
pub mod pipeline;
pub mod pixel_info;
pub mod plate;
pub mod sparse;
pub mod ticks;

pub use channels::{composite_channels, match_channel_mask};
pub use colorize::{apply_colormap, infer_bounds, resolve_range, ColorRange};
pub use contrast::{apply_contrast, auto_contrast, log_transform};
pub use histogram::{axis_label, Density, Histogram, XScale, DEFAULT_BINS, DEFAULT_GRIDSIZE};
pub use measurement::{
    annotations, color_by_measurement, display_data, Annotation, DisplayMode, MeasurementDisplay,
    MeasurementRender, MeasurementSource,
};
pub use outline::{distance_to_features, outline, outline_alpha};
pub use overlay::{render_layers, renumber_for_display};
pub use pipeline::{composite, display_rgb, Compositor};
pub use pixel_info::{length_field, measure_length, pixel_at, pixel_fields, PixelField};
pub use plate::{
    plate_data_as_array, render_plate, select_plate, well_name, well_readout, PlateData, PlateType,
};
pub use sparse::{render_ijv, render_labels, scrambled_order};
pub use ticks::{colorbar_ticks, Tick, TICK_COUNT};
