//! Raw pixels plus display parameters to a displayable RGB array.

use cellview_core::{DisplayParameters, ImageKind, LabelLayer, Result};
use ndarray::Array3;

use crate::channels::composite_channels;
use crate::colorize::{apply_colormap, resolve_range};
use crate::contrast::apply_contrast;
use crate::overlay::render_layers;

/// Contrast, channel mask and colormap, without label layers.
///
/// Color stacks are clipped to [0, 1]; colormapped planes already are.
#[must_use]
pub fn display_rgb(image: &ImageKind, params: &DisplayParameters) -> Array3<f32> {
    match apply_contrast(image, params.contrast) {
        ImageKind::Grayscale(plane) => {
            let view = plane.view();
            let range = resolve_range(params, &view);
            apply_colormap(&view, params.colormap, range)
        }
        ImageKind::Rgb(data) | ImageKind::MultiChannel(data) => {
            let mut rgb = composite_channels(&data, &params.channel_mask);
            rgb.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) });
            rgb
        }
    }
}

/// Full compositing pipeline: contrast, channels, colormap, label layers.
///
/// Pure: the input is never modified and repeated calls with the same
/// arguments produce identical output.
pub fn composite(
    image: &ImageKind,
    params: &DisplayParameters,
    layers: &[LabelLayer],
) -> Result<Array3<f32>> {
    let rgb = display_rgb(image, params);
    if layers.is_empty() {
        return Ok(rgb);
    }
    render_layers(&rgb, layers)
}

/// Parameters and label layers reused across many images.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    params: DisplayParameters,
    layers: Vec<LabelLayer>,
}

impl Compositor {
    /// Create with default parameters and no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom parameters.
    #[must_use]
    pub fn with_params(params: DisplayParameters) -> Self {
        Self {
            params,
            layers: Vec::new(),
        }
    }

    /// Add a label layer drawn after the existing ones.
    #[must_use]
    pub fn with_layer(mut self, layer: LabelLayer) -> Self {
        self.layers.push(layer);
        self
    }

    #[must_use]
    pub fn params(&self) -> &DisplayParameters {
        &self.params
    }

    #[must_use]
    pub fn layers(&self) -> &[LabelLayer] {
        &self.layers
    }

    /// Render one image.
    pub fn render(&self, image: &ImageKind) -> Result<Array3<f32>> {
        composite(image, &self.params, &self.layers)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use cellview_core::{Colormap, ContrastMode, Error, LabelMode, Rgb8};
    use ndarray::{array, Array2, Axis};

    #[test]
    fn test_single_bright_pixel_grayscale() {
        let image = ImageKind::grayscale(array![[0.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 0.0]])
            .unwrap();
        let params = DisplayParameters::new()
            .with_contrast(ContrastMode::Normalized)
            .with_colormap(Colormap::Gray);
        let out = composite(&image, &params, &[]).unwrap();

        assert_eq!(out.dim(), (3, 3, 3));
        let top = Colormap::Gray.map(1.0);
        let bottom = Colormap::Gray.map(0.0);
        for y in 0..3 {
            for x in 0..3 {
                let pixel = [out[[y, x, 0]], out[[y, x, 1]], out[[y, x, 2]]];
                if (y, x) == (1, 1) {
                    assert_eq!(pixel, top);
                } else {
                    assert_eq!(pixel, bottom);
                }
            }
        }
    }

    #[test]
    fn test_two_channel_blue_is_zero_before_overlay() {
        let mut data = Array3::<f32>::zeros((2, 2, 2));
        data[[0, 0, 0]] = 1.0;
        data[[1, 1, 1]] = 0.5;
        let image = ImageKind::from_planes(data).unwrap();
        let out = composite(&image, &DisplayParameters::new(), &[]).unwrap();
        assert_eq!(out.dim(), (2, 2, 3));
        assert!(out.index_axis(Axis(2), 2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_raw_rgb_is_clipped() {
        let data = Array3::from_elem((1, 2, 3), 4.0f32);
        let image = ImageKind::from_planes(data).unwrap();
        let params = DisplayParameters::new().with_contrast(ContrastMode::Raw);
        let out = composite(&image, &params, &[]).unwrap();
        assert!(out.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_outline_over_grayscale() {
        let image = ImageKind::grayscale(Array2::zeros((4, 4))).unwrap();
        let labels = array![[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]];
        let layer = LabelLayer::new("Nuclei", vec![labels])
            .with_mode(LabelMode::Outline)
            .with_outline_color(Rgb8::RED);
        let out = composite(&image, &DisplayParameters::new(), &[layer]).unwrap();
        assert_eq!([out[[2, 2, 0]], out[[2, 2, 1]], out[[2, 2, 2]]], [1.0, 0.0, 0.0]);
        assert_eq!([out[[0, 0, 0]], out[[0, 0, 1]], out[[0, 0, 2]]], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mismatched_layer_fails() {
        let image = ImageKind::grayscale(Array2::zeros((4, 4))).unwrap();
        let layer = LabelLayer::new("Nuclei", vec![Array2::zeros((3, 4))]);
        let result = composite(&image, &DisplayParameters::new(), &[layer]);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_compositor_is_idempotent() {
        let image = ImageKind::grayscale(array![[0.1, 3.0, 7.0], [2.0, 0.0, 9.5]]).unwrap();
        let compositor = Compositor::with_params(
            DisplayParameters::new()
                .with_contrast(ContrastMode::Log)
                .with_colormap(Colormap::Viridis),
        )
        .with_layer(
            LabelLayer::new("Cells", vec![array![[1, 1, 0], [0, 2, 2]]])
                .with_mode(LabelMode::Alpha),
        );
        let first = compositor.render(&image).unwrap();
        let second = compositor.render(&image).unwrap();
        assert_eq!(first, second);
    }
}
