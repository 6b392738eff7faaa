//! Image and label mask readers.

use std::path::Path;

use cellview_core::ImageKind;
use image::{DynamicImage, GenericImageView};
use ndarray::{Array2, Array3};

use crate::{Error, Result};

fn dims(img: &DynamicImage) -> (usize, usize) {
    let (width, height) = img.dimensions();
    (height as usize, width as usize)
}

/// Read an image file as floating-point pixels.
///
/// Integer samples are scaled to [0, 1] by their type's maximum; float
/// samples are kept. Alpha is dropped. Grayscale files become
/// [`ImageKind::Grayscale`], everything else [`ImageKind::Rgb`].
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<ImageKind> {
    let path = path.as_ref();
    let img = image::open(path)?;
    let (height, width) = dims(&img);
    log::debug!(
        "read {}: {width}x{height} {:?}",
        path.display(),
        img.color()
    );

    let kind = if img.color().has_color() {
        let data = Array3::from_shape_vec((height, width, 3), img.to_rgb32f().into_raw())
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;
        ImageKind::from_planes(data)?
    } else {
        let data = Array2::from_shape_vec((height, width), img.to_luma32f().into_raw())
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;
        ImageKind::grayscale(data)?
    };
    Ok(kind)
}

/// Read a label mask: an 8- or 16-bit grayscale image of integer object ids.
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Array2<u32>> {
    let path = path.as_ref();
    let img = image::open(path)?;
    let shape = dims(&img);
    let ids: Vec<u32> = match img {
        DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(u32::from).collect(),
        DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(u32::from).collect(),
        other => {
            return Err(Error::InvalidFormat(format!(
                "{}: label masks must be 8- or 16-bit grayscale, found {:?}",
                path.display(),
                other.color()
            )))
        }
    };
    Array2::from_shape_vec(shape, ids).map_err(|e| Error::InvalidFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::{ImageBuffer, Luma, Rgb, Rgba};
    use tempfile::tempdir;

    #[test]
    fn test_read_gray8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");
        ImageBuffer::from_fn(3, 2, |x, y| Luma([(x * 100 + y) as u8]))
            .save(&path)
            .unwrap();

        let image = read_image(&path).unwrap();
        assert_eq!(image.dim(), (2, 3));
        let ImageKind::Grayscale(plane) = image else {
            panic!("expected grayscale");
        };
        assert_abs_diff_eq!(plane[[0, 1]], 100.0 / 255.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plane[[1, 2]], 201.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn test_read_gray16_scales_by_max() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray16.png");
        ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 65535 }]))
            .save(&path)
            .unwrap();
        let ImageKind::Grayscale(plane) = read_image(&path).unwrap() else {
            panic!("expected grayscale");
        };
        assert_abs_diff_eq!(plane[[0, 0]], 0.0);
        assert_abs_diff_eq!(plane[[0, 1]], 1.0);
    }

    #[test]
    fn test_read_rgba_drops_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("color.png");
        ImageBuffer::from_pixel(2, 2, Rgba([255u8, 0, 51, 10]))
            .save(&path)
            .unwrap();
        let image = read_image(&path).unwrap();
        assert_eq!(image.channels(), 3);
        let ImageKind::Rgb(data) = image else {
            panic!("expected rgb");
        };
        assert_abs_diff_eq!(data[[1, 1, 0]], 1.0);
        assert_abs_diff_eq!(data[[1, 1, 2]], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_read_labels_keeps_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.png");
        ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(2, 2, |x, y| Luma([(y * 2 + x) as u16 * 300]))
            .save(&path)
            .unwrap();
        let labels = read_labels(&path).unwrap();
        assert_eq!(labels, ndarray::array![[0, 300], [600, 900]]);
    }

    #[test]
    fn test_read_labels_rejects_color() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("color.png");
        ImageBuffer::from_pixel(1, 1, Rgb([1u8, 2, 3])).save(&path).unwrap();
        assert!(matches!(read_labels(&path), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(read_image("/nonexistent/cellview/image.png").is_err());
    }
}
