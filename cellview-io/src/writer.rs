//! Writers for composited output and label masks.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::path::Path;

use image::{ImageBuffer, Luma, RgbImage};
use ndarray::{Array2, Array3};

use crate::{Error, Result};

/// Convert a [0, 1] float sample to 8 bits. NaN becomes 0.
fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn image_size(height: usize, width: usize) -> Result<(u32, u32)> {
    let convert = |n: usize| {
        u32::try_from(n).map_err(|_| Error::InvalidFormat(format!("dimension {n} is too large")))
    };
    Ok((convert(width)?, convert(height)?))
}

/// Write an `(height, width, 3)` RGB array in [0, 1] as an 8-bit image.
///
/// The format follows the file extension (png, tif/tiff, jpg/jpeg).
pub fn write_rgb<P: AsRef<Path>>(path: P, rgb: &Array3<f32>) -> Result<()> {
    let path = path.as_ref();
    let (height, width, channels) = rgb.dim();
    if channels != 3 {
        return Err(Error::InvalidFormat(format!(
            "expected 3 color channels, found {channels}"
        )));
    }
    let (w, h) = image_size(height, width)?;
    // iter() walks in logical (row, column, channel) order
    let raw: Vec<u8> = rgb.iter().copied().map(to_u8).collect();
    let img = RgbImage::from_raw(w, h, raw)
        .ok_or_else(|| Error::InvalidFormat("pixel buffer does not match image size".into()))?;
    img.save(path)?;
    log::debug!("wrote {} ({width}x{height})", path.display());
    Ok(())
}

/// Write a label mask as a 16-bit grayscale image.
pub fn write_labels<P: AsRef<Path>>(path: P, labels: &Array2<u32>) -> Result<()> {
    let path = path.as_ref();
    let (height, width) = labels.dim();
    let (w, h) = image_size(height, width)?;
    let raw = labels
        .iter()
        .map(|&id| {
            u16::try_from(id)
                .map_err(|_| Error::InvalidFormat(format!("label {id} does not fit in 16 bits")))
        })
        .collect::<Result<Vec<u16>>>()?;
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w, h, raw)
        .ok_or_else(|| Error::InvalidFormat("label buffer does not match image size".into()))?;
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{read_image, read_labels};
    use cellview_core::ImageKind;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_to_u8() {
        assert_eq!(to_u8(0.0), 0);
        assert_eq!(to_u8(1.0), 255);
        assert_eq!(to_u8(2.0), 255);
        assert_eq!(to_u8(-1.0), 0);
        assert_eq!(to_u8(f32::NAN), 0);
        assert_eq!(to_u8(0.5), 128);
    }

    #[test]
    fn test_write_rgb_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut rgb = Array3::<f32>::zeros((2, 3, 3));
        rgb[[1, 2, 0]] = 1.0;
        rgb[[0, 1, 2]] = 0.2;
        write_rgb(&path, &rgb).unwrap();

        let ImageKind::Rgb(back) = read_image(&path).unwrap() else {
            panic!("expected rgb");
        };
        assert_eq!(back.dim(), (2, 3, 3));
        assert_abs_diff_eq!(back[[1, 2, 0]], 1.0);
        assert_abs_diff_eq!(back[[0, 1, 2]], 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(back[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_write_tiff() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tiff");
        write_rgb(&path, &Array3::from_elem((4, 4, 3), 0.5)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_rgb_rejects_wrong_channels() {
        let dir = tempdir().unwrap();
        let result = write_rgb(dir.path().join("bad.png"), &Array3::zeros((2, 2, 4)));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_label_round_trip_and_overflow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.png");
        let labels = array![[0, 1, 2], [40000, 0, 7]];
        write_labels(&path, &labels).unwrap();
        assert_eq!(read_labels(&path).unwrap(), labels);

        let too_big = array![[70000u32]];
        assert!(write_labels(dir.path().join("big.png"), &too_big).is_err());
    }
}
