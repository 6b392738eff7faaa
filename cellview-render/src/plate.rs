//! Per-well values laid out as a plate map.
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use cellview_core::{Colormap, Error, Result};
use ndarray::{Array2, Array3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colorize::ColorRange;

const ROW_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOP";

/// Empty wells are drawn gray.
const MISSING_WELL: [f32; 3] = [0.5, 0.5, 0.5];

/// Well values per plate: `plates[plate][well]`.
pub type PlateData = BTreeMap<String, BTreeMap<String, f64>>;

/// Standard microplate formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlateType {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "96"))]
    Wells96,
    #[cfg_attr(feature = "serde", serde(rename = "384"))]
    Wells384,
}

impl PlateType {
    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(self) -> (usize, usize) {
        match self {
            PlateType::Wells96 => (8, 12),
            PlateType::Wells384 => (16, 24),
        }
    }
}

impl fmt::Display for PlateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlateType::Wells96 => write!(f, "96"),
            PlateType::Wells384 => write!(f, "384"),
        }
    }
}

impl FromStr for PlateType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "96" => Ok(PlateType::Wells96),
            "384" => Ok(PlateType::Wells384),
            other => Err(Error::ConfigError(format!("unknown plate type '{other}'"))),
        }
    }
}

/// Parse a well name like `"B07"` into zero-based `(row, column)`.
pub fn parse_well(well: &str) -> Result<(usize, usize)> {
    let invalid = || Error::InvalidWell(well.to_string());
    let mut chars = well.chars();
    let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
    let row = ROW_LETTERS
        .iter()
        .position(|&b| char::from(b) == letter)
        .ok_or_else(invalid)?;
    let column: usize = chars.as_str().parse().map_err(|_| invalid())?;
    if column == 0 {
        return Err(invalid());
    }
    Ok((row, column - 1))
}

/// Well name for zero-based `(row, column)`, e.g. `(1, 6)` is `"B07"`.
#[must_use]
pub fn well_name(row: usize, column: usize) -> String {
    let letter = ROW_LETTERS.get(row).map_or('?', |&b| char::from(b));
    format!("{letter}{:02}", column + 1)
}

/// The named plate, or the first plate in name order when `name` is `None`.
pub fn select_plate<'a>(
    plates: &'a PlateData,
    name: Option<&str>,
) -> Result<(&'a str, &'a BTreeMap<String, f64>)> {
    let found = match name {
        Some(name) => plates.get_key_value(name),
        None => plates.iter().next(),
    };
    found.map(|(plate, wells)| (plate.as_str(), wells)).ok_or_else(|| {
        let available: Vec<&str> = plates.keys().map(String::as_str).collect();
        Error::ConfigError(match name {
            Some(name) => format!("unknown plate '{name}' (available: {})", available.join(", ")),
            None => "no plates to display".to_string(),
        })
    })
}

/// Lay out per-well values as a `rows x columns` array.
///
/// Wells without data are NaN. Wells that do not fit the plate are skipped
/// with a single warning; malformed well names are an error.
pub fn plate_data_as_array(
    wells: &BTreeMap<String, f64>,
    plate_type: PlateType,
) -> Result<Array2<f64>> {
    let (rows, columns) = plate_type.shape();
    let mut data = Array2::from_elem((rows, columns), f64::NAN);
    let mut warned = false;
    for (well, &value) in wells {
        let (row, column) = parse_well(well)?;
        if row >= rows || column >= columns {
            if !warned {
                log::warn!("well {well} does not fit in a {plate_type}-well plate");
                warned = true;
            }
            continue;
        }
        data[[row, column]] = value;
    }
    Ok(data)
}

/// Color a plate map, drawing empty wells gray.
#[must_use]
pub fn render_plate(data: &Array2<f64>, colormap: Colormap) -> Array3<f32> {
    let range = data
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        })
        .map_or(ColorRange::UNIT, |(lo, hi)| ColorRange::new(lo as f32, hi as f32));

    let (rows, columns) = data.dim();
    let mut out = Array3::zeros((rows, columns, 3));
    for ((r, c), &value) in data.indexed_iter() {
        let color = if value.is_finite() {
            colormap.map(range.normalize(value as f32))
        } else {
            MISSING_WELL
        };
        for (k, v) in color.into_iter().enumerate() {
            out[[r, c, k]] = v;
        }
    }
    out
}

/// Readout for the well under a plate-map cursor, e.g. `"A01 - 1.0000"`.
#[must_use]
pub fn well_readout(data: &Array2<f64>, row: usize, column: usize) -> String {
    let name = well_name(row, column);
    match data.get([row, column]) {
        Some(value) => format!("{name} - {value:.4}"),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    fn wells(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|&(w, v)| (w.to_string(), v)).collect()
    }

    #[test]
    fn test_96_well_layout() {
        let data =
            plate_data_as_array(&wells(&[("A01", 1.0), ("h12", 2.0), ("C05", 3.5)]), PlateType::Wells96)
                .unwrap();
        assert_eq!(data.dim(), (8, 12));
        assert_eq!(data[[0, 0]], 1.0);
        assert_eq!(data[[7, 11]], 2.0);
        assert_eq!(data[[2, 4]], 3.5);
        assert!(data[[0, 1]].is_nan());
    }

    #[test]
    fn test_out_of_plate_wells_are_skipped() {
        let data = plate_data_as_array(&wells(&[("P24", 1.0), ("A13", 2.0)]), PlateType::Wells96).unwrap();
        assert!(data.iter().all(|v| v.is_nan()));

        let big = plate_data_as_array(&wells(&[("P24", 1.0)]), PlateType::Wells384).unwrap();
        assert_eq!(big[[15, 23]], 1.0);
    }

    #[test]
    fn test_malformed_wells() {
        assert!(matches!(parse_well("Z01"), Err(Error::InvalidWell(_))));
        assert!(matches!(parse_well("A00"), Err(Error::InvalidWell(_))));
        assert!(matches!(parse_well("Axx"), Err(Error::InvalidWell(_))));
        assert!(matches!(parse_well(""), Err(Error::InvalidWell(_))));
        assert_eq!(parse_well("b7").unwrap(), (1, 6));
    }

    #[test]
    fn test_well_names() {
        assert_eq!(well_name(0, 0), "A01");
        assert_eq!(well_name(15, 23), "P24");
        let data = plate_data_as_array(&wells(&[("A01", 1.0)]), PlateType::Wells96).unwrap();
        assert_eq!(well_readout(&data, 0, 0), "A01 - 1.0000");
        assert_eq!(well_readout(&data, 20, 0), "?01");
    }

    #[test]
    fn test_select_plate() {
        let plates: PlateData = [
            ("P2".to_string(), wells(&[("A01", 2.0)])),
            ("P1".to_string(), wells(&[("A01", 1.0)])),
        ]
        .into_iter()
        .collect();
        let (name, first) = select_plate(&plates, None).unwrap();
        assert_eq!(name, "P1");
        assert_eq!(first["A01"], 1.0);
        assert_eq!(select_plate(&plates, Some("P2")).unwrap().1["A01"], 2.0);
        assert!(matches!(select_plate(&plates, Some("P9")), Err(Error::ConfigError(_))));
        assert!(select_plate(&PlateData::new(), None).is_err());
    }

    #[test]
    fn test_render_plate_marks_missing_gray() {
        let data = plate_data_as_array(&wells(&[("A01", 0.0), ("A02", 10.0)]), PlateType::Wells96).unwrap();
        let rgb = render_plate(&data, Colormap::Gray);
        assert_eq!(rgb[[0, 0, 0]], 0.0);
        assert_eq!(rgb[[0, 1, 0]], 1.0);
        assert_eq!(rgb[[3, 3, 1]], 0.5);
        assert_eq!("384".parse::<PlateType>().unwrap().shape(), (16, 24));
    }
}
