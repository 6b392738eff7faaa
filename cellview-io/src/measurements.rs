//! Measurement, plate and sparse-label tables in, text annotations out.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

use cellview_core::Ijv;
use cellview_render::{Annotation, MeasurementSource, PlateData};

use crate::{Error, Result};

/// Columns of a measurement table, one row per object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    pub values: Vec<f64>,
    /// Empty when the table has no position columns.
    pub center_x: Vec<f64>,
    pub center_y: Vec<f64>,
}

impl Measurements {
    /// Per-object values when the table has positions, otherwise the
    /// first value as a whole-image measurement.
    pub fn into_source(self) -> Result<MeasurementSource> {
        if !self.center_x.is_empty() {
            return Ok(MeasurementSource::Objects {
                values: self.values,
                center_x: self.center_x,
                center_y: self.center_y,
            });
        }
        let value = self
            .values
            .first()
            .copied()
            .ok_or_else(|| Error::InvalidFormat("measurement table has no rows".into()))?;
        Ok(MeasurementSource::Image { value })
    }
}

fn parse_cell(cell: &str, line: usize) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse()
        .map_err(|_| Error::InvalidFormat(format!("line {line}: '{cell}' is not a number")))
}

/// Plate name for tables without a `plate` column.
pub const DEFAULT_PLATE: &str = "plate";

/// Lowercased header names and the lines after the header.
fn open_table(path: &Path) -> Result<(Vec<String>, Lines<BufReader<File>>)> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| Error::InvalidFormat(format!("{}: empty file", path.display())))?;
    let columns = header.split(',').map(|h| h.trim().to_ascii_lowercase()).collect();
    Ok((columns, lines))
}

fn require_column(columns: &[String], name: &str, path: &Path) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| Error::InvalidFormat(format!("{}: no '{name}' column", path.display())))
}

/// Read a comma-separated table with a `value` column and optional
/// `center_x` and `center_y` columns. Headers are case-insensitive; empty
/// and `nan` cells become NaN.
pub fn read_measurements_csv<P: AsRef<Path>>(path: P) -> Result<Measurements> {
    let path = path.as_ref();
    let (columns, lines) = open_table(path)?;
    let find = |name: &str| columns.iter().position(|c| c == name);

    let value_col = require_column(&columns, "value", path)?;
    let centers = match (find("center_x"), find("center_y")) {
        (Some(x), Some(y)) => Some((x, y)),
        (None, None) => None,
        _ => {
            return Err(Error::InvalidFormat(format!(
                "{}: center_x and center_y must appear together",
                path.display()
            )))
        }
    };

    let mut table = Measurements::default();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 2;
        let cells: Vec<&str> = line.split(',').collect();
        let cell = |col: usize| parse_cell(cells.get(col).copied().unwrap_or(""), line_no);
        table.values.push(cell(value_col)?);
        if let Some((x, y)) = centers {
            table.center_x.push(cell(x)?);
            table.center_y.push(cell(y)?);
        }
    }
    log::debug!("read {} measurement(s) from {}", table.values.len(), path.display());
    Ok(table)
}

/// Read per-well values from a table with `well` and `value` columns.
///
/// An optional `plate` column splits the wells by plate; without it every
/// well belongs to [`DEFAULT_PLATE`].
pub fn read_plate_csv<P: AsRef<Path>>(path: P) -> Result<PlateData> {
    let path = path.as_ref();
    let (columns, lines) = open_table(path)?;
    let well_col = require_column(&columns, "well", path)?;
    let value_col = require_column(&columns, "value", path)?;
    let plate_col = columns.iter().position(|c| c == "plate");

    let mut plates = PlateData::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        let text = |col: usize| cells.get(col).map_or("", |c| c.trim());
        let plate = plate_col.map_or(DEFAULT_PLATE, text);
        let value = parse_cell(text(value_col), i + 2)?;
        plates
            .entry(plate.to_string())
            .or_default()
            .insert(text(well_col).to_string(), value);
    }
    log::debug!("read {} plate(s) from {}", plates.len(), path.display());
    Ok(plates)
}

/// Read the named numeric columns, in the order asked for.
pub fn read_columns_csv<P: AsRef<Path>>(path: P, names: &[&str]) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let (columns, lines) = open_table(path)?;
    let indices = names
        .iter()
        .map(|name| require_column(&columns, &name.to_ascii_lowercase(), path))
        .collect::<Result<Vec<_>>>()?;

    let mut out = vec![Vec::new(); names.len()];
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        for (column, &index) in out.iter_mut().zip(&indices) {
            column.push(parse_cell(cells.get(index).copied().unwrap_or(""), i + 2)?);
        }
    }
    Ok(out)
}

/// Read a sparse labeling from a table with `i`, `j` and `label` columns.
pub fn read_ijv_csv<P: AsRef<Path>>(path: P) -> Result<Ijv> {
    let path = path.as_ref();
    let (columns, lines) = open_table(path)?;
    let i_col = require_column(&columns, "i", path)?;
    let j_col = require_column(&columns, "j", path)?;
    let label_col = require_column(&columns, "label", path)?;

    let mut entries = Vec::new();
    for (n, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        let cell = |col: usize| {
            let text = cells.get(col).map_or("", |c| c.trim());
            text.parse::<usize>().map_err(|_| {
                Error::InvalidFormat(format!("line {}: '{text}' is not a non-negative integer", n + 2))
            })
        };
        let label = u32::try_from(cell(label_col)?)
            .map_err(|_| Error::InvalidFormat(format!("line {}: label out of range", n + 2)))?;
        entries.push((cell(i_col)?, cell(j_col)?, label));
    }
    log::debug!("read {} ijv entries from {}", entries.len(), path.display());
    Ok(Ijv::new(entries))
}

/// Write text annotations as a JSON array of `{x, y, text}`.
pub fn write_annotations_json<P: AsRef<Path>>(path: P, annotations: &[Annotation]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, annotations)?;
    writer.flush()?;
    Ok(())
}
