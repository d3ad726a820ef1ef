use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{SolutionRow, SolutionTable};
use crate::error::{Error, Result};

/// Required column names, in `(E, n, F)` order. Names are case-sensitive.
pub const ENERGY_COLUMN: &str = "E";
pub const DENSITY_COLUMN: &str = "n";
pub const RESIDUAL_COLUMN: &str = "F";

const COLUMNS: [&str; 3] = [ENERGY_COLUMN, DENSITY_COLUMN, RESIDUAL_COLUMN];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a solution-set table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least `E`, `n` and `F` columns
/// * `.json`    – `[{ "E": ..., "n": ..., "F": ... }, ...]`
/// * `.parquet` – numeric `E`, `n` and `F` columns
///
/// Extra columns are ignored. A missing column or a value that is not a
/// number fails the whole file.
pub fn load_file(path: &Path) -> Result<SolutionTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        _ => {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            })
        }
    };
    debug!("read {} rows from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SolutionTable> {
    let csv_err = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));
    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut indices = [0usize; 3];
    for (slot, column) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::MissingColumn {
                path: path.to_path_buf(),
                column,
            })?;
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let mut values = [0.0f64; 3];
        for ((value, &idx), column) in values.iter_mut().zip(&indices).zip(COLUMNS) {
            let raw = record.get(idx).unwrap_or("");
            *value = parse_number(raw).ok_or_else(|| Error::InvalidValue {
                path: path.to_path_buf(),
                row: row_no + 1,
                column,
                value: raw.to_string(),
            })?;
        }
        rows.push(SolutionRow::new(values[0], values[1], values[2]));
    }

    Ok(SolutionTable::new(path, rows))
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as written by
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "E": 120.5, "n": 4.1e11, "F": 2.3e-7 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SolutionTable> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let records = root.as_array().ok_or_else(|| Error::InvalidValue {
        path: path.to_path_buf(),
        row: 0,
        column: ENERGY_COLUMN,
        value: "expected a top-level JSON array".to_string(),
    })?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let mut values = [0.0f64; 3];
        for (value, column) in values.iter_mut().zip(COLUMNS) {
            let cell = record.get(column).ok_or_else(|| Error::MissingColumn {
                path: path.to_path_buf(),
                column,
            })?;
            *value = cell.as_f64().ok_or_else(|| Error::InvalidValue {
                path: path.to_path_buf(),
                row: i + 1,
                column,
                value: cell.to_string(),
            })?;
        }
        rows.push(SolutionRow::new(values[0], values[1], values[2]));
    }

    Ok(SolutionTable::new(path, rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with numeric `E`, `n` and `F` columns.
///
/// Float64, Float32, Int64 and Int32 columns are accepted; a null cell is a
/// malformed value.
fn load_parquet(path: &Path) -> Result<SolutionTable> {
    let parquet_err = |details: String| Error::Parquet {
        path: path.to_path_buf(),
        details,
    };

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parquet_err(format!("reading metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| parquet_err(format!("building reader: {e}")))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| parquet_err(format!("reading batch: {e}")))?;
        let schema = batch.schema();

        let mut columns: Vec<&ArrayRef> = Vec::with_capacity(3);
        for column in COLUMNS {
            let idx = schema.index_of(column).map_err(|_| Error::MissingColumn {
                path: path.to_path_buf(),
                column,
            })?;
            columns.push(batch.column(idx));
        }

        let offset = rows.len();
        for row in 0..batch.num_rows() {
            let mut values = [0.0f64; 3];
            for ((value, col), column) in values.iter_mut().zip(&columns).zip(COLUMNS) {
                *value = numeric_cell(col, row).ok_or_else(|| Error::InvalidValue {
                    path: path.to_path_buf(),
                    row: offset + row + 1,
                    column,
                    value: format!("{:?} cell", col.data_type()),
                })?;
            }
            rows.push(SolutionRow::new(values[0], values[1], values[2]));
        }
    }

    Ok(SolutionTable::new(path, rows))
}

/// Read one numeric cell as `f64`, or `None` for nulls and non-numeric types.
fn numeric_cell(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        _ => None,
    }
}
