use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::config::DashboardConfig;

use super::clean::{self, Derivation};
use super::error::{DataError, Result};
use super::model::{CellValue, CreditDataset};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Summary of one load, shown next to the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: PathBuf,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub employment_normalized: usize,
}

#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: CreditDataset,
    pub report: LoadReport,
}

/// Read `config.data_path`, derive the year columns and drop incomplete rows.
///
/// Any failure here is fatal for the dashboard: the caller shows the error
/// instead of a partial page.
pub fn load_and_clean_data(config: &DashboardConfig) -> Result<LoadedData> {
    let path = config.data_path.as_path();
    let mut wanted = clean::required_columns();
    wanted.push(clean::ID_COLUMN);

    let table = load_table(path, &wanted)?;
    let rows_read = table.rows.len();
    let cleaned = clean::clean_table(&table, &Derivation::from(config))?;

    let report = LoadReport {
        source: path.to_path_buf(),
        rows_read,
        rows_dropped: cleaned.rows_dropped,
        employment_normalized: cleaned.employment_normalized,
    };
    log::info!(
        "Loaded {} applicants from {} ({} rows read, {} dropped, {} not employed)",
        cleaned.records.len(),
        path.display(),
        report.rows_read,
        report.rows_dropped,
        report.employment_normalized
    );
    if report.rows_dropped > 0 {
        log::warn!("Dropped {} incomplete rows", report.rows_dropped);
    }

    Ok(LoadedData {
        dataset: CreditDataset::from_records(cleaned.records),
        report,
    })
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// Projected source table: only the requested columns that exist, in
/// request order, with each row aligned to `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Load the `wanted` columns of a table file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names
/// * `.parquet` – flat schema as written by Pandas or Polars
/// * `.json`    – `[{ "TARGET": 0, "CODE_GENDER": "F", ... }, ...]`
pub fn load_table(path: &Path, wanted: &[&str]) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, wanted),
        "parquet" | "pq" => load_parquet(path, wanted),
        "json" => load_json(path, wanted),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataError::Unavailable {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, wanted: &[&str]) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(open_source(path)?);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let projection: Vec<(String, usize)> = wanted
        .iter()
        .filter_map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .map(|i| (name.to_string(), i))
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = projection
            .iter()
            .map(|(_, i)| guess_cell_type(record.get(*i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok(RawTable {
        columns: projection.into_iter().map(|(name, _)| name).collect(),
        rows,
    })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// A key absent from one record is a null cell; a key absent from every
/// record is a missing column.
fn load_json(path: &Path, wanted: &[&str]) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open_source(path)?))?;
    let records = root
        .as_array()
        .ok_or_else(|| DataError::Malformed("expected top-level JSON array".to_string()))?;

    let objects = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_object()
                .ok_or_else(|| DataError::Malformed(format!("row {i} is not a JSON object")))
        })
        .collect::<Result<Vec<_>>>()?;

    let columns: Vec<String> = wanted
        .iter()
        .filter(|name| objects.iter().any(|obj| obj.contains_key(**name)))
        .map(|name| name.to_string())
        .collect();

    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Only the wanted top-level columns are decoded.
fn load_parquet(path: &Path, wanted: &[&str]) -> Result<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open_source(path)?)?;

    let schema = builder.schema().clone();
    let columns: Vec<String> = wanted
        .iter()
        .filter(|name| schema.index_of(name).is_ok())
        .map(|name| name.to_string())
        .collect();
    let roots: Vec<usize> = columns
        .iter()
        .filter_map(|name| schema.index_of(name).ok())
        .collect();

    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
    let reader = builder.with_projection(mask).build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let batch_schema = batch.schema();

        let arrays = columns
            .iter()
            .map(|name| -> Result<ArrayRef> {
                let idx = batch_schema.index_of(name)?;
                normalize_column(batch.column(idx))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            rows.push(arrays.iter().map(|a| extract_cell(a.as_ref(), row)).collect());
        }
    }

    Ok(RawTable { columns, rows })
}

// -- Parquet / Arrow helpers --

/// Cast a column to one of the four physical types [`extract_cell`] reads.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Utf8 | DataType::Boolean | DataType::Int64 | DataType::Float64 => {
            return Ok(col.clone());
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 | DataType::Float32 => DataType::Float64,
        // LargeUtf8, Utf8View and dictionary-encoded categoricals
        _ => DataType::Utf8,
    };
    Ok(cast(col, &target)?)
}

fn extract_cell(col: &dyn Array, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<StringArray>() {
        CellValue::String(arr.value(row).to_string())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        CellValue::Integer(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Float64Array>() {
        CellValue::Float(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<BooleanArray>() {
        CellValue::Bool(arr.value(row))
    } else {
        CellValue::Null
    }
}
