use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between the source file and a clean dataset.
///
/// Load variants abort the dashboard; there is no partial render.
/// [`DataError::UnknownAttribute`] and [`DataError::FilterKind`] come from
/// bad preset filters and abort it just the same.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data source {} is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("row {row}: invalid value {value:?} in column {column}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("{attribute} is not a {expected} attribute")]
    FilterKind {
        attribute: String,
        expected: &'static str,
    },

    #[error("malformed data source: {0}")]
    Malformed(String),
}

impl DataError {
    /// Whether the error happened while reading the source, as opposed to a
    /// bad filter configuration.
    pub fn is_load_failure(&self) -> bool {
        !matches!(
            self,
            DataError::UnknownAttribute(_) | DataError::FilterKind { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
