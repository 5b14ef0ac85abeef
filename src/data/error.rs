use thiserror::Error;

/// Errors raised while loading a source table.
///
/// Any of these means no table was produced; a previously loaded table is
/// never touched by a failed load.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("reading source: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("required column '{name}' is missing from the source")]
    MissingColumn { name: String },

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

/// Errors raised by the filter engine. Recoverable: the caller rejects the
/// criteria and keeps its prior view.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid GPA range: lower bound {lo} is greater than upper bound {hi}")]
    InvalidRange { lo: f64, hi: f64 },
}
