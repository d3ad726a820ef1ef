use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building an overlap plot.
///
/// Every variant is fatal for the run: nothing is retried and no partial
/// output is written.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read parquet file {path}: {details}")]
    Parquet { path: PathBuf, details: String },

    #[error("{path} is missing the required '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{path}, row {row}, column '{column}': '{value}' is not a number")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("unsupported file extension '.{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("density grid is empty (every cell is zero)")]
    EmptyGrid,

    #[error("the overlap is empty: dataset '{dataset}' has no rows inside the histogram range")]
    EmptyOverlap { dataset: String },

    #[error("failed to render figure: {0}")]
    Render(String),

    #[error("failed to encode {format}: {details}")]
    Encode { format: &'static str, details: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    /// Whether this is the empty-result condition reported to the user as
    /// "the overlap is empty".
    pub fn is_empty_overlap(&self) -> bool {
        matches!(self, Error::EmptyOverlap { .. } | Error::EmptyGrid)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
