//! Ingest errors
//!
//! Failures reading a submission file or writing its records. Problems with
//! the data inside a readable file are checker findings, not errors.

use thiserror::Error;

use crate::storage::StorageError;
use crate::validator::ValidatorError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("unreadable workbook {path}: {source}")]
    Xlsx {
        path: String,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("{path} has no sheet named '{sheet}'")]
    MissingSheet { path: String, sheet: String },

    #[error("{path} has no header on row {row}")]
    MissingHeader { path: String, row: usize },

    #[error("{path} is not a .xlsx or .csv file")]
    UnsupportedFormat { path: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

pub type IngestResult<T> = Result<T, IngestError>;
