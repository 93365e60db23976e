//! Data-layer error types.

use thiserror::Error;

/// Result type for data operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors that can occur while loading the tabulated visual data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required data file is missing from the data directory.
    #[error("missing data file: {0}")]
    MissingFile(String),

    /// A cell could not be parsed as a number.
    #[error("parse error in {file} line {line}: {message}")]
    Parse {
        /// File the error occurred in.
        file: String,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A table does not have the expected shape or wavelength range.
    #[error("malformed table {file}: {message}")]
    Malformed {
        /// File the error occurred in.
        file: String,
        /// What went wrong.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
