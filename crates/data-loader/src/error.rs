//! Error types for the data-loader crate.
//!
//! Loading is a one-time startup step, so every variant here is meant to be
//! fatal to the caller: a catalog is either fully cleaned or not produced.

use thiserror::Error;

/// Errors that can occur while reading and cleaning the film catalog
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the input (bad quoting, ragged rows, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required header is absent from the catalog file
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// Row in the catalog couldn't be parsed
    #[error("Parse error at line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    /// A data field had a value that cannot be cleaned into the schema
    #[error("Invalid value for {field} at line {line}: {value}")]
    InvalidValue {
        field: String,
        value: String,
        line: usize,
    },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
