//! Error types for the Boxoffice pipeline and query layer.
//!
//! - [`CsvError`] - reading and decoding delimited files
//! - [`PipelineError`] - raw dataset to cleaned dataset run
//! - [`QueryError`] - loading the cleaned dataset for queries
//! - [`ServerError`] - HTTP API
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Parse failures on individual values (numbers, dates, genres) are not
//! errors at all: they degrade to missing values and drop the row.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading a delimited file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Content could not be decoded with the detected encoding.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// Malformed record.
    #[error("Line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Errors that abort a transform run. No output file is written when one
/// of these is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Raw input file does not exist.
    #[error("Input file not found: '{}'. Make sure it is in the working directory.", .0.display())]
    MissingInput(PathBuf),

    /// Raw input lacks columns the pipeline reads.
    #[error("Input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Nothing survived the validity filter.
    #[error("No rows with valid financial data (revenue > {threshold} and budget > {threshold}) out of {read} read")]
    NoValidRecords { read: usize, threshold: f64 },

    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Failed writing the cleaned file.
    #[error("Failed to write output: {0}")]
    Write(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors while loading the cleaned dataset.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Cleaned file is absent. Data-dependent views must not be rendered.
    #[error("Cleaned data file not found: '{}'. Run `boxoffice transform` first.", .0.display())]
    DataUnavailable(PathBuf),

    /// Filter bounds are inverted or otherwise unusable.
    #[error("Invalid filter: {0}")]
    InvalidCriteria(String),

    /// Cleaned file exists but is not a valid cleaned dataset.
    #[error("Invalid cleaned data: {0}")]
    Csv(#[from] CsvError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for QueryError {
    fn from(err: csv::Error) -> Self {
        QueryError::Csv(err.into())
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Query layer error.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Data could not be loaded at startup; data endpoints are disabled.
    #[error("Data unavailable: {0}")]
    Unavailable(String),

    /// Socket or runtime failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
