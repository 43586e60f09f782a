//! Error types for the rehabilitation records pipeline.
//!
//! Every stage returns [`Result`], and any error aborts the run. Errors are
//! grouped into the coarse [`ErrorKind`] taxonomy so callers can tell input
//! problems from schema, data-quality, configuration and output problems.
//!
//! Errors are serializable as `{ code, message }` so a run report or a host
//! application can carry them without losing the error code.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Source file missing or unreadable.
    Input,
    /// An expected column is absent or has the wrong shape.
    Schema,
    /// Values that the pipeline cannot process deterministically.
    DataQuality,
    /// Invalid pipeline configuration.
    Configuration,
    /// The destination could not be written.
    Output,
    /// Anything else (library errors without a more specific home).
    Internal,
}

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// File extension is not one the loader understands.
    #[error("Unsupported input format '{0}' (expected csv, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFormat(String),

    /// Input file exists but its contents cannot be parsed as a table.
    #[error("Failed to read '{}': {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    /// Spreadsheet could not be opened or parsed.
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Column exists but cannot be interpreted as the expected type.
    #[error("Column '{column}' cannot be used as {expected}: found {found}")]
    UnexpectedColumnType {
        column: String,
        expected: String,
        found: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// A column that must be complete still contains missing values.
    #[error("Column '{column}' contains {count} missing values")]
    MissingValues { column: String, count: usize },

    /// A text-tagged numeric cell contains no digits.
    #[error("No digits found in column '{column}' at row {row}: {value:?}")]
    DigitExtractionFailed {
        column: String,
        row: usize,
        value: String,
    },

    /// Destination could not be written.
    #[error("Failed to write '{}': {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::MalformedInput { .. } => "MALFORMED_INPUT",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::UnexpectedColumnType { .. } => "UNEXPECTED_COLUMN_TYPE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::MissingValues { .. } => "MISSING_VALUES",
            Self::DigitExtractionFailed { .. } => "DIGIT_EXTRACTION_FAILED",
            Self::WriteFailed { .. } => "WRITE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputNotFound(_)
            | Self::UnsupportedFormat(_)
            | Self::MalformedInput { .. }
            | Self::Spreadsheet(_) => ErrorKind::Input,
            Self::ColumnNotFound(_) | Self::UnexpectedColumnType { .. } => ErrorKind::Schema,
            Self::NoValidValues(_)
            | Self::MissingValues { .. }
            | Self::DigitExtractionFailed { .. } => ErrorKind::DataQuality,
            Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::WriteFailed { .. } => ErrorKind::Output,
            Self::Io(_) | Self::Polars(_) | Self::Json(_) => ErrorKind::Internal,
            Self::WithContext { source, .. } => source.kind(),
        }
    }
}

impl From<calamine::Error> for PipelineError {
    fn from(err: calamine::Error) -> Self {
        PipelineError::Spreadsheet(err.to_string())
    }
}

impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}
