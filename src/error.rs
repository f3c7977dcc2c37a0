//! Error types for the MIV AutoML wizard

use thiserror::Error;

/// Result type alias for MIV operations
pub type Result<T> = std::result::Result<T, MivError>;

/// Main error type for the wizard
#[derive(Error, Debug)]
pub enum MivError {
    /// Uploaded content could not be parsed into a table
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// Target column is neither textual nor numeric
    #[error("Unknown problem type for target column '{0}'")]
    UnknownProblemType(String),

    /// The automated model search raised
    #[error("Model search failed: {0}")]
    ModelSearchFailure(String),

    /// One results section could not be rendered
    #[error("Presentation failure in {section}: {reason}")]
    PresentationFailure { section: String, reason: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Plot '{plot}' is not supported for {model}")]
    UnsupportedPlot { plot: String, model: String },

    #[error("Unsupported file extension '{found}', expected one of: {expected}")]
    UnsupportedExtension { found: String, expected: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data error: {0}")]
    Polars(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl From<polars::error::PolarsError> for MivError {
    fn from(err: polars::error::PolarsError) -> Self {
        MivError::Polars(err.to_string())
    }
}

impl From<serde_json::Error> for MivError {
    fn from(err: serde_json::Error) -> Self {
        MivError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for MivError {
    fn from(err: ndarray::ShapeError) -> Self {
        MivError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<dialoguer::Error> for MivError {
    fn from(err: dialoguer::Error) -> Self {
        MivError::Prompt(err.to_string())
    }
}
