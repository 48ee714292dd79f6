//! Error types for tabreport

use thiserror::Error;

/// Result type alias for tabreport operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Main error type for report generation and feature selection
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Duplicate model name: {0}")]
    DuplicateModel(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for ReportError {
    fn from(err: polars::error::PolarsError) -> Self {
        ReportError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ReportError {
    fn from(err: ndarray::ShapeError) -> Self {
        ReportError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportError::ModelNotFound("ridge".to_string());
        assert_eq!(err.to_string(), "Model not found: ridge");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReportError = io_err.into();
        assert!(matches!(err, ReportError::IoError(_)));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = ReportError::InvalidParameter {
            name: "k".to_string(),
            value: "7".to_string(),
            reason: "must be <= n_features (3)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter: k = 7, must be <= n_features (3)"
        );
    }
}
