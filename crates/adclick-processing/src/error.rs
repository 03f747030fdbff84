//! Custom error types for dataset loading and preprocessing.
//!
//! This module provides the error hierarchy for the processing crate using
//! `thiserror`. Every failure in the loader, the reporter and the
//! preprocessor is fatal for the current run and propagates to the caller.
//!
//! Errors are serializable as `{code, message}` so an outer surface
//! (a scheduler, a notification, a JSON report) can display them.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the processing crate.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// None of the candidate dataset locations exists.
    #[error("Dataset not found. Tried: {}", display_paths(.attempted))]
    NotFound { attempted: Vec<PathBuf> },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A column is present but its values cannot be used as expected.
    #[error("Schema mismatch in column '{column}': {reason}")]
    SchemaMismatch { column: String, reason: String },

    /// A matrix does not have the column count a fitted transform expects.
    #[error("Shape mismatch: expected {expected} columns, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

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
        source: Box<ProcessingError>,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    let rendered: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a [`ProcessingError::SchemaMismatch`].
    pub fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        ProcessingError::SchemaMismatch {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Get a stable error code for callers that branch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ColumnNotFound(_) | Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error means the input dataset could not be located.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a schema problem in the input table.
    pub fn is_schema_mismatch(&self) -> bool {
        self.error_code() == "SCHEMA_MISMATCH"
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

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
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = ProcessingError::NotFound {
            attempted: vec![PathBuf::from("a.csv")],
        };
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(
            ProcessingError::ColumnNotFound("Age".to_string()).error_code(),
            "SCHEMA_MISMATCH"
        );
        assert_eq!(
            ProcessingError::schema("Male", "contains nulls").error_code(),
            "SCHEMA_MISMATCH"
        );
    }

    #[test]
    fn test_not_found_lists_every_path() {
        let err = ProcessingError::NotFound {
            attempted: vec![PathBuf::from("data/a.csv"), PathBuf::from("b.csv")],
        };
        let message = err.to_string();
        assert!(message.contains("data/a.csv"));
        assert!(message.contains("b.csv"));
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("SCHEMA_MISMATCH"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context_preserves_kind() {
        let error = ProcessingError::NotFound { attempted: vec![] }.with_context("During load");
        assert!(error.to_string().contains("During load"));
        assert_eq!(error.error_code(), "NOT_FOUND");
        assert!(error.is_not_found());
        assert!(!error.is_schema_mismatch());
    }
}
