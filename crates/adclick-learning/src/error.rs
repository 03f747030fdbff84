//! Error types for the adclick-learning crate.
//!
//! This module defines [`LearningError`], the error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.
//!
//! # Error Handling
//!
//! Errors are:
//! - **Fatal for the run**: a failed candidate aborts selection, no partial
//!   result is produced
//! - **Coded**: [`LearningError::error_code`] gives a stable identifier
//! - **Serializable**: errors serialize as `{code, message}`
//!
//! Notification problems are the one exception: they are reported through
//! [`NotificationOutcome`](crate::NotificationOutcome) and never escape
//! [`notify`](crate::notify).
//!
//! # Example
//!
//! ```rust,ignore
//! use adclick_learning::{LearningError, SelectionConfig};
//!
//! fn configure() -> Result<SelectionConfig, LearningError> {
//!     let config = SelectionConfig::builder()
//!         .artifact_path("model/ad_click_model.sav")
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use adclick_processing::ProcessingError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for adclick-learning operations.
///
/// Covers configuration, candidate training, artifact persistence and the
/// data errors bubbling up from `adclick-processing`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the selector or the runner.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training or prediction.
    ///
    /// Common causes:
    /// - the training labels contain a single class
    /// - the feature matrix and the label vector disagree in length
    /// - the test set is empty
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A candidate model failed to train. Selection is aborted.
    #[error("Training failed for {model}: {reason}")]
    TrainingFailed {
        /// Display name of the candidate.
        model: String,
        /// What went wrong.
        reason: String,
    },

    /// The model artifact does not exist.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The artifact could not be encoded or decoded.
    ///
    /// A file that exists but fails to decode is reported here, including
    /// artifacts written by an incompatible format version.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A notifier failed to deliver a message.
    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    /// Loading or preprocessing failed.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// I/O error during artifact or outbox writes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<bincode::Error> for LearningError {
    fn from(err: bincode::Error) -> Self {
        LearningError::Serialization(err.to_string())
    }
}

impl LearningError {
    /// Shorthand for a [`LearningError::TrainingFailed`].
    pub fn training(model: impl Into<String>, reason: impl Into<String>) -> Self {
        LearningError::TrainingFailed {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::TrainingFailed { .. } => "TRAINING_FAILED",
            Self::ModelNotFound { .. } => "MODEL_NOT_FOUND",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::NotificationFailed(_) => "NOTIFICATION_FAILED",
            Self::Processing(inner) => inner.error_code(),
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

impl Serialize for LearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("LearningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
