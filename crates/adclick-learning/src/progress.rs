//! Progress reporting types for the pipeline runner.
//!
//! This module defines [`PipelineStage`], [`ProgressUpdate`] and the
//! [`ProgressCallback`] type alias.
//!
//! # Example
//!
//! ```rust,ignore
//! use adclick_learning::{Pipeline, ProgressUpdate};
//!
//! let pipeline = Pipeline::builder()
//!     .on_progress(|update: ProgressUpdate| {
//!         println!("[{}] {:.0}% - {}", update.stage, update.progress * 100.0, update.message);
//!         if let Some((done, total)) = update.models_completed {
//!             println!("  Models: {}/{}", done, total);
//!         }
//!     })
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The current stage of a pipeline run.
///
/// Stages run in this order:
///
/// 1. [`Loading`](Self::Loading) - reading the dataset
/// 2. [`Summarizing`](Self::Summarizing) - logging dataset statistics
/// 3. [`Preprocessing`](Self::Preprocessing) - splitting and scaling
/// 4. [`Training`](Self::Training) - fitting and scoring the candidates
/// 5. [`Saving`](Self::Saving) - writing the winning model
/// 6. [`Notifying`](Self::Notifying) - handing the result to the notifier
/// 7. [`Complete`](Self::Complete)
///
/// [`Failed`](Self::Failed) is reported instead of `Complete` when a stage
/// returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PipelineStage {
    #[default]
    Loading,
    Summarizing,
    Preprocessing,
    Training,
    Saving,
    Notifying,
    Complete,
    Failed,
}

impl PipelineStage {
    /// Returns the snake_case name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Loading => "loading",
            PipelineStage::Summarizing => "summarizing",
            PipelineStage::Preprocessing => "preprocessing",
            PipelineStage::Training => "training",
            PipelineStage::Saving => "saving",
            PipelineStage::Notifying => "notifying",
            PipelineStage::Complete => "complete",
            PipelineStage::Failed => "failed",
        }
    }

    /// Returns `true` for [`Complete`](Self::Complete) and [`Failed`](Self::Failed).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a [`PipelineStage`] from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePipelineStageError {
    invalid_value: String,
}

impl ParsePipelineStageError {
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.invalid_value
    }
}

impl fmt::Display for ParsePipelineStageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid pipeline stage: '{}'. Valid values are: loading, summarizing, \
             preprocessing, training, saving, notifying, complete, failed",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParsePipelineStageError {}

impl FromStr for PipelineStage {
    type Err = ParsePipelineStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(PipelineStage::Loading),
            "summarizing" => Ok(PipelineStage::Summarizing),
            "preprocessing" => Ok(PipelineStage::Preprocessing),
            "training" => Ok(PipelineStage::Training),
            "saving" => Ok(PipelineStage::Saving),
            "notifying" => Ok(PipelineStage::Notifying),
            "complete" => Ok(PipelineStage::Complete),
            "failed" => Ok(PipelineStage::Failed),
            _ => Err(ParsePipelineStageError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

/// A progress update from the pipeline runner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Overall progress from 0.0 to 1.0. Increases monotonically during a
    /// successful run.
    pub progress: f64,

    /// Human-readable status message.
    pub message: String,

    /// `(completed, total)` candidates; only set during
    /// [`Training`](PipelineStage::Training).
    pub models_completed: Option<(u32, u32)>,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, progress: f64, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress,
            message: message.into(),
            models_completed: None,
        }
    }

    #[must_use]
    pub fn with_models(mut self, completed: u32, total: u32) -> Self {
        self.models_completed = Some((completed, total));
        self
    }
}

/// Type alias for a progress callback function.
///
/// Callbacks must be `Send + Sync`; they run on the pipeline's thread and
/// should return quickly.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;
