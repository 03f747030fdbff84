//! adclick-learning: model comparison, selection and persistence for the
//! ad-click pipeline.
//!
//! This crate takes the [`Split`](adclick_processing::Split) produced by
//! `adclick-processing`, trains three candidate classifiers on it, keeps the
//! most accurate one and writes it to disk together with its selection
//! metadata.
//!
//! # Features
//!
//! - **Candidates**: logistic regression, random forest and decision tree,
//!   trained natively on `ndarray` and seeded for reproducibility
//! - **Selection**: strictly-greater accuracy wins, ties keep the earlier
//!   candidate
//! - **Persistence**: one versioned `bincode` artifact per run
//! - **Notification**: optional success message through a [`Notifier`],
//!   whose failures never fail the run
//! - **Progress Reporting**: stage-level callbacks from the [`Pipeline`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use adclick_learning::{Pipeline, SelectionConfig};
//!
//! let pipeline = Pipeline::builder()
//!     .selection(SelectionConfig::with_artifact_path("model/ad_click_model.sav"))
//!     .on_progress(|u| println!("{:.0}% - {}", u.progress * 100.0, u.message))
//!     .build()?;
//!
//! let run = pipeline.run()?;
//! for score in &run.selection.all_scores {
//!     println!("{}: {:.4}", score.name, score.accuracy);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! load_data ──► summarize ──► preprocess ──► ModelSelector ──► TrainedModel (.sav)
//!                                                 │
//!                                                 ▼
//!                                          SelectionResult ──► notify
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, LearningError>`](Result):
//!
//! - [`LearningError::Processing`] - the dataset could not be loaded or prepared
//! - [`LearningError::TrainingFailed`] - a candidate could not be trained
//! - [`LearningError::ModelNotFound`] - no artifact at the given path
//! - [`LearningError::Serialization`] - the artifact is corrupt or from another format version
//!
//! See [`LearningError`] for the complete list.
//!
//! # Model Reuse
//!
//! ```rust,ignore
//! let model = TrainedModel::load("model/ad_click_model.sav")?;
//! let labels = model.predict(split.x_test())?;
//!
//! // or, in one step
//! let first = adclick_learning::predict_first(&split, "model/ad_click_model.sav")?;
//! ```

mod config;
mod error;
mod model;
pub mod models;
mod notify;
mod pipeline;
mod progress;
mod selector;
mod types;

// Re-export public API
//
// Configuration types
pub use config::{
    DEFAULT_ARTIFACT_PATH, DEFAULT_PIPELINE_NAME, DecisionTreeParams, LogisticRegressionParams,
    NotificationConfig, RandomForestParams, SelectionConfig, SelectionConfigBuilder,
};
// Error types
pub use error::{LearningError, Result};
// Model artifact and reuse
pub use model::{ARTIFACT_FORMAT_VERSION, ModelArtifact, TrainedModel, predict_first};
// Candidate classifiers
pub use models::{Candidate, CandidateKind, Classifier, accuracy};
// Notification
pub use notify::{LogNotifier, NotificationMessage, NotificationOutcome, Notifier, OutboxNotifier, notify};
// Pipeline types
pub use pipeline::{Pipeline, PipelineBuilder, PipelineRun};
// Progress reporting types
pub use progress::{ParsePipelineStageError, PipelineStage, ProgressCallback, ProgressUpdate};
// Selection
pub use selector::{ModelSelector, pick_best, select_best};
// Result types
pub use types::{DatasetContext, ModelScore, SelectionResult};
