//! End-to-end pipeline runner.
//!
//! This module provides the [`Pipeline`] struct and its builder. A run
//! executes these stages in order:
//!
//! 1. **Loading** - read the dataset from the first existing candidate path
//! 2. **Summarizing** - log shape, label balance and column statistics
//! 3. **Preprocessing** - seeded train/test partition, scaling fitted on train rows
//! 4. **Training** - fit and score every candidate classifier
//! 5. **Saving** - persist the most accurate candidate
//! 6. **Notifying** - hand the result to the configured [`Notifier`]
//!
//! Any stage error aborts the run and is returned to the caller, except
//! notification: a delivery failure is recorded in
//! [`PipelineRun::notification`] and the run still succeeds.
//!
//! # Example
//!
//! ```rust,ignore
//! use adclick_learning::{LogNotifier, NotificationConfig, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .notification(NotificationConfig::enabled("bot@example.com", recipients))
//!     .notifier(LogNotifier)
//!     .on_progress(|update| {
//!         println!("[{}] {:.0}% - {}", update.stage, update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let run = pipeline.run()?;
//! println!("Best model: {} ({:.4})", run.selection.best_model_name, run.selection.accuracy);
//! ```

use crate::config::{NotificationConfig, SelectionConfig};
use crate::error::{LearningError, Result};
use crate::notify::{NotificationOutcome, Notifier, notify};
use crate::progress::{PipelineStage, ProgressCallback, ProgressUpdate};
use crate::selector::ModelSelector;
use crate::types::{DatasetContext, SelectionResult};
use adclick_processing::{DatasetReporter, DatasetSummary, PipelineConfig, load_data, preprocess};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Share of overall progress covered by candidate training.
const TRAINING_RANGE: (f64, f64) = (0.4, 0.8);

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    pub summary: DatasetSummary,
    pub selection: SelectionResult,
    pub notification: NotificationOutcome,
}

/// The ad-click model pipeline.
///
/// Use [`Pipeline::builder()`] to construct one. A pipeline holds no state
/// between runs; [`run()`](Self::run) may be called repeatedly and every
/// call overwrites the artifact.
pub struct Pipeline {
    data: PipelineConfig,
    selection: SelectionConfig,
    notification: NotificationConfig,
    notifier: Option<Arc<dyn Notifier>>,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("data", &self.data)
            .field("selection", &self.selection)
            .field("notification", &self.notification)
            .field("notifier", &self.notifier.as_ref().map(|n| n.name()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Pipeline {
    /// Create a new builder for `Pipeline`.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Run every stage.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError`] if:
    /// - [`Processing`](LearningError::Processing): the dataset is missing or
    ///   does not have the expected columns
    /// - [`InvalidData`](LearningError::InvalidData): the partition is empty
    /// - [`TrainingFailed`](LearningError::TrainingFailed): a candidate could
    ///   not be trained or scored
    /// - [`Io`](LearningError::Io) or [`Serialization`](LearningError::Serialization):
    ///   the artifact could not be written
    pub fn run(&self) -> Result<PipelineRun> {
        let mut progress = 0.0;
        match self.run_stages(&mut progress) {
            Ok(run) => {
                self.report(PipelineStage::Complete, 1.0, "Pipeline complete");
                info!(
                    "Pipeline complete: {} selected with accuracy {:.4}",
                    run.selection.best_model_name, run.selection.accuracy
                );
                Ok(run)
            }
            Err(e) => {
                error!("Pipeline failed: {}", e);
                self.report(PipelineStage::Failed, progress, e.to_string());
                Err(e)
            }
        }
    }

    fn run_stages(&self, progress: &mut f64) -> Result<PipelineRun> {
        self.advance(progress, PipelineStage::Loading, 0.0, "Loading dataset");
        let df = load_data(&self.data.candidate_paths)?;

        self.advance(progress, PipelineStage::Summarizing, 0.2, "Summarizing dataset");
        let summary = DatasetReporter::from_config(&self.data).report(&df)?;

        self.advance(
            progress,
            PipelineStage::Preprocessing,
            0.3,
            "Splitting and scaling features",
        );
        let split = preprocess(&df, &self.data)?;
        info!(
            "Preprocessed: {} train rows, {} test rows, {} features",
            split.n_train(),
            split.n_test(),
            split.n_features()
        );

        *progress = TRAINING_RANGE.0;
        let mut selector = ModelSelector::new(self.selection.clone());
        if let Some(callback) = &self.progress_callback {
            selector =
                selector.with_progress(Arc::clone(callback), TRAINING_RANGE.0, TRAINING_RANGE.1);
        }
        let selection = selector.select(&split)?;

        self.advance(progress, PipelineStage::Notifying, 0.9, "Sending notification");
        let notification = notify(
            self.notifier.as_deref(),
            &self.notification,
            &selection,
            &DatasetContext::new(df.height()),
        );

        Ok(PipelineRun {
            summary,
            selection,
            notification,
        })
    }

    fn advance(&self, progress: &mut f64, stage: PipelineStage, value: f64, message: &str) {
        *progress = value;
        self.report(stage, value, message);
    }

    fn report(&self, stage: PipelineStage, progress: f64, message: impl Into<String>) {
        if let Some(callback) = &self.progress_callback {
            callback(ProgressUpdate::new(stage, progress, message));
        }
    }

    pub fn data_config(&self) -> &PipelineConfig {
        &self.data
    }

    pub fn selection_config(&self) -> &SelectionConfig {
        &self.selection
    }

    pub fn notification_config(&self) -> &NotificationConfig {
        &self.notification
    }
}

/// Builder for [`Pipeline`].
///
/// Every setting is optional. Without one the defaults apply: the standard
/// dataset locations, the default artifact path and no notification.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::builder().random_seed(7).build()?)
///     .selection(SelectionConfig::with_artifact_path("out/model.sav"))
///     .on_progress(|update| println!("{}", update.message))
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    data: Option<PipelineConfig>,
    selection: Option<SelectionConfig>,
    notification: Option<NotificationConfig>,
    notifier: Option<Arc<dyn Notifier>>,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("data", &self.data)
            .field("selection", &self.selection)
            .field("notification", &self.notification)
            .field("notifier", &self.notifier.as_ref().map(|n| n.name()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl PipelineBuilder {
    /// Set the loading and preprocessing configuration.
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.data = Some(config);
        self
    }

    /// Set the candidate hyperparameters and artifact path.
    #[must_use]
    pub fn selection(mut self, config: SelectionConfig) -> Self {
        self.selection = Some(config);
        self
    }

    /// Set the notification capability.
    #[must_use]
    pub fn notification(mut self, config: NotificationConfig) -> Self {
        self.notification = Some(config);
        self
    }

    /// Set the notifier used when notification is enabled.
    #[must_use]
    pub fn notifier<N>(mut self, notifier: N) -> Self
    where
        N: Notifier + 'static,
    {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Set the progress callback (optional).
    ///
    /// The callback should execute quickly; it runs on the pipeline's thread.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if any configuration is
    /// invalid, or if notification is enabled without a notifier.
    pub fn build(self) -> Result<Pipeline> {
        let data = self.data.unwrap_or_default();
        data.validate()
            .map_err(|e| LearningError::InvalidConfig(e.to_string()))?;

        let selection = self.selection.unwrap_or_default();
        selection.validate()?;

        let notification = self.notification.unwrap_or_default();
        notification.validate()?;
        if notification.enabled && self.notifier.is_none() {
            return Err(LearningError::InvalidConfig(
                "Notification is enabled but no notifier was provided".to_string(),
            ));
        }

        Ok(Pipeline {
            data,
            selection,
            notification,
            notifier: self.notifier,
            progress_callback: self.progress_callback,
        })
    }
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[test]
    fn test_builder_defaults() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert!(!pipeline.notification_config().enabled);
        assert_eq!(
            pipeline.selection_config().artifact_path,
            PathBuf::from(crate::config::DEFAULT_ARTIFACT_PATH)
        );
        assert_eq!(pipeline.data_config().test_size, 0.3);
    }

    #[test]
    fn test_enabled_notification_requires_notifier() {
        let err = Pipeline::builder()
            .notification(NotificationConfig::enabled(
                "bot@example.com",
                vec!["team@example.com".to_string()],
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, LearningError::InvalidConfig(_)));
        assert!(err.to_string().contains("no notifier"));
    }

    #[test]
    fn test_invalid_data_config_rejected() {
        let mut data = PipelineConfig::default();
        data.test_size = 1.5;
        let err = Pipeline::builder().config(data).build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_builder_debug() {
        let builder = Pipeline::builder()
            .notifier(LogNotifier)
            .on_progress(|_| {});
        let debug_str = format!("{:?}", builder);
        assert!(debug_str.contains("PipelineBuilder"));
        assert!(debug_str.contains("<callback>"));
        assert!(debug_str.contains("\"log\""));
    }

    #[test]
    fn test_missing_dataset_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let data = PipelineConfig::builder()
            .candidate_paths(vec![dir.path().join("absent.csv")])
            .build()
            .unwrap();
        let pipeline = Pipeline::builder()
            .config(data)
            .selection(SelectionConfig::with_artifact_path(dir.path().join("m.sav")))
            .on_progress(move |u| sink.lock().unwrap().push(u.stage))
            .build()
            .unwrap();

        let err = pipeline.run().unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(
            *seen.lock().unwrap(),
            [PipelineStage::Loading, PipelineStage::Failed]
        );
        assert!(!dir.path().join("m.sav").exists());
    }
}
