//! Best-of-three model selection.
//!
//! [`ModelSelector`] trains every candidate on the train rows of a
//! [`Split`], scores it on the test rows and keeps a running best. A
//! candidate replaces the best only with a strictly higher accuracy, so
//! ties go to the earliest candidate in
//! [`CandidateKind::ALL`](crate::models::CandidateKind::ALL). The winner is
//! written to the artifact path.
//!
//! A candidate that fails to train aborts the whole selection; no result
//! is chosen from the remaining ones.

use crate::config::SelectionConfig;
use crate::error::{LearningError, Result};
use crate::model::TrainedModel;
use crate::models::{Candidate, CandidateKind, Classifier};
use crate::progress::{PipelineStage, ProgressCallback, ProgressUpdate};
use crate::types::{ModelScore, SelectionResult};
use adclick_processing::Split;
use std::path::Path;
use tracing::{debug, info};

/// Format of [`SelectionResult::trained_at`].
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Trains the fixed candidates and persists the best one.
pub struct ModelSelector {
    config: SelectionConfig,
    progress_callback: Option<ProgressCallback>,
    progress_range: (f64, f64),
}

impl std::fmt::Debug for ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSelector")
            .field("config", &self.config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ModelSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            progress_callback: None,
            progress_range: (0.0, 1.0),
        }
    }

    /// Report per-candidate progress, mapped linearly onto `start..end` of
    /// the overall run.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback, start: f64, end: f64) -> Self {
        self.progress_callback = Some(callback);
        self.progress_range = (start, end);
        self
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Train and score every candidate in evaluation order.
    ///
    /// # Errors
    ///
    /// [`LearningError::TrainingFailed`] for the first candidate that cannot
    /// be fitted or scored.
    pub fn evaluate(&self, split: &Split) -> Result<Vec<(Candidate, f64)>> {
        if split.n_train() == 0 || split.n_test() == 0 {
            return Err(LearningError::InvalidData(format!(
                "need non-empty train and test sets, got {} / {}",
                split.n_train(),
                split.n_test()
            )));
        }

        let total = CandidateKind::ALL.len() as u32;
        let mut trained = Vec::with_capacity(CandidateKind::ALL.len());

        for (done, kind) in CandidateKind::ALL.into_iter().enumerate() {
            self.report(done as u32, total, format!("Training {kind}"));
            debug!("Fitting {} on {} rows", kind, split.n_train());

            let mut model = Candidate::new(kind, &self.config);
            model
                .fit(split.x_train(), split.y_train())
                .map_err(|e| training_error(kind, e))?;
            let accuracy = model
                .score(split.x_test(), split.y_test())
                .map_err(|e| training_error(kind, e))?;

            info!("{} accuracy: {:.4}", kind, accuracy);
            trained.push((model, accuracy));
        }

        self.report(total, total, "All candidates trained".to_string());
        Ok(trained)
    }

    /// Train every candidate, persist the best and describe the outcome.
    ///
    /// # Errors
    ///
    /// - [`LearningError::TrainingFailed`] if any candidate fails
    /// - [`LearningError::Io`] or [`LearningError::Serialization`] if the
    ///   artifact cannot be written
    pub fn select(&self, split: &Split) -> Result<SelectionResult> {
        let mut trained = self.evaluate(split)?;

        let all_scores: Vec<ModelScore> = trained
            .iter()
            .map(|(model, accuracy)| ModelScore::new(model.name(), *accuracy))
            .collect();
        let accuracies: Vec<f64> = all_scores.iter().map(|s| s.accuracy).collect();
        let best_idx = pick_best(&accuracies)
            .ok_or_else(|| LearningError::InvalidData("no candidates were evaluated".to_string()))?;

        let (model, accuracy) = trained.swap_remove(best_idx);
        let best_model_name = model.name().to_string();
        let trained_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

        self.report_stage(
            PipelineStage::Saving,
            format!("Saving {best_model_name}"),
        );
        TrainedModel::new(
            model,
            accuracy,
            trained_at.clone(),
            split.feature_names().to_vec(),
        )?
        .save(&self.config.artifact_path)?;

        info!(
            "Best model: {} with accuracy: {:.4}",
            best_model_name, accuracy
        );

        Ok(SelectionResult {
            best_model_name,
            accuracy,
            all_scores,
            trained_at,
            artifact_path: self.config.artifact_path.clone(),
        })
    }

    fn report_stage(&self, stage: PipelineStage, message: String) {
        if let Some(callback) = &self.progress_callback {
            callback(ProgressUpdate::new(stage, self.progress_range.1, message));
        }
    }

    fn report(&self, done: u32, total: u32, message: String) {
        if let Some(callback) = &self.progress_callback {
            let (start, end) = self.progress_range;
            let progress = start + (end - start) * f64::from(done) / f64::from(total.max(1));
            callback(
                ProgressUpdate::new(PipelineStage::Training, progress, message)
                    .with_models(done, total),
            );
        }
    }
}

/// Index of the best accuracy. Only a strictly greater value replaces the
/// running best, so the earliest of equal values wins.
pub fn pick_best(accuracies: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, accuracy) in accuracies.iter().copied().enumerate() {
        if best.is_none_or(|(_, current)| accuracy > current) {
            best = Some((idx, accuracy));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Train the candidates with default hyperparameters and write the winner
/// to `artifact_path`.
pub fn select_best(split: &Split, artifact_path: impl AsRef<Path>) -> Result<SelectionResult> {
    ModelSelector::new(SelectionConfig::with_artifact_path(artifact_path.as_ref())).select(split)
}

fn training_error(kind: CandidateKind, err: LearningError) -> LearningError {
    match err {
        LearningError::InvalidData(reason) | LearningError::InvalidConfig(reason) => {
            LearningError::training(kind.display_name(), reason)
        }
        other => LearningError::training(kind.display_name(), other.to_string()),
    }
}
