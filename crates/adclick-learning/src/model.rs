//! Persisted model artifact and the reuse read path.
//!
//! This module provides [`TrainedModel`], the winning candidate together
//! with its selection metadata, and:
//!
//! - **Serialization** via [`save()`](TrainedModel::save), [`load()`](TrainedModel::load),
//!   [`to_bytes()`](TrainedModel::to_bytes) and [`from_bytes()`](TrainedModel::from_bytes)
//! - **Inference** via [`predict()`](TrainedModel::predict) and [`score()`](TrainedModel::score)
//! - **Reuse** via [`predict_first`], which reloads an artifact and predicts
//!   the first row of a test set
//!
//! # Format
//!
//! An artifact is one `bincode` file holding a [`ModelArtifact`]: a format
//! version, the winner's display name, its accuracy, the training time, the
//! feature names and the fitted model. Encoding uses fixed-width integers
//! and rejects trailing bytes. Files written with a different format
//! version, or whose model fails its structural check, are rejected as
//! [`LearningError::Serialization`].
//!
//! # Example
//!
//! ```rust,ignore
//! use adclick_learning::TrainedModel;
//!
//! let model = TrainedModel::load("model/ad_click_model.sav")?;
//! println!("{} trained at {}", model.model_name(), model.trained_at());
//! let labels = model.predict(split.x_test())?;
//! ```

use crate::error::{LearningError, Result};
use crate::models::{Candidate, Classifier};
use adclick_processing::Split;
use bincode::Options;
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Version written into every artifact.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// On-disk form of a selected model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Display name of the winning candidate.
    pub model_name: String,
    /// Test accuracy recorded at selection time.
    pub accuracy: f64,
    pub trained_at: String,
    /// Feature columns the model was trained on, in order.
    pub feature_names: Vec<String>,
    pub model: Candidate,
}

/// A fitted model ready for inference.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    artifact: ModelArtifact,
}

impl TrainedModel {
    /// Wrap a fitted candidate.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidData`] if the candidate has not been fitted.
    pub fn new(
        model: Candidate,
        accuracy: f64,
        trained_at: impl Into<String>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if !model.is_fitted() {
            return Err(LearningError::InvalidData(format!(
                "{} has not been fitted",
                model.name()
            )));
        }

        Ok(Self {
            artifact: ModelArtifact {
                format_version: ARTIFACT_FORMAT_VERSION,
                model_name: model.name().to_string(),
                accuracy,
                trained_at: trained_at.into(),
                feature_names,
                model,
            },
        })
    }

    /// Load an artifact from disk.
    ///
    /// # Errors
    ///
    /// - [`LearningError::ModelNotFound`] if the file does not exist
    /// - [`LearningError::Serialization`] if it cannot be decoded
    /// - [`LearningError::Io`] if it cannot be read
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LearningError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = fs::read(path)?;
        let model = Self::from_bytes(&bytes)?;
        debug!("Loaded {} from {}", model.model_name(), path.display());
        Ok(model)
    }

    /// Write the artifact, creating parent directories and replacing any
    /// existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_bytes()?)?;
        info!("Model saved to {}", path.display());
        Ok(())
    }

    /// Encode the artifact as bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode_options().serialize(&self.artifact)?)
    }

    /// Decode an artifact produced by [`to_bytes()`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// [`LearningError::Serialization`] if the bytes do not decode, carry
    /// trailing data, come from another format version, or hold a model
    /// that is unfitted or internally inconsistent.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let artifact: ModelArtifact = bincode_options().deserialize(bytes)?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(LearningError::Serialization(format!(
                "unsupported artifact format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if !artifact.model.is_fitted() {
            return Err(LearningError::Serialization(
                "artifact contains an unfitted model".to_string(),
            ));
        }
        artifact.model.validate().map_err(|e| {
            LearningError::Serialization(format!("artifact contains a malformed model: {e}"))
        })?;

        Ok(Self { artifact })
    }

    /// Predict a label for every row.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        self.artifact.model.predict(x)
    }

    /// Accuracy on a labelled set.
    pub fn score(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<f64> {
        self.artifact.model.score(x, y)
    }

    pub fn model_name(&self) -> &str {
        &self.artifact.model_name
    }

    /// Accuracy recorded when the model was selected.
    pub fn accuracy(&self) -> f64 {
        self.artifact.accuracy
    }

    pub fn trained_at(&self) -> &str {
        &self.artifact.trained_at
    }

    pub fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    pub fn model(&self) -> &Candidate {
        &self.artifact.model
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

static_assertions::assert_impl_all!(TrainedModel: Send, Sync);

/// Reload the artifact at `path`, log its accuracy on the test set of
/// `split`, and return the prediction for the first test row.
///
/// # Errors
///
/// - [`LearningError::ModelNotFound`] if no artifact exists at `path`
/// - [`LearningError::Serialization`] if the artifact is corrupt
/// - [`LearningError::InvalidData`] if the test set is empty or its
///   features differ from the ones the model was trained on
pub fn predict_first(split: &Split, path: impl AsRef<Path>) -> Result<i64> {
    let model = TrainedModel::load(path)?;

    if split.n_test() == 0 {
        return Err(LearningError::InvalidData("test set is empty".to_string()));
    }
    if !model.feature_names().is_empty() && model.feature_names() != split.feature_names() {
        return Err(LearningError::InvalidData(format!(
            "model expects features {:?}, split has {:?}",
            model.feature_names(),
            split.feature_names()
        )));
    }

    let accuracy = model.score(split.x_test(), split.y_test())?;
    info!(
        "Loaded {} model, test accuracy: {:.4}",
        model.model_name(),
        accuracy
    );

    let predictions = model.predict(split.x_test())?;
    predictions
        .first()
        .copied()
        .ok_or_else(|| LearningError::InvalidData("no prediction produced".to_string()))
}
