//! Configuration for candidate training and notification.
//!
//! This module provides [`SelectionConfig`] and its builder for the model
//! selector, the per-candidate hyperparameter structs, and
//! [`NotificationConfig`] for the notification boundary.
//!
//! # Example
//!
//! ```
//! use adclick_learning::SelectionConfig;
//!
//! let config = SelectionConfig::builder()
//!     .artifact_path("model/ad_click_model.sav")
//!     .random_seed(42)
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::LearningError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the persisted model.
pub const DEFAULT_ARTIFACT_PATH: &str = "model/ad_click_model.sav";

/// Default pipeline name used in notification subjects.
pub const DEFAULT_PIPELINE_NAME: &str = "ad_click_prediction";

/// Hyperparameters of the L2-regularized logistic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    /// Inverse regularization strength (default: 1.0). Must be positive.
    pub c: f64,
    /// Maximum gradient descent iterations (default: 1000).
    pub max_iter: usize,
    /// Gradient descent step size (default: 0.1).
    pub learning_rate: f64,
    /// Stop once the gradient norm drops below this (default: 1e-6).
    pub tol: f64,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.1,
            tol: 1e-6,
        }
    }
}

/// Hyperparameters of a single CART tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeParams {
    /// Maximum depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node (default: 2).
    pub min_samples_split: usize,
    /// Minimum samples in each leaf (default: 1).
    pub min_samples_leaf: usize,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Hyperparameters of the bagged tree ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    /// Number of trees (default: 100).
    pub n_estimators: usize,
    /// Draw a bootstrap sample per tree (default: true).
    pub bootstrap: bool,
    /// Settings of every tree. Each split considers `floor(sqrt(n_features))`
    /// randomly chosen features.
    pub tree: DecisionTreeParams,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            bootstrap: true,
            tree: DecisionTreeParams::default(),
        }
    }
}

/// Configuration of the model selector.
///
/// Use [`SelectionConfig::builder()`] to construct one with validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Where the winning model is written. Parent directories are created.
    pub artifact_path: PathBuf,

    /// Seed of every randomized candidate (default: 42).
    pub random_seed: u64,

    pub logistic_regression: LogisticRegressionParams,
    pub random_forest: RandomForestParams,
    pub decision_tree: DecisionTreeParams,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            random_seed: 42,
            logistic_regression: LogisticRegressionParams::default(),
            random_forest: RandomForestParams::default(),
            decision_tree: DecisionTreeParams::default(),
        }
    }
}

impl SelectionConfig {
    /// Create a new builder for `SelectionConfig`.
    #[must_use]
    pub fn builder() -> SelectionConfigBuilder {
        SelectionConfigBuilder::default()
    }

    /// Default configuration writing the artifact to `path`.
    pub fn with_artifact_path(path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: path.into(),
            ..Self::default()
        }
    }

    /// Check every hyperparameter.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidConfig`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), LearningError> {
        if self.artifact_path.as_os_str().is_empty() {
            return Err(LearningError::InvalidConfig(
                "artifact_path must not be empty".to_string(),
            ));
        }

        let lr = &self.logistic_regression;
        if !(lr.c > 0.0 && lr.c.is_finite()) {
            return Err(LearningError::InvalidConfig(
                "logistic_regression.c must be a positive number".to_string(),
            ));
        }
        if lr.max_iter == 0 {
            return Err(LearningError::InvalidConfig(
                "logistic_regression.max_iter must be at least 1".to_string(),
            ));
        }
        if !(lr.learning_rate > 0.0 && lr.learning_rate.is_finite()) {
            return Err(LearningError::InvalidConfig(
                "logistic_regression.learning_rate must be a positive number".to_string(),
            ));
        }

        if self.random_forest.n_estimators == 0 {
            return Err(LearningError::InvalidConfig(
                "random_forest.n_estimators must be at least 1".to_string(),
            ));
        }

        for (name, tree) in [
            ("random_forest.tree", &self.random_forest.tree),
            ("decision_tree", &self.decision_tree),
        ] {
            if tree.min_samples_split < 2 {
                return Err(LearningError::InvalidConfig(format!(
                    "{name}.min_samples_split must be at least 2"
                )));
            }
            if tree.min_samples_leaf == 0 {
                return Err(LearningError::InvalidConfig(format!(
                    "{name}.min_samples_leaf must be at least 1"
                )));
            }
            if tree.max_depth == Some(0) {
                return Err(LearningError::InvalidConfig(format!(
                    "{name}.max_depth must be at least 1"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`SelectionConfig`].
#[derive(Debug, Clone, Default)]
pub struct SelectionConfigBuilder {
    config: SelectionConfig,
}

impl SelectionConfigBuilder {
    /// Set the artifact location.
    #[must_use]
    pub fn artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.artifact_path = path.into();
        self
    }

    /// Set the seed of the randomized candidates (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    #[must_use]
    pub fn logistic_regression(mut self, params: LogisticRegressionParams) -> Self {
        self.config.logistic_regression = params;
        self
    }

    #[must_use]
    pub fn random_forest(mut self, params: RandomForestParams) -> Self {
        self.config.random_forest = params;
        self
    }

    #[must_use]
    pub fn decision_tree(mut self, params: DecisionTreeParams) -> Self {
        self.config.decision_tree = params;
        self
    }

    /// Set the number of trees in the ensemble (default: 100).
    #[must_use]
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.random_forest.n_estimators = n;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if a hyperparameter is out
    /// of range or the artifact path is empty.
    pub fn build(self) -> Result<SelectionConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Notification settings.
///
/// Notification is off unless `enabled` is set. When it is on, the runner
/// refuses to build without a notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub enabled: bool,
    /// Sender address shown in the message.
    pub sender: String,
    pub recipients: Vec<String>,
    /// Name used in the subject line.
    pub pipeline_name: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sender: String::new(),
            recipients: Vec::new(),
            pipeline_name: DEFAULT_PIPELINE_NAME.to_string(),
        }
    }
}

impl NotificationConfig {
    /// Enabled configuration with the given sender and recipients.
    pub fn enabled(sender: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            enabled: true,
            sender: sender.into(),
            recipients,
            ..Self::default()
        }
    }

    /// Disabled configuration.
    pub fn disabled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pipeline_name(mut self, name: impl Into<String>) -> Self {
        self.pipeline_name = name.into();
        self
    }

    /// Parse a comma separated recipient list, dropping empty entries.
    pub fn parse_recipients(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check that an enabled configuration has somewhere to send to.
    pub fn validate(&self) -> Result<(), LearningError> {
        if self.enabled && self.recipients.is_empty() {
            return Err(LearningError::InvalidConfig(
                "notification is enabled but no recipients are configured".to_string(),
            ));
        }
        if self.pipeline_name.trim().is_empty() {
            return Err(LearningError::InvalidConfig(
                "pipeline_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
