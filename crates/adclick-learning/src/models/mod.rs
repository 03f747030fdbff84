//! Candidate classifiers.
//!
//! Three binary classifiers over `ndarray` feature matrices, trained in a
//! fixed order by the [`ModelSelector`](crate::ModelSelector):
//!
//! | Order | Candidate              | Type                     |
//! |-------|------------------------|--------------------------|
//! | 1     | Logistic Regression    | [`LogisticRegression`]   |
//! | 2     | Random Forest          | [`RandomForest`]         |
//! | 3     | Decision Tree          | [`DecisionTree`]         |
//!
//! Labels are `0` or `1`. Every model is serde-serializable so the winner
//! can be written into the model artifact.

mod decision_tree;
mod logistic;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeNode};
pub use logistic::LogisticRegression;
pub use random_forest::RandomForest;

use crate::config::SelectionConfig;
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trainable binary classifier.
pub trait Classifier {
    /// Fit on a feature matrix and its aligned label vector.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<()>;

    /// Predict a label for every row.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>>;

    /// Fraction of rows whose prediction equals the label.
    fn score(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<f64> {
        let predicted = self.predict(x)?;
        accuracy(predicted.view(), y)
    }

    fn is_fitted(&self) -> bool;
}

/// Fraction of positions where `predicted` equals `truth`, in `[0, 1]`.
///
/// # Errors
///
/// [`LearningError::InvalidData`] when the inputs are empty or differ in
/// length.
pub fn accuracy(predicted: ArrayView1<'_, i64>, truth: ArrayView1<'_, i64>) -> Result<f64> {
    if predicted.len() != truth.len() {
        return Err(LearningError::InvalidData(format!(
            "{} predictions for {} labels",
            predicted.len(),
            truth.len()
        )));
    }
    if truth.is_empty() {
        return Err(LearningError::InvalidData(
            "cannot score an empty set".to_string(),
        ));
    }

    let correct = predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Shared shape checks for `fit`.
pub(crate) fn check_training_data(x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(LearningError::InvalidData(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 {
        return Err(LearningError::InvalidData(
            "training set is empty".to_string(),
        ));
    }
    if x.ncols() == 0 {
        return Err(LearningError::InvalidData(
            "training set has no features".to_string(),
        ));
    }
    if let Some(bad) = y.iter().find(|v| **v != 0 && **v != 1) {
        return Err(LearningError::InvalidData(format!(
            "labels must be 0 or 1, found {bad}"
        )));
    }
    Ok(())
}

/// Shared shape checks for `predict`.
pub(crate) fn check_prediction_input(x: ArrayView2<'_, f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(LearningError::InvalidData(format!(
            "model was trained on {} features, got {}",
            n_features,
            x.ncols()
        )));
    }
    Ok(())
}

/// The fixed candidate kinds, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    LogisticRegression,
    RandomForest,
    DecisionTree,
}

impl CandidateKind {
    /// Every candidate in evaluation order. Ties go to the earlier entry.
    pub const ALL: [CandidateKind; 3] = [
        CandidateKind::LogisticRegression,
        CandidateKind::RandomForest,
        CandidateKind::DecisionTree,
    ];

    /// Human-readable name used in results and notifications.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            CandidateKind::LogisticRegression => "Logistic Regression",
            CandidateKind::RandomForest => "Random Forest",
            CandidateKind::DecisionTree => "Decision Tree",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One of the three candidate models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Candidate {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
}

impl Candidate {
    /// An unfitted candidate configured from `config`.
    pub fn new(kind: CandidateKind, config: &SelectionConfig) -> Self {
        match kind {
            CandidateKind::LogisticRegression => Candidate::LogisticRegression(
                LogisticRegression::from_params(&config.logistic_regression),
            ),
            CandidateKind::RandomForest => Candidate::RandomForest(RandomForest::from_params(
                &config.random_forest,
                config.random_seed,
            )),
            CandidateKind::DecisionTree => Candidate::DecisionTree(DecisionTree::from_params(
                &config.decision_tree,
                config.random_seed,
            )),
        }
    }

    #[must_use]
    pub fn kind(&self) -> CandidateKind {
        match self {
            Candidate::LogisticRegression(_) => CandidateKind::LogisticRegression,
            Candidate::RandomForest(_) => CandidateKind::RandomForest,
            Candidate::DecisionTree(_) => CandidateKind::DecisionTree,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    /// Structural check of a fitted model, used when reading one back from
    /// disk.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidData`] describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        match self {
            Candidate::LogisticRegression(m) => m.validate(),
            Candidate::RandomForest(m) => m.validate(),
            Candidate::DecisionTree(m) => m.validate(),
        }
    }
}

impl Classifier for Candidate {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<()> {
        match self {
            Candidate::LogisticRegression(m) => m.fit(x, y),
            Candidate::RandomForest(m) => m.fit(x, y),
            Candidate::DecisionTree(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        match self {
            Candidate::LogisticRegression(m) => m.predict(x),
            Candidate::RandomForest(m) => m.predict(x),
            Candidate::DecisionTree(m) => m.predict(x),
        }
    }

    fn is_fitted(&self) -> bool {
        match self {
            Candidate::LogisticRegression(m) => m.is_fitted(),
            Candidate::RandomForest(m) => m.is_fitted(),
            Candidate::DecisionTree(m) => m.is_fitted(),
        }
    }
}
