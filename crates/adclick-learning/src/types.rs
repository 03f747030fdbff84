//! Result types returned by the selector and consumed by notification.
//!
//! - [`SelectionResult`]: the outcome of one selection run
//! - [`ModelScore`]: accuracy of one candidate
//! - [`DatasetContext`]: facts about the training data quoted in messages

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Test-set accuracy of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    /// Display name of the candidate (e.g. "Random Forest").
    pub name: String,
    /// Accuracy in `[0, 1]`.
    pub accuracy: f64,
}

impl ModelScore {
    pub fn new(name: impl Into<String>, accuracy: f64) -> Self {
        Self {
            name: name.into(),
            accuracy,
        }
    }
}

/// Outcome of a selection run.
///
/// Created once per run by [`ModelSelector::select`](crate::ModelSelector::select)
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Name of the winning candidate.
    pub best_model_name: String,

    /// Test accuracy of the winner. Equal to the maximum of `all_scores`.
    pub accuracy: f64,

    /// Accuracy of every candidate, in evaluation order.
    pub all_scores: Vec<ModelScore>,

    /// Local time the result was produced.
    pub trained_at: String,

    /// Where the winning model was written.
    pub artifact_path: PathBuf,
}

impl SelectionResult {
    /// Candidate name to accuracy.
    pub fn scores(&self) -> HashMap<&str, f64> {
        self.all_scores
            .iter()
            .map(|s| (s.name.as_str(), s.accuracy))
            .collect()
    }

    /// Accuracy of one candidate by display name.
    pub fn score_of(&self, name: &str) -> Option<f64> {
        self.all_scores
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.accuracy)
    }
}

/// Facts about the dataset a run was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetContext {
    /// Dataset name shown to readers.
    pub name: String,
    /// Number of rows in the loaded table.
    pub samples: usize,
    /// Short task description.
    pub task: String,
}

impl DatasetContext {
    pub fn new(samples: usize) -> Self {
        Self {
            name: "Advertising Click Data".to_string(),
            samples,
            task: "Binary Classification".to_string(),
        }
    }
}

static_assertions::assert_impl_all!(SelectionResult: Send, Sync);
static_assertions::assert_impl_all!(DatasetContext: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> SelectionResult {
        SelectionResult {
            best_model_name: "Random Forest".to_string(),
            accuracy: 0.96,
            all_scores: vec![
                ModelScore::new("Logistic Regression", 0.95),
                ModelScore::new("Random Forest", 0.96),
                ModelScore::new("Decision Tree", 0.93),
            ],
            trained_at: "2026-10-19 10:00:00.000000".to_string(),
            artifact_path: PathBuf::from("model/ad_click_model.sav"),
        }
    }

    #[test]
    fn test_scores_mapping() {
        let r = result();
        let scores = r.scores();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores["Decision Tree"], 0.93);
        assert_eq!(r.score_of("Random Forest"), Some(0.96));
        assert_eq!(r.score_of("SVM"), None);
    }

    #[test]
    fn test_result_serializes_in_order() {
        let json = serde_json::to_value(result()).unwrap();
        assert_eq!(json["best_model_name"], "Random Forest");
        assert_eq!(json["all_scores"][0]["name"], "Logistic Regression");
        assert_eq!(json["all_scores"][2]["name"], "Decision Tree");
    }
}
