//! Configuration types for loading and preprocessing the dataset.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. The defaults describe the
//! advertising click dataset.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the binary label column.
pub const LABEL_COLUMN: &str = "Clicked on Ad";

/// Columns removed from the feature set before training.
pub const EXCLUDED_COLUMNS: [&str; 5] = [
    "Timestamp",
    LABEL_COLUMN,
    "Ad Topic Line",
    "Country",
    "City",
];

/// Numeric columns that go through min-max scaling and standardization.
pub const SCALED_COLUMNS: [&str; 5] = [
    "Daily Time Spent on Site",
    "Age",
    "Area Income",
    "Daily Internet Usage",
    "Male",
];

/// Numeric columns described by the dataset reporter.
pub const SUMMARY_COLUMNS: [&str; 2] = ["Age", "Area Income"];

/// Default locations searched for the dataset, in priority order.
pub fn default_candidate_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("dags/data/advertising.csv"),
        PathBuf::from("data/advertising.csv"),
        PathBuf::from("advertising.csv"),
    ]
}

/// Configuration for loading and preprocessing.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use adclick_processing::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .candidate_paths(vec!["/srv/data/advertising.csv".into()])
///     .random_seed(7)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Ordered dataset locations. The first existing one is read.
    pub candidate_paths: Vec<PathBuf>,

    /// Name of the binary label column.
    /// Default: "Clicked on Ad"
    pub label_column: String,

    /// Columns dropped from the feature set. Absent ones are ignored.
    pub excluded_columns: Vec<String>,

    /// Columns scaled with min-max then standardization.
    /// Every one of them must be present.
    pub scaled_columns: Vec<String>,

    /// Numeric columns described by the reporter.
    /// Default: ["Age", "Area Income"]
    pub summary_columns: Vec<String>,

    /// Fraction of rows held out for testing (0.0 - 1.0, exclusive).
    /// Default: 0.3
    pub test_size: f64,

    /// Seed of the train/test shuffle.
    /// Default: 42
    pub random_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            candidate_paths: default_candidate_paths(),
            label_column: LABEL_COLUMN.to_string(),
            excluded_columns: EXCLUDED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            scaled_columns: SCALED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            summary_columns: SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            test_size: 0.3,
            random_seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }

        if self.candidate_paths.is_empty() {
            return Err(ConfigValidationError::NoCandidatePaths);
        }

        if self.label_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("label_column".to_string()));
        }

        if let Some(col) = self
            .scaled_columns
            .iter()
            .find(|c| **c == self.label_column)
        {
            return Err(ConfigValidationError::LabelIsFeature(col.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test size: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestSize(f64),

    #[error("At least one candidate dataset path is required")]
    NoCandidatePaths,

    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Label column '{0}' cannot also be a scaled feature")]
    LabelIsFeature(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    candidate_paths: Option<Vec<PathBuf>>,
    label_column: Option<String>,
    excluded_columns: Option<Vec<String>>,
    scaled_columns: Option<Vec<String>>,
    summary_columns: Option<Vec<String>>,
    test_size: Option<f64>,
    random_seed: Option<u64>,
}

impl PipelineConfigBuilder {
    /// Set the ordered list of dataset locations.
    pub fn candidate_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.candidate_paths = Some(paths);
        self
    }

    /// Set the label column.
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    /// Set the columns dropped from the feature set.
    pub fn excluded_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns that are scaled.
    pub fn scaled_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scaled_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns described by the reporter.
    pub fn summary_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.summary_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the held-out fraction.
    ///
    /// # Arguments
    /// * `fraction` - Value between 0.0 and 1.0 (e.g., 0.3 = 30%)
    pub fn test_size(mut self, fraction: f64) -> Self {
        self.test_size = Some(fraction);
        self
    }

    /// Set the shuffle seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            candidate_paths: self.candidate_paths.unwrap_or(defaults.candidate_paths),
            label_column: self.label_column.unwrap_or(defaults.label_column),
            excluded_columns: self.excluded_columns.unwrap_or(defaults.excluded_columns),
            scaled_columns: self.scaled_columns.unwrap_or(defaults.scaled_columns),
            summary_columns: self.summary_columns.unwrap_or(defaults.summary_columns),
            test_size: self.test_size.unwrap_or(defaults.test_size),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
        };

        config.validate()?;
        Ok(config)
    }
}
