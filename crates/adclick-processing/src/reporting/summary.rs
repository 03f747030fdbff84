//! Dataset summary: shape, columns, label balance and numeric statistics.

use super::statistics::ColumnStatistics;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::utils::{binary_labels, column_names, numeric_values, require_columns};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Observational summary of the loaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Number of rows.
    pub row_count: usize,
    /// Column names in table order.
    pub columns: Vec<String>,
    /// Name of the label column.
    pub label_column: String,
    /// Number of rows per label value.
    pub label_distribution: BTreeMap<i64, usize>,
    /// Descriptive statistics of the configured numeric columns.
    pub statistics: Vec<ColumnStatistics>,
}

/// Computes and emits a [`DatasetSummary`]. Never mutates the table.
#[derive(Debug, Clone)]
pub struct DatasetReporter {
    label_column: String,
    summary_columns: Vec<String>,
}

impl DatasetReporter {
    pub fn new(label_column: impl Into<String>, summary_columns: Vec<String>) -> Self {
        Self {
            label_column: label_column.into(),
            summary_columns,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.label_column.clone(), config.summary_columns.clone())
    }

    /// Compute the summary.
    ///
    /// # Errors
    ///
    /// Schema mismatch when the label or a summary column is missing or
    /// malformed.
    pub fn describe(&self, df: &DataFrame) -> Result<DatasetSummary> {
        require_columns(df, std::slice::from_ref(&self.label_column))?;
        require_columns(df, &self.summary_columns)?;

        let mut label_distribution = BTreeMap::new();
        for label in binary_labels(df, &self.label_column)? {
            *label_distribution.entry(label).or_insert(0usize) += 1;
        }

        let statistics = self
            .summary_columns
            .iter()
            .map(|name| {
                numeric_values(df, name).map(|values| ColumnStatistics::describe(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DatasetSummary {
            row_count: df.height(),
            columns: column_names(df),
            label_column: self.label_column.clone(),
            label_distribution,
            statistics,
        })
    }

    /// Compute the summary and emit it through the log.
    pub fn report(&self, df: &DataFrame) -> Result<DatasetSummary> {
        let summary = self.describe(df)?;
        log_summary(&summary);
        Ok(summary)
    }
}

/// Emit the dataset summary and report success.
///
/// # Errors
///
/// Schema mismatch when an expected column is missing.
pub fn summarize(df: &DataFrame, config: &PipelineConfig) -> Result<bool> {
    DatasetReporter::from_config(config).report(df)?;
    Ok(true)
}

fn log_summary(summary: &DatasetSummary) {
    info!("=== Dataset Summary ===");
    info!("Total Samples: {}", summary.row_count);
    info!("Features: {:?}", summary.columns);
    info!("Target Distribution ({}):", summary.label_column);
    for (label, count) in &summary.label_distribution {
        info!("  {:<6} {}", label, count);
    }

    for stats in &summary.statistics {
        info!("{} Statistics:", stats.column);
        info!("  count {:>14}", stats.count);
        info!("  mean  {:>14.6}", stats.mean);
        info!("  std   {:>14.6}", stats.std);
        info!("  min   {:>14.6}", stats.min);
        info!("  25%   {:>14.6}", stats.q25);
        info!("  50%   {:>14.6}", stats.median);
        info!("  75%   {:>14.6}", stats.q75);
        info!("  max   {:>14.6}", stats.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use polars::prelude::*;

    fn sample() -> DataFrame {
        df!(
            "Age" => &[20.0f64, 30.0, 40.0, 50.0],
            "Area Income" => &[1000.0f64, 2000.0, 3000.0, 4000.0],
            "City" => &["A", "B", "C", "D"],
            "Clicked on Ad" => &[0i64, 1, 1, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_describe_counts_labels() {
        let reporter = DatasetReporter::from_config(&PipelineConfig::default());
        let summary = reporter.describe(&sample()).unwrap();

        assert_eq!(summary.row_count, 4);
        assert_eq!(summary.columns.len(), 4);
        assert_eq!(summary.label_distribution.get(&0), Some(&1));
        assert_eq!(summary.label_distribution.get(&1), Some(&3));
        assert_eq!(summary.statistics.len(), 2);
        assert_eq!(summary.statistics[0].column, "Age");
        assert_eq!(summary.statistics[1].mean, 2500.0);
    }

    #[test]
    fn test_summarize_does_not_mutate() {
        let df = sample();
        let before = df.clone();
        assert!(summarize(&df, &PipelineConfig::default()).unwrap());
        assert!(df.equals(&before));
    }

    #[test]
    fn test_missing_summary_column_is_reported() {
        let df = df!("Clicked on Ad" => &[0i64, 1], "Age" => &[1.0f64, 2.0]).unwrap();
        let err = summarize(&df, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, ProcessingError::ColumnNotFound(ref c) if c == "Area Income"));
    }
}
