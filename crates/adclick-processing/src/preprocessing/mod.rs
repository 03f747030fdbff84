//! Train/test preprocessing.
//!
//! [`preprocess`] turns the raw table into a [`Split`]:
//!
//! 1. the excluded identifier/text columns and the label are removed from
//!    the feature set, the label is kept separately
//! 2. rows are partitioned with a seeded shuffle (70/30 by default)
//! 3. the configured numeric columns are min-max scaled and then
//!    standardized, with both scalers fitted on the train rows only
//!
//! Columns that are neither excluded nor scaled pass through untouched.

mod scaler;
mod split;

pub use scaler::{FeatureScaler, MinMaxScaler, StandardScaler};
pub use split::{PartitionIndices, partition, test_row_count};

use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::types::Split;
use crate::utils::{binary_labels, column_names, numeric_values, require_columns};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::DataFrame;
use tracing::{debug, info};

/// Builds a [`Split`] from the raw table according to a [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PipelineConfig,
}

impl Preprocessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Names of the feature columns, in table order.
    pub fn feature_columns(&self, df: &DataFrame) -> Vec<String> {
        column_names(df)
            .into_iter()
            .filter(|name| {
                *name != self.config.label_column && !self.config.excluded_columns.contains(name)
            })
            .collect()
    }

    /// Run the preprocessing steps.
    ///
    /// # Errors
    ///
    /// - schema mismatch if the label or a scaled column is missing, a
    ///   feature column is not numeric, or the label is not binary
    /// - invalid configuration if a scaled column is also excluded or the
    ///   table is too small to split
    pub fn preprocess(&self, df: &DataFrame) -> Result<Split> {
        let config = &self.config;
        require_columns(df, std::slice::from_ref(&config.label_column))?;
        require_columns(df, &config.scaled_columns)?;

        let feature_names = self.feature_columns(df);
        let scaled_idx = config
            .scaled_columns
            .iter()
            .map(|name| {
                feature_names.iter().position(|f| f == name).ok_or_else(|| {
                    ProcessingError::InvalidConfig(format!(
                        "scaled column '{}' is excluded from the features",
                        name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let features = feature_matrix(df, &feature_names)?;
        let labels = Array1::from(binary_labels(df, &config.label_column)?);
        debug!(
            "Feature matrix {:?}, dropped {:?}",
            features.dim(),
            config.excluded_columns
        );

        let parts = partition(df.height(), config.test_size, config.random_seed)?;
        let x_train = features.select(Axis(0), &parts.train);
        let x_test = features.select(Axis(0), &parts.test);
        let y_train = labels.select(Axis(0), &parts.train);
        let y_test = labels.select(Axis(0), &parts.test);

        let scaler = FeatureScaler::fit(x_train.view(), &scaled_idx)?;
        let x_train = scaler.transform(x_train.view())?;
        let x_test = scaler.transform(x_test.view())?;

        info!(
            "Preprocessed {} rows into {} train / {} test with {} features",
            df.height(),
            x_train.nrows(),
            x_test.nrows(),
            feature_names.len()
        );

        Ok(Split::new(x_train, x_test, y_train, y_test)?
            .with_feature_names(feature_names)?
            .with_scaler(scaler))
    }
}

/// Split and scale `df` with the given configuration.
pub fn preprocess(df: &DataFrame, config: &PipelineConfig) -> Result<Split> {
    Preprocessor::new(config.clone()).preprocess(df)
}

fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut matrix = Array2::zeros((df.height(), columns.len()));
    for (j, name) in columns.iter().enumerate() {
        let values = numeric_values(df, name)?;
        matrix.column_mut(j).assign(&Array1::from(values));
    }
    Ok(matrix)
}
