//! Feature scalers fitted on training rows and replayed on test rows.
//!
//! Every `transform` checks the input against the column count seen at fit
//! time and fails with [`ProcessingError::ShapeMismatch`] otherwise.

use crate::error::{ProcessingError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Rescales each column to `[0, 1]` using the fitted minimum and range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    range: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on the columns of `x`.
    pub fn fit(x: ArrayView2<'_, f64>) -> Self {
        let (min, range) = x
            .axis_iter(Axis(1))
            .map(|col| {
                let lo = col.iter().copied().fold(f64::INFINITY, f64::min);
                let hi = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (lo, non_zero(hi - lo))
            })
            .unzip();
        Self { min, range }
    }

    pub fn min(&self) -> &[f64] {
        &self.min
    }

    pub fn range(&self) -> &[f64] {
        &self.range
    }

    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        check_columns(x, self.min.len())?;
        let mut out = x.to_owned();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            col.mapv_inplace(|v| (v - self.min[j]) / self.range[j]);
        }
        Ok(out)
    }
}

/// Centers each column on its fitted mean and divides by its population std.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: ArrayView2<'_, f64>) -> Self {
        let (mean, scale) = x
            .axis_iter(Axis(1))
            .map(|col| {
                let (mean, std) = mean_and_std(col);
                (mean, non_zero(std))
            })
            .unzip();
        Self { mean, scale }
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        check_columns(x, self.mean.len())?;
        let mut out = x.to_owned();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            col.mapv_inplace(|v| (v - self.mean[j]) / self.scale[j]);
        }
        Ok(out)
    }
}

/// Min-max scaling followed by standardization on a subset of columns.
///
/// Columns not listed in `columns` pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    n_features: usize,
    columns: Vec<usize>,
    min_max: MinMaxScaler,
    standard: StandardScaler,
}

impl FeatureScaler {
    /// Fit both scalers on the training matrix. The standard scaler sees the
    /// min-max output, so the two are applied as one chain.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::ShapeMismatch`] if a column index is out of range.
    pub fn fit(x_train: ArrayView2<'_, f64>, columns: &[usize]) -> Result<Self> {
        if let Some(&bad) = columns.iter().find(|&&j| j >= x_train.ncols()) {
            return Err(ProcessingError::ShapeMismatch {
                expected: bad + 1,
                found: x_train.ncols(),
            });
        }

        let selected = x_train.select(Axis(1), columns);
        let min_max = MinMaxScaler::fit(selected.view());
        let standard = StandardScaler::fit(min_max.transform(selected.view())?.view());

        Ok(Self {
            n_features: x_train.ncols(),
            columns: columns.to_vec(),
            min_max,
            standard,
        })
    }

    /// Column count of the matrix the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Indices of the scaled columns.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn min_max(&self) -> &MinMaxScaler {
        &self.min_max
    }

    pub fn standard(&self) -> &StandardScaler {
        &self.standard
    }

    /// Apply the fitted chain without refitting.
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        check_columns(x, self.n_features)?;
        let selected = x.select(Axis(1), &self.columns);
        let scaled = self
            .standard
            .transform(self.min_max.transform(selected.view())?.view())?;

        let mut out = x.to_owned();
        for (k, &j) in self.columns.iter().enumerate() {
            out.column_mut(j).assign(&scaled.column(k));
        }
        Ok(out)
    }
}

fn check_columns(x: ArrayView2<'_, f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        return Err(ProcessingError::ShapeMismatch {
            expected,
            found: x.ncols(),
        });
    }
    Ok(())
}

fn mean_and_std(col: ArrayView1<'_, f64>) -> (f64, f64) {
    let n = col.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = col.sum() / n as f64;
    let variance = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    (mean, variance.sqrt())
}

// Constant columns keep a unit scale instead of dividing by zero.
fn non_zero(scale: f64) -> f64 {
    if scale.abs() < f64::EPSILON || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_min_max_range() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = MinMaxScaler::fit(x.view());
        let out = scaler.transform(x.view()).unwrap();

        assert_eq!(out.column(0).to_vec(), vec![0.0, 0.5, 1.0]);
        // constant column keeps unit range
        assert_eq!(out.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_standard_scaler_zero_mean_unit_variance() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let out = StandardScaler::fit(x.view()).transform(x.view()).unwrap();
        let (mean, std) = mean_and_std(out.column(0));
        assert!(mean.abs() < 1e-12);
        assert!((std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_feature_scaler_passes_through_unlisted_columns() {
        let train = array![[1.0, 7.0], [2.0, 8.0], [3.0, 9.0]];
        let scaler = FeatureScaler::fit(train.view(), &[0]).unwrap();
        let out = scaler.transform(train.view()).unwrap();

        assert_eq!(out.column(1).to_vec(), vec![7.0, 8.0, 9.0]);
        let (mean, std) = mean_and_std(out.column(0));
        assert!(mean.abs() < 1e-12);
        assert!((std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_does_not_refit() {
        let train = array![[0.0], [10.0]];
        let scaler = FeatureScaler::fit(train.view(), &[0]).unwrap();
        let test = array![[20.0]];
        let before = scaler.clone();
        let out = scaler.transform(test.view()).unwrap();

        assert_eq!(scaler, before);
        // 20 -> min-max 2.0 -> (2.0 - 0.5) / 0.5
        assert!((out[[0, 0]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_rejects_wrong_column_count() {
        let train = array![[1.0, 7.0], [2.0, 8.0], [3.0, 9.0]];
        let scaler = FeatureScaler::fit(train.view(), &[0, 1]).unwrap();

        let narrow = array![[1.0], [2.0]];
        let err = scaler.transform(narrow.view()).unwrap_err();
        assert_eq!(err.error_code(), "SHAPE_MISMATCH");

        let wide = array![[1.0, 2.0, 3.0]];
        assert!(scaler.transform(wide.view()).is_err());
        assert!(scaler.min_max().transform(narrow.view()).is_err());
        assert!(scaler.standard().transform(wide.view()).is_err());
    }

    #[test]
    fn test_fit_rejects_out_of_range_column() {
        let train = array![[1.0, 7.0], [2.0, 8.0]];
        let err = FeatureScaler::fit(train.view(), &[2]).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::ShapeMismatch {
                expected: 3,
                found: 2
            }
        ));
    }
}
