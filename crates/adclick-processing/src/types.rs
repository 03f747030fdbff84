//! Data types shared between preprocessing and training.

use crate::error::{ProcessingError, Result};
use crate::preprocessing::FeatureScaler;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Train/test partition of scaled features and aligned labels.
///
/// Rows of each feature matrix line up with the entries of the matching
/// label vector; the constructor rejects anything else. A `Split` is
/// immutable once built.
#[derive(Debug, Clone)]
pub struct Split {
    x_train: Array2<f64>,
    x_test: Array2<f64>,
    y_train: Array1<i64>,
    y_test: Array1<i64>,
    feature_names: Vec<String>,
    scaler: Option<FeatureScaler>,
}

impl Split {
    /// Build a split from already prepared arrays.
    ///
    /// # Errors
    ///
    /// Schema mismatch when row counts and label lengths disagree or the
    /// two matrices have a different number of columns.
    pub fn new(
        x_train: Array2<f64>,
        x_test: Array2<f64>,
        y_train: Array1<i64>,
        y_test: Array1<i64>,
    ) -> Result<Self> {
        if x_train.nrows() != y_train.len() {
            return Err(ProcessingError::schema(
                "train",
                format!("{} feature rows vs {} labels", x_train.nrows(), y_train.len()),
            ));
        }
        if x_test.nrows() != y_test.len() {
            return Err(ProcessingError::schema(
                "test",
                format!("{} feature rows vs {} labels", x_test.nrows(), y_test.len()),
            ));
        }
        if x_train.ncols() != x_test.ncols() {
            return Err(ProcessingError::schema(
                "features",
                format!("{} train columns vs {} test columns", x_train.ncols(), x_test.ncols()),
            ));
        }

        let feature_names = (0..x_train.ncols()).map(|i| format!("x{i}")).collect();
        Ok(Self {
            x_train,
            x_test,
            y_train,
            y_test,
            feature_names,
            scaler: None,
        })
    }

    /// Attach feature names. Must match the number of columns.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.x_train.ncols() {
            return Err(ProcessingError::schema(
                "features",
                format!("{} names for {} columns", names.len(), self.x_train.ncols()),
            ));
        }
        self.feature_names = names;
        Ok(self)
    }

    /// Attach the scaler that produced the feature matrices.
    pub fn with_scaler(mut self, scaler: FeatureScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn x_train(&self) -> ArrayView2<'_, f64> {
        self.x_train.view()
    }

    pub fn x_test(&self) -> ArrayView2<'_, f64> {
        self.x_test.view()
    }

    pub fn y_train(&self) -> ArrayView1<'_, i64> {
        self.y_train.view()
    }

    pub fn y_test(&self) -> ArrayView1<'_, i64> {
        self.y_test.view()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Parameters fitted on the training rows, if this split was scaled.
    pub fn scaler(&self) -> Option<&FeatureScaler> {
        self.scaler.as_ref()
    }

    pub fn n_train(&self) -> usize {
        self.y_train.len()
    }

    pub fn n_test(&self) -> usize {
        self.y_test.len()
    }

    pub fn n_features(&self) -> usize {
        self.x_train.ncols()
    }

    /// Consume the split into `(x_train, x_test, y_train, y_test)`.
    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>, Array1<i64>, Array1<i64>) {
        (self.x_train, self.x_test, self.y_train, self.y_test)
    }
}

static_assertions::assert_impl_all!(Split: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_checks_alignment() {
        let ok = Split::new(
            array![[1.0], [2.0]],
            array![[3.0]],
            array![0, 1],
            array![1],
        );
        assert!(ok.is_ok());

        let bad = Split::new(array![[1.0], [2.0]], array![[3.0]], array![0], array![1]);
        assert!(bad.unwrap_err().is_schema_mismatch());

        let bad_cols = Split::new(
            array![[1.0, 2.0]],
            array![[3.0]],
            array![0],
            array![1],
        );
        assert!(bad_cols.is_err());
    }

    #[test]
    fn test_feature_names() {
        let split = Split::new(array![[1.0, 2.0]], array![[3.0, 4.0]], array![0], array![1])
            .unwrap()
            .with_feature_names(vec!["a".into(), "b".into()])
            .unwrap();
        assert_eq!(split.feature_names(), ["a".to_string(), "b".to_string()]);
        assert_eq!(split.n_features(), 2);
        assert!(split.scaler().is_none());
    }
}
