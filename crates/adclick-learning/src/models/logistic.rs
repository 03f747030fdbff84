//! L2-regularized logistic regression fitted by batch gradient descent.

use super::{Classifier, check_prediction_input, check_training_data};
use crate::config::LogisticRegressionParams;
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Logistic regression for binary classification.
///
/// Minimizes the mean log loss plus `||w||² / (2·C·n)`, which matches an
/// L2 penalty with inverse strength `C` on the summed loss. The intercept is
/// not penalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Learning rate
    pub learning_rate: f64,
    /// Convergence tolerance
    pub tol: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::from_params(&LogisticRegressionParams::default())
    }
}

impl LogisticRegression {
    pub fn from_params(params: &LogisticRegressionParams) -> Self {
        Self {
            c: params.c,
            max_iter: params.max_iter,
            learning_rate: params.learning_rate,
            tol: params.tol,
            coefficients: None,
            intercept: 0.0,
        }
    }

    /// Fitted weights, one per feature.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Check that the fitted weights and intercept are finite.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidData`] if the model is unfitted or holds a
    /// non-finite parameter.
    pub fn validate(&self) -> Result<()> {
        let weights = self
            .coefficients
            .as_ref()
            .ok_or_else(|| LearningError::InvalidData("model is not fitted".to_string()))?;
        if weights.is_empty() {
            return Err(LearningError::InvalidData(
                "fitted model has no coefficients".to_string(),
            ));
        }
        if !self.intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(LearningError::InvalidData(
                "model parameters are not finite".to_string(),
            ));
        }
        Ok(())
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Probability of class 1 for every row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let weights = self
            .coefficients
            .as_ref()
            .ok_or_else(|| LearningError::InvalidData("model is not fitted".to_string()))?;
        check_prediction_input(x, weights.len())?;

        let linear = x.dot(weights) + self.intercept;
        Ok(Self::sigmoid(&linear))
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<()> {
        check_training_data(x, y)?;

        let positives = y.iter().filter(|v| **v == 1).count();
        if positives == 0 || positives == y.len() {
            return Err(LearningError::InvalidData(
                "logistic regression needs samples of both classes".to_string(),
            ));
        }

        let n = x.nrows() as f64;
        let target = y.mapv(|v| v as f64);
        let penalty = 1.0 / (self.c * n);

        let mut weights: Array1<f64> = Array1::zeros(x.ncols());
        let mut bias = 0.0;

        for _ in 0..self.max_iter {
            let predictions = Self::sigmoid(&(x.dot(&weights) + bias));
            let errors = &predictions - &target;

            let dw = x.t().dot(&errors) / n + &weights * penalty;
            let db = errors.sum() / n;

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - dw * self.learning_rate;
            bias -= self.learning_rate * db;
        }

        if !bias.is_finite() || weights.iter().any(|w: &f64| !w.is_finite()) {
            return Err(LearningError::InvalidData(
                "gradient descent diverged".to_string(),
            ));
        }

        self.coefficients = Some(weights);
        self.intercept = bias;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| i64::from(p > 0.5)))
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::blobs;
    use ndarray::array;

    #[test]
    fn test_separates_blobs() {
        let (x, y) = blobs(20);
        let mut model = LogisticRegression::default();
        model.fit(x.view(), y.view()).unwrap();

        let weights = model.coefficients().unwrap();
        assert!(weights.iter().all(|w| *w > 0.0));
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (x, y) = blobs(10);
        let mut model = LogisticRegression::default();
        model.fit(x.view(), y.view()).unwrap();

        let proba = model.predict_proba(x.view()).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_single_class_fails() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![1i64, 1, 1];
        let err = LogisticRegression::default()
            .fit(x.view(), y.view())
            .unwrap_err();
        assert!(err.to_string().contains("both classes"));
    }

    #[test]
    fn test_predict_before_fit() {
        let x = array![[0.0]];
        assert!(LogisticRegression::default().predict(x.view()).is_err());
    }

    #[test]
    fn test_feature_count_checked() {
        let (x, y) = blobs(5);
        let mut model = LogisticRegression::default();
        model.fit(x.view(), y.view()).unwrap();
        assert!(model.predict(array![[1.0, 2.0, 3.0]].view()).is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_weights() {
        let (x, y) = blobs(5);
        let mut model = LogisticRegression::default();
        model.fit(x.view(), y.view()).unwrap();
        model.validate().unwrap();

        model.coefficients = Some(array![1.0, f64::NAN]);
        assert!(model.validate().is_err());
    }
}
