//! Bagged ensemble of decision trees.

use super::{Classifier, DecisionTree, check_prediction_input, check_training_data};
use crate::config::{DecisionTreeParams, RandomForestParams};
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random forest classifier.
///
/// Every tree is fitted on its own bootstrap sample and considers
/// `floor(sqrt(n_features))` random features per split. Class-1
/// probabilities are averaged over the trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Number of trees
    pub n_estimators: usize,
    /// Whether to draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `random_state + i`
    pub random_state: u64,
    params: DecisionTreeParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::from_params(&RandomForestParams::default(), 42)
    }
}

impl RandomForest {
    pub fn from_params(params: &RandomForestParams, random_state: u64) -> Self {
        Self {
            n_estimators: params.n_estimators,
            bootstrap: params.bootstrap,
            random_state,
            params: params.tree.clone(),
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Check every tree and that all of them agree on the feature count.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidData`] if the forest is empty or a tree is
    /// malformed.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(LearningError::InvalidData("model is not fitted".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != self.n_features {
                return Err(LearningError::InvalidData(format!(
                    "tree {i} has {} features, forest has {}",
                    tree.n_features(),
                    self.n_features
                )));
            }
            tree.validate()?;
        }
        Ok(())
    }

    fn max_features(n_features: usize) -> usize {
        ((n_features as f64).sqrt().floor() as usize).max(1)
    }

    /// Mean class-1 probability over all trees.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(LearningError::InvalidData("model is not fitted".to_string()));
        }
        check_prediction_input(x, self.n_features)?;

        let mut total: Array1<f64> = Array1::zeros(x.nrows());
        for tree in &self.trees {
            total += &tree.predict_proba(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<()> {
        check_training_data(x, y)?;
        if self.n_estimators == 0 {
            return Err(LearningError::InvalidConfig(
                "random forest needs at least one tree".to_string(),
            ));
        }

        let n_samples = x.nrows();
        let max_features = Self::max_features(x.ncols());
        let mut trees = Vec::with_capacity(self.n_estimators);

        for tree_idx in 0..self.n_estimators {
            let seed = self.random_state.wrapping_add(tree_idx as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let sample: Vec<usize> = if self.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };
            let x_boot = x.select(Axis(0), &sample);
            let y_boot = y.select(Axis(0), &sample);

            let mut tree =
                DecisionTree::from_params(&self.params, rng.next_u64()).with_max_features(max_features);
            tree.fit(x_boot.view(), y_boot.view())?;
            trees.push(tree);
        }

        debug!(
            "Fitted {} trees with {} of {} features per split",
            trees.len(),
            max_features,
            x.ncols()
        );

        self.trees = trees;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| i64::from(p > 0.5)))
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::blobs;

    fn small_forest(n: usize, seed: u64) -> RandomForest {
        RandomForest::from_params(
            &RandomForestParams {
                n_estimators: n,
                ..Default::default()
            },
            seed,
        )
    }

    #[test]
    fn test_max_features_is_floor_sqrt() {
        assert_eq!(RandomForest::max_features(5), 2);
        assert_eq!(RandomForest::max_features(9), 3);
        assert_eq!(RandomForest::max_features(1), 1);
    }

    #[test]
    fn test_fits_requested_number_of_trees() {
        let (x, y) = blobs(20);
        let mut forest = small_forest(7, 42);
        forest.fit(x.view(), y.view()).unwrap();

        assert_eq!(forest.n_trees(), 7);
        assert_eq!(forest.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = blobs(20);
        let mut a = small_forest(5, 42);
        let mut b = small_forest(5, 42);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();

        for (ta, tb) in a.trees().iter().zip(b.trees()) {
            assert_eq!(ta.root(), tb.root());
        }
        assert_eq!(
            a.predict_proba(x.view()).unwrap(),
            b.predict_proba(x.view()).unwrap()
        );
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = blobs(2);
        assert!(RandomForest::default().predict(x.view()).is_err());
    }

    #[test]
    fn test_validate_checks_tree_feature_counts() {
        let (x, y) = blobs(10);
        let mut forest = small_forest(3, 42);
        forest.fit(x.view(), y.view()).unwrap();
        forest.validate().unwrap();

        forest.n_features = 5;
        let err = forest.validate().unwrap_err();
        assert!(err.to_string().contains("tree 0 has 2 features"));
    }
}
