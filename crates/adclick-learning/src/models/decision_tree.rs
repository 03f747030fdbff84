//! CART decision tree with Gini impurity.

use super::{Classifier, check_prediction_input, check_training_data};
use crate::config::DecisionTreeParams;
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf with the fraction of class-1 training samples that reached it
    Leaf { p_one: f64, n_samples: usize },
    /// Internal node; rows with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

impl TreeNode {
    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        match self {
            TreeNode::Leaf { p_one, .. } => {
                if !(0.0..=1.0).contains(p_one) {
                    return Err(LearningError::InvalidData(format!(
                        "leaf probability {p_one} is outside [0, 1]"
                    )));
                }
                Ok(())
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if *feature >= n_features {
                    return Err(LearningError::InvalidData(format!(
                        "split on feature {feature} but the tree has {n_features} features"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(LearningError::InvalidData(format!(
                        "split threshold {threshold} is not finite"
                    )));
                }
                left.validate(n_features)?;
                right.validate(n_features)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Binary classification tree.
///
/// Grows greedily: at every node each considered feature is swept in sorted
/// order and the threshold with the largest Gini decrease wins. Ties keep
/// the lower feature index and the lower threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn at random per split; `None` considers all of them
    pub max_features: Option<usize>,
    /// Seed of the feature sampling
    pub random_state: u64,
    root: Option<TreeNode>,
    n_features: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::from_params(&DecisionTreeParams::default(), 42)
    }
}

impl DecisionTree {
    pub fn from_params(params: &DecisionTreeParams, random_state: u64) -> Self {
        Self {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: None,
            random_state,
            root: None,
            n_features: 0,
        }
    }

    /// Consider only `n` randomly drawn features at every split.
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n.max(1));
        self
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Depth of the fitted tree (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::depth)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::n_leaves)
    }

    /// Number of features seen during `fit` (0 before fitting).
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Check that every split of the fitted tree refers to a known feature
    /// and every leaf holds a probability.
    ///
    /// # Errors
    ///
    /// [`LearningError::InvalidData`] naming the first malformed node.
    pub fn validate(&self) -> Result<()> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| LearningError::InvalidData("model is not fitted".to_string()))?;
        if self.n_features == 0 {
            return Err(LearningError::InvalidData(
                "fitted tree has no features".to_string(),
            ));
        }
        root.validate(self.n_features)
    }

    /// Probability of class 1 for every row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| LearningError::InvalidData("model is not fitted".to_string()))?;
        check_prediction_input(x, self.n_features)?;

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { p_one, .. } => break *p_one,
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                            ..
                        } => {
                            node = if row[*feature] <= *threshold {
                                &**left
                            } else {
                                &**right
                            };
                        }
                    }
                }
            })
            .collect())
    }

    fn build(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let positives = indices.iter().filter(|&&i| y[i] == 1).count();
        let leaf = TreeNode::Leaf {
            p_one: positives as f64 / n_samples as f64,
            n_samples,
        };

        let should_stop = n_samples < self.min_samples_split
            || positives == 0
            || positives == n_samples
            || self.max_depth.is_some_and(|d| depth >= d);
        if should_stop {
            return leaf;
        }

        let Some(split) = self.find_best_split(x, y, indices, positives, rng) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, split.feature]] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return leaf;
        }

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(x, y, &left, depth + 1, rng)),
            right: Box::new(self.build(x, y, &right, depth + 1, rng)),
            n_samples,
        }
    }

    fn find_best_split(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, i64>,
        indices: &[usize],
        positives: usize,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = x.ncols();
        let mut features: Vec<usize> = match self.max_features {
            Some(k) if k < n_features => rand::seq::index::sample(rng, n_features, k).into_vec(),
            _ => (0..n_features).collect(),
        };
        features.sort_unstable();

        let n = indices.len();
        let parent = gini(positives, n);
        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, i64)> = Vec::with_capacity(n);

        for feature in features {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x[[i, feature]], y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_n = 0usize;
            let mut left_pos = 0usize;
            for w in 1..pairs.len() {
                left_n += 1;
                if pairs[w - 1].1 == 1 {
                    left_pos += 1;
                }

                let (lo, hi) = (pairs[w - 1].0, pairs[w].0);
                if lo >= hi {
                    continue;
                }
                let right_n = n - left_n;
                if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left_n as f64 * gini(left_pos, left_n)
                    + right_n as f64 * gini(positives - left_pos, right_n))
                    / n as f64;
                let gain = parent - weighted;

                if best.is_none_or(|b| gain > b.gain) {
                    let mut threshold = (lo + hi) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Gini impurity of a binary node.
fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, i64>) -> Result<()> {
        check_training_data(x, y)?;

        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| i64::from(p > 0.5)))
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::blobs;
    use ndarray::array;

    #[test]
    fn test_gini() {
        assert_eq!(gini(0, 10), 0.0);
        assert_eq!(gini(10, 10), 0.0);
        assert_eq!(gini(5, 10), 0.5);
    }

    #[test]
    fn test_single_split_on_separable_data() {
        let (x, y) = blobs(15);
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), y.view()).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_unlimited_depth_fits_training_set() {
        // XOR needs more than one split
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![0i64, 1, 1, 0];
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), y.view()).unwrap();

        assert_eq!(tree.predict(x.view()).unwrap(), y);
        assert_eq!(tree.n_leaves(), 4);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![0i64, 1, 1, 0];
        let params = DecisionTreeParams {
            max_depth: Some(1),
            ..Default::default()
        };
        let mut tree = DecisionTree::from_params(&params, 42);
        tree.fit(x.view(), y.view()).unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn test_pure_labels_give_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1i64, 1, 1];
        let mut tree = DecisionTree::default();
        tree.fit(x.view(), y.view()).unwrap();

        assert_eq!(
            tree.root(),
            Some(&TreeNode::Leaf {
                p_one: 1.0,
                n_samples: 3
            })
        );
        assert_eq!(tree.predict(array![[10.0]].view()).unwrap(), array![1i64]);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![1i64, 0, 0, 0, 0];
        let params = DecisionTreeParams {
            min_samples_leaf: 2,
            ..Default::default()
        };
        let mut tree = DecisionTree::from_params(&params, 42);
        tree.fit(x.view(), y.view()).unwrap();

        fn check(node: &TreeNode) {
            match node {
                TreeNode::Leaf { n_samples, .. } => assert!(*n_samples >= 2),
                TreeNode::Split { left, right, .. } => {
                    check(left);
                    check(right);
                }
            }
        }
        check(tree.root().unwrap());
    }

    #[test]
    fn test_feature_sampling_is_seeded() {
        let (x, y) = blobs(20);
        let mut a = DecisionTree::default().with_max_features(1);
        let mut b = DecisionTree::default().with_max_features(1);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();
        assert_eq!(a.root(), b.root());
    }

    fn tree_with_root(root: TreeNode, n_features: usize) -> DecisionTree {
        DecisionTree {
            root: Some(root),
            n_features,
            ..DecisionTree::default()
        }
    }

    fn leaf(p_one: f64) -> Box<TreeNode> {
        Box::new(TreeNode::Leaf {
            p_one,
            n_samples: 1,
        })
    }

    #[test]
    fn test_validate_fitted_tree() {
        let (x, y) = blobs(10);
        let mut tree = DecisionTree::default();
        assert!(tree.validate().is_err());

        tree.fit(x.view(), y.view()).unwrap();
        tree.validate().unwrap();
        assert_eq!(tree.n_features(), 2);
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let tree = tree_with_root(
            TreeNode::Split {
                feature: 99,
                threshold: 0.0,
                left: leaf(0.0),
                right: leaf(1.0),
                n_samples: 2,
            },
            2,
        );
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("feature 99"));
    }

    #[test]
    fn test_validate_rejects_bad_leaf_and_threshold() {
        let nested = tree_with_root(
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: leaf(0.0),
                right: leaf(1.5),
                n_samples: 2,
            },
            1,
        );
        assert!(nested.validate().is_err());

        let nan_threshold = tree_with_root(
            TreeNode::Split {
                feature: 0,
                threshold: f64::NAN,
                left: leaf(0.0),
                right: leaf(1.0),
                n_samples: 2,
            },
            1,
        );
        assert!(nan_threshold.validate().is_err());
    }
}
