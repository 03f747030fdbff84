//! Seeded train/test partitioning.

use crate::error::{ProcessingError, Result};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for `n_rows` and a held-out fraction.
pub fn test_row_count(n_rows: usize, test_size: f64) -> usize {
    (n_rows as f64 * test_size).ceil() as usize
}

/// Shuffle `0..n_rows` with a seeded generator and cut it into test and
/// train indices. The first `ceil(n_rows * test_size)` shuffled rows are the
/// test set.
///
/// The same `(n_rows, test_size, seed)` always yields the same partition.
pub fn partition(n_rows: usize, test_size: f64, seed: u64) -> Result<PartitionIndices> {
    let n_test = test_row_count(n_rows, test_size);
    if n_test == 0 || n_test >= n_rows {
        return Err(ProcessingError::InvalidConfig(format!(
            "test_size {} on {} rows leaves an empty train or test set",
            test_size, n_rows
        )));
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(PartitionIndices {
        train,
        test: indices,
    })
}
