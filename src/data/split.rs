//! Row splitting: shuffled train/test partitions and k-fold rotation

use crate::error::{ReportError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single fold: rows used for fitting and rows held out
#[derive(Debug, Clone, PartialEq)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    /// Create a new k-fold splitter (no shuffling)
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    /// Shuffle rows before assigning folds
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate the folds for `n_samples` rows.
    ///
    /// Fold sizes differ by at most one; the first `n_samples % n_splits`
    /// folds take the extra row.
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(ReportError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(ReportError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = match self.random_state {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;

        for fold_idx in 0..self.n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices = indices[current..current + fold_size].to_vec();
            let train_indices = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(FoldSplit {
                train_indices,
                test_indices,
                fold_idx,
            });
            current += fold_size;
        }

        Ok(splits)
    }
}

/// Shuffled train/test partition of `n_samples` rows.
///
/// Returns `(train_rows, test_rows)`, each sorted ascending so the
/// partition preserves the original row order.
pub fn train_test_indices(
    n_samples: usize,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(ReportError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in [0, 1)".to_string(),
        });
    }

    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    if n_samples > 0 && n_test >= n_samples {
        return Err(ReportError::ValidationError(format!(
            "test_size {} leaves no training rows out of {}",
            test_size, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut test_rows = indices[..n_test].to_vec();
    let mut train_rows = indices[n_test..].to_vec();
    test_rows.sort_unstable();
    train_rows.sort_unstable();

    Ok((train_rows, test_rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold_covers_every_row_once() {
        let splits = KFold::new(5).split(100).unwrap();
        assert_eq!(splits.len(), 5);

        let mut all_test: Vec<usize> = splits
            .iter()
            .flat_map(|s| s.test_indices.iter().copied())
            .collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());

        for split in &splits {
            assert_eq!(split.train_indices.len() + split.test_indices.len(), 100);
        }
    }

    #[test]
    fn test_k_fold_uneven_sizes() {
        let splits = KFold::new(3).split(10).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_k_fold_seeded_shuffle_is_deterministic() {
        let a = KFold::new(4).with_shuffle(true).with_random_state(42).split(20).unwrap();
        let b = KFold::new(4).with_shuffle(true).with_random_state(42).split(20).unwrap();
        assert_eq!(a, b);

        let unshuffled = KFold::new(4).split(20).unwrap();
        assert_ne!(a, unshuffled);
    }

    #[test]
    fn test_k_fold_rejects_bad_counts() {
        assert!(KFold::new(1).split(10).is_err());
        assert!(KFold::new(5).split(3).is_err());
    }

    #[test]
    fn test_train_test_indices() {
        let (train, test) = train_test_indices(10, 0.2, 42).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert!(test.iter().all(|i| !train.contains(i)));
        assert!(train.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_train_test_indices_bad_size() {
        assert!(train_test_indices(10, 1.5, 42).is_err());
        assert!(train_test_indices(1, 0.5, 42).is_err());
    }
}
