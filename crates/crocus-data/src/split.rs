//! Seeded train/test splitting.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::DataError;

/// Configuration for a shuffled train/test split.
///
/// Construct via [`TrainTestSplit::new`], then chain `with_seed` if desired.
///
/// The test side receives `ceil(n_samples * test_fraction)` rows after a
/// seeded shuffle; the remainder is the train side, so the two subset sizes
/// always sum to the input size.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    test_fraction: f64,
    seed: u64,
}

impl TrainTestSplit {
    /// Create a new split config with the given test fraction.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidTestFraction`] unless `test_fraction`
    /// is in (0.0, 1.0).
    pub fn new(test_fraction: f64) -> Result<Self, DataError> {
        if !test_fraction.is_finite() || test_fraction <= 0.0 || test_fraction >= 1.0 {
            return Err(DataError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            seed: 42,
        })
    }

    /// Set the random seed for the shuffle.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the test fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split the dataset into `(train, test)` subsets.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::EmptyDataset`] | Zero samples |
    /// | [`DataError::DegenerateSplit`] | Either subset would be empty |
    #[instrument(skip_all, fields(n_samples = dataset.n_samples(), test_fraction = self.test_fraction))]
    pub fn split(&self, dataset: &Dataset) -> Result<(Dataset, Dataset), DataError> {
        let n_samples = dataset.n_samples();
        if n_samples == 0 {
            return Err(DataError::EmptyDataset);
        }

        let n_test = (n_samples as f64 * self.test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(DataError::DegenerateSplit {
                n_samples,
                fraction: self.test_fraction,
            });
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let (test_indices, train_indices) = indices.split_at(n_test);
        let train = dataset.select(train_indices);
        let test = dataset.select(test_indices);

        info!(
            n_train = train.n_samples(),
            n_test = test.n_samples(),
            "dataset split"
        );

        Ok((train, test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iris::load_iris;

    #[test]
    fn sizes_sum_to_total_for_any_seed() {
        let ds = load_iris().unwrap();
        for seed in [0u64, 1, 42, 999] {
            let split = TrainTestSplit::new(0.25).unwrap().with_seed(seed);
            let (train, test) = split.split(&ds).unwrap();
            assert_eq!(train.n_samples() + test.n_samples(), ds.n_samples());
        }
    }

    #[test]
    fn quarter_of_iris_is_38_test_rows() {
        // ceil(150 * 0.25) = 38, leaving 112 for training.
        let ds = load_iris().unwrap();
        let (train, test) = TrainTestSplit::new(0.25).unwrap().split(&ds).unwrap();
        assert_eq!(train.n_samples(), 112);
        assert_eq!(test.n_samples(), 38);
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let ds = load_iris().unwrap();
        let split = TrainTestSplit::new(0.25).unwrap().with_seed(7);
        let (train_a, test_a) = split.split(&ds).unwrap();
        let (train_b, test_b) = split.split(&ds).unwrap();
        assert_eq!(train_a.labels(), train_b.labels());
        assert_eq!(test_a.labels(), test_b.labels());
        assert_eq!(train_a.features()[0], train_b.features()[0]);
    }

    #[test]
    fn different_seeds_differ() {
        let ds = load_iris().unwrap();
        let (_, test_a) = TrainTestSplit::new(0.25)
            .unwrap()
            .with_seed(1)
            .split(&ds)
            .unwrap();
        let (_, test_b) = TrainTestSplit::new(0.25)
            .unwrap()
            .with_seed(2)
            .split(&ds)
            .unwrap();
        assert_ne!(test_a.labels(), test_b.labels());
    }

    #[test]
    fn rows_stay_attached_to_labels() {
        // Every (row, label) pair in the output must exist in the input.
        let ds = load_iris().unwrap();
        let (train, test) = TrainTestSplit::new(0.2).unwrap().split(&ds).unwrap();
        for subset in [&train, &test] {
            for (row, &label) in subset.features().iter().zip(subset.labels()) {
                let found = ds
                    .features()
                    .iter()
                    .zip(ds.labels())
                    .any(|(r, &l)| r == row && l == label);
                assert!(found, "row {row:?} with label {label} not in source");
            }
        }
    }

    #[test]
    fn invalid_fraction_rejected() {
        assert!(TrainTestSplit::new(0.0).is_err());
        assert!(TrainTestSplit::new(1.0).is_err());
        assert!(TrainTestSplit::new(-0.5).is_err());
        assert!(TrainTestSplit::new(f64::NAN).is_err());
    }

    #[test]
    fn degenerate_split_rejected() {
        let ds = load_iris().unwrap();
        let tiny = ds.select(&[0]);
        let err = TrainTestSplit::new(0.5).unwrap().split(&tiny).unwrap_err();
        assert!(matches!(err, DataError::DegenerateSplit { .. }));
    }
}
