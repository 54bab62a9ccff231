//! Stratified k-fold cross-validation for Random Forest.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::error::RfError;
use crate::importance::{RankedFeature, aggregate_importances};

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of stratified k-fold cross-validation.
#[derive(Debug)]
pub struct CrossValidationResult {
    /// Accuracy for each fold, each in [0.0, 1.0].
    pub fold_accuracies: Vec<f64>,
    /// Pooled confusion matrix (summed across all held-out folds).
    pub confusion_matrix: ConfusionMatrix,
    /// Mean accuracy across folds.
    pub mean_accuracy: f64,
    /// Standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Averaged feature importances across all folds.
    pub feature_importances: Vec<RankedFeature>,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
    /// Number of classes.
    pub n_classes: usize,
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Run stratified k-fold cross-validation.
    ///
    /// Assigns samples to `n_folds` folds with approximately equal class
    /// distribution in each, then trains a forest per fold on the remaining
    /// folds and scores it on the held-out fold. The result always holds
    /// exactly `n_folds` accuracies.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero samples |
    /// | [`RfError::TooFewSamplesForFolds`] | A class has fewer samples than folds |
    /// | Other RF errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        labels: &[usize],
        feature_names: &[String],
    ) -> Result<CrossValidationResult, RfError> {
        if features.is_empty() {
            return Err(RfError::EmptyDataset);
        }

        let n_samples = features.len();
        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;

        let fold_assignments = self.stratified_assignments(labels, n_classes)?;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut pooled_true = Vec::new();
        let mut pooled_predicted = Vec::new();
        let mut pooled_importances: Vec<Vec<f64>> = Vec::new();

        for fold in 0..self.n_folds {
            let mut train_features = Vec::new();
            let mut train_labels = Vec::new();
            let mut test_features = Vec::new();
            let mut test_labels = Vec::new();

            for (i, &assigned) in fold_assignments.iter().enumerate() {
                if assigned == fold {
                    test_features.push(features[i].clone());
                    test_labels.push(labels[i]);
                } else {
                    train_features.push(features[i].clone());
                    train_labels.push(labels[i]);
                }
            }

            // Per-fold seed offset so the folds don't share tree randomness.
            let fold_config = config
                .clone()
                .with_seed(config.seed.wrapping_add(fold as u64));
            let result = fold_config.fit(&train_features, &train_labels, feature_names)?;

            let predictions = result.forest().predict_batch(&test_features)?;
            let correct = predictions
                .iter()
                .zip(&test_labels)
                .filter(|&(p, l)| p == l)
                .count();
            let fold_accuracy = correct as f64 / test_labels.len() as f64;
            fold_accuracies.push(fold_accuracy);

            info!(fold, accuracy = fold_accuracy, "fold completed");

            pooled_true.extend_from_slice(&test_labels);
            pooled_predicted.extend_from_slice(&predictions);

            let forest = result.forest();
            pooled_importances.extend(forest.trees.iter().map(|t| t.feature_importances()));
        }

        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / self.n_folds as f64;
        let std_accuracy = {
            let variance = fold_accuracies
                .iter()
                .map(|&a| (a - mean_accuracy).powi(2))
                .sum::<f64>()
                / self.n_folds as f64;
            variance.sqrt()
        };

        let confusion_matrix =
            ConfusionMatrix::from_labels(&pooled_true, &pooled_predicted, n_classes)?;
        let feature_importances = aggregate_importances(&pooled_importances, feature_names);

        info!(mean_accuracy, std_accuracy, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_accuracies,
            confusion_matrix,
            mean_accuracy,
            std_accuracy,
            feature_importances,
            n_folds: self.n_folds,
            n_samples,
            n_classes,
        })
    }

    /// Assign each sample to a fold, stratified by class.
    ///
    /// Groups indices by class, shuffles within each class, then deals them
    /// round-robin across folds.
    fn stratified_assignments(
        &self,
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Vec<usize>, RfError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; n_classes];
        for (i, &label) in labels.iter().enumerate() {
            class_indices[label].push(i);
        }

        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_folds {
                return Err(RfError::TooFewSamplesForFolds {
                    class,
                    count: indices.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut assignments = vec![0usize; labels.len()];
        for indices in &mut class_indices {
            indices.shuffle(&mut rng);
            for (j, &idx) in indices.iter().enumerate() {
                assignments[idx] = j % self.n_folds;
            }
        }
        Ok(assignments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for class in 0..3usize {
            for i in 0..30 {
                features.push(vec![class as f64 * 10.0 + i as f64 * 0.1, 0.5]);
                labels.push(class);
            }
        }
        let names = vec!["x".to_string(), "y".to_string()];
        (features, labels, names)
    }

    #[test]
    fn five_fold_separable_accuracy() {
        let (features, labels, names) = make_separable_data();
        let rf_config = RandomForestConfig::new(20)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .with_seed(42);
        let cv = CrossValidation::new(5).unwrap().with_seed(42);
        let result = cv.evaluate(&rf_config, &features, &labels, &names).unwrap();

        assert!(
            result.mean_accuracy > 0.8,
            "mean_accuracy = {}",
            result.mean_accuracy
        );
        assert_eq!(result.fold_accuracies.len(), 5);
        assert_eq!(result.n_folds, 5);
        assert_eq!(result.n_samples, 90);
    }

    #[test]
    fn fold_scores_stay_in_unit_interval() {
        let (features, labels, names) = make_separable_data();
        let rf_config = RandomForestConfig::new(5).unwrap().with_seed(42);
        let cv = CrossValidation::new(3).unwrap();
        let result = cv.evaluate(&rf_config, &features, &labels, &names).unwrap();
        assert_eq!(result.fold_accuracies.len(), 3);
        for &acc in &result.fold_accuracies {
            assert!((0.0..=1.0).contains(&acc), "fold accuracy {acc}");
        }
    }

    #[test]
    fn pooled_confusion_matrix_covers_all_samples() {
        let (features, labels, names) = make_separable_data();
        let rf_config = RandomForestConfig::new(10).unwrap().with_seed(42);
        let cv = CrossValidation::new(3).unwrap();
        let result = cv.evaluate(&rf_config, &features, &labels, &names).unwrap();
        assert_eq!(result.confusion_matrix.n_classes(), 3);
        let total: usize = result.confusion_matrix.as_rows().iter().flatten().sum();
        assert_eq!(total, 90);
    }

    #[test]
    fn stratified_folds_balance_classes() {
        let (_, labels, _) = make_separable_data();
        let cv = CrossValidation::new(5).unwrap().with_seed(42);
        let assignments = cv.stratified_assignments(&labels, 3).unwrap();
        // 30 samples per class over 5 folds: exactly 6 per class per fold.
        for fold in 0..5 {
            for class in 0..3 {
                let count = assignments
                    .iter()
                    .zip(&labels)
                    .filter(|&(&a, &l)| a == fold && l == class)
                    .count();
                assert_eq!(count, 6, "fold {fold}, class {class}");
            }
        }
    }

    #[test]
    fn feature_importances_sum_to_one() {
        let (features, labels, names) = make_separable_data();
        let rf_config = RandomForestConfig::new(10).unwrap().with_seed(42);
        let cv = CrossValidation::new(3).unwrap();
        let result = cv.evaluate(&rf_config, &features, &labels, &names).unwrap();
        let total: f64 = result.feature_importances.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
    }

    #[test]
    fn invalid_fold_count() {
        assert!(CrossValidation::new(0).is_err());
        assert!(CrossValidation::new(1).is_err());
    }

    #[test]
    fn too_few_samples_for_folds() {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0], vec![12.0]];
        let labels = vec![0, 0, 1, 1, 1];
        let names = vec!["x".to_string()];
        let rf_config = RandomForestConfig::new(5).unwrap();
        let cv = CrossValidation::new(5).unwrap();
        let err = cv
            .evaluate(&rf_config, &features, &labels, &names)
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::TooFewSamplesForFolds {
                class: 0,
                count: 2,
                n_folds: 5
            }
        ));
    }
}
