//! Accuracy regression tests for crocus-rf.
//!
//! These tests verify that algorithmic changes do not degrade Random Forest
//! classification accuracy on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crocus_rf::{ConfusionMatrix, CrossValidation, OobMode, RandomForestConfig};

/// Generate a 300-sample, 8-feature, 3-class classification dataset.
///
/// Features 0-2 carry the class signal (class * 3.0 + noise in [0, 0.5]);
/// features 3-7 are pure noise in [0, 0.5]. Classes alternate round-robin.
fn make_classification() -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 300;
    let n_features = 8;
    let n_classes = 3;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    let names: Vec<String> = (0..n_features).map(|f| format!("f{f}")).collect();
    (features, labels, names)
}

/// 5-fold cross-validation mean accuracy must exceed 0.85.
#[test]
fn cv_accuracy_above_threshold() {
    let (features, labels, names) = make_classification();
    let rf_config = RandomForestConfig::new(100).unwrap().with_seed(42);
    let cv = CrossValidation::new(5).unwrap().with_seed(42);
    let result = cv.evaluate(&rf_config, &features, &labels, &names).unwrap();

    assert!(
        result.mean_accuracy > 0.85,
        "cv mean_accuracy {} <= 0.85",
        result.mean_accuracy
    );
}

/// A leaf-capped forest (16 leaves per tree) must stay above 0.85 CV accuracy
/// on this dataset; the cap trades depth for speed, not correctness here.
#[test]
fn leaf_capped_cv_accuracy_above_threshold() {
    let (features, labels, names) = make_classification();
    let rf_config = RandomForestConfig::new(100)
        .unwrap()
        .with_max_leaf_nodes(Some(16))
        .with_seed(42);
    let cv = CrossValidation::new(5).unwrap().with_seed(42);
    let result = cv.evaluate(&rf_config, &features, &labels, &names).unwrap();

    assert!(
        result.mean_accuracy > 0.85,
        "leaf-capped cv mean_accuracy {} <= 0.85",
        result.mean_accuracy
    );
}

/// OOB accuracy with 100 trees must exceed 0.80.
#[test]
fn oob_accuracy_above_threshold() {
    let (features, labels, names) = make_classification();
    let rf_config = RandomForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .with_oob_mode(OobMode::Enabled);
    let result = rf_config.fit(&features, &labels, &names).unwrap();

    let oob = result
        .oob_score()
        .expect("OOB score must be computed when OobMode::Enabled");
    assert!(oob.accuracy > 0.80, "oob_accuracy {} <= 0.80", oob.accuracy);
}

/// The top 3 features by importance must include at least 2 of f0, f1, f2.
///
/// Only f0-f2 carry the class signal; a correctly functioning forest must
/// rank them above the noise columns.
#[test]
fn top_features_are_informative() {
    let (features, labels, names) = make_classification();
    let rf_config = RandomForestConfig::new(100).unwrap().with_seed(42);
    let result = rf_config.fit(&features, &labels, &names).unwrap();

    let informative: std::collections::HashSet<&str> =
        ["f0", "f1", "f2"].iter().copied().collect();
    let top3: Vec<&str> = result
        .importances()
        .iter()
        .take(3)
        .map(|f| f.name.as_str())
        .collect();
    let hits = top3.iter().filter(|&&n| informative.contains(n)).count();

    assert!(
        hits >= 2,
        "only {hits}/3 of top-3 features are informative; top-3: {top3:?}"
    );
}

/// Same config and seed must produce identical predictions across runs.
#[test]
fn deterministic_predictions() {
    let (features, labels, names) = make_classification();
    let rf_config = RandomForestConfig::new(100).unwrap().with_seed(42);

    let result1 = rf_config.fit(&features, &labels, &names).unwrap();
    let result2 = rf_config.fit(&features, &labels, &names).unwrap();

    let preds1 = result1.forest().predict_batch(&features).unwrap();
    let preds2 = result2.forest().predict_batch(&features).unwrap();

    assert_eq!(
        preds1, preds2,
        "predictions differ across runs with the same seed"
    );
}

/// Training accuracy with 100 trees must exceed 0.95.
#[test]
fn prediction_accuracy_on_training_data() {
    let (features, labels, names) = make_classification();
    let rf_config = RandomForestConfig::new(100).unwrap().with_seed(42);
    let result = rf_config.fit(&features, &labels, &names).unwrap();

    let accuracy = result.forest().score(&features, &labels).unwrap();
    assert!(accuracy > 0.95, "training accuracy {accuracy} <= 0.95");
}

/// The reported score must equal the confusion-matrix diagonal fraction, and
/// the mismatch count must equal the off-diagonal sum.
#[test]
fn score_consistent_with_confusion_matrix() {
    let (features, labels, names) = make_classification();
    let rf_config = RandomForestConfig::new(50).unwrap().with_seed(42);
    let result = rf_config.fit(&features, &labels, &names).unwrap();
    let forest = result.forest();

    let predictions = forest.predict_batch(&features).unwrap();
    let score = forest.score(&features, &labels).unwrap();
    let cm = ConfusionMatrix::from_labels(&labels, &predictions, 3).unwrap();

    assert!((score - cm.accuracy()).abs() < 1e-12);

    let mismatches = predictions
        .iter()
        .zip(&labels)
        .filter(|&(p, l)| p != l)
        .count();
    assert_eq!(cm.n_misclassified(), mismatches);
}
