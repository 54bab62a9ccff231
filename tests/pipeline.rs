//! End-to-end pipeline checks: load, split, fit, score, report, cross-validate.
//!
//! These are the glue-level sanity properties of the evaluation pipeline,
//! run on the real bundled dataset with a small forest to keep them fast.

use crocus_data::{TrainTestSplit, load_iris};
use crocus_report::{Style, render_heatmap, render_prediction_table};
use crocus_rf::{ConfusionMatrix, CrossValidation, RandomForestConfig};

const SEED: u64 = 42;

#[test]
fn split_sizes_sum_to_dataset_size() {
    let dataset = load_iris().unwrap();
    for seed in [0u64, 7, 42, 12345] {
        let (train, test) = TrainTestSplit::new(0.25)
            .unwrap()
            .with_seed(seed)
            .split(&dataset)
            .unwrap();
        assert_eq!(train.n_samples() + test.n_samples(), dataset.n_samples());
    }
}

#[test]
fn test_accuracy_consistent_with_confusion_diagonal() {
    let dataset = load_iris().unwrap();
    let (train, test) = TrainTestSplit::new(0.25)
        .unwrap()
        .with_seed(SEED)
        .split(&dataset)
        .unwrap();

    let result = RandomForestConfig::new(50)
        .unwrap()
        .with_max_leaf_nodes(Some(16))
        .with_seed(SEED)
        .fit(train.features(), train.labels(), train.feature_names())
        .unwrap();
    let forest = result.forest();

    let accuracy = forest.score(test.features(), test.labels()).unwrap();
    let percent = accuracy * 100.0;
    assert!((0.0..=100.0).contains(&percent), "accuracy% = {percent}");

    let predictions = forest.predict_batch(test.features()).unwrap();
    let cm =
        ConfusionMatrix::from_labels(test.labels(), &predictions, dataset.n_classes()).unwrap();

    let diagonal: usize = (0..cm.n_classes()).map(|i| cm.as_rows()[i][i]).sum();
    let expected = diagonal as f64 / test.n_samples() as f64;
    assert!(
        (accuracy - expected).abs() < 1e-12,
        "score {accuracy} != diagonal fraction {expected}"
    );
}

#[test]
fn misclassified_count_is_off_diagonal_sum() {
    let dataset = load_iris().unwrap();
    let (train, test) = TrainTestSplit::new(0.25)
        .unwrap()
        .with_seed(SEED)
        .split(&dataset)
        .unwrap();

    let result = RandomForestConfig::new(50)
        .unwrap()
        .with_max_leaf_nodes(Some(16))
        .with_seed(SEED)
        .fit(train.features(), train.labels(), train.feature_names())
        .unwrap();

    let predictions = result.forest().predict_batch(test.features()).unwrap();
    let cm =
        ConfusionMatrix::from_labels(test.labels(), &predictions, dataset.n_classes()).unwrap();

    let mismatches = predictions
        .iter()
        .zip(test.labels())
        .filter(|&(p, l)| p != l)
        .count();
    assert_eq!(cm.n_misclassified(), mismatches);

    let off_diagonal: usize = cm
        .as_rows()
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(move |&(j, _)| j != i)
                .map(|(_, &v)| v)
        })
        .sum();
    assert_eq!(cm.n_misclassified(), off_diagonal);
}

#[test]
fn cross_validation_returns_configured_fold_scores() {
    let dataset = load_iris().unwrap();
    let (train, _) = TrainTestSplit::new(0.25)
        .unwrap()
        .with_seed(SEED)
        .split(&dataset)
        .unwrap();

    let config = RandomForestConfig::new(20)
        .unwrap()
        .with_max_leaf_nodes(Some(16))
        .with_seed(SEED);
    let cv = CrossValidation::new(5).unwrap().with_seed(SEED);
    let cv_result = cv
        .evaluate(&config, train.features(), train.labels(), train.feature_names())
        .unwrap();

    assert_eq!(cv_result.fold_accuracies.len(), 5);
    for &score in &cv_result.fold_accuracies {
        assert!((0.0..=1.0).contains(&score), "fold score {score}");
    }
    assert!((0.0..=1.0).contains(&cv_result.mean_accuracy));
}

#[test]
fn forest_separates_iris_reasonably_well() {
    // Iris is an easy dataset; even a small leaf-capped forest should be
    // well above chance on the held-out split.
    let dataset = load_iris().unwrap();
    let (train, test) = TrainTestSplit::new(0.25)
        .unwrap()
        .with_seed(SEED)
        .split(&dataset)
        .unwrap();

    let result = RandomForestConfig::new(100)
        .unwrap()
        .with_max_leaf_nodes(Some(16))
        .with_seed(SEED)
        .fit(train.features(), train.labels(), train.feature_names())
        .unwrap();

    let accuracy = result.forest().score(test.features(), test.labels()).unwrap();
    assert!(accuracy > 0.8, "test accuracy = {accuracy}");
}

#[test]
fn report_renders_for_real_pipeline_output() {
    let dataset = load_iris().unwrap();
    let (train, test) = TrainTestSplit::new(0.25)
        .unwrap()
        .with_seed(SEED)
        .split(&dataset)
        .unwrap();

    let result = RandomForestConfig::new(20)
        .unwrap()
        .with_max_leaf_nodes(Some(16))
        .with_seed(SEED)
        .fit(train.features(), train.labels(), train.feature_names())
        .unwrap();

    let predictions = result.forest().predict_batch(test.features()).unwrap();
    let cm =
        ConfusionMatrix::from_labels(test.labels(), &predictions, dataset.n_classes()).unwrap();

    let heatmap = render_heatmap(cm.as_rows(), dataset.class_names(), &Style::plain()).unwrap();
    assert!(heatmap.contains("setosa"));
    assert_eq!(heatmap.lines().count(), dataset.n_classes() + 1);

    let table = render_prediction_table(
        test.labels(),
        &predictions,
        dataset.class_names(),
        &Style::plain(),
    )
    .unwrap();
    // Header plus one row per test sample.
    assert_eq!(table.lines().count(), test.n_samples() + 1);
}
