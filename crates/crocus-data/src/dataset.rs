//! In-memory labeled dataset for classification.

/// A labeled tabular dataset.
///
/// Features are row-major (`features[sample_index][feature_index]`), labels
/// are zero-based class indices into `class_names`. Rows and labels are
/// stored in parallel vectors — `features[i]` corresponds to `labels[i]`.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    class_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Dataset {
    /// Assemble a dataset from pre-validated parts.
    pub(crate) fn new(
        feature_names: Vec<String>,
        class_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self {
            feature_names,
            class_names,
            features,
            labels,
        }
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the class names, indexed by label.
    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the label vector.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Return the number of samples per class, indexed by label.
    #[must_use]
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.class_names.len()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Build a new dataset from a subset of row indices.
    ///
    /// Feature and class names are shared unchanged; indices must be valid.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        let features = indices.iter().map(|&i| self.features[i].clone()).collect();
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        Self {
            feature_names: self.feature_names.clone(),
            class_names: self.class_names.clone(),
            features,
            labels,
        }
    }
}
