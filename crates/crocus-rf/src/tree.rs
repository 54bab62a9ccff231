use std::collections::BinaryHeap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::error::RfError;
use crate::node::Node;
use crate::split::{BestSplit, SplitCriterion, find_best_split};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `max_leaf_nodes`    | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
///
/// With `max_leaf_nodes` unset the tree grows depth-first until every leaf is
/// pure or a stopping rule fires. With it set, growth switches to best-first:
/// the frontier leaf whose best split yields the largest impurity decrease is
/// expanded next, until the leaf count reaches the cap.
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) max_leaf_nodes: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            max_leaf_nodes: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of leaves. `None` means unlimited.
    #[must_use]
    pub fn with_max_leaf_nodes(mut self, max_leaf_nodes: Option<usize>) -> Self {
        self.max_leaf_nodes = max_leaf_nodes;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the maximum number of features to consider at each split.
    ///
    /// `None` means consider all features.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train a decision tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]` — row-major layout.
    /// `labels[sample_idx]` — class labels (zero-based).
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `features` is empty |
    /// | [`RfError::ZeroFeatures`] | rows have zero feature columns |
    /// | [`RfError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`RfError::NonFiniteValue`] | any value is NaN or infinite |
    /// | [`RfError::InvalidMaxFeatures`] | `max_features` resolves outside [1, n_features] |
    /// | [`RfError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`RfError::InvalidMaxLeafNodes`] | `max_leaf_nodes` is `Some(0)` or `Some(1)` |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split` < 2 |
    /// | [`RfError::InvalidMinSamplesLeaf`] | `min_samples_leaf` < 1 |
    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        let (n_samples, n_features) = validate_dataset(features, labels)?;

        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if let Some(cap) = self.max_leaf_nodes
            && cap < 2
        {
            return Err(RfError::InvalidMaxLeafNodes {
                max_leaf_nodes: cap,
            });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }

        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;

        debug!(
            n_samples,
            n_features,
            n_classes,
            max_features,
            max_leaf_nodes = ?self.max_leaf_nodes,
            "fitting decision tree"
        );

        // Column-major layout for the split scan.
        let col_features: Vec<Vec<f64>> = (0..n_features)
            .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
            .collect();

        let mut grower = Grower {
            col_features: &col_features,
            labels,
            n_classes,
            config: self,
            max_features,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };

        let all_indices: Vec<usize> = (0..n_samples).collect();
        match self.max_leaf_nodes {
            Some(cap) => {
                grower.grow_best_first(&all_indices, cap);
            }
            None => {
                grower.grow_depth_first(&all_indices, 0);
            }
        }

        debug!(n_nodes = grower.arena.len(), "decision tree built");

        Ok(DecisionTree {
            nodes: grower.arena,
            n_features,
            n_classes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a row-major training dataset.
///
/// Returns `(n_samples, n_features)` on success. Shared between tree and
/// forest training so both report identical errors.
pub(crate) fn validate_dataset(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<(usize, usize), RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_samples = features.len();
    if labels.len() != n_samples {
        return Err(RfError::LabelCountMismatch {
            n_rows: n_samples,
            n_labels: labels.len(),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok((n_samples, n_features))
}

/// Shared state for growing one tree over a column-major dataset.
struct Grower<'a> {
    col_features: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    config: &'a DecisionTreeConfig,
    max_features: usize,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

/// A frontier leaf awaiting best-first expansion, with its precomputed split.
struct FrontierEntry {
    decrease: f64,
    /// Insertion sequence; earlier entries win ties for determinism.
    order: usize,
    node_idx: usize,
    depth: usize,
    split: BestSplit,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.decrease == other.decrease && self.order == other.order
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.decrease
            .total_cmp(&other.decrease)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl Grower<'_> {
    fn class_counts(&self, sample_indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &si in sample_indices {
            counts[self.labels[si]] += 1;
        }
        counts
    }

    /// Append a leaf for the given samples and return its arena index.
    fn push_leaf(&mut self, sample_indices: &[usize]) -> usize {
        let class_counts = self.class_counts(sample_indices);
        let impurity = self
            .config
            .criterion
            .impurity(&class_counts, sample_indices.len());
        let idx = self.arena.len();
        self.arena.push(Node::Leaf {
            class_counts,
            impurity,
        });
        idx
    }

    /// Find the best split for a node, or `None` when a stopping rule fires.
    fn best_split(&mut self, sample_indices: &[usize], depth: usize) -> Option<BestSplit> {
        let n_samples = sample_indices.len();
        if self.config.max_depth.is_some_and(|max_d| depth >= max_d) {
            return None;
        }
        if n_samples < self.config.min_samples_split {
            return None;
        }
        let counts = self.class_counts(sample_indices);
        if self.config.criterion.impurity(&counts, n_samples).value() == 0.0 {
            return None;
        }
        find_best_split(
            self.col_features,
            self.labels,
            sample_indices,
            self.n_classes,
            self.config.criterion,
            self.max_features,
            self.config.min_samples_leaf,
            &mut self.rng,
        )
    }

    /// Classic recursive growth: split every node until a stopping rule fires.
    ///
    /// Returns the arena index of the subtree root. Uses the placeholder
    /// pattern — the parent slot is pushed before the children so indices
    /// stay valid during recursion.
    fn grow_depth_first(&mut self, sample_indices: &[usize], depth: usize) -> usize {
        let split = match self.best_split(sample_indices, depth) {
            Some(s) => s,
            None => return self.push_leaf(sample_indices),
        };

        let class_counts = self.class_counts(sample_indices);
        let impurity = self
            .config
            .criterion
            .impurity(&class_counts, sample_indices.len());

        let node_idx = self.arena.len();
        self.arena.push(Node::Leaf {
            class_counts,
            impurity,
        });

        let left = self.grow_depth_first(&split.left_indices, depth + 1);
        let right = self.grow_depth_first(&split.right_indices, depth + 1);

        self.arena[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples: sample_indices.len(),
            impurity_decrease: split.impurity_decrease,
        };
        node_idx
    }

    /// Leaf-capped growth: repeatedly expand the frontier leaf whose best
    /// split yields the largest impurity decrease, until the tree holds
    /// `cap` leaves or no frontier leaf can split.
    fn grow_best_first(&mut self, sample_indices: &[usize], cap: usize) -> usize {
        let root = self.push_leaf(sample_indices);
        let mut n_leaves = 1usize;
        let mut next_order = 0usize;
        let mut frontier = BinaryHeap::new();

        if let Some(split) = self.best_split(sample_indices, 0) {
            frontier.push(FrontierEntry {
                decrease: split.impurity_decrease,
                order: next_order,
                node_idx: root,
                depth: 0,
                split,
            });
            next_order += 1;
        }

        while n_leaves < cap {
            let Some(entry) = frontier.pop() else { break };
            let FrontierEntry {
                node_idx,
                depth,
                split,
                ..
            } = entry;

            // The expanded slot is still the leaf it was queued as.
            let (impurity, n_samples) = match &self.arena[node_idx] {
                Node::Leaf {
                    class_counts,
                    impurity,
                } => (*impurity, class_counts.iter().sum::<usize>()),
                Node::Split { .. } => unreachable!("frontier entries reference leaves"),
            };

            let left = self.push_leaf(&split.left_indices);
            let right = self.push_leaf(&split.right_indices);
            self.arena[node_idx] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
                impurity,
                n_samples,
                impurity_decrease: split.impurity_decrease,
            };
            n_leaves += 1;

            for (child_idx, child_indices) in
                [(left, &split.left_indices), (right, &split.right_indices)]
            {
                if let Some(child_split) = self.best_split(child_indices, depth + 1) {
                    frontier.push(FrontierEntry {
                        decrease: child_split.impurity_decrease,
                        order: next_order,
                        node_idx: child_idx,
                        depth: depth + 1,
                        split: child_split,
                    });
                    next_order += 1;
                }
            }
        }

        root
    }
}

/// A fitted CART decision tree.
///
/// Stored as an arena-based `Vec<Node>` (root at index 0) with index
/// references for cache-friendly traversal.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// Traverses from the root: at each split, goes left when
    /// `sample[feature] <= threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let leaf = &self.nodes[self.traverse(sample)];
        Ok(leaf
            .leaf_prediction()
            .expect("traverse always ends at a leaf"))
    }

    /// Return the class probability distribution for a single sample.
    ///
    /// The returned `Vec` has length `n_classes`, summing to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let leaf = &self.nodes[self.traverse(sample)];
        Ok(leaf
            .leaf_distribution()
            .expect("traverse always ends at a leaf"))
    }

    /// Compute Mean Decrease in Impurity (MDI) feature importances.
    ///
    /// Accumulates each split's `impurity_decrease` by feature index, then
    /// normalizes the totals to sum to 1.0. Returns a `Vec` of length
    /// `n_features`; all zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node_idx, d)) = stack.pop() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
            }
        }
        max_depth
    }

    /// Traverse from the root and return the arena index of the leaf reached.
    fn traverse(&self, sample: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}
