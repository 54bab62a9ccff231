//! Out-of-bag (OOB) evaluation for Random Forest.

use crate::error::RfError;
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// OOB accuracy (fraction of correctly predicted OOB samples).
    pub accuracy: f64,
    /// OOB confusion matrix: `confusion_matrix[true][predicted]`.
    pub confusion_matrix: Vec<Vec<usize>>,
    /// Number of samples that had at least one OOB tree.
    pub n_oob_samples: usize,
}

/// Compute out-of-bag predictions and accuracy.
///
/// Each sample is voted on only by trees whose bootstrap did not contain it
/// (majority vote). Samples that are in-bag for every tree are skipped.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, RfError> {
    let n_samples = features.len();

    let mut votes: Vec<Vec<usize>> = vec![vec![0; n_classes]; n_samples];
    let mut has_oob = vec![false; n_samples];

    for (tree, oob_indices) in trees.iter().zip(oob_indices_per_tree) {
        for &sample_idx in oob_indices {
            let pred = tree.predict(&features[sample_idx])?;
            votes[sample_idx][pred] += 1;
            has_oob[sample_idx] = true;
        }
    }

    let n_oob_samples = has_oob.iter().filter(|&&h| h).count();
    if n_oob_samples == 0 {
        return Err(RfError::OobEvaluationFailed {
            reason: "no sample has any OOB tree".to_string(),
        });
    }

    let mut confusion = vec![vec![0usize; n_classes]; n_classes];
    let mut correct = 0usize;

    for (i, sample_votes) in votes.iter().enumerate() {
        if !has_oob[i] {
            continue;
        }
        let predicted = sample_votes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        confusion[labels[i]][predicted] += 1;
        if predicted == labels[i] {
            correct += 1;
        }
    }

    Ok(OobScore {
        accuracy: correct as f64 / n_oob_samples as f64,
        confusion_matrix: confusion,
        n_oob_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::compute_oob;
    use crate::tree::DecisionTreeConfig;

    #[test]
    fn oob_votes_only_from_listed_trees() {
        // One perfectly fitting tree; samples 0 and 3 are its OOB set.
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let labels = vec![0, 0, 1, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();

        let oob_per_tree = vec![vec![0usize, 3]];
        let score = compute_oob(&[tree], &features, &labels, 2, &oob_per_tree).unwrap();

        assert_eq!(score.n_oob_samples, 2);
        assert!((score.accuracy - 1.0).abs() < f64::EPSILON);
        // Only the two OOB samples appear in the matrix.
        let total: usize = score.confusion_matrix.iter().flatten().sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn no_oob_samples_is_an_error() {
        let features = vec![vec![1.0], vec![10.0]];
        let labels = vec![0, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let err = compute_oob(&[tree], &features, &labels, 2, &[vec![]]).unwrap_err();
        assert!(matches!(err, crate::RfError::OobEvaluationFailed { .. }));
    }
}
