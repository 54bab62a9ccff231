//! Error types for crocus-report.

/// Errors from report rendering.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Returned when the matrix to render has zero rows.
    #[error("cannot render an empty matrix")]
    EmptyMatrix,

    /// Returned when the matrix is not square or does not match the class names.
    #[error("matrix shape mismatch: expected {expected} entries, got {got}")]
    ShapeMismatch {
        /// The expected dimension (number of class names).
        expected: usize,
        /// The dimension actually found.
        got: usize,
    },

    /// Returned when truth and prediction vectors differ in length.
    #[error("truth has {truth} entries but predictions have {predicted}")]
    LengthMismatch {
        /// Number of truth labels.
        truth: usize,
        /// Number of predicted labels.
        predicted: usize,
    },

    /// Returned when a label does not index into the class names.
    #[error("label {label} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// The number of known classes.
        n_classes: usize,
    },
}
