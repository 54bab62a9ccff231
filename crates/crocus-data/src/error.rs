//! Error types for crocus-data.

/// Errors from dataset parsing and splitting.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error at byte offset {offset}")]
    CsvParse {
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV contains a header but zero data rows.
    #[error("dataset has no data rows")]
    EmptyDataset,

    /// Returned when a data row has a different number of columns than the header.
    #[error("row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is NaN, Inf, or unparseable.
    #[error("non-finite value at row {row_index}, column {col_index}: \"{raw}\"")]
    NonFiniteValue {
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based feature column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the species column is empty.
    #[error("empty species label at row {row_index}")]
    EmptySpecies {
        /// Zero-based row index (excluding header).
        row_index: usize,
    },

    /// Returned when test_fraction is outside (0.0, 1.0).
    #[error("test_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when a split would leave the train or test side empty.
    #[error("splitting {n_samples} samples with test_fraction {fraction} leaves an empty subset")]
    DegenerateSplit {
        /// Total number of samples.
        n_samples: usize,
        /// The requested test fraction.
        fraction: f64,
    },
}
