//! The bundled Iris dataset.

use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::DataError;

/// Fisher's Iris measurements, compiled into the binary.
const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// Load the bundled Iris dataset.
///
/// 150 samples, 4 feature columns (sepal/petal length and width in cm),
/// 3 classes (setosa, versicolor, virginica) with 50 samples each. Class
/// labels are assigned in first-seen order, so setosa = 0, versicolor = 1,
/// virginica = 2.
///
/// The CSV is revalidated on every load: the asset is compiled in, but the
/// parser applies the same checks it would to any external file.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::CsvParse`] | Malformed CSV record |
/// | [`DataError::EmptyDataset`] | Zero data rows after header |
/// | [`DataError::InconsistentRowLength`] | Row column count differs from header |
/// | [`DataError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable |
/// | [`DataError::EmptySpecies`] | Species column is empty |
pub fn load_iris() -> Result<Dataset, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(IRIS_CSV.as_bytes());

    let header = rdr.headers().map_err(|e| DataError::CsvParse {
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    })?;
    let expected_cols = header.len();
    if expected_cols < 2 {
        return Err(DataError::EmptyDataset);
    }
    let n_feature_cols = expected_cols - 1;
    let feature_names: Vec<String> = header
        .iter()
        .take(n_feature_cols)
        .map(str::to_string)
        .collect();
    debug!(n_feature_cols, "read bundled CSV header");

    let mut class_names: Vec<String> = Vec::new();
    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (row_index, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| DataError::CsvParse {
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;

        if record.len() != expected_cols {
            return Err(DataError::InconsistentRowLength {
                row_index,
                expected: expected_cols,
                got: record.len(),
            });
        }

        let mut row = Vec::with_capacity(n_feature_cols);
        for col_index in 0..n_feature_cols {
            let raw = record.get(col_index).unwrap_or("");
            let value: f64 = raw.parse().map_err(|_| DataError::NonFiniteValue {
                row_index,
                col_index,
                raw: raw.to_string(),
            })?;
            if !value.is_finite() {
                return Err(DataError::NonFiniteValue {
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                });
            }
            row.push(value);
        }

        let species = record.get(n_feature_cols).unwrap_or("");
        if species.is_empty() {
            return Err(DataError::EmptySpecies { row_index });
        }
        let label = match class_names.iter().position(|n| n == species) {
            Some(idx) => idx,
            None => {
                class_names.push(species.to_string());
                class_names.len() - 1
            }
        };

        features.push(row);
        labels.push(label);
    }

    if features.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    info!(
        n_samples = features.len(),
        n_features = n_feature_cols,
        n_classes = class_names.len(),
        "iris dataset loaded"
    );

    Ok(Dataset::new(feature_names, class_names, features, labels))
}
