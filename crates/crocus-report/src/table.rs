//! Per-sample prediction table and per-class metrics table.

use crate::error::ReportError;
use crate::style::Style;

const RED: u8 = 196;
const GREEN: u8 = 40;

/// Render the per-sample truth/prediction/correctness table.
///
/// One row per sample: the true class name, the predicted class name, and
/// whether they match. With color enabled, matches render green and
/// mismatches red.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ReportError::LengthMismatch`] | `truth.len() != predicted.len()` |
/// | [`ReportError::LabelOutOfRange`] | A label does not index `class_names` |
pub fn render_prediction_table(
    truth: &[usize],
    predicted: &[usize],
    class_names: &[String],
    style: &Style,
) -> Result<String, ReportError> {
    if truth.len() != predicted.len() {
        return Err(ReportError::LengthMismatch {
            truth: truth.len(),
            predicted: predicted.len(),
        });
    }
    let n_classes = class_names.len();
    for &label in truth.iter().chain(predicted) {
        if label >= n_classes {
            return Err(ReportError::LabelOutOfRange { label, n_classes });
        }
    }

    let name_width = class_names
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("prediction".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:>name_width$}  {:>name_width$}  correct\n",
        "truth", "prediction"
    ));
    for (&t, &p) in truth.iter().zip(predicted) {
        let verdict = if t == p {
            style.fg("true", GREEN)
        } else {
            style.fg("false", RED)
        };
        out.push_str(&format!(
            "{:>name_width$}  {:>name_width$}  {verdict}\n",
            class_names[t], class_names[p]
        ));
    }
    Ok(out)
}

/// Render per-class precision/recall/F1/support rows.
///
/// `metrics[i]` is `(precision, recall, f1, support)` for class `i`, passed
/// as plain primitives so callers are not tied to any classifier crate.
///
/// # Errors
///
/// Returns [`ReportError::ShapeMismatch`] when `metrics.len() != class_names.len()`.
pub fn render_class_metrics(
    class_names: &[String],
    metrics: &[(f64, f64, f64, usize)],
    _style: &Style,
) -> Result<String, ReportError> {
    if metrics.len() != class_names.len() {
        return Err(ReportError::ShapeMismatch {
            expected: class_names.len(),
            got: metrics.len(),
        });
    }

    let name_width = class_names.iter().map(String::len).max().unwrap_or(0).max(5);

    let mut out = String::new();
    out.push_str(&format!(
        "{:>name_width$}  precision  recall      f1  support\n",
        "class"
    ));
    for (name, &(precision, recall, f1, support)) in class_names.iter().zip(metrics) {
        out.push_str(&format!(
            "{name:>name_width$}  {precision:>9.4}  {recall:>6.4}  {f1:>6.4}  {support:>7}\n"
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["setosa".into(), "versicolor".into(), "virginica".into()]
    }

    #[test]
    fn table_rows_and_verdicts() {
        let out =
            render_prediction_table(&[0, 1, 2], &[0, 2, 2], &names(), &Style::plain()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("truth"));
        assert!(lines[1].ends_with("true"));
        assert!(lines[2].ends_with("false"));
        assert!(lines[2].contains("versicolor"));
        assert!(lines[3].ends_with("true"));
    }

    #[test]
    fn color_marks_mismatches() {
        let out = render_prediction_table(&[0, 1], &[0, 0], &names(), &Style::ansi()).unwrap();
        assert!(out.contains("\x1b[38;5;196m"));
        assert!(out.contains("\x1b[38;5;40m"));
    }

    #[test]
    fn length_mismatch_rejected() {
        let err =
            render_prediction_table(&[0, 1], &[0], &names(), &Style::plain()).unwrap_err();
        assert!(matches!(
            err,
            ReportError::LengthMismatch {
                truth: 2,
                predicted: 1
            }
        ));
    }

    #[test]
    fn label_out_of_range_rejected() {
        let err =
            render_prediction_table(&[0, 7], &[0, 0], &names(), &Style::plain()).unwrap_err();
        assert!(matches!(
            err,
            ReportError::LabelOutOfRange {
                label: 7,
                n_classes: 3
            }
        ));
    }

    #[test]
    fn empty_input_renders_header_only() {
        let out = render_prediction_table(&[], &[], &names(), &Style::plain()).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn class_metrics_formatting() {
        let metrics = vec![
            (1.0, 1.0, 1.0, 13),
            (0.9375, 1.0, 0.9677, 15),
            (1.0, 0.9, 0.9474, 10),
        ];
        let out = render_class_metrics(&names(), &metrics, &Style::plain()).unwrap();
        assert_eq!(out.lines().count(), 4);
        assert!(out.contains("precision"));
        assert!(out.contains("0.9375"));
        assert!(out.contains("13"));
    }

    #[test]
    fn class_metrics_shape_mismatch() {
        let err = render_class_metrics(&names(), &[(1.0, 1.0, 1.0, 5)], &Style::plain())
            .unwrap_err();
        assert!(matches!(err, ReportError::ShapeMismatch { expected: 3, got: 1 }));
    }
}
