//! Terminal heatmap rendering for confusion matrices.

use crate::error::ReportError;
use crate::style::Style;

/// 256-color background ramp, coolest to hottest.
const RAMP: [u8; 6] = [236, 24, 25, 31, 38, 45];

/// Foreground switches to black on the two brightest backgrounds.
const DARK_FG: u8 = 16;
const LIGHT_FG: u8 = 231;

/// Render a confusion matrix as a color-graded terminal grid.
///
/// Rows are true classes, columns predicted classes, both labeled with
/// `class_names`. Each cell's background is scaled by its count relative to
/// the matrix maximum. With a plain [`Style`] the output is the bare numeric
/// grid with the same headers.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ReportError::EmptyMatrix`] | `matrix` has zero rows |
/// | [`ReportError::ShapeMismatch`] | Not square, or row count != `class_names.len()` |
pub fn render_heatmap(
    matrix: &[Vec<usize>],
    class_names: &[String],
    style: &Style,
) -> Result<String, ReportError> {
    if matrix.is_empty() {
        return Err(ReportError::EmptyMatrix);
    }
    let n = class_names.len();
    if matrix.len() != n {
        return Err(ReportError::ShapeMismatch {
            expected: n,
            got: matrix.len(),
        });
    }
    for row in matrix {
        if row.len() != n {
            return Err(ReportError::ShapeMismatch {
                expected: n,
                got: row.len(),
            });
        }
    }

    let max = matrix.iter().flatten().max().copied().unwrap_or(0);
    let label_width = class_names.iter().map(String::len).max().unwrap_or(0).max(4);
    let cell_width = label_width.max(5);

    let mut out = String::new();

    // Column headers (predicted classes).
    out.push_str(&format!("{:>label_width$}", ""));
    for name in class_names {
        out.push_str(&format!(" {name:>cell_width$}"));
    }
    out.push('\n');

    // One row per true class.
    for (name, row) in class_names.iter().zip(matrix) {
        out.push_str(&format!("{name:>label_width$}"));
        for &count in row {
            let cell = format!(" {count:>width$} ", width = cell_width - 1);
            let level = shade_level(count, max);
            let fg = if level >= RAMP.len() - 2 { DARK_FG } else { LIGHT_FG };
            out.push_str(&style.paint(&cell, fg, RAMP[level]));
        }
        out.push('\n');
    }

    Ok(out)
}

/// Map a count to an index into the shade ramp.
fn shade_level(count: usize, max: usize) -> usize {
    if max == 0 || count == 0 {
        return 0;
    }
    let fraction = count as f64 / max as f64;
    let level = (fraction * (RAMP.len() - 1) as f64).round() as usize;
    level.min(RAMP.len() - 1)
}
