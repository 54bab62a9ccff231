//! Console rendering for classifier evaluation output.
//!
//! Renders confusion-matrix heatmaps, per-sample prediction tables, and
//! per-class metric tables as strings for terminal display. Everything takes
//! plain slices, so the crate has no dependency on the classifier itself.

mod error;
mod heatmap;
mod style;
mod table;

pub use error::ReportError;
pub use heatmap::render_heatmap;
pub use style::Style;
pub use table::{render_class_metrics, render_prediction_table};
