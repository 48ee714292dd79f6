//! Fit statistics
//!
//! Scorers hold predictions and ground truth for one dataset partition and
//! expose their statistics as [`StatsTable`]s:
//! - [`RegressionScorer`] - rmse, mae, mape, correlations, R²
//! - [`ClassificationScorer`] - accuracy, precision, recall, f1, ROC AUC
//! - [`CvScorer`] - per-fold and fold-averaged statistics

pub mod classification;
pub mod cv;
pub mod regression;
pub mod roc;
mod table;

pub use classification::{ClassificationScorer, TaskArity};
pub use cv::{CvScorer, Scorer};
pub use regression::RegressionScorer;
pub use roc::{roc_curve, RocCurve};
pub use table::StatsTable;
