//! tabreport - Model reports and feature selection for tabular ML
//!
//! This crate fits regression and classification models on a shared
//! train/test split, reports their goodness-of-fit statistics and draws
//! diagnostic plots. It also reduces predictor sets with univariate or
//! Lasso-based feature selection.
//!
//! # Modules
//!
//! ## Reporting
//! - [`report`] - Dataset, model and multi-model reports
//! - [`metrics`] - Scorers and statistic tables
//! - [`plotting`] - ROC and observed-vs-predicted plots (SVG)
//!
//! ## Modeling
//! - [`models`] - Estimators and the model contract used by reports
//! - [`feature_selection`] - K-best and Lasso selectors
//! - [`preprocessing`] - Target scaling
//!
//! ## Data
//! - [`data`] - Polars-backed data handler, emitters and k-fold splits
//! - [`config`] - Report configuration
//!
//! ## Services
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use tabreport::prelude::*;
//!
//! # fn main() -> tabreport::error::Result<()> {
//! let df = load_csv("housing.csv")?;
//! let data = DataHandler::new(df);
//! let config = ReportConfig::new("price", &["rooms", "area"]).with_outer_cv(5);
//!
//! let models = vec![
//!     RegressionModel::new(LinearRegression::new()).boxed(),
//!     RegressionModel::new(LassoRegression::new(0.1)).boxed(),
//! ];
//! let report = MLRegressionReport::new(models, &data, config)?;
//! println!("{}", report.fit_statistics(Dataset::Test)?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;
pub mod config;

// Data and statistics
pub mod data;
pub mod metrics;

// Modeling
pub mod models;
pub mod feature_selection;
pub mod preprocessing;

// Reporting
pub mod plotting;
pub mod report;

// Services
pub mod cli;

pub use error::{ReportError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::ReportConfig;
    pub use crate::data::{load_csv, DataEmitter, DataHandler};
    pub use crate::error::{ReportError, Result};
    pub use crate::feature_selection::{FeatureSelector, KBestSelector, LassoSelector, ScoreFunc, Selection};
    pub use crate::metrics::{ClassificationScorer, RegressionScorer, StatsTable, TaskArity};
    pub use crate::models::{
        ClassificationModel, Classifier, LassoRegression, LinearRegression, LogisticClassifier, Model,
        RegressionModel, Regressor,
    };
    pub use crate::plotting::{Figure, DEFAULT_FIGSIZE};
    pub use crate::preprocessing::{ScalerType, TargetScaler};
    pub use crate::report::{
        Availability, ClassificationModelReport, Dataset, HoldoutRegressionReport, MLClassificationReport,
        MLRegressionReport, RegressionModelReport, Unavailable,
    };
}
