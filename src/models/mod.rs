//! Models
//!
//! A [`Model`] pairs an estimator with the data it is trained on and keeps
//! the scorers produced by fitting:
//! - [`RegressionModel`] wraps any [`Regressor`]
//! - [`ClassificationModel`] wraps any [`Classifier`]
//!
//! Estimators:
//! - [`LinearRegression`] (OLS / ridge)
//! - [`LassoRegression`]
//! - [`LogisticClassifier`] (binary and one-vs-rest)

mod classification;
mod estimator;
pub mod linear;
mod regression;

pub use classification::ClassificationModel;
pub use estimator::{Classifier, Regressor};
pub use linear::{LassoRegression, LinearRegression, LogisticClassifier, LogisticRegression};
pub use regression::RegressionModel;

use crate::data::DataEmitter;
use crate::error::Result;
use crate::metrics::{ClassificationScorer, CvScorer, RegressionScorer, Scorer};
use std::sync::Arc;

/// A model whose data is specified, fitted, and then reported on
pub trait Model {
    type Scorer: Scorer;

    /// Unique identifier used for report lookup
    fn name(&self) -> &str;

    /// Attach the train/test emitter and, for outer cross-validation, the
    /// per-fold emitters
    fn specify_data(&mut self, emitter: Arc<DataEmitter>, emitters: Option<Arc<[DataEmitter]>>);

    /// Fit against the specified data, producing the scorers
    fn fit(&mut self) -> Result<()>;

    fn train_scorer(&self) -> Option<&Self::Scorer>;

    fn test_scorer(&self) -> Option<&Self::Scorer>;

    /// Held-out fold scorers from outer cross-validation
    fn cv_scorer(&self) -> Option<&CvScorer<Self::Scorer>>;

    /// Scorer over the concatenated held-out predictions of every outer
    /// fold, when cross-validation produced one
    fn train_overall_scorer(&self) -> Option<&Self::Scorer> {
        None
    }

    fn is_cross_validated(&self) -> bool {
        self.cv_scorer().is_some()
    }
}

/// Boxed regression model, as held by regression reports
pub type DynRegressionModel = dyn Model<Scorer = RegressionScorer>;

/// Boxed classification model, as held by classification reports
pub type DynClassificationModel = dyn Model<Scorer = ClassificationScorer>;
