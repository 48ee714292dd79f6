//! Regression model wrapper

use super::estimator::Regressor;
use super::{DynRegressionModel, Model};
use crate::data::DataEmitter;
use crate::error::{ReportError, Result};
use crate::metrics::{CvScorer, RegressionScorer};
use std::sync::Arc;
use tracing::debug;

/// A regression estimator bound to its data and scorers
#[derive(Debug, Clone)]
pub struct RegressionModel<R: Regressor> {
    name: String,
    estimator: R,
    emitter: Option<Arc<DataEmitter>>,
    emitters: Option<Arc<[DataEmitter]>>,
    train_scorer: Option<RegressionScorer>,
    test_scorer: Option<RegressionScorer>,
    cv_scorer: Option<CvScorer<RegressionScorer>>,
}

impl<R: Regressor + 'static> RegressionModel<R> {
    /// Wrap an estimator; the model is named after the estimator
    pub fn new(estimator: R) -> Self {
        Self {
            name: estimator.name(),
            estimator,
            emitter: None,
            emitters: None,
            train_scorer: None,
            test_scorer: None,
            cv_scorer: None,
        }
    }

    /// Override the model name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The estimator fitted on the full training partition
    pub fn estimator(&self) -> &R {
        &self.estimator
    }

    /// Box for use in a multi-model report
    pub fn boxed(self) -> Box<DynRegressionModel> {
        Box::new(self)
    }

    fn score(&self, estimator: &R, emitter: &DataEmitter, train: bool) -> Result<RegressionScorer> {
        let (x, y) = if train {
            emitter.emit_train_xy()
        } else {
            emitter.emit_test_xy()
        };
        let y_pred = estimator.predict(x)?;
        Ok(RegressionScorer::new(
            y_pred,
            y.clone(),
            emitter.x_vars().len(),
            self.name.clone(),
        ))
    }
}

impl<R: Regressor + 'static> Model for RegressionModel<R> {
    type Scorer = RegressionScorer;

    fn name(&self) -> &str {
        &self.name
    }

    fn specify_data(&mut self, emitter: Arc<DataEmitter>, emitters: Option<Arc<[DataEmitter]>>) {
        self.emitter = Some(emitter);
        self.emitters = emitters;
    }

    fn fit(&mut self) -> Result<()> {
        let emitter = self.emitter.clone().ok_or_else(|| {
            ReportError::ValidationError(format!(
                "data for model '{}' not specified; call specify_data first",
                self.name
            ))
        })?;

        self.cv_scorer = match self.emitters.clone() {
            Some(folds) => {
                let mut fold_scorers = Vec::with_capacity(folds.len());
                for (i, fold) in folds.iter().enumerate() {
                    let mut estimator = self.estimator.clone();
                    let (x, y) = fold.emit_train_xy();
                    estimator.fit(x, y)?;
                    fold_scorers.push(self.score(&estimator, fold, false)?);
                    debug!(model = %self.name, fold = i + 1, "Scored outer fold");
                }
                Some(CvScorer::new(fold_scorers, self.name.clone()))
            }
            None => None,
        };

        let (x, y) = emitter.emit_train_xy();
        self.estimator.fit(x, y)?;
        self.train_scorer = Some(self.score(&self.estimator, &emitter, true)?);
        self.test_scorer = Some(self.score(&self.estimator, &emitter, false)?);
        Ok(())
    }

    fn train_scorer(&self) -> Option<&RegressionScorer> {
        self.train_scorer.as_ref()
    }

    fn test_scorer(&self) -> Option<&RegressionScorer> {
        self.test_scorer.as_ref()
    }

    fn cv_scorer(&self) -> Option<&CvScorer<RegressionScorer>> {
        self.cv_scorer.as_ref()
    }
}
