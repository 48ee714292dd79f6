//! Classification model wrapper

use super::estimator::Classifier;
use super::{DynClassificationModel, Model};
use crate::data::DataEmitter;
use crate::error::{ReportError, Result};
use crate::metrics::classification::distinct_classes;
use crate::metrics::{ClassificationScorer, CvScorer, TaskArity};
use ndarray::{concatenate, Array1, Array2, Axis};
use std::sync::Arc;
use tracing::debug;

/// A classification estimator bound to its data and scorers
#[derive(Debug, Clone)]
pub struct ClassificationModel<C: Classifier> {
    name: String,
    estimator: C,
    emitter: Option<Arc<DataEmitter>>,
    emitters: Option<Arc<[DataEmitter]>>,
    classes: Vec<f64>,
    train_scorer: Option<ClassificationScorer>,
    test_scorer: Option<ClassificationScorer>,
    cv_scorer: Option<CvScorer<ClassificationScorer>>,
    train_overall_scorer: Option<ClassificationScorer>,
}

/// Predictions for one partition: labels and, for binary tasks, the
/// positive-class scores
struct Predictions {
    labels: Array1<f64>,
    scores: Option<Array1<f64>>,
    truth: Array1<f64>,
}

impl<C: Classifier + 'static> ClassificationModel<C> {
    /// Wrap an estimator; the model is named after the estimator
    pub fn new(estimator: C) -> Self {
        Self {
            name: estimator.name(),
            estimator,
            emitter: None,
            emitters: None,
            classes: Vec::new(),
            train_scorer: None,
            test_scorer: None,
            cv_scorer: None,
            train_overall_scorer: None,
        }
    }

    /// Override the model name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn estimator(&self) -> &C {
        &self.estimator
    }

    /// Class labels of the full training partition
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn arity(&self) -> TaskArity {
        TaskArity::from_classes(&self.classes)
    }

    /// Box for use in a multi-model report
    pub fn boxed(self) -> Box<DynClassificationModel> {
        Box::new(self)
    }

    fn predict(&self, estimator: &C, x: &Array2<f64>, y: &Array1<f64>) -> Result<Predictions> {
        let proba = estimator.predict_proba(x)?;
        let labels = estimator.predict(x)?;

        let scores = match self.arity() {
            TaskArity::Binary => {
                let positive = self.classes.get(1).copied().unwrap_or(1.0);
                let column = estimator.classes().iter().position(|&c| c == positive);
                Some(match column {
                    Some(c) => proba.column(c).to_owned(),
                    None => Array1::zeros(x.nrows()),
                })
            }
            TaskArity::Multiclass => None,
        };

        Ok(Predictions {
            labels,
            scores,
            truth: y.clone(),
        })
    }

    fn scorer(&self, p: Predictions) -> ClassificationScorer {
        ClassificationScorer::new(p.labels, p.truth, p.scores, self.classes.clone(), self.name.clone())
    }
}

impl<C: Classifier + 'static> Model for ClassificationModel<C> {
    type Scorer = ClassificationScorer;

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

        let (x, y) = emitter.emit_train_xy();
        self.classes = distinct_classes(y);

        self.cv_scorer = None;
        self.train_overall_scorer = None;
        if let Some(folds) = self.emitters.clone() {
            let mut fold_scorers = Vec::with_capacity(folds.len());
            let mut held_out = Vec::with_capacity(folds.len());

            for (i, fold) in folds.iter().enumerate() {
                let mut estimator = self.estimator.clone();
                let (x_fold, y_fold) = fold.emit_train_xy();
                estimator.fit(x_fold, y_fold)?;

                let (x_held, y_held) = fold.emit_test_xy();
                let p = self.predict(&estimator, x_held, y_held)?;
                held_out.push((p.labels.clone(), p.scores.clone(), p.truth.clone()));
                fold_scorers.push(self.scorer(p));
                debug!(model = %self.name, fold = i + 1, "Scored outer fold");
            }

            let labels: Vec<_> = held_out.iter().map(|(l, _, _)| l.view()).collect();
            let truths: Vec<_> = held_out.iter().map(|(_, _, t)| t.view()).collect();
            let scores: Option<Vec<_>> = held_out.iter().map(|(_, s, _)| s.as_ref().map(|s| s.view())).collect();

            let overall = Predictions {
                labels: concatenate(Axis(0), &labels)?,
                truth: concatenate(Axis(0), &truths)?,
                scores: scores.map(|s| concatenate(Axis(0), &s)).transpose()?,
            };
            self.train_overall_scorer = Some(self.scorer(overall));
            self.cv_scorer = Some(CvScorer::new(fold_scorers, self.name.clone()));
        }

        self.estimator.fit(x, y)?;
        let train = self.predict(&self.estimator, x, y)?;
        self.train_scorer = Some(self.scorer(train));

        let (x_test, y_test) = emitter.emit_test_xy();
        let test = self.predict(&self.estimator, x_test, y_test)?;
        self.test_scorer = Some(self.scorer(test));
        Ok(())
    }

    fn train_scorer(&self) -> Option<&ClassificationScorer> {
        self.train_scorer.as_ref()
    }

    fn test_scorer(&self) -> Option<&ClassificationScorer> {
        self.test_scorer.as_ref()
    }

    fn cv_scorer(&self) -> Option<&CvScorer<ClassificationScorer>> {
        self.cv_scorer.as_ref()
    }

    fn train_overall_scorer(&self) -> Option<&ClassificationScorer> {
        self.train_overall_scorer.as_ref()
    }
}
