//! Regression reports

use super::{fit_models, Availability, Dataset, Unavailable};
use crate::config::ReportConfig;
use crate::data::DataHandler;
use crate::error::{ReportError, Result};
use crate::metrics::{RegressionScorer, StatsTable};
use crate::models::DynRegressionModel;
use crate::plotting::{self, Figure};
use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, DrawingBackend};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Statistics and plots for one regression model on one partition
#[derive(Clone)]
pub struct RegressionDatasetReport {
    model: Arc<DynRegressionModel>,
    dataset: Dataset,
}

impl RegressionDatasetReport {
    /// Bind a fitted model to the partition named `dataset` ("train" or
    /// "test")
    pub fn new(model: Arc<DynRegressionModel>, dataset: &str) -> Result<Self> {
        Ok(Self::for_dataset(model, dataset.parse()?))
    }

    pub fn for_dataset(model: Arc<DynRegressionModel>, dataset: Dataset) -> Self {
        Self { model, dataset }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn model(&self) -> &DynRegressionModel {
        &*self.model
    }

    fn scorer(&self) -> Result<&RegressionScorer> {
        match self.dataset {
            Dataset::Train => self.model.train_scorer(),
            Dataset::Test => self.model.test_scorer(),
        }
        .ok_or(ReportError::ModelNotFitted)
    }

    /// Goodness-of-fit statistics, one column named by the model
    pub fn fit_statistics(&self) -> Result<StatsTable> {
        Ok(self.scorer()?.stats_df())
    }

    /// Cross-validated statistics, averaged across folds or one column per
    /// fold. Only defined on the train partition of a cross-validated model.
    pub fn cv_fit_statistics(&self, averaged_across_folds: bool) -> Availability<StatsTable> {
        if !self.model.is_cross_validated() {
            return Availability::unavailable(Unavailable::NotCrossValidated);
        }
        if self.dataset == Dataset::Test {
            return Availability::unavailable(Unavailable::TestPartition);
        }

        match self.model.cv_scorer() {
            Some(cv) if averaged_across_folds => Availability::Available(cv.stats_df()),
            Some(cv) => Availability::Available(cv.cv_stats_df()),
            None => Availability::unavailable(Unavailable::NotCrossValidated),
        }
    }

    /// Observed (y-axis) against predicted (x-axis) values
    pub fn plot_obs_vs_pred(&self, figsize: (u32, u32)) -> Result<Figure> {
        let scorer = self.scorer()?;
        plotting::plot_obs_vs_pred(&scorer.y_pred().to_vec(), &scorer.y_true().to_vec(), figsize)
    }

    /// Like [`plot_obs_vs_pred`](Self::plot_obs_vs_pred), drawn into an
    /// existing area
    pub fn draw_obs_vs_pred<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let scorer = self.scorer()?;
        plotting::draw_obs_vs_pred(area, &scorer.y_pred().to_vec(), &scorer.y_true().to_vec())
    }
}

impl fmt::Debug for RegressionDatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegressionDatasetReport")
            .field("model", &self.model.name())
            .field("dataset", &self.dataset)
            .finish()
    }
}

/// Routes to the train or test report of one regression model
#[derive(Clone)]
pub struct RegressionModelReport {
    model: Arc<DynRegressionModel>,
}

impl RegressionModelReport {
    pub fn new(model: Arc<DynRegressionModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &DynRegressionModel {
        &*self.model
    }

    /// A new report over the training partition
    pub fn train_report(&self) -> RegressionDatasetReport {
        RegressionDatasetReport::for_dataset(Arc::clone(&self.model), Dataset::Train)
    }

    /// A new report over the test partition
    pub fn test_report(&self) -> RegressionDatasetReport {
        RegressionDatasetReport::for_dataset(Arc::clone(&self.model), Dataset::Test)
    }

    pub fn report(&self, dataset: Dataset) -> RegressionDatasetReport {
        RegressionDatasetReport::for_dataset(Arc::clone(&self.model), dataset)
    }
}

impl fmt::Debug for RegressionModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegressionModelReport")
            .field("model", &self.model.name())
            .finish()
    }
}

/// Fits a set of regression models on shared data and reports on them.
///
/// Indexable by model name; `report["name"]` panics when no model has that
/// name, use [`MLRegressionReport::model_report`] for a fallible lookup.
pub struct MLRegressionReport {
    config: ReportConfig,
    reports: Vec<RegressionModelReport>,
    index: HashMap<String, usize>,
}

impl MLRegressionReport {
    /// Fit `models` in order against the data in `data` and build one report
    /// per model
    pub fn new(models: Vec<Box<DynRegressionModel>>, data: &DataHandler, config: ReportConfig) -> Result<Self> {
        let fitted = fit_models(models, data, &config)?;
        Ok(Self {
            config,
            reports: fitted.models.into_iter().map(RegressionModelReport::new).collect(),
            index: fitted.index,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Model names in fitting order
    pub fn model_names(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.model().name()).collect()
    }

    pub fn model_report(&self, model_id: &str) -> Result<&RegressionModelReport> {
        self.index
            .get(model_id)
            .map(|&i| &self.reports[i])
            .ok_or_else(|| ReportError::ModelNotFound(model_id.to_string()))
    }

    pub fn model(&self, model_id: &str) -> Result<&DynRegressionModel> {
        self.model_report(model_id).map(|r| r.model())
    }

    /// Every model's statistics on `dataset`, one column per model in
    /// fitting order
    pub fn fit_statistics(&self, dataset: Dataset) -> Result<StatsTable> {
        let tables = self
            .reports
            .iter()
            .map(|r| r.report(dataset).fit_statistics())
            .collect::<Result<Vec<_>>>()?;
        Ok(StatsTable::hconcat(&tables))
    }

    /// Cross-validated train statistics of every model.
    ///
    /// Availability is decided by the first model; a later model without
    /// outer folds contributes no columns.
    pub fn cv_fit_statistics(&self, averaged_across_folds: bool) -> Availability<StatsTable> {
        match self.reports.first() {
            Some(first) if first.model().is_cross_validated() => {}
            _ => return Availability::unavailable(Unavailable::NotCrossValidated),
        }

        let tables: Vec<StatsTable> = self
            .reports
            .iter()
            .filter_map(|r| r.train_report().cv_fit_statistics(averaged_across_folds).into_option())
            .collect();
        Availability::Available(StatsTable::hconcat(&tables))
    }
}

impl Index<&str> for MLRegressionReport {
    type Output = RegressionModelReport;

    fn index(&self, model_id: &str) -> &RegressionModelReport {
        match self.model_report(model_id) {
            Ok(report) => report,
            Err(_) => panic!("no model named '{}' in report", model_id),
        }
    }
}

impl fmt::Debug for MLRegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MLRegressionReport")
            .field("y_var", &self.config.y_var)
            .field("models", &self.model_names())
            .finish()
    }
}
