//! Classification reports

use super::{fit_models, Availability, Dataset, Unavailable};
use crate::config::ReportConfig;
use crate::data::DataHandler;
use crate::error::{ReportError, Result};
use crate::metrics::{ClassificationScorer, RocCurve, StatsTable, TaskArity};
use crate::models::DynClassificationModel;
use crate::plotting::{self, Figure};
use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, DrawingBackend};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Statistics and plots for one classification model on one partition.
///
/// The task arity is read from the model's train scorer, where it was fixed
/// when the model was fitted.
#[derive(Clone)]
pub struct ClassificationDatasetReport {
    model: Arc<DynClassificationModel>,
    dataset: Dataset,
}

impl ClassificationDatasetReport {
    pub fn new(model: Arc<DynClassificationModel>, dataset: &str) -> Result<Self> {
        Ok(Self::for_dataset(model, dataset.parse()?))
    }

    pub fn for_dataset(model: Arc<DynClassificationModel>, dataset: Dataset) -> Self {
        Self { model, dataset }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn model(&self) -> &DynClassificationModel {
        &*self.model
    }

    pub fn arity(&self) -> Result<TaskArity> {
        self.model
            .train_scorer()
            .map(|s| s.arity())
            .ok_or(ReportError::ModelNotFitted)
    }

    fn scorer(&self) -> Result<&ClassificationScorer> {
        match self.dataset {
            Dataset::Train => self.model.train_scorer(),
            Dataset::Test => self.model.test_scorer(),
        }
        .ok_or(ReportError::ModelNotFitted)
    }

    pub fn fit_statistics(&self) -> Result<StatsTable> {
        Ok(self.scorer()?.stats_df())
    }

    /// Precision, recall, f1 and support per class; unavailable for binary
    /// tasks
    pub fn fit_statistics_by_class(&self) -> Result<Availability<StatsTable>> {
        if self.arity()? == TaskArity::Binary {
            return Ok(Availability::unavailable(Unavailable::BinaryTask));
        }
        Ok(Availability::Available(self.scorer()?.stats_by_class_df()))
    }

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

    pub fn cv_fit_statistics_by_class(&self, averaged_across_folds: bool) -> Result<Availability<StatsTable>> {
        if !self.model.is_cross_validated() {
            return Ok(Availability::unavailable(Unavailable::NotCrossValidated));
        }
        if self.arity()? == TaskArity::Binary {
            return Ok(Availability::unavailable(Unavailable::BinaryTask));
        }
        if self.dataset == Dataset::Test {
            return Ok(Availability::unavailable(Unavailable::TestPartition));
        }

        Ok(match self.model.cv_scorer() {
            Some(cv) if averaged_across_folds => Availability::Available(cv.stats_by_class_df()),
            Some(cv) => Availability::Available(cv.cv_stats_by_class_df()),
            None => Availability::unavailable(Unavailable::NotCrossValidated),
        })
    }

    /// Positive-class scores and truths behind the ROC curve. On the train
    /// partition the scorer over all held-out outer folds is preferred.
    fn roc_inputs(&self) -> Result<Availability<(Vec<f64>, Vec<f64>)>> {
        if self.arity()? != TaskArity::Binary {
            return Ok(Availability::unavailable(Unavailable::NotBinary));
        }

        let scorer = match self.dataset {
            Dataset::Train => match self.model.train_overall_scorer() {
                Some(overall) => overall,
                None => self.scorer()?,
            },
            Dataset::Test => self.scorer()?,
        };
        let scores = scorer.y_pred_score().ok_or_else(|| {
            ReportError::ComputationError(format!("model '{}' produced no class scores", self.model.name()))
        })?;

        let truths = scorer.y_true_binary().to_vec();
        let n_pos = truths.iter().filter(|&&t| t > 0.5).count();
        if n_pos == 0 || n_pos == truths.len() {
            return Ok(Availability::unavailable(Unavailable::SingleClass));
        }

        Ok(Availability::Available((scores.to_vec(), truths)))
    }

    /// ROC curve of the positive class; unavailable for multiclass tasks and
    /// for partitions holding a single class
    pub fn plot_roc_curve(&self, figsize: (u32, u32)) -> Result<Availability<Figure>> {
        match self.roc_inputs()? {
            Availability::Available((scores, truths)) => {
                Ok(Availability::Available(plotting::plot_roc_curve(&scores, &truths, figsize)?))
            }
            Availability::Unavailable(reason) => Ok(Availability::Unavailable(reason)),
        }
    }

    /// Like [`plot_roc_curve`](Self::plot_roc_curve), drawn into an existing
    /// area
    pub fn draw_roc_curve<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<Availability<RocCurve>> {
        match self.roc_inputs()? {
            Availability::Available((scores, truths)) => {
                Ok(Availability::Available(plotting::draw_roc_curve(area, &scores, &truths)?))
            }
            Availability::Unavailable(reason) => Ok(Availability::Unavailable(reason)),
        }
    }
}

impl fmt::Debug for ClassificationDatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationDatasetReport")
            .field("model", &self.model.name())
            .field("dataset", &self.dataset)
            .finish()
    }
}

/// Routes to the train or test report of one classification model
#[derive(Clone)]
pub struct ClassificationModelReport {
    model: Arc<DynClassificationModel>,
}

impl ClassificationModelReport {
    pub fn new(model: Arc<DynClassificationModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &DynClassificationModel {
        &*self.model
    }

    pub fn train_report(&self) -> ClassificationDatasetReport {
        self.report(Dataset::Train)
    }

    pub fn test_report(&self) -> ClassificationDatasetReport {
        self.report(Dataset::Test)
    }

    pub fn report(&self, dataset: Dataset) -> ClassificationDatasetReport {
        ClassificationDatasetReport::for_dataset(Arc::clone(&self.model), dataset)
    }
}

impl fmt::Debug for ClassificationModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationModelReport")
            .field("model", &self.model.name())
            .finish()
    }
}

/// Fits a set of classification models on shared data and reports on them.
/// Indexable by model name.
pub struct MLClassificationReport {
    config: ReportConfig,
    reports: Vec<ClassificationModelReport>,
    index: HashMap<String, usize>,
}

impl MLClassificationReport {
    pub fn new(
        models: Vec<Box<DynClassificationModel>>,
        data: &DataHandler,
        config: ReportConfig,
    ) -> Result<Self> {
        let fitted = fit_models(models, data, &config)?;
        Ok(Self {
            config,
            reports: fitted.models.into_iter().map(ClassificationModelReport::new).collect(),
            index: fitted.index,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.model().name()).collect()
    }

    pub fn model_report(&self, model_id: &str) -> Result<&ClassificationModelReport> {
        self.index
            .get(model_id)
            .map(|&i| &self.reports[i])
            .ok_or_else(|| ReportError::ModelNotFound(model_id.to_string()))
    }

    pub fn model(&self, model_id: &str) -> Result<&DynClassificationModel> {
        self.model_report(model_id).map(|r| r.model())
    }

    pub fn fit_statistics(&self, dataset: Dataset) -> Result<StatsTable> {
        let tables = self
            .reports
            .iter()
            .map(|r| r.report(dataset).fit_statistics())
            .collect::<Result<Vec<_>>>()?;
        Ok(StatsTable::hconcat(&tables))
    }

    /// Cross-validated train statistics of every model, gated on the first
    /// model having been cross-validated
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

impl Index<&str> for MLClassificationReport {
    type Output = ClassificationModelReport;

    fn index(&self, model_id: &str) -> &ClassificationModelReport {
        match self.model_report(model_id) {
            Ok(report) => report,
            Err(_) => panic!("no model named '{}' in report", model_id),
        }
    }
}

impl fmt::Debug for MLClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MLClassificationReport")
            .field("y_var", &self.config.y_var)
            .field("models", &self.model_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassificationModel, LogisticClassifier};
    use polars::df;

    fn binary_handler() -> DataHandler {
        let x: Vec<f64> = (0..40).map(|i| i as f64 / 4.0).collect();
        let noise: Vec<f64> = (0..40).map(|i| ((i * 7) % 5) as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| if v >= 5.0 { 1.0 } else { 0.0 }).collect();
        DataHandler::new(df!("x" => x, "noise" => noise, "y" => y).unwrap())
    }

    fn multiclass_handler() -> DataHandler {
        let x: Vec<f64> = (0..60).map(|i| (i % 30) as f64 / 3.0).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&v| if v < 3.3 { 0.0 } else if v < 6.6 { 1.0 } else { 2.0 })
            .collect();
        DataHandler::new(df!("x" => x, "y" => y).unwrap())
    }

    fn logit(name: &str) -> Box<DynClassificationModel> {
        ClassificationModel::new(LogisticClassifier::new()).with_name(name).boxed()
    }

    #[test]
    fn test_binary_by_class_is_unavailable() {
        let config = ReportConfig::new("y", &["x", "noise"]).with_verbose(false);
        let report = MLClassificationReport::new(vec![logit("a")], &binary_handler(), config).unwrap();

        let by_class = report["a"].test_report().fit_statistics_by_class().unwrap();
        assert_eq!(by_class.reason(), Some(Unavailable::BinaryTask));
        assert!(report["a"].train_report().plot_roc_curve((300, 300)).unwrap().is_available());
    }

    #[test]
    fn test_multiclass_views() {
        let config = ReportConfig::new("y", &["x"]).with_outer_cv(3).with_verbose(false);
        let report = MLClassificationReport::new(vec![logit("ovr")], &multiclass_handler(), config).unwrap();
        let train = report["ovr"].train_report();

        assert_eq!(train.arity().unwrap(), TaskArity::Multiclass);
        let by_class = train.fit_statistics_by_class().unwrap().into_option().unwrap();
        assert_eq!(by_class.n_cols(), 3);
        assert!(train.cv_fit_statistics_by_class(true).unwrap().is_available());

        let roc = train.plot_roc_curve((300, 300)).unwrap();
        assert_eq!(roc.reason(), Some(Unavailable::NotBinary));
        let test_cv = report["ovr"].test_report().cv_fit_statistics_by_class(false).unwrap();
        assert_eq!(test_cv.reason(), Some(Unavailable::TestPartition));
    }

    #[test]
    fn test_roc_prefers_overall_scorer() {
        let config = ReportConfig::new("y", &["x", "noise"]).with_outer_cv(4).with_verbose(false);
        let report = MLClassificationReport::new(vec![logit("a")], &binary_handler(), config).unwrap();
        let train = report["a"].train_report();

        let Availability::Available((scores, _)) = train.roc_inputs().unwrap() else {
            panic!("binary ROC inputs should be available");
        };
        let overall = train.model().train_overall_scorer().unwrap();
        assert_eq!(scores.len(), overall.y_true().len());
        assert_eq!(scores.len(), 32);
    }

    #[test]
    fn test_roc_on_single_class_partition() {
        let x: Vec<f64> = (0..16).map(|i| i as f64 / 4.0).collect();
        let y: Vec<f64> = x.iter().map(|&v| if v >= 2.0 { 1.0 } else { 0.0 }).collect();
        let train = df!("x" => &x, "y" => &y).unwrap();
        let test = df!("x" => &x[2..6], "y" => &y[2..6]).unwrap();
        let data = DataHandler::from_split(train, test).unwrap();

        let config = ReportConfig::new("y", &["x"]).with_verbose(false);
        let report = MLClassificationReport::new(vec![logit("a")], &data, config).unwrap();

        let roc = report["a"].test_report().plot_roc_curve((300, 300)).unwrap();
        assert_eq!(roc.reason(), Some(Unavailable::SingleClass));
        assert!(report["a"].train_report().plot_roc_curve((300, 300)).unwrap().is_available());

        let stats = report.fit_statistics(Dataset::Test).unwrap();
        assert!(stats.get("roc_auc", "a").unwrap().is_nan());
    }

    #[test]
    fn test_invalid_dataset_name() {
        let config = ReportConfig::new("y", &["x", "noise"]).with_verbose(false);
        let report = MLClassificationReport::new(vec![logit("a")], &binary_handler(), config).unwrap();
        let model = Arc::clone(&report["a"].model);

        assert!(matches!(
            ClassificationDatasetReport::new(model, "validation"),
            Err(ReportError::ValidationError(_))
        ));
        assert_eq!(
            ClassificationDatasetReport::new(Arc::clone(&report["a"].model), "test").unwrap().dataset(),
            Dataset::Test
        );
    }

    #[test]
    fn test_fit_statistics_columns() {
        let config = ReportConfig::new("y", &["x", "noise"]).with_verbose(false);
        let report =
            MLClassificationReport::new(vec![logit("b"), logit("a")], &binary_handler(), config).unwrap();
        let table = report.fit_statistics(Dataset::Test).unwrap();
        assert_eq!(table.column_labels(), &["b".to_string(), "a".to_string()][..]);
        assert_eq!(report.model_names(), vec!["b", "a"]);
    }
}
