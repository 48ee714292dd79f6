//! Reports over already trained regressors and a held-out split

use crate::error::{ReportError, Result};
use crate::metrics::{RegressionScorer, StatsTable};
use crate::models::Regressor;
use crate::plotting::{self, Figure};
use crate::preprocessing::TargetScaler;
use ndarray::{Array1, Array2};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// Lookup key for a holdout report: insertion position or model name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportKey {
    Position(usize),
    Name(String),
}

impl From<usize> for ReportKey {
    fn from(i: usize) -> Self {
        ReportKey::Position(i)
    }
}

impl From<&str> for ReportKey {
    fn from(name: &str) -> Self {
        ReportKey::Name(name.to_string())
    }
}

impl From<String> for ReportKey {
    fn from(name: String) -> Self {
        ReportKey::Name(name)
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKey::Position(i) => write!(f, "#{}", i),
            ReportKey::Name(name) => f.write_str(name),
        }
    }
}

/// Held-out predictions of one trained regressor and their statistics
#[derive(Debug, Clone)]
pub struct HoldoutModelReport {
    name: String,
    y_var: String,
    y_pred: Array1<f64>,
    y_true: Array1<f64>,
    scorer: RegressionScorer,
}

impl HoldoutModelReport {
    /// Predict `x_test` with `model` and score against `y_test`. With a
    /// scaler, predictions and truth are mapped back to the original scale
    /// before scoring.
    pub fn new<R: Regressor>(
        name: impl Into<String>,
        model: &R,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
        y_var: impl Into<String>,
        y_scaler: Option<&TargetScaler>,
    ) -> Result<Self> {
        let name = name.into();
        let mut y_pred = model.predict(x_test)?;
        let mut y_true = y_test.clone();
        if let Some(scaler) = y_scaler {
            y_pred = scaler.inverse_transform(&y_pred)?;
            y_true = scaler.inverse_transform(&y_true)?;
        }

        let scorer = RegressionScorer::new(y_pred.clone(), y_true.clone(), x_test.ncols(), name.clone());
        Ok(Self {
            name,
            y_var: y_var.into(),
            y_pred,
            y_true,
            scorer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scorer(&self) -> &RegressionScorer {
        &self.scorer
    }

    pub fn y_pred(&self) -> &Array1<f64> {
        &self.y_pred
    }

    pub fn y_true(&self) -> &Array1<f64> {
        &self.y_true
    }

    pub fn fit_statistics(&self) -> StatsTable {
        self.scorer.stats_df()
    }

    /// Predicted (y-axis) against true (x-axis) values, captioned with the
    /// target name and Pearson correlation
    pub fn plot_pred_vs_true(&self, figsize: (u32, u32)) -> Result<Figure> {
        let r = self.scorer.stat("pearsonr").unwrap_or(f64::NAN);
        let caption = format!("{}: Predicted vs True | Pearson R = {:.3}", self.y_var, r);
        plotting::plot_pred_vs_true(&self.y_pred.to_vec(), &self.y_true.to_vec(), &caption, figsize)
    }
}

/// Reports for a set of trained regressors on one held-out split.
///
/// Models are added in order and can be looked up by position or by name,
/// through [`HoldoutRegressionReport::get`] or indexing with a `usize` or a
/// `&str`.
#[derive(Debug, Clone)]
pub struct HoldoutRegressionReport {
    y_var: String,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
    y_scaler: Option<TargetScaler>,
    reports: Vec<HoldoutModelReport>,
    index: HashMap<String, usize>,
}

impl HoldoutRegressionReport {
    pub fn new(
        x_test: Array2<f64>,
        y_test: Array1<f64>,
        y_var: impl Into<String>,
        y_scaler: Option<TargetScaler>,
    ) -> Result<Self> {
        if x_test.nrows() != y_test.len() {
            return Err(ReportError::ShapeError {
                expected: format!("{} target values", x_test.nrows()),
                actual: format!("{} target values", y_test.len()),
            });
        }

        Ok(Self {
            y_var: y_var.into(),
            x_test,
            y_test,
            y_scaler,
            reports: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Add a trained model under its estimator name
    pub fn with_model<R: Regressor>(mut self, model: &R) -> Result<Self> {
        self.add_model(model.name(), model)?;
        Ok(self)
    }

    /// Add a trained model under `name`
    pub fn add_model<R: Regressor>(&mut self, name: impl Into<String>, model: &R) -> Result<&HoldoutModelReport> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ReportError::DuplicateModel(name));
        }

        let report = HoldoutModelReport::new(
            name.clone(),
            model,
            &self.x_test,
            &self.y_test,
            self.y_var.clone(),
            self.y_scaler.as_ref(),
        )?;
        self.index.insert(name, self.reports.len());
        self.reports.push(report);
        Ok(&self.reports[self.reports.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HoldoutModelReport> {
        self.reports.iter()
    }

    pub fn get(&self, key: impl Into<ReportKey>) -> Result<&HoldoutModelReport> {
        let key = key.into();
        let found = match &key {
            ReportKey::Position(i) => self.reports.get(*i),
            ReportKey::Name(name) => self.index.get(name).map(|&i| &self.reports[i]),
        };
        found.ok_or_else(|| ReportError::ModelNotFound(key.to_string()))
    }

    /// Statistics of every model, one column per model in insertion order
    pub fn fit_statistics(&self) -> StatsTable {
        let tables: Vec<StatsTable> = self.reports.iter().map(|r| r.fit_statistics()).collect();
        StatsTable::hconcat(&tables)
    }
}

impl Index<usize> for HoldoutRegressionReport {
    type Output = HoldoutModelReport;

    fn index(&self, i: usize) -> &HoldoutModelReport {
        &self.reports[i]
    }
}

impl Index<&str> for HoldoutRegressionReport {
    type Output = HoldoutModelReport;

    fn index(&self, name: &str) -> &HoldoutModelReport {
        match self.index.get(name) {
            Some(&i) => &self.reports[i],
            None => panic!("no model named '{}' in report", name),
        }
    }
}
