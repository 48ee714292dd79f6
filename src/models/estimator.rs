//! Estimator traits: the numerical seam under every model

use crate::error::{ReportError, Result};
use ndarray::{Array1, Array2};

/// A regression estimator
pub trait Regressor: Clone {
    /// Default display name
    fn name(&self) -> String;

    /// Fit to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict targets
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// A classification estimator over float-coded class labels
pub trait Classifier: Clone {
    /// Default display name
    fn name(&self) -> String;

    /// Fit to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Sorted class labels seen during fitting
    fn classes(&self) -> &[f64];

    /// Class probabilities, one column per entry of [`Classifier::classes`]
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Most probable class for each row
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        let classes = self.classes();
        if proba.ncols() != classes.len() {
            return Err(ReportError::ShapeError {
                expected: format!("{} probability columns", classes.len()),
                actual: format!("{} probability columns", proba.ncols()),
            });
        }

        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |acc, (i, &p)| if p > acc.1 { (i, p) } else { acc });
                classes[best.0]
            })
            .collect())
    }
}
