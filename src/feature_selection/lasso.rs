//! Lasso-based selection

use super::{top_k_mask, FeatureSelector, Selection};
use crate::data::DataEmitter;
use crate::error::{ReportError, Result};
use crate::models::{LassoRegression, Regressor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coefficients at or below this magnitude count as zero
const COEF_THRESHOLD: f64 = 1e-5;

/// Keeps at most `max_n_features` predictors, ranked by the magnitude of
/// their Lasso coefficient. Zero coefficients are never kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoSelector {
    max_n_features: usize,
    alpha: f64,
    name: String,
    coefficients: Option<Vec<f64>>,
    support: Option<Vec<bool>>,
}

impl LassoSelector {
    /// `alpha` defaults to 0; pass a positive value through
    /// [`LassoSelector::with_alpha`] for a sparse fit
    pub fn new(max_n_features: usize) -> Self {
        Self {
            max_n_features,
            alpha: 0.0,
            name: "LassoSelector".to_string(),
            coefficients: None,
            support: None,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn max_n_features(&self) -> usize {
        self.max_n_features
    }

    /// Fitted Lasso coefficients, `None` before [`FeatureSelector::select`]
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    pub fn support(&self) -> Option<&[bool]> {
        self.support.as_deref()
    }
}

impl FeatureSelector for LassoSelector {
    fn name(&self) -> &str {
        &self.name
    }

    fn select(&mut self, emitter: &DataEmitter) -> Result<Selection> {
        if self.alpha < 0.0 || !self.alpha.is_finite() {
            return Err(ReportError::InvalidParameter {
                name: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "must be a finite non-negative number".to_string(),
            });
        }

        let (x, y) = emitter.emit_train_xy();
        let mut lasso = LassoRegression::new(self.alpha);
        lasso.fit(x, y)?;
        let coefficients = lasso.coefficients.ok_or(ReportError::ModelNotFitted)?.to_vec();

        let importance: Vec<f64> = coefficients.iter().map(|c| c.abs()).collect();
        let support: Vec<bool> = top_k_mask(&importance, self.max_n_features)
            .into_iter()
            .zip(&importance)
            .map(|(top, &imp)| top && imp >= COEF_THRESHOLD)
            .collect();

        debug!(
            selector = %self.name,
            alpha = self.alpha,
            n_selected = support.iter().filter(|&&s| s).count(),
            "Selected features by Lasso coefficient"
        );

        self.coefficients = Some(coefficients);
        self.support = Some(support.clone());
        Selection::from_support(emitter.x_vars().to_vec(), support)
    }
}
