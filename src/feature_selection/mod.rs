//! Feature selection
//!
//! Selectors reduce a predictor set to a smaller subset using the training
//! partition of a [`DataEmitter`]:
//! - [`KBestSelector`] - univariate scoring, keeps the `k` best
//! - [`LassoSelector`] - keeps the largest Lasso coefficients

mod kbest;
mod lasso;

pub use kbest::{KBestSelector, ScoreFunc};
pub use lasso::LassoSelector;

use crate::data::DataEmitter;
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

/// A selector that filters the predictors of a training partition
pub trait FeatureSelector {
    /// Display name
    fn name(&self) -> &str;

    /// Fit on the training partition and return the selection
    fn select(&mut self, emitter: &DataEmitter) -> Result<Selection>;
}

/// Outcome of a feature selection.
///
/// `support` is aligned positionally with `all_features` and
/// `selected_features` is exactly the features whose flag is set, in their
/// original order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    all_features: Vec<String>,
    selected_features: Vec<String>,
    support: Vec<bool>,
}

impl Selection {
    /// Build from the candidate features and an inclusion mask
    pub fn from_support(all_features: Vec<String>, support: Vec<bool>) -> Result<Self> {
        if all_features.len() != support.len() {
            return Err(ReportError::ShapeError {
                expected: format!("support of length {}", all_features.len()),
                actual: format!("support of length {}", support.len()),
            });
        }

        let selected_features = all_features
            .iter()
            .zip(&support)
            .filter(|&(_, &keep)| keep)
            .map(|(f, _)| f.clone())
            .collect();

        Ok(Self {
            all_features,
            selected_features,
            support,
        })
    }

    pub fn all_features(&self) -> &[String] {
        &self.all_features
    }

    pub fn selected_features(&self) -> &[String] {
        &self.selected_features
    }

    pub fn support(&self) -> &[bool] {
        &self.support
    }

    pub fn n_selected(&self) -> usize {
        self.selected_features.len()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>, Vec<bool>) {
        (self.all_features, self.selected_features, self.support)
    }
}

/// Mask keeping the `k` highest-scoring positions; NaN scores rank last
pub(crate) fn top_k_mask(scores: &[f64], k: usize) -> Vec<bool> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        let sa = if scores[a].is_nan() { f64::NEG_INFINITY } else { scores[a] };
        let sb = if scores[b].is_nan() { f64::NEG_INFINITY } else { scores[b] };
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut mask = vec![false; scores.len()];
    for &i in order.iter().take(k) {
        mask[i] = true;
    }
    mask
}
