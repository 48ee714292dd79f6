//! Univariate k-best selection

use super::{top_k_mask, FeatureSelector, Selection};
use crate::data::DataEmitter;
use crate::error::{ReportError, Result};
use crate::metrics::regression::pearson;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Univariate scoring function ranking each predictor against the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreFunc {
    /// F-statistic of a one-predictor linear regression
    FRegression,
    /// Signed Pearson correlation
    RRegression,
    /// Histogram estimate of mutual information
    MutualInfoRegression,
}

impl ScoreFunc {
    /// Score every column of `x` against `y`
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Vec<f64> {
        let y_vec = y.to_vec();
        x.columns()
            .into_iter()
            .map(|col| match self {
                ScoreFunc::FRegression => {
                    let r = pearson(Some(&col.to_vec()), Some(&y_vec));
                    let dof = x.nrows() as f64 - 2.0;
                    let r2 = r * r;
                    if r2 >= 1.0 {
                        f64::INFINITY
                    } else {
                        r2 / (1.0 - r2) * dof
                    }
                }
                ScoreFunc::RRegression => pearson(Some(&col.to_vec()), Some(&y_vec)),
                ScoreFunc::MutualInfoRegression => mutual_information(col, y.view()),
            })
            .collect()
    }
}

impl fmt::Display for ScoreFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScoreFunc::FRegression => "f_regression",
            ScoreFunc::RRegression => "r_regression",
            ScoreFunc::MutualInfoRegression => "mutual_info_regression",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ScoreFunc {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "f_regression" => Ok(ScoreFunc::FRegression),
            "r_regression" => Ok(ScoreFunc::RRegression),
            "mutual_info_regression" => Ok(ScoreFunc::MutualInfoRegression),
            other => Err(ReportError::InvalidParameter {
                name: "score_func".to_string(),
                value: other.to_string(),
                reason: "expected f_regression, r_regression or mutual_info_regression".to_string(),
            }),
        }
    }
}

/// Keeps the `k` predictors with the highest univariate score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KBestSelector {
    score_func: ScoreFunc,
    k: usize,
    name: String,
    all_feature_scores: Option<Vec<f64>>,
    selected_feature_scores: Option<Vec<f64>>,
    support: Option<Vec<bool>>,
}

impl KBestSelector {
    pub fn new(score_func: ScoreFunc, k: usize) -> Self {
        Self {
            score_func,
            k,
            name: format!("KBestSelector({})", score_func),
            all_feature_scores: None,
            selected_feature_scores: None,
            support: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn score_func(&self) -> ScoreFunc {
        self.score_func
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Scores of every candidate, `None` before [`FeatureSelector::select`]
    pub fn all_feature_scores(&self) -> Option<&[f64]> {
        self.all_feature_scores.as_deref()
    }

    /// Scores of the kept features in positional order
    pub fn selected_feature_scores(&self) -> Option<&[f64]> {
        self.selected_feature_scores.as_deref()
    }

    pub fn support(&self) -> Option<&[bool]> {
        self.support.as_deref()
    }
}

impl FeatureSelector for KBestSelector {
    fn name(&self) -> &str {
        &self.name
    }

    fn select(&mut self, emitter: &DataEmitter) -> Result<Selection> {
        let (x, y) = emitter.emit_train_xy();
        let n_features = x.ncols();
        if self.k > n_features {
            return Err(ReportError::InvalidParameter {
                name: "k".to_string(),
                value: self.k.to_string(),
                reason: format!("k should be <= n_features = {}", n_features),
            });
        }

        let scores = self.score_func.score(x, y);
        let support = top_k_mask(&scores, self.k);
        debug!(selector = %self.name, k = self.k, n_features, "Scored candidate features");

        self.selected_feature_scores = Some(
            scores
                .iter()
                .zip(&support)
                .filter(|&(_, &keep)| keep)
                .map(|(&s, _)| s)
                .collect(),
        );
        self.all_feature_scores = Some(scores);
        self.support = Some(support.clone());

        Selection::from_support(emitter.x_vars().to_vec(), support)
    }
}

/// Mutual information between two continuous variables after equal-width
/// binning
fn mutual_information(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    if n < 2.0 {
        return 0.0;
    }

    let n_bins = (n.sqrt() as usize).clamp(2, 20);
    let x_bins = discretize(x, n_bins);
    let y_bins = discretize(y, n_bins);

    let mut joint: HashMap<(usize, usize), usize> = HashMap::new();
    let mut x_counts = vec![0usize; n_bins];
    let mut y_counts = vec![0usize; n_bins];
    for (&xb, &yb) in x_bins.iter().zip(&y_bins) {
        *joint.entry((xb, yb)).or_insert(0) += 1;
        x_counts[xb] += 1;
        y_counts[yb] += 1;
    }

    let mi: f64 = joint
        .iter()
        .map(|(&(xb, yb), &count)| {
            let p_xy = count as f64 / n;
            let p_x = x_counts[xb] as f64 / n;
            let p_y = y_counts[yb] as f64 / n;
            p_xy * (p_xy / (p_x * p_y)).ln()
        })
        .sum();

    mi.max(0.0)
}

fn discretize(x: ArrayView1<f64>, n_bins: usize) -> Vec<usize> {
    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return vec![0; x.len()];
    }

    let width = range / n_bins as f64;
    x.iter()
        .map(|&v| (((v - min) / width) as usize).min(n_bins - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// y depends on x0 strongly, on x2 weakly, not at all on x1
    fn emitter() -> DataEmitter {
        let n = 40;
        let x = Array2::from_shape_fn((n, 3), |(i, j)| match j {
            0 => i as f64,
            1 => ((i * 7) % 5) as f64,
            _ => ((i * 13) % 11) as f64,
        });
        let y = Array1::from_shape_fn(n, |i| 2.0 * x[[i, 0]] + 0.5 * x[[i, 2]]);
        let names = vec!["x0".to_string(), "x1".to_string(), "x2".to_string()];
        DataEmitter::new("y", names, x.clone(), y.clone(), x, y).unwrap()
    }

    #[test]
    fn test_kbest_f_regression() {
        let mut selector = KBestSelector::new(ScoreFunc::FRegression, 1);
        assert!(selector.support().is_none());

        let selection = selector.select(&emitter()).unwrap();
        assert_eq!(selection.selected_features(), &["x0".to_string()][..]);
        assert_eq!(selection.support(), &[true, false, false][..]);
        assert_eq!(selector.all_feature_scores().unwrap().len(), 3);
        assert_eq!(selector.selected_feature_scores().unwrap().len(), 1);
    }

    #[test]
    fn test_kbest_all_features() {
        for func in [
            ScoreFunc::FRegression,
            ScoreFunc::RRegression,
            ScoreFunc::MutualInfoRegression,
        ] {
            let mut selector = KBestSelector::new(func, 3);
            let selection = selector.select(&emitter()).unwrap();
            assert_eq!(selection.selected_features(), selection.all_features());
            assert!(selection.support().iter().all(|&s| s));
        }
    }

    #[test]
    fn test_kbest_k_too_large() {
        let mut selector = KBestSelector::new(ScoreFunc::RRegression, 4);
        let result = selector.select(&emitter());
        assert!(matches!(result, Err(ReportError::InvalidParameter { .. })));
    }

    #[test]
    fn test_score_func_parse() {
        assert_eq!("f_regression".parse::<ScoreFunc>().unwrap(), ScoreFunc::FRegression);
        assert!("chi2".parse::<ScoreFunc>().is_err());
        assert_eq!(
            KBestSelector::new(ScoreFunc::MutualInfoRegression, 1).name(),
            "KBestSelector(mutual_info_regression)"
        );
    }

    #[test]
    fn test_mutual_information_constant_column() {
        let x = Array1::from_elem(10, 3.0);
        let y = Array1::from_shape_fn(10, |i| i as f64);
        assert_eq!(mutual_information(x.view(), y.view()), 0.0);
    }
}
