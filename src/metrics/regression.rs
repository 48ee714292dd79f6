//! Goodness-of-fit statistics for regression

use super::table::StatsTable;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Statistic names, in table order
pub const REGRESSION_STATS: [&str; 8] =
    ["rmse", "mae", "mape", "pearsonr", "spearmanr", "r2", "adjr2", "n_obs"];

/// Holds predictions and ground truth for one partition and the
/// statistics computed from them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionScorer {
    y_pred: Array1<f64>,
    y_true: Array1<f64>,
    n_predictors: usize,
    name: String,
    stats: Vec<(String, f64)>,
}

impl RegressionScorer {
    /// Score `y_pred` against `y_true`.
    ///
    /// `n_predictors` is used for the adjusted R².
    pub fn new(
        y_pred: Array1<f64>,
        y_true: Array1<f64>,
        n_predictors: usize,
        name: impl Into<String>,
    ) -> Self {
        let stats = compute_stats(&y_pred, &y_true, n_predictors);
        Self {
            y_pred,
            y_true,
            n_predictors,
            name: name.into(),
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn y_pred(&self) -> &Array1<f64> {
        &self.y_pred
    }

    pub fn y_true(&self) -> &Array1<f64> {
        &self.y_true
    }

    pub fn n_predictors(&self) -> usize {
        self.n_predictors
    }

    /// One statistic by name
    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.iter().find(|(k, _)| k == name).map(|(_, v)| *v)
    }

    /// Statistics as a one-column table labeled by the scorer name
    pub fn stats_df(&self) -> StatsTable {
        let pairs: Vec<(&str, f64)> = self.stats.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        StatsTable::from_pairs(self.name.clone(), &pairs)
    }
}

fn compute_stats(y_pred: &Array1<f64>, y_true: &Array1<f64>, n_predictors: usize) -> Vec<(String, f64)> {
    let n = y_true.len() as f64;
    let errors: Vec<f64> = y_true.iter().zip(y_pred.iter()).map(|(t, p)| t - p).collect();

    let (rmse, mae, r2) = if n > 0.0 {
        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { f64::NAN };
        (mse.sqrt(), mae, r2)
    } else {
        (f64::NAN, f64::NAN, f64::NAN)
    };

    let nonzero: Vec<(f64, f64)> = y_true
        .iter()
        .zip(errors.iter())
        .filter(|(t, _)| **t != 0.0)
        .map(|(t, e)| (*t, *e))
        .collect();
    let mape = if nonzero.is_empty() {
        f64::NAN
    } else {
        nonzero.iter().map(|(t, e)| (e / t).abs()).sum::<f64>() / nonzero.len() as f64
    };

    let dof = n - n_predictors as f64 - 1.0;
    let adjr2 = if dof > 0.0 && !r2.is_nan() {
        1.0 - (1.0 - r2) * (n - 1.0) / dof
    } else {
        f64::NAN
    };

    let pearsonr = pearson(y_true.as_slice_memory_order(), y_pred.as_slice_memory_order());
    let spearmanr = pearson(
        Some(&rank_average(y_true.iter().copied().collect())),
        Some(&rank_average(y_pred.iter().copied().collect())),
    );

    vec![
        ("rmse".to_string(), rmse),
        ("mae".to_string(), mae),
        ("mape".to_string(), mape),
        ("pearsonr".to_string(), pearsonr),
        ("spearmanr".to_string(), spearmanr),
        ("r2".to_string(), r2),
        ("adjr2".to_string(), adjr2),
        ("n_obs".to_string(), n),
    ]
}

/// Pearson correlation; NaN when either side is constant or too short
pub(crate) fn pearson(x: Option<&[f64]>, y: Option<&[f64]>) -> f64 {
    let (Some(x), Some(y)) = (x, y) else {
        return f64::NAN;
    };
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let x_mean = x.iter().take(n).sum::<f64>() / n as f64;
    let y_mean = y.iter().take(n).sum::<f64>() / n as f64;

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        sum_xy / denom
    }
}

/// 1-based ranks with ties sharing their average rank
fn rank_average(values: Vec<f64>) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}
