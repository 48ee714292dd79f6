//! ROC curve and area under the curve

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

/// Points of a receiver operating characteristic curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocCurve {
    /// False positive rate at each threshold
    pub fpr: Vec<f64>,
    /// True positive rate at each threshold
    pub tpr: Vec<f64>,
    /// Decreasing score thresholds; the first is +inf
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Trapezoidal area under the curve
    pub fn auc(&self) -> f64 {
        auc(&self.fpr, &self.tpr)
    }
}

/// Compute the ROC curve for positive-class `scores` against binary
/// `truths` (1.0 = positive).
///
/// Tied scores produce a single curve point.
pub fn roc_curve(scores: &[f64], truths: &[f64]) -> Result<RocCurve> {
    if scores.len() != truths.len() {
        return Err(ReportError::ShapeError {
            expected: format!("{} truths", scores.len()),
            actual: format!("{} truths", truths.len()),
        });
    }

    let n_pos = truths.iter().filter(|&&t| t > 0.5).count();
    let n_neg = truths.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(ReportError::ComputationError(
            "ROC curve needs both positive and negative samples".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];

    let mut tp = 0usize;
    let mut fp = 0usize;
    for (pos, &idx) in order.iter().enumerate() {
        if truths[idx] > 0.5 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_tie = order
            .get(pos + 1)
            .map_or(true, |&next| scores[next] != scores[idx]);
        if last_of_tie {
            fpr.push(fp as f64 / n_neg as f64);
            tpr.push(tp as f64 / n_pos as f64);
            thresholds.push(scores[idx]);
        }
    }

    Ok(RocCurve { fpr, tpr, thresholds })
}

/// Trapezoidal area under a curve given by monotone `x`
pub fn auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation() {
        let scores = [0.1, 0.2, 0.8, 0.9];
        let truths = [0.0, 0.0, 1.0, 1.0];
        let curve = roc_curve(&scores, &truths).unwrap();
        assert!((curve.auc() - 1.0).abs() < 1e-12);
        assert_eq!(curve.fpr.first(), Some(&0.0));
        assert_eq!(curve.tpr.last(), Some(&1.0));
    }

    #[test]
    fn test_inverted_scores() {
        let scores = [0.9, 0.8, 0.2, 0.1];
        let truths = [0.0, 0.0, 1.0, 1.0];
        let curve = roc_curve(&scores, &truths).unwrap();
        assert!(curve.auc().abs() < 1e-12);
    }

    #[test]
    fn test_ties_collapse() {
        let scores = [0.5, 0.5, 0.5, 0.5];
        let truths = [0.0, 1.0, 0.0, 1.0];
        let curve = roc_curve(&scores, &truths).unwrap();
        assert_eq!(curve.fpr.len(), 2);
        assert!((curve.auc() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_fails() {
        assert!(roc_curve(&[0.1, 0.2], &[1.0, 1.0]).is_err());
    }
}
