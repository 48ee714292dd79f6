//! Classification statistics

use super::roc::roc_curve;
use super::table::StatsTable;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Number of classes a classification task distinguishes.
///
/// Decided once from the training labels and carried with every scorer
/// built for that model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskArity {
    Binary,
    Multiclass,
}

impl TaskArity {
    pub fn from_classes(classes: &[f64]) -> Self {
        if classes.len() <= 2 {
            TaskArity::Binary
        } else {
            TaskArity::Multiclass
        }
    }
}

/// Sorted distinct labels
pub fn distinct_classes(labels: &Array1<f64>) -> Vec<f64> {
    let mut classes: Vec<f64> = labels.iter().copied().collect();
    classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    classes.dedup();
    classes
}

/// Render a class label for table headers
pub fn class_label(class: f64) -> String {
    if class.fract() == 0.0 {
        format!("{}", class as i64)
    } else {
        format!("{}", class)
    }
}

/// Holds predicted labels, positive-class scores and ground truth for one
/// partition, plus the statistics computed from them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationScorer {
    y_pred: Array1<f64>,
    y_true: Array1<f64>,
    y_pred_score: Option<Array1<f64>>,
    classes: Vec<f64>,
    arity: TaskArity,
    name: String,
    stats: Vec<(String, f64)>,
}

impl ClassificationScorer {
    /// Score predicted labels against the truth.
    ///
    /// `classes` is the label set the model was trained on; its size fixes
    /// the task arity. `y_pred_score` holds positive-class (`classes[1]`)
    /// scores for binary tasks.
    pub fn new(
        y_pred: Array1<f64>,
        y_true: Array1<f64>,
        y_pred_score: Option<Array1<f64>>,
        classes: Vec<f64>,
        name: impl Into<String>,
    ) -> Self {
        let arity = TaskArity::from_classes(&classes);
        let stats = compute_stats(&y_pred, &y_true, y_pred_score.as_ref(), &classes, arity);
        Self {
            y_pred,
            y_true,
            y_pred_score,
            classes,
            arity,
            name: name.into(),
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> TaskArity {
        self.arity
    }

    pub fn is_binary(&self) -> bool {
        self.arity == TaskArity::Binary
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn y_pred(&self) -> &Array1<f64> {
        &self.y_pred
    }

    pub fn y_true(&self) -> &Array1<f64> {
        &self.y_true
    }

    pub fn y_pred_score(&self) -> Option<&Array1<f64>> {
        self.y_pred_score.as_ref()
    }

    /// Truth as 0/1 with `classes[1]` as the positive class
    pub fn y_true_binary(&self) -> Array1<f64> {
        let positive = self.classes.get(1).copied().unwrap_or(1.0);
        self.y_true.mapv(|t| if t == positive { 1.0 } else { 0.0 })
    }

    /// One statistic by name
    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.iter().find(|(k, _)| k == name).map(|(_, v)| *v)
    }

    /// Overall statistics as a one-column table labeled by the scorer name
    pub fn stats_df(&self) -> StatsTable {
        let pairs: Vec<(&str, f64)> = self.stats.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        StatsTable::from_pairs(self.name.clone(), &pairs)
    }

    /// Precision, recall, f1 and support with one column per class
    pub fn stats_by_class_df(&self) -> StatsTable {
        let tables: Vec<StatsTable> = self
            .classes
            .iter()
            .map(|&class| {
                let c = class_counts(&self.y_pred, &self.y_true, class);
                StatsTable::from_pairs(
                    class_label(class),
                    &[
                        ("precision", c.precision()),
                        ("recall", c.recall()),
                        ("f1", c.f1()),
                        ("support", c.support as f64),
                    ],
                )
            })
            .collect();
        StatsTable::hconcat(&tables)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ClassCounts {
    tp: usize,
    fp: usize,
    fn_: usize,
    support: usize,
}

impl ClassCounts {
    fn precision(&self) -> f64 {
        if self.tp + self.fp > 0 {
            self.tp as f64 / (self.tp + self.fp) as f64
        } else {
            0.0
        }
    }

    fn recall(&self) -> f64 {
        if self.tp + self.fn_ > 0 {
            self.tp as f64 / (self.tp + self.fn_) as f64
        } else {
            0.0
        }
    }

    fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }
}

fn class_counts(y_pred: &Array1<f64>, y_true: &Array1<f64>, class: f64) -> ClassCounts {
    let mut counts = ClassCounts::default();
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        match (t == class, p == class) {
            (true, true) => counts.tp += 1,
            (false, true) => counts.fp += 1,
            (true, false) => counts.fn_ += 1,
            (false, false) => {}
        }
        if t == class {
            counts.support += 1;
        }
    }
    counts
}

fn compute_stats(
    y_pred: &Array1<f64>,
    y_true: &Array1<f64>,
    y_pred_score: Option<&Array1<f64>>,
    classes: &[f64],
    arity: TaskArity,
) -> Vec<(String, f64)> {
    let n = y_true.len();
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    let accuracy = if n > 0 { correct as f64 / n as f64 } else { f64::NAN };

    let mut stats = vec![("accuracy".to_string(), accuracy)];

    match arity {
        TaskArity::Binary => {
            let positive = classes.get(1).copied().unwrap_or(1.0);
            let c = class_counts(y_pred, y_true, positive);
            stats.push(("precision".to_string(), c.precision()));
            stats.push(("recall".to_string(), c.recall()));
            stats.push(("f1".to_string(), c.f1()));

            let roc_auc = y_pred_score
                .and_then(|scores| {
                    let truths: Vec<f64> = y_true
                        .iter()
                        .map(|&t| if t == positive { 1.0 } else { 0.0 })
                        .collect();
                    let scores: Vec<f64> = scores.iter().copied().collect();
                    roc_curve(&scores, &truths).ok()
                })
                .map(|curve| curve.auc())
                .unwrap_or(f64::NAN);
            stats.push(("roc_auc".to_string(), roc_auc));
        }
        TaskArity::Multiclass => {
            let per_class: Vec<ClassCounts> = classes
                .iter()
                .map(|&c| class_counts(y_pred, y_true, c))
                .collect();
            let k = per_class.len().max(1) as f64;
            stats.push((
                "precision".to_string(),
                per_class.iter().map(|c| c.precision()).sum::<f64>() / k,
            ));
            stats.push((
                "recall".to_string(),
                per_class.iter().map(|c| c.recall()).sum::<f64>() / k,
            ));
            stats.push((
                "f1".to_string(),
                per_class.iter().map(|c| c.f1()).sum::<f64>() / k,
            ));
        }
    }

    stats.push(("n_obs".to_string(), n as f64));
    stats
}
