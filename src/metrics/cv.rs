//! Cross-validated statistics built from per-fold scorers

use super::classification::ClassificationScorer;
use super::regression::RegressionScorer;
use super::table::StatsTable;
use serde::{Deserialize, Serialize};

/// Anything that reports a one-column statistics table
pub trait Scorer {
    fn name(&self) -> &str;
    fn stats_df(&self) -> StatsTable;
}

impl Scorer for RegressionScorer {
    fn name(&self) -> &str {
        RegressionScorer::name(self)
    }

    fn stats_df(&self) -> StatsTable {
        RegressionScorer::stats_df(self)
    }
}

impl Scorer for ClassificationScorer {
    fn name(&self) -> &str {
        ClassificationScorer::name(self)
    }

    fn stats_df(&self) -> StatsTable {
        ClassificationScorer::stats_df(self)
    }
}

/// Held-out fold scorers of an outer cross-validation loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvScorer<S> {
    name: String,
    fold_scorers: Vec<S>,
}

impl<S: Scorer> CvScorer<S> {
    pub fn new(fold_scorers: Vec<S>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fold_scorers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_folds(&self) -> usize {
        self.fold_scorers.len()
    }

    pub fn fold_scorers(&self) -> &[S] {
        &self.fold_scorers
    }

    fn fold_label(&self, fold_idx: usize) -> String {
        format!("{}: Fold {}", self.name, fold_idx + 1)
    }

    /// Statistics averaged across folds, one column labeled by the model
    pub fn stats_df(&self) -> StatsTable {
        let tables: Vec<StatsTable> = self
            .fold_scorers
            .iter()
            .map(|s| s.stats_df().relabel_columns(|_| self.name.clone()))
            .collect();
        StatsTable::mean_of(&tables).unwrap_or_else(|| StatsTable::new(Vec::new()))
    }

    /// Statistics for every fold, one column per fold
    pub fn cv_stats_df(&self) -> StatsTable {
        let tables: Vec<StatsTable> = self
            .fold_scorers
            .iter()
            .enumerate()
            .map(|(i, s)| s.stats_df().relabel_columns(|_| self.fold_label(i)))
            .collect();
        StatsTable::hconcat(&tables)
    }
}

impl CvScorer<ClassificationScorer> {
    /// Per-class statistics averaged across folds
    pub fn stats_by_class_df(&self) -> StatsTable {
        let tables: Vec<StatsTable> = self
            .fold_scorers
            .iter()
            .map(|s| s.stats_by_class_df())
            .collect();
        StatsTable::mean_of(&tables).unwrap_or_else(|| StatsTable::new(Vec::new()))
    }

    /// Per-class statistics for every fold, columns labeled "<model>: Fold k: <class>"
    pub fn cv_stats_by_class_df(&self) -> StatsTable {
        let tables: Vec<StatsTable> = self
            .fold_scorers
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let fold = self.fold_label(i);
                s.stats_by_class_df()
                    .relabel_columns(|class| format!("{}: {}", fold, class))
            })
            .collect();
        StatsTable::hconcat(&tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn regression_cv() -> CvScorer<RegressionScorer> {
        let f1 = RegressionScorer::new(array![1.0, 2.0, 3.0], array![1.0, 2.0, 4.0], 1, "ols");
        let f2 = RegressionScorer::new(array![1.0, 2.0, 3.0], array![1.0, 2.0, 3.0], 1, "ols");
        CvScorer::new(vec![f1, f2], "ols")
    }

    #[test]
    fn test_averaged_stats() {
        let cv = regression_cv();
        let table = cv.stats_df();
        assert_eq!(table.column_labels(), &["ols".to_string()]);

        let fold_rmse: Vec<f64> = cv
            .fold_scorers()
            .iter()
            .map(|s| s.stat("rmse").unwrap())
            .collect();
        let expected = (fold_rmse[0] + fold_rmse[1]) / 2.0;
        assert!((table.get("rmse", "ols").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_per_fold_stats() {
        let table = regression_cv().cv_stats_df();
        assert_eq!(
            table.column_labels(),
            &["ols: Fold 1".to_string(), "ols: Fold 2".to_string()]
        );
    }

    #[test]
    fn test_by_class_per_fold() {
        let classes = vec![0.0, 1.0, 2.0];
        let f1 = ClassificationScorer::new(
            array![0.0, 1.0, 2.0],
            array![0.0, 1.0, 2.0],
            None,
            classes.clone(),
            "ovr",
        );
        let f2 = ClassificationScorer::new(
            array![0.0, 1.0, 1.0],
            array![0.0, 1.0, 2.0],
            None,
            classes,
            "ovr",
        );
        let cv = CvScorer::new(vec![f1, f2], "ovr");

        let averaged = cv.stats_by_class_df();
        assert!((averaged.get("recall", "2").unwrap() - 0.5).abs() < 1e-12);

        let per_fold = cv.cv_stats_by_class_df();
        assert_eq!(per_fold.n_cols(), 6);
        assert_eq!(per_fold.column_labels()[0], "ovr: Fold 1: 0");
    }
}
