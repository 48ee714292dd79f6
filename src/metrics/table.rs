//! Labeled statistic tables

use crate::error::{ReportError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A small labeled table of statistics.
///
/// Rows are statistic names, columns are whatever the statistics were
/// computed for (a model, a fold, a class). Values are stored column-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl StatsTable {
    /// Empty table with the given rows and no columns
    pub fn new(row_labels: Vec<String>) -> Self {
        Self {
            row_labels,
            column_labels: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Single-column table from `(statistic, value)` pairs
    pub fn from_pairs(column_label: impl Into<String>, pairs: &[(&str, f64)]) -> Self {
        Self {
            row_labels: pairs.iter().map(|(k, _)| k.to_string()).collect(),
            column_labels: vec![column_label.into()],
            columns: vec![pairs.iter().map(|(_, v)| *v).collect()],
        }
    }

    /// Append a column; `values` must align with the row labels
    pub fn push_column(&mut self, label: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.row_labels.len() {
            return Err(ReportError::ShapeError {
                expected: format!("{} values", self.row_labels.len()),
                actual: format!("{} values", values.len()),
            });
        }
        self.column_labels.push(label.into());
        self.columns.push(values);
        Ok(())
    }

    /// Concatenate tables column-wise.
    ///
    /// Columns keep the order of `tables`. Rows are matched by label; a
    /// row missing from one table is filled with NaN in that table's
    /// columns. Row order is first-seen order.
    pub fn hconcat<'a, I>(tables: I) -> StatsTable
    where
        I: IntoIterator<Item = &'a StatsTable>,
    {
        let tables: Vec<&StatsTable> = tables.into_iter().collect();

        let mut row_labels: Vec<String> = Vec::new();
        for table in &tables {
            for label in &table.row_labels {
                if !row_labels.contains(label) {
                    row_labels.push(label.clone());
                }
            }
        }

        let mut result = StatsTable::new(row_labels);
        for table in tables {
            for (label, column) in table.column_labels.iter().zip(&table.columns) {
                let aligned: Vec<f64> = result
                    .row_labels
                    .iter()
                    .map(|row| {
                        table
                            .row_index(row)
                            .map(|i| column[i])
                            .unwrap_or(f64::NAN)
                    })
                    .collect();
                result.column_labels.push(label.clone());
                result.columns.push(aligned);
            }
        }
        result
    }

    /// Element-wise mean of tables sharing a layout, as one column per
    /// input column label. Used to average fold tables.
    pub fn mean_of<'a, I>(tables: I) -> Option<StatsTable>
    where
        I: IntoIterator<Item = &'a StatsTable>,
    {
        let tables: Vec<&StatsTable> = tables.into_iter().collect();
        let first = *tables.first()?;

        let mut result = StatsTable::new(first.row_labels.clone());
        for label in &first.column_labels {
            let mean: Vec<f64> = first
                .row_labels
                .iter()
                .map(|row| {
                    let values: Vec<f64> = tables
                        .iter()
                        .filter_map(|t| t.get(row, label))
                        .filter(|v| !v.is_nan())
                        .collect();
                    if values.is_empty() {
                        f64::NAN
                    } else {
                        values.iter().sum::<f64>() / values.len() as f64
                    }
                })
                .collect();
            result.column_labels.push(label.clone());
            result.columns.push(mean);
        }
        Some(result)
    }

    /// Copy of the table with every column relabeled by `f`
    pub fn relabel_columns(&self, f: impl Fn(&str) -> String) -> StatsTable {
        StatsTable {
            row_labels: self.row_labels.clone(),
            column_labels: self.column_labels.iter().map(|l| f(l)).collect(),
            columns: self.columns.clone(),
        }
    }

    fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|r| r == label)
    }

    fn column_index(&self, label: &str) -> Option<usize> {
        self.column_labels.iter().position(|c| c == label)
    }

    /// Value at (`row`, `column`)
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.row_index(row)?;
        let c = self.column_index(column)?;
        Some(self.columns[c][r])
    }

    /// All values of one column, aligned with [`Self::row_labels`]
    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.column_index(label).map(|c| self.columns[c].as_slice())
    }

    /// All values of one row, aligned with [`Self::column_labels`]
    pub fn row(&self, label: &str) -> Option<Vec<f64>> {
        let r = self.row_index(label)?;
        Some(self.columns.iter().map(|c| c[r]).collect())
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.column_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Convert to a polars frame with a leading "Statistic" column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.n_cols() + 1);
        columns.push(Series::new("Statistic".into(), self.row_labels.as_slice()).into());
        for (label, values) in self.column_labels.iter().zip(&self.columns) {
            columns.push(Series::new(label.as_str().into(), values.as_slice()).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

impl fmt::Display for StatsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .row_labels
            .iter()
            .map(|l| l.len())
            .max()
            .unwrap_or(0)
            .max("Statistic".len());

        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| c.iter().map(|v| format_value(*v)).collect())
            .collect();
        let widths: Vec<usize> = self
            .column_labels
            .iter()
            .zip(&cells)
            .map(|(label, col)| {
                col.iter()
                    .map(|s| s.len())
                    .max()
                    .unwrap_or(0)
                    .max(label.len())
            })
            .collect();

        write!(f, "{:<w$}", "Statistic", w = label_width)?;
        for (label, w) in self.column_labels.iter().zip(&widths) {
            write!(f, "  {:>w$}", label, w = *w)?;
        }
        writeln!(f)?;

        for (r, row_label) in self.row_labels.iter().enumerate() {
            write!(f, "{:<w$}", row_label, w = label_width)?;
            for (col, w) in cells.iter().zip(&widths) {
                write!(f, "  {:>w$}", col[r], w = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{}", v as i64)
    } else {
        format!("{:.4}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hconcat_preserves_column_order() {
        let a = StatsTable::from_pairs("ols", &[("rmse", 1.0), ("r2", 0.9)]);
        let b = StatsTable::from_pairs("ridge", &[("rmse", 2.0), ("r2", 0.8)]);
        let combined = StatsTable::hconcat([&a, &b]);

        assert_eq!(combined.column_labels(), &["ols".to_string(), "ridge".to_string()]);
        assert_eq!(combined.get("rmse", "ridge"), Some(2.0));
        assert_eq!(combined.row("r2"), Some(vec![0.9, 0.8]));
    }

    #[test]
    fn test_hconcat_outer_joins_rows() {
        let a = StatsTable::from_pairs("a", &[("accuracy", 0.5)]);
        let b = StatsTable::from_pairs("b", &[("accuracy", 0.7), ("roc_auc", 0.8)]);
        let combined = StatsTable::hconcat([&a, &b]);

        assert_eq!(combined.n_rows(), 2);
        assert!(combined.get("roc_auc", "a").unwrap().is_nan());
        assert_eq!(combined.get("roc_auc", "b"), Some(0.8));
    }

    #[test]
    fn test_mean_of() {
        let f1 = StatsTable::from_pairs("m", &[("rmse", 1.0), ("r2", 0.5)]);
        let f2 = StatsTable::from_pairs("m", &[("rmse", 3.0), ("r2", 0.7)]);
        let mean = StatsTable::mean_of([&f1, &f2]).unwrap();
        assert!((mean.get("rmse", "m").unwrap() - 2.0).abs() < 1e-12);
        assert!((mean.get("r2", "m").unwrap() - 0.6).abs() < 1e-12);
        assert!(StatsTable::mean_of(std::iter::empty()).is_none());
    }

    #[test]
    fn test_push_column_shape() {
        let mut table = StatsTable::new(vec!["a".to_string(), "b".to_string()]);
        assert!(table.push_column("x", vec![1.0]).is_err());
        assert!(table.push_column("x", vec![1.0, 2.0]).is_ok());
        assert_eq!(table.column("x"), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_to_dataframe() {
        let table = StatsTable::from_pairs("ols", &[("rmse", 1.5), ("r2", 0.25)]);
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(df.height(), 2);
        assert!(df.column("ols").is_ok());
    }

    #[test]
    fn test_display() {
        let table = StatsTable::from_pairs("ols", &[("n_obs", 10.0), ("r2", 0.25)]);
        let text = table.to_string();
        assert!(text.starts_with("Statistic"));
        assert!(text.contains("0.2500"));
        assert!(text.contains("10"));
    }
}
