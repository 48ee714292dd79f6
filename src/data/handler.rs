//! DataFrame-backed data access: train/test partitioning and fold emitters

use super::emitter::DataEmitter;
use super::split::{train_test_indices, KFold};
use crate::error::{ReportError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Default fraction of rows held out for testing
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default seed for the train/test partition
pub const DEFAULT_SPLIT_SEED: u64 = 42;

#[derive(Debug, Clone)]
enum Partition {
    /// Shuffled split of the whole frame
    Random { test_size: f64, seed: u64 },
    /// First `n_train` rows are training rows, the rest are test rows
    Fixed { n_train: usize },
}

/// Owns the source data and hands out emitters for a target/predictor set
#[derive(Debug, Clone)]
pub struct DataHandler {
    df: DataFrame,
    partition: Partition,
}

impl DataHandler {
    /// Wrap a frame; rows are split into train and test with the default
    /// test size and seed
    pub fn new(df: DataFrame) -> Self {
        Self {
            df,
            partition: Partition::Random {
                test_size: DEFAULT_TEST_SIZE,
                seed: DEFAULT_SPLIT_SEED,
            },
        }
    }

    /// Use a pre-made train/test split
    pub fn from_split(train: DataFrame, test: DataFrame) -> Result<Self> {
        let n_train = train.height();
        let df = train.vstack(&test)?;
        Ok(Self {
            df,
            partition: Partition::Fixed { n_train },
        })
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        let seed = match self.partition {
            Partition::Random { seed, .. } => seed,
            Partition::Fixed { .. } => DEFAULT_SPLIT_SEED,
        };
        self.partition = Partition::Random { test_size, seed };
        self
    }

    /// Set the train/test partition seed
    pub fn with_split_seed(mut self, seed: u64) -> Self {
        let test_size = match self.partition {
            Partition::Random { test_size, .. } => test_size,
            Partition::Fixed { .. } => DEFAULT_TEST_SIZE,
        };
        self.partition = Partition::Random { test_size, seed };
        self
    }

    /// The underlying frame (train rows first when built from a split)
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    fn partition_rows(&self) -> Result<(Vec<usize>, Vec<usize>)> {
        let n = self.df.height();
        match self.partition {
            Partition::Random { test_size, seed } => train_test_indices(n, test_size, seed),
            Partition::Fixed { n_train } => Ok(((0..n_train).collect(), (n_train..n).collect())),
        }
    }

    /// Emitter with the train and test partitions for `y_var` ~ `x_vars`.
    ///
    /// Rows with a missing value in any requested column are dropped from
    /// their partition.
    pub fn train_test_emitter(&self, y_var: &str, x_vars: &[String]) -> Result<DataEmitter> {
        let y_col = extract_column(&self.df, y_var)?;
        let x_cols = x_vars
            .iter()
            .map(|name| extract_column(&self.df, name))
            .collect::<Result<Vec<_>>>()?;

        let (train_rows, test_rows) = self.partition_rows()?;
        let (x_train, y_train) = assemble(&y_col, &x_cols, &train_rows);
        let (x_test, y_test) = assemble(&y_col, &x_cols, &test_rows);

        if y_train.is_empty() {
            return Err(ReportError::DataError(format!(
                "no complete training rows for {} ~ {}",
                y_var,
                x_vars.join(" + ")
            )));
        }

        debug!(
            y_var,
            n_train = y_train.len(),
            n_test = y_test.len(),
            "Built train/test emitter"
        );

        DataEmitter::new(y_var, x_vars.to_vec(), x_train, y_train, x_test, y_test)
    }

    /// One emitter per fold of the training partition; each emitter's test
    /// side is the held-out fold.
    pub fn kfold_emitters(
        &self,
        y_var: &str,
        x_vars: &[String],
        n_folds: usize,
        shuffle: bool,
        random_state: u64,
    ) -> Result<Vec<DataEmitter>> {
        let base = self.train_test_emitter(y_var, x_vars)?;
        let splits = KFold::new(n_folds)
            .with_shuffle(shuffle)
            .with_random_state(random_state)
            .split(base.n_train())?;

        debug!(y_var, n_folds, random_state, "Built k-fold emitters");

        Ok(splits
            .iter()
            .map(|s| base.from_train_rows(&s.train_indices, &s.test_indices))
            .collect())
    }
}

/// Load a CSV file with a header row
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let file = File::open(path.as_ref()).map_err(|e| ReportError::DataError(e.to_string()))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| ReportError::DataError(e.to_string()))
}

fn extract_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| ReportError::FeatureNotFound(name.to_string()))?;
    let column_f64 = column
        .cast(&DataType::Float64)
        .map_err(|e| ReportError::DataError(e.to_string()))?;
    let values = column_f64
        .f64()
        .map_err(|e| ReportError::DataError(e.to_string()))?
        .into_iter()
        .collect();
    Ok(values)
}

fn assemble(
    y_col: &[Option<f64>],
    x_cols: &[Vec<Option<f64>>],
    rows: &[usize],
) -> (Array2<f64>, Array1<f64>) {
    let complete: Vec<usize> = rows
        .iter()
        .copied()
        .filter(|&r| y_col[r].is_some() && x_cols.iter().all(|c| c[r].is_some()))
        .collect();

    let y: Array1<f64> = complete.iter().map(|&r| y_col[r].unwrap_or(0.0)).collect();
    let x = Array2::from_shape_fn((complete.len(), x_cols.len()), |(i, j)| {
        x_cols[j][complete[i]].unwrap_or(0.0)
    });
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "x1" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
            "x2" => &[Some(1), Some(0), None, Some(1), Some(0), Some(1), Some(0), Some(1), Some(0), Some(1)],
            "y" => &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0]
        )
        .unwrap()
    }

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_train_test_emitter_sizes() {
        let handler = DataHandler::new(frame());
        let emitter = handler.train_test_emitter("y", &vars(&["x1"])).unwrap();
        assert_eq!(emitter.n_train(), 8);
        assert_eq!(emitter.n_test(), 2);
    }

    #[test]
    fn test_rows_with_nulls_are_dropped() {
        let handler = DataHandler::new(frame()).with_test_size(0.0);
        let emitter = handler.train_test_emitter("y", &vars(&["x1", "x2"])).unwrap();
        assert_eq!(emitter.n_train(), 9);
        let (x, _) = emitter.emit_train_xy();
        assert!(x.column(0).iter().all(|&v| v != 3.0));
    }

    #[test]
    fn test_missing_column() {
        let handler = DataHandler::new(frame());
        let result = handler.train_test_emitter("y", &vars(&["nope"]));
        assert!(matches!(result, Err(ReportError::FeatureNotFound(_))));
    }

    #[test]
    fn test_from_split_keeps_partitions() {
        let df = frame();
        let train = df.slice(0, 7);
        let test = df.slice(7, 3);
        let handler = DataHandler::from_split(train, test).unwrap();
        let emitter = handler.train_test_emitter("y", &vars(&["x1"])).unwrap();
        assert_eq!(emitter.n_train(), 7);
        let (_, y_test) = emitter.emit_test_xy();
        assert_eq!(y_test.to_vec(), vec![16.0, 18.0, 20.0]);
    }

    #[test]
    fn test_kfold_emitters_rotate_training_rows() {
        let handler = DataHandler::new(frame());
        let emitters = handler
            .kfold_emitters("y", &vars(&["x1"]), 4, true, 42)
            .unwrap();
        assert_eq!(emitters.len(), 4);

        let held_out: usize = emitters.iter().map(|e| e.n_test()).sum();
        assert_eq!(held_out, 8);
        for e in &emitters {
            assert_eq!(e.n_train() + e.n_test(), 8);
        }
    }

    #[test]
    fn test_load_csv() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,y").unwrap();
        writeln!(file, "1,2,3").unwrap();
        writeln!(file, "4,5,6").unwrap();

        let df = load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }
}
