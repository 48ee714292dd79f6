//! Train/test feature-label pairs handed to models and selectors

use crate::error::{ReportError, Result};
use ndarray::{Array1, Array2, Axis};

/// Aligned train and test matrices for one target and predictor set
#[derive(Debug, Clone)]
pub struct DataEmitter {
    y_var: String,
    x_vars: Vec<String>,
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
}

impl DataEmitter {
    /// Build an emitter from already extracted arrays
    pub fn new(
        y_var: impl Into<String>,
        x_vars: Vec<String>,
        x_train: Array2<f64>,
        y_train: Array1<f64>,
        x_test: Array2<f64>,
        y_test: Array1<f64>,
    ) -> Result<Self> {
        for (x, y, side) in [(&x_train, &y_train, "train"), (&x_test, &y_test, "test")] {
            if x.nrows() != y.len() {
                return Err(ReportError::ShapeError {
                    expected: format!("{} y length = {}", side, x.nrows()),
                    actual: format!("{} y length = {}", side, y.len()),
                });
            }
            if x.ncols() != x_vars.len() {
                return Err(ReportError::ShapeError {
                    expected: format!("{} columns = {}", side, x_vars.len()),
                    actual: format!("{} columns = {}", side, x.ncols()),
                });
            }
        }

        Ok(Self {
            y_var: y_var.into(),
            x_vars,
            x_train,
            y_train,
            x_test,
            y_test,
        })
    }

    pub fn y_var(&self) -> &str {
        &self.y_var
    }

    pub fn x_vars(&self) -> &[String] {
        &self.x_vars
    }

    /// Training features and target
    pub fn emit_train_xy(&self) -> (&Array2<f64>, &Array1<f64>) {
        (&self.x_train, &self.y_train)
    }

    /// Test features and target
    pub fn emit_test_xy(&self) -> (&Array2<f64>, &Array1<f64>) {
        (&self.x_test, &self.y_test)
    }

    pub fn n_train(&self) -> usize {
        self.y_train.len()
    }

    pub fn n_test(&self) -> usize {
        self.y_test.len()
    }

    /// Emitter whose train side is `train_rows` and test side is `test_rows`
    /// of this emitter's training partition.
    pub(crate) fn from_train_rows(&self, train_rows: &[usize], test_rows: &[usize]) -> Self {
        Self {
            y_var: self.y_var.clone(),
            x_vars: self.x_vars.clone(),
            x_train: self.x_train.select(Axis(0), train_rows),
            y_train: self.y_train.select(Axis(0), train_rows),
            x_test: self.x_train.select(Axis(0), test_rows),
            y_test: self.y_train.select(Axis(0), test_rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn emitter() -> DataEmitter {
        DataEmitter::new(
            "y",
            vec!["a".to_string(), "b".to_string()],
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            array![1.0, 2.0, 3.0],
            array![[7.0, 8.0]],
            array![4.0],
        )
        .unwrap()
    }

    #[test]
    fn test_emit() {
        let e = emitter();
        let (x, y) = e.emit_train_xy();
        assert_eq!(x.nrows(), 3);
        assert_eq!(y.len(), 3);
        assert_eq!(e.n_test(), 1);
        assert_eq!(e.x_vars(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = DataEmitter::new(
            "y",
            vec!["a".to_string()],
            array![[1.0], [2.0]],
            array![1.0],
            array![[3.0]],
            array![3.0],
        );
        assert!(matches!(result, Err(ReportError::ShapeError { .. })));
    }

    #[test]
    fn test_from_train_rows() {
        let fold = emitter().from_train_rows(&[0, 2], &[1]);
        let (x, y) = fold.emit_train_xy();
        assert_eq!(x.row(1).to_vec(), vec![5.0, 6.0]);
        assert_eq!(y.to_vec(), vec![1.0, 3.0]);
        let (x_test, y_test) = fold.emit_test_xy();
        assert_eq!(x_test.row(0).to_vec(), vec![3.0, 4.0]);
        assert_eq!(y_test.to_vec(), vec![2.0]);
    }
}
