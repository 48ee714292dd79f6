//! Linear estimators: least squares, ridge, lasso and logistic regression

use super::estimator::{Classifier, Regressor};
use crate::error::{ReportError, Result};
use crate::metrics::classification::distinct_classes;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve the symmetric positive-definite system Ax = b by Cholesky
/// decomposition. Near-singular systems get a tiny ridge and one retry.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    cholesky_solve_inner(a, b).or_else(|| {
        let n = a.nrows();
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
        let mut a_reg = a.clone();
        for k in 0..n {
            a_reg[[k, k]] += ridge.max(1e-12);
        }
        cholesky_solve_inner(&a_reg, b)
    })
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

fn check_xy(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ReportError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(ReportError::ValidationError(
            "cannot fit on zero samples".to_string(),
        ));
    }
    Ok(())
}

/// Centered copies of x and y with their means
fn center(x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array2<f64>, Array1<f64>, Array1<f64>, f64)> {
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| ReportError::ComputationError("empty design matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);
    let x_c = x - &x_mean.clone().insert_axis(Axis(0));
    let y_c = y - y_mean;
    Ok((x_c, y_c, x_mean, y_mean))
}

fn linear_predict(
    coefficients: Option<&Array1<f64>>,
    intercept: f64,
    x: &Array2<f64>,
) -> Result<Array1<f64>> {
    let coefficients = coefficients.ok_or(ReportError::ModelNotFitted)?;
    if x.ncols() != coefficients.len() {
        return Err(ReportError::ShapeError {
            expected: format!("{} columns", coefficients.len()),
            actual: format!("{} columns", x.ncols()),
        });
    }
    Ok(x.dot(coefficients) + intercept)
}

/// Ordinary least squares, with optional L2 penalty (ridge)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: f64,
    /// L2 regularization strength; 0 is plain least squares
    pub alpha: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Plain least squares
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha: 0.0,
        }
    }

    /// Ridge regression with penalty `alpha`
    pub fn ridge(alpha: f64) -> Self {
        Self {
            alpha,
            ..Self::new()
        }
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> String {
        if self.alpha > 0.0 {
            format!("Ridge(alpha={})", self.alpha)
        } else {
            "OLS".to_string()
        }
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;
        let (x_c, y_c, x_mean, y_mean) = center(x, y)?;

        let mut xtx = x_c.t().dot(&x_c);
        for i in 0..x.ncols() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = x_c.t().dot(&y_c);

        let coefficients = cholesky_solve(&xtx, &xty).ok_or_else(|| {
            ReportError::ComputationError("Matrix is singular, cannot solve least squares".to_string())
        })?;

        self.intercept = y_mean - coefficients.dot(&x_mean);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(self.coefficients.as_ref(), self.intercept, x)
    }
}

/// Lasso regression (L1 penalty) by coordinate descent.
///
/// Minimizes `1/(2n) ||y - Xw - b||² + alpha ||w||₁`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// L1 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for LassoRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LassoRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha,
            max_iter: 1000,
            tol: 1e-6,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Soft-threshold operator for the L1 proximal step
    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }
}

impl Regressor for LassoRegression {
    fn name(&self) -> String {
        format!("Lasso(alpha={})", self.alpha)
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let (x_c, y_c, x_mean, y_mean) = center(x, y)?;

        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_c.column(j).mapv(|v| v * v).sum())
            .collect();

        let mut w = Array1::<f64>::zeros(n_features);
        let lambda = self.alpha * n_samples as f64;
        let mut r = y_c.clone();

        for _iter in 0..self.max_iter {
            let mut max_change: f64 = 0.0;

            for j in 0..n_features {
                if col_norms[j] < 1e-15 {
                    w[j] = 0.0;
                    continue;
                }
                let old_wj = w[j];
                let rho = x_c.column(j).dot(&r) + col_norms[j] * old_wj;
                w[j] = Self::soft_threshold(rho, lambda) / col_norms[j];

                let delta = old_wj - w[j];
                if delta != 0.0 {
                    r.scaled_add(delta, &x_c.column(j));
                    max_change = max_change.max(delta.abs());
                }
            }

            if max_change < self.tol {
                break;
            }
        }

        self.intercept = y_mean - w.dot(&x_mean);
        self.coefficients = Some(w);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        linear_predict(self.coefficients.as_ref(), self.intercept, x)
    }
}

/// Binary logistic regression trained by gradient descent on 0/1 targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// L2 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub learning_rate: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
        }
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Fit on targets in {0, 1}
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;
        let n_samples = x.nrows() as f64;

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for _iter in 0..self.max_iter {
            let predictions = Self::sigmoid(&(x.dot(&weights) + bias));
            let errors = &predictions - y;
            let dw = x.t().dot(&errors) / n_samples + self.alpha * &weights;
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - self.learning_rate * dw;
            bias -= self.learning_rate * db;
        }

        self.coefficients = Some(weights);
        self.intercept = bias;
        Ok(())
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let linear = linear_predict(self.coefficients.as_ref(), self.intercept, x)?;
        Ok(Self::sigmoid(&linear))
    }
}

/// Logistic classifier over arbitrary labels.
///
/// Two classes train a single logistic model for `classes[1]`; more classes
/// train one model per class and normalize the one-vs-rest probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    template: LogisticRegression,
    classes: Vec<f64>,
    estimators: Vec<LogisticRegression>,
}

impl Default for LogisticClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticClassifier {
    pub fn new() -> Self {
        Self {
            template: LogisticRegression::new(),
            classes: Vec::new(),
            estimators: Vec::new(),
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.template.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.template.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.template.learning_rate = learning_rate;
        self
    }
}

impl Classifier for LogisticClassifier {
    fn name(&self) -> String {
        format!("Logistic(alpha={})", self.template.alpha)
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;
        let classes = distinct_classes(y);
        if classes.len() < 2 {
            return Err(ReportError::ValidationError(format!(
                "need at least two classes to fit a classifier, found {}",
                classes.len()
            )));
        }

        let targets: Vec<f64> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        self.estimators = targets
            .iter()
            .map(|&class| -> Result<LogisticRegression> {
                let y_bin = y.mapv(|v| if v == class { 1.0 } else { 0.0 });
                let mut est = self.template.clone();
                est.fit(x, &y_bin)?;
                Ok(est)
            })
            .collect::<Result<Vec<_>>>()?;
        self.classes = classes;
        Ok(())
    }

    fn classes(&self) -> &[f64] {
        &self.classes
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.estimators.is_empty() {
            return Err(ReportError::ModelNotFitted);
        }

        let n = x.nrows();
        let k = self.classes.len();
        let mut proba = Array2::<f64>::zeros((n, k));

        if k == 2 {
            let p = self.estimators[0].predict_proba(x)?;
            proba.column_mut(0).assign(&p.mapv(|v| 1.0 - v));
            proba.column_mut(1).assign(&p);
        } else {
            for (c, est) in self.estimators.iter().enumerate() {
                proba.column_mut(c).assign(&est.predict_proba(x)?);
            }
            for mut row in proba.rows_mut() {
                let total = row.sum();
                if total > 0.0 {
                    row /= total;
                } else {
                    row.fill(1.0 / k as f64);
                }
            }
        }
        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn linear_data() -> (Array2<f64>, Array1<f64>) {
        // y = 2*x1 - x2 + 1
        let x = array![
            [1.0, 0.5],
            [2.0, 1.5],
            [3.0, 0.0],
            [4.0, 2.0],
            [5.0, 1.0],
            [6.0, 3.0]
        ];
        let y = x.column(0).mapv(|v| 2.0 * v) - &x.column(1) + 1.0;
        (x, y)
    }

    #[test]
    fn test_ols_recovers_coefficients() {
        let (x, y) = linear_data();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-6);
        assert!((coef[1] + 1.0).abs() < 1e-6);
        assert!((model.intercept - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ridge_shrinks() {
        let (x, y) = linear_data();
        let mut ols = LinearRegression::new();
        ols.fit(&x, &y).unwrap();
        let mut ridge = LinearRegression::ridge(10.0);
        ridge.fit(&x, &y).unwrap();

        let norm = |m: &LinearRegression| m.coefficients.as_ref().unwrap().mapv(|v| v * v).sum();
        assert!(norm(&ridge) < norm(&ols));
        assert_eq!(ridge.name(), "Ridge(alpha=10)");
    }

    #[test]
    fn test_lasso_large_alpha_zeroes_everything() {
        let (x, y) = linear_data();
        let mut lasso = LassoRegression::new(1e6);
        lasso.fit(&x, &y).unwrap();
        assert!(lasso.coefficients.as_ref().unwrap().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_lasso_small_alpha_close_to_ols() {
        let (x, y) = linear_data();
        let mut lasso = LassoRegression::new(1e-6).with_max_iter(10_000);
        lasso.fit(&x, &y).unwrap();
        let coef = lasso.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-2);
    }

    #[test]
    fn test_predict_before_fit() {
        let x = array![[1.0]];
        assert!(matches!(
            LinearRegression::new().predict(&x),
            Err(ReportError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_logistic_binary_labels() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [7.0], [8.0], [9.0], [10.0]];
        let y = array![3.0, 3.0, 3.0, 3.0, 5.0, 5.0, 5.0, 5.0];
        let mut clf = LogisticClassifier::new();
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.classes(), &[3.0, 5.0]);
        let pred = clf.predict(&x).unwrap();
        assert_eq!(pred, y);
    }

    #[test]
    fn test_logistic_multiclass_proba_rows_sum_to_one() {
        let x = array![[0.0], [0.5], [5.0], [5.5], [10.0], [10.5]];
        let y = array![0.0, 0.0, 1.0, 1.0, 2.0, 2.0];
        let mut clf = LogisticClassifier::new();
        clf.fit(&x, &y).unwrap();

        let proba = clf.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 3);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_logistic_single_class_fails() {
        let x = array![[0.0], [1.0]];
        let y = array![1.0, 1.0];
        assert!(LogisticClassifier::new().fit(&x, &y).is_err());
    }
}
