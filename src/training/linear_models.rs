//! Linear model implementations

use crate::error::{MivError, Result};
use crate::preprocessing::StandardScaler;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve the symmetric positive-definite system `a * x = b` by Cholesky.
///
/// Returns `None` when `a` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
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

    // L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Solve `(X^T X + alpha I) w = X^T y`, adding a small ridge if singular
fn solve_normal_equations(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    let mut xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let n = xtx.nrows();
    for i in 0..n {
        xtx[[i, i]] += alpha;
    }

    if let Some(w) = cholesky_solve(&xtx, &xty) {
        return Ok(w);
    }

    // Collinear features: regularize just enough to make the system solvable
    let jitter = 1e-8 * (xtx.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64).max(1.0);
    for i in 0..n {
        xtx[[i, i]] += jitter;
    }
    cholesky_solve(&xtx, &xty).ok_or_else(|| {
        MivError::ComputationError("matrix is singular, cannot solve least squares".to_string())
    })
}

fn check_lengths(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(MivError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    Ok(())
}

/// Least squares regression with optional L2 penalty (ridge when `alpha > 0`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    /// L2 regularization strength
    pub alpha: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 0.0,
        }
    }

    /// Ridge regression with the given penalty
    pub fn ridge(alpha: f64) -> Self {
        Self::new().with_alpha(alpha)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_lengths(x, y)?;
        if x.nrows() == 0 {
            return Err(MivError::ValidationError("cannot fit on zero rows".to_string()));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let coefficients = solve_normal_equations(&x_centered, &y_centered, self.alpha)?;
        self.intercept = Some(y_mean - coefficients.dot(&x_mean));
        self.coefficients = Some(coefficients);
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(MivError::ModelNotFitted)?;
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }
}

/// One-vs-rest logistic regression trained by batch gradient descent
/// on standardized features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One row of weights per class
    pub coefficients: Option<Array2<f64>>,
    pub intercepts: Option<Array1<f64>>,
    /// L2 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub learning_rate: f64,
    scaler: Option<StandardScaler>,
    n_classes: usize,
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
            intercepts: None,
            alpha: 0.01,
            max_iter: 500,
            tol: 1e-6,
            learning_rate: 0.5,
            scaler: None,
            n_classes: 0,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Fit on label codes `0..n_classes`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, n_classes: usize) -> Result<&mut Self> {
        check_lengths(x, y)?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 {
            return Err(MivError::ValidationError("cannot fit on zero rows".to_string()));
        }

        let scaler = StandardScaler::fit(x);
        let xs = scaler.transform(x);
        let n_classes = n_classes.max(1);

        let mut coefficients = Array2::<f64>::zeros((n_classes, n_features));
        let mut intercepts = Array1::<f64>::zeros(n_classes);

        for class in 0..n_classes {
            let target = y.mapv(|v| if v.round() as usize == class { 1.0 } else { 0.0 });
            let mut weights = Array1::<f64>::zeros(n_features);
            let mut bias = 0.0;

            for _ in 0..self.max_iter {
                let probs = (xs.dot(&weights) + bias).mapv(Self::sigmoid);
                let errors = &probs - &target;
                let dw = xs.t().dot(&errors) / n_samples as f64 + self.alpha * &weights;
                let db = errors.mean().unwrap_or(0.0);

                let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
                if grad_norm < self.tol {
                    break;
                }

                weights = weights - self.learning_rate * dw;
                bias -= self.learning_rate * db;
            }

            coefficients.row_mut(class).assign(&weights);
            intercepts[class] = bias;
        }

        self.coefficients = Some(coefficients);
        self.intercepts = Some(intercepts);
        self.scaler = Some(scaler);
        self.n_classes = n_classes;
        Ok(self)
    }

    /// Normalized one-vs-rest probabilities, one column per class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(MivError::ModelNotFitted)?;
        let intercepts = self.intercepts.as_ref().ok_or(MivError::ModelNotFitted)?;
        let scaler = self.scaler.as_ref().ok_or(MivError::ModelNotFitted)?;

        let xs = scaler.transform(x);
        let mut scores = xs.dot(&coefficients.t()) + &intercepts.view().insert_axis(Axis(0));
        scores.mapv_inplace(Self::sigmoid);

        for mut row in scores.rows_mut() {
            let total = row.sum();
            if total > 0.0 {
                row /= total;
            }
        }
        Ok(scores)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(argmax_rows(&self.predict_proba(x)?))
    }

    /// Mean absolute weight per feature across classes, in original feature order
    pub fn coefficient_magnitudes(&self) -> Option<Array1<f64>> {
        self.coefficients
            .as_ref()
            .and_then(|c| c.mapv(f64::abs).mean_axis(Axis(0)))
    }
}

/// Index of the largest value in each row, as f64
pub(crate) fn argmax_rows(proba: &Array2<f64>) -> Array1<f64> {
    proba
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0usize, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
                .0 as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ols_recovers_line() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![3.0, 5.0, 7.0, 9.0, 11.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-8);
        assert!((model.intercept.unwrap() - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_collinear_features_still_fit() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!((pred[3] - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut ols = LinearRegression::new();
        ols.fit(&x, &y).unwrap();
        let mut ridge = LinearRegression::ridge(10.0);
        ridge.fit(&x, &y).unwrap();

        assert!(ridge.coefficients.unwrap()[0] < ols.coefficients.unwrap()[0]);
    }

    #[test]
    fn test_logistic_multiclass() {
        let x = array![[0.0], [0.2], [0.4], [5.0], [5.2], [5.4], [10.0], [10.2], [10.4]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

        let mut model = LogisticRegression::new().with_max_iter(2000);
        model.fit(&x, &y, 3).unwrap();

        let pred = model.predict(&array![[0.1], [10.3]]).unwrap();
        assert_eq!(pred[0], 0.0);
        assert_eq!(pred[1], 2.0);

        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (9, 3));
        assert!((proba.row(0).sum() - 1.0).abs() < 1e-9);
    }
}
