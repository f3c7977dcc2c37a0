//! Gaussian Naive Bayes for continuous features

use crate::error::{MivError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-class feature statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassStats {
    log_prior: f64,
    means: Vec<f64>,
    variances: Vec<f64>,
}

/// Gaussian Naive Bayes classifier over label codes `0..n_classes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNaiveBayes {
    /// `None` for classes absent from the training rows
    stats: Vec<Option<ClassStats>>,
    /// Fraction of the largest feature variance added to every variance
    pub var_smoothing: f64,
    n_features: usize,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            stats: Vec::new(),
            var_smoothing: 1e-9,
            n_features: 0,
        }
    }

    pub fn with_var_smoothing(mut self, smoothing: f64) -> Self {
        self.var_smoothing = smoothing;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, n_classes: usize) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() {
            return Err(MivError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(MivError::ValidationError("cannot fit on zero rows".to_string()));
        }

        let max_label = y.iter().fold(0.0f64, |m, &v| m.max(v)) as usize;
        let n_classes = n_classes.max(max_label + 1);

        let max_var = x
            .columns()
            .into_iter()
            .map(|c| c.var(0.0))
            .fold(0.0f64, f64::max);
        let epsilon = (self.var_smoothing * max_var).max(1e-12);

        // Welford's single-pass mean and variance per class
        let mut counts = vec![0usize; n_classes];
        let mut means = vec![vec![0.0; n_features]; n_classes];
        let mut m2 = vec![vec![0.0; n_features]; n_classes];
        for (row, &label) in x.rows().into_iter().zip(y.iter()) {
            let c = label as usize;
            counts[c] += 1;
            for (j, &val) in row.iter().enumerate() {
                let delta = val - means[c][j];
                means[c][j] += delta / counts[c] as f64;
                m2[c][j] += delta * (val - means[c][j]);
            }
        }

        self.stats = (0..n_classes)
            .map(|c| {
                (counts[c] > 0).then(|| ClassStats {
                    log_prior: (counts[c] as f64 / n_samples as f64).ln(),
                    means: means[c].clone(),
                    variances: m2[c].iter().map(|v| v / counts[c] as f64 + epsilon).collect(),
                })
            })
            .collect();
        self.n_features = n_features;

        Ok(())
    }

    fn joint_log_likelihood(stats: &ClassStats, row: ArrayView1<f64>) -> f64 {
        stats.log_prior
            + row
                .iter()
                .zip(stats.means.iter())
                .zip(stats.variances.iter())
                .map(|((&xi, &mean), &var)| -0.5 * ((xi - mean).powi(2) / var + var.ln() + (2.0 * PI).ln()))
                .sum::<f64>()
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.stats.is_empty() {
            return Err(MivError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(MivError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.stats.len()));
        for (i, row) in x.rows().into_iter().enumerate() {
            let log_probs: Vec<f64> = self
                .stats
                .iter()
                .map(|s| s.as_ref().map_or(f64::NEG_INFINITY, |s| Self::joint_log_likelihood(s, row)))
                .collect();

            // log-sum-exp normalization
            let max_val = log_probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let total: f64 = log_probs.iter().map(|&v| (v - max_val).exp()).sum();
            for (j, &v) in log_probs.iter().enumerate() {
                proba[[i, j]] = (v - max_val).exp() / total;
            }
        }
        Ok(proba)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(super::linear_models::argmax_rows(&self.predict_proba(x)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gaussian_nb() {
        let x = array![[1.0, 2.0], [1.2, 1.8], [0.8, 2.1], [6.0, 8.0], [6.2, 7.9], [5.9, 8.2]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y, 2).unwrap();

        let pred = nb.predict(&array![[1.0, 2.0], [6.0, 8.0]]).unwrap();
        assert_eq!(pred.to_vec(), vec![0.0, 1.0]);

        let proba = nb.predict_proba(&x).unwrap();
        assert!((proba.row(3).sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_absent_class_gets_zero_probability() {
        let x = array![[0.0], [0.5], [9.0], [9.5]];
        let y = array![0.0, 0.0, 2.0, 2.0];

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y, 3).unwrap();

        let proba = nb.predict_proba(&array![[5.0]]).unwrap();
        assert_eq!(proba.ncols(), 3);
        assert_eq!(proba[[0, 1]], 0.0);
    }
}
