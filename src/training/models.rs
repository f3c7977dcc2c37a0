//! Evaluation metrics for candidate models

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for one evaluation of a model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Accuracy (classification)
    pub accuracy: Option<f64>,
    /// Macro-averaged precision (classification)
    pub precision: Option<f64>,
    /// Macro-averaged recall (classification)
    pub recall: Option<f64>,
    /// Macro-averaged F1 (classification)
    pub f1_score: Option<f64>,
    /// Mean absolute error (regression)
    pub mae: Option<f64>,
    /// Mean squared error (regression)
    pub mse: Option<f64>,
    /// Root mean squared error (regression)
    pub rmse: Option<f64>,
    /// R-squared (regression)
    pub r2: Option<f64>,
    /// Fit time in seconds
    pub training_time_secs: f64,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classification metrics over label codes `0..n_classes`
    pub fn compute_classification(y_true: &Array1<f64>, y_pred: &Array1<f64>, n_classes: usize) -> Self {
        let mut metrics = Self::new();
        let n = y_true.len();
        if n == 0 {
            return metrics;
        }

        let n_classes = n_classes.max(1);
        let mut tp = vec![0usize; n_classes];
        let mut fp = vec![0usize; n_classes];
        let mut fn_ = vec![0usize; n_classes];
        let mut correct = 0usize;

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            let t = (t.round().max(0.0) as usize).min(n_classes - 1);
            let p = (p.round().max(0.0) as usize).min(n_classes - 1);
            if t == p {
                correct += 1;
                tp[t] += 1;
            } else {
                fp[p] += 1;
                fn_[t] += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };

        let mut precision_sum = 0.0;
        let mut recall_sum = 0.0;
        let mut f1_sum = 0.0;
        for c in 0..n_classes {
            let p = ratio(tp[c], tp[c] + fp[c]);
            let r = ratio(tp[c], tp[c] + fn_[c]);
            precision_sum += p;
            recall_sum += r;
            f1_sum += if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
        }

        metrics.accuracy = Some(correct as f64 / n as f64);
        metrics.precision = Some(precision_sum / n_classes as f64);
        metrics.recall = Some(recall_sum / n_classes as f64);
        metrics.f1_score = Some(f1_sum / n_classes as f64);
        metrics
    }

    /// Regression metrics
    pub fn compute_regression(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut metrics = Self::new();
        if y_true.is_empty() {
            return metrics;
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        metrics.mse = Some(mse);
        metrics.rmse = Some(mse.sqrt());
        metrics.mae = Some(errors.iter().map(|e| e.abs()).sum::<f64>() / n);

        let y_mean = y_true.sum() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        metrics.r2 = Some(if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 });

        metrics
    }

    /// Average several fold metrics; fields missing everywhere stay `None`
    pub fn mean_of(folds: &[ModelMetrics]) -> Self {
        fn avg(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
            let collected: Vec<f64> = values.flatten().collect();
            if collected.is_empty() {
                None
            } else {
                Some(collected.iter().sum::<f64>() / collected.len() as f64)
            }
        }

        Self {
            accuracy: avg(folds.iter().map(|m| m.accuracy)),
            precision: avg(folds.iter().map(|m| m.precision)),
            recall: avg(folds.iter().map(|m| m.recall)),
            f1_score: avg(folds.iter().map(|m| m.f1_score)),
            mae: avg(folds.iter().map(|m| m.mae)),
            mse: avg(folds.iter().map(|m| m.mse)),
            rmse: avg(folds.iter().map(|m| m.rmse)),
            r2: avg(folds.iter().map(|m| m.r2)),
            training_time_secs: avg(folds.iter().map(|m| Some(m.training_time_secs))).unwrap_or(0.0),
        }
    }
}
