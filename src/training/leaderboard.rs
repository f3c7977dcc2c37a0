//! Ranked table of evaluated candidates

use super::engine::TaskKind;
use super::estimator::Estimator;
use super::models::ModelMetrics;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Metric a leaderboard is ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMetric {
    Accuracy,
    Precision,
    Recall,
    F1,
    MAE,
    MSE,
    RMSE,
    R2,
}

impl SortMetric {
    pub fn value(&self, metrics: &ModelMetrics) -> Option<f64> {
        match self {
            SortMetric::Accuracy => metrics.accuracy,
            SortMetric::Precision => metrics.precision,
            SortMetric::Recall => metrics.recall,
            SortMetric::F1 => metrics.f1_score,
            SortMetric::MAE => metrics.mae,
            SortMetric::MSE => metrics.mse,
            SortMetric::RMSE => metrics.rmse,
            SortMetric::R2 => metrics.r2,
        }
    }

    pub fn higher_is_better(&self) -> bool {
        !matches!(self, SortMetric::MAE | SortMetric::MSE | SortMetric::RMSE)
    }
}

/// One evaluated candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub model: String,
    pub estimator: Estimator,
    /// Cross-validated mean metrics
    pub metrics: ModelMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    task: TaskKind,
    sort_metric: SortMetric,
    entries: Vec<LeaderboardEntry>,
}

const CLASSIFICATION_COLUMNS: [&str; 6] = ["Model", "Accuracy", "Precision", "Recall", "F1", "TT (Sec)"];
const REGRESSION_COLUMNS: [&str; 6] = ["Model", "MAE", "MSE", "RMSE", "R2", "TT (Sec)"];

impl Leaderboard {
    /// Rank entries best first; candidates keep their order on ties
    pub fn new(task: TaskKind, sort_metric: SortMetric, mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| {
            let va = sort_metric.value(&a.metrics);
            let vb = sort_metric.value(&b.metrics);
            let ordering = match (va, vb) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            if sort_metric.higher_is_better() {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Self {
            task,
            sort_metric,
            entries,
        }
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    pub fn sort_metric(&self) -> SortMetric {
        self.sort_metric
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn column_names(&self) -> &'static [&'static str] {
        match self.task {
            TaskKind::Classification => &CLASSIFICATION_COLUMNS,
            TaskKind::Regression => &REGRESSION_COLUMNS,
        }
    }

    /// Materialize as a table, metrics rounded to four decimals
    pub fn to_frame(&self) -> Result<DataFrame> {
        let names = self.column_names();
        let round = |v: Option<f64>| v.map(|x| (x * 10_000.0).round() / 10_000.0);
        let metric_column = |idx: usize, get: fn(&ModelMetrics) -> Option<f64>| {
            let values: Vec<Option<f64>> = self.entries.iter().map(|e| round(get(&e.metrics))).collect();
            Column::new(names[idx].into(), values)
        };

        let models: Vec<&str> = self.entries.iter().map(|e| e.model.as_str()).collect();
        let times: Vec<f64> = self
            .entries
            .iter()
            .map(|e| (e.metrics.training_time_secs * 100.0).round() / 100.0)
            .collect();

        let columns = match self.task {
            TaskKind::Classification => vec![
                Column::new(names[0].into(), models),
                metric_column(1, |m| m.accuracy),
                metric_column(2, |m| m.precision),
                metric_column(3, |m| m.recall),
                metric_column(4, |m| m.f1_score),
                Column::new(names[5].into(), times),
            ],
            TaskKind::Regression => vec![
                Column::new(names[0].into(), models),
                metric_column(1, |m| m.mae),
                metric_column(2, |m| m.mse),
                metric_column(3, |m| m.rmse),
                metric_column(4, |m| m.r2),
                Column::new(names[5].into(), times),
            ],
        };

        Ok(DataFrame::new(columns)?)
    }
}
