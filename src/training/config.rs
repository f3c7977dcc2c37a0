//! Search configuration

use super::engine::TaskKind;
use super::estimator::Estimator;
use super::leaderboard::SortMetric;
use serde::{Deserialize, Serialize};

/// Seed passed to every search so identical inputs rank identically
pub const SESSION_SEED: u64 = 123;

/// Settings for the automated model search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Cross-validation folds, clamped to the data at search time
    pub folds: usize,
    /// Seed used when the caller does not supply one
    pub seed: u64,
    pub classification_sort: SortMetric,
    pub regression_sort: SortMetric,
    /// Estimators to evaluate; each is used only for tasks it supports
    pub candidates: Vec<Estimator>,
    pub n_estimators: usize,
    pub n_neighbors: usize,
    pub ridge_alpha: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            seed: SESSION_SEED,
            classification_sort: SortMetric::Accuracy,
            regression_sort: SortMetric::R2,
            candidates: Estimator::ALL.to_vec(),
            n_estimators: 50,
            n_neighbors: 5,
            ridge_alpha: 1.0,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<Estimator>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_n_neighbors(mut self, k: usize) -> Self {
        self.n_neighbors = k.max(1);
        self
    }

    pub fn with_sort_metric(mut self, task: TaskKind, metric: SortMetric) -> Self {
        match task {
            TaskKind::Classification => self.classification_sort = metric,
            TaskKind::Regression => self.regression_sort = metric,
        }
        self
    }

    pub fn sort_metric(&self, task: TaskKind) -> SortMetric {
        match task {
            TaskKind::Classification => self.classification_sort,
            TaskKind::Regression => self.regression_sort,
        }
    }

    /// Candidates applicable to `task`, in configured order
    pub fn candidates_for(&self, task: TaskKind) -> Vec<Estimator> {
        self.candidates
            .iter()
            .copied()
            .filter(|e| e.supports(task))
            .collect()
    }
}
