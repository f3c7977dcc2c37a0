//! Seeded K-fold splitting

use crate::error::{MivError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-validation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CVStrategy {
    /// Shuffled K-fold
    KFold { n_splits: usize },
    /// Shuffled K-fold keeping class proportions per fold
    StratifiedKFold { n_splits: usize },
}

/// A single train/test split
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Cross-validation splitter; the same seed always yields the same folds
pub struct CrossValidator {
    strategy: CVStrategy,
    seed: u64,
}

impl CrossValidator {
    pub fn new(strategy: CVStrategy, seed: u64) -> Self {
        Self { strategy, seed }
    }

    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<CVSplit>> {
        match self.strategy {
            CVStrategy::KFold { n_splits } => self.k_fold(y.len(), n_splits),
            CVStrategy::StratifiedKFold { n_splits } => self.stratified_k_fold(y, n_splits),
        }
    }

    fn k_fold(&self, n_samples: usize, n_splits: usize) -> Result<Vec<CVSplit>> {
        check_splits(n_samples, n_splits)?;

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        for (i, idx) in indices.into_iter().enumerate() {
            folds[i % n_splits].push(idx);
        }

        Ok(assemble(folds))
    }

    fn stratified_k_fold(&self, y: &Array1<f64>, n_splits: usize) -> Result<Vec<CVSplit>> {
        check_splits(y.len(), n_splits)?;

        // BTreeMap keeps class order stable so folds are reproducible
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        let mut offset = 0usize;

        for indices in class_indices.values_mut() {
            indices.shuffle(&mut rng);
            for (i, &idx) in indices.iter().enumerate() {
                folds[(offset + i) % n_splits].push(idx);
            }
            offset += indices.len();
        }

        Ok(assemble(folds))
    }
}

fn check_splits(n_samples: usize, n_splits: usize) -> Result<()> {
    if n_splits < 2 {
        return Err(MivError::ValidationError(
            "n_splits must be at least 2".to_string(),
        ));
    }
    if n_samples < n_splits {
        return Err(MivError::ValidationError(format!(
            "n_samples ({}) must be >= n_splits ({})",
            n_samples, n_splits
        )));
    }
    Ok(())
}

fn assemble(folds: Vec<Vec<usize>>) -> Vec<CVSplit> {
    (0..folds.len())
        .map(|fold_idx| {
            let train_indices = folds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != fold_idx)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();
            CVSplit {
                train_indices,
                test_indices: folds[fold_idx].clone(),
                fold_idx,
            }
        })
        .collect()
}
