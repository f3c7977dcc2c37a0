//! K-Nearest Neighbors implementation
//!
//! Features are standardized on the training set before any distance is taken.

use crate::error::{MivError, Result};
use crate::preprocessing::StandardScaler;
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Distance metric for KNN
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// L2
    #[default]
    Euclidean,
    /// L1
    Manhattan,
}

/// Weighting scheme for neighbors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum WeightScheme {
    #[default]
    Uniform,
    /// Inverse distance
    Distance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNConfig {
    pub n_neighbors: usize,
    pub metric: DistanceMetric,
    pub weights: WeightScheme,
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            metric: DistanceMetric::Euclidean,
            weights: WeightScheme::Uniform,
        }
    }
}

/// Training set held by a fitted KNN model
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Memory {
    scaler: StandardScaler,
    x: Array2<f64>,
    y: Array1<f64>,
}

impl Memory {
    fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MivError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(MivError::ValidationError("cannot fit on zero rows".to_string()));
        }
        let scaler = StandardScaler::fit(x);
        Ok(Self {
            x: scaler.transform(x),
            scaler,
            y: y.clone(),
        })
    }

    /// Neighbors of every query row, as `(distance, label)` pairs
    fn neighbors(&self, x: &Array2<f64>, config: &KNNConfig) -> Result<Vec<Vec<(f64, f64)>>> {
        if x.ncols() != self.x.ncols() {
            return Err(MivError::ShapeError {
                expected: format!("{} features", self.x.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let queries = self.scaler.transform(x);
        let k = config.n_neighbors.clamp(1, self.x.nrows());

        Ok((0..queries.nrows())
            .into_par_iter()
            .map(|i| find_k_nearest(queries.row(i), &self.x, &self.y, k, config.metric))
            .collect())
    }
}

/// K-Nearest Neighbors classifier over label codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNClassifier {
    config: KNNConfig,
    memory: Option<Memory>,
    n_classes: usize,
}

impl KNNClassifier {
    pub fn new(config: KNNConfig) -> Self {
        Self {
            config,
            memory: None,
            n_classes: 0,
        }
    }

    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig {
            n_neighbors: k,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &KNNConfig {
        &self.config
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, n_classes: usize) -> Result<()> {
        self.memory = Some(Memory::fit(x, y)?);
        let max_label = y.iter().fold(0.0f64, |m, &v| m.max(v)) as usize;
        self.n_classes = n_classes.max(max_label + 1);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(super::linear_models::argmax_rows(&self.predict_proba(x)?))
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let memory = self.memory.as_ref().ok_or(MivError::ModelNotFitted)?;
        let neighbors = memory.neighbors(x, &self.config)?;

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (r, found) in neighbors.iter().enumerate() {
            let mut total = 0.0;
            for &(dist, label) in found {
                let w = weight(dist, self.config.weights);
                proba[[r, label as usize]] += w;
                total += w;
            }
            if total > 0.0 {
                proba.row_mut(r).mapv_inplace(|v| v / total);
            }
        }
        Ok(proba)
    }
}

/// K-Nearest Neighbors regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNRegressor {
    config: KNNConfig,
    memory: Option<Memory>,
}

impl KNNRegressor {
    pub fn new(config: KNNConfig) -> Self {
        Self { config, memory: None }
    }

    pub fn with_k(k: usize) -> Self {
        Self::new(KNNConfig {
            n_neighbors: k,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &KNNConfig {
        &self.config
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.memory = Some(Memory::fit(x, y)?);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let memory = self.memory.as_ref().ok_or(MivError::ModelNotFitted)?;
        let neighbors = memory.neighbors(x, &self.config)?;

        Ok(neighbors
            .iter()
            .map(|found| {
                let (sum, total) = found.iter().fold((0.0, 0.0), |(s, t), &(dist, value)| {
                    let w = weight(dist, self.config.weights);
                    (s + w * value, t + w)
                });
                if total > 0.0 {
                    sum / total
                } else {
                    0.0
                }
            })
            .collect())
    }
}

fn weight(dist: f64, scheme: WeightScheme) -> f64 {
    match scheme {
        WeightScheme::Uniform => 1.0,
        WeightScheme::Distance => 1.0 / (dist + 1e-10),
    }
}

/// Max-heap entry keyed by distance
#[derive(PartialEq)]
struct DistLabel(f64, f64);

impl Eq for DistLabel {}
impl PartialOrd for DistLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Keep the k smallest distances in a bounded max-heap
fn find_k_nearest(
    point: ArrayView1<f64>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
    metric: DistanceMetric,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = compute_distance(point, row, metric);
        if heap.len() < k {
            heap.push(DistLabel(dist, y_train[i]));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistLabel(dist, y_train[i]));
            }
        }
    }

    heap.into_iter().map(|dl| (dl.0, dl.1)).collect()
}

fn compute_distance(a: ArrayView1<f64>, b: ArrayView1<f64>, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b.iter())
            .map(|(ai, bi)| (ai - bi).powi(2))
            .sum::<f64>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).abs()).sum(),
    }
}
