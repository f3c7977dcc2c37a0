//! Decision tree implementation

use crate::error::{MivError, Result};
use ndarray::{Array1, Array2};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node; `distribution` holds class fractions for classifiers
    Leaf {
        value: f64,
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity (classification)
    Gini,
    /// Mean squared error (regression)
    MSE,
}

/// Running statistics of the targets on one side of a candidate split
#[derive(Clone)]
enum SideStats {
    Counts { counts: Vec<f64>, n: f64 },
    Moments { sum: f64, sum_sq: f64, n: f64 },
}

impl SideStats {
    fn empty(criterion: Criterion, n_classes: usize) -> Self {
        match criterion {
            Criterion::Gini => SideStats::Counts {
                counts: vec![0.0; n_classes],
                n: 0.0,
            },
            Criterion::MSE => SideStats::Moments {
                sum: 0.0,
                sum_sq: 0.0,
                n: 0.0,
            },
        }
    }

    fn add(&mut self, y: f64, sign: f64) {
        match self {
            SideStats::Counts { counts, n } => {
                counts[y as usize] += sign;
                *n += sign;
            }
            SideStats::Moments { sum, sum_sq, n } => {
                *sum += sign * y;
                *sum_sq += sign * y * y;
                *n += sign;
            }
        }
    }

    fn n(&self) -> f64 {
        match self {
            SideStats::Counts { n, .. } | SideStats::Moments { n, .. } => *n,
        }
    }

    fn impurity(&self) -> f64 {
        match self {
            SideStats::Counts { counts, n } => {
                if *n <= 0.0 {
                    return 0.0;
                }
                1.0 - counts.iter().map(|c| (c / n).powi(2)).sum::<f64>()
            }
            SideStats::Moments { sum, sum_sq, n } => {
                if *n <= 0.0 {
                    return 0.0;
                }
                let mean = sum / n;
                (sum_sq / n - mean * mean).max(0.0)
            }
        }
    }
}

/// CART decision tree for classification (label codes) or regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn at random for each split; all when `None`
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    pub random_state: u64,
    n_features: usize,
    n_classes: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_classifier()
    }
}

impl DecisionTree {
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: 0,
            n_features: 0,
            n_classes: 0,
            feature_importances: None,
        }
    }

    pub fn new_regressor() -> Self {
        Self {
            criterion: Criterion::MSE,
            ..Self::new_classifier()
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    /// Number of classes to size leaf distributions for; raised to cover
    /// the largest label seen during fit
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn is_classification(&self) -> bool {
        self.criterion == Criterion::Gini
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(MivError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(MivError::ValidationError("cannot fit on zero rows".to_string()));
        }

        self.n_features = x.ncols();
        if self.is_classification() {
            if y.iter().any(|v| *v < 0.0 || v.fract() != 0.0) {
                return Err(MivError::ValidationError(
                    "classification labels must be non-negative integer codes".to_string(),
                ));
            }
            let max_label = y.iter().fold(0.0f64, |m, &v| m.max(v)) as usize;
            self.n_classes = self.n_classes.max(max_label + 1);
        }

        let mut importances = vec![0.0; self.n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, indices, 0, &mut rng, &mut importances));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn stats_for(&self, y: &Array1<f64>, indices: &[usize]) -> SideStats {
        let mut stats = SideStats::empty(self.criterion, self.n_classes);
        for &i in indices {
            stats.add(y[i], 1.0);
        }
        stats
    }

    fn make_leaf(&self, stats: &SideStats) -> TreeNode {
        match stats {
            SideStats::Counts { counts, n } => {
                let distribution: Vec<f64> = counts
                    .iter()
                    .map(|c| if *n > 0.0 { c / n } else { 0.0 })
                    .collect();
                let value = distribution
                    .iter()
                    .enumerate()
                    .fold((0usize, f64::NEG_INFINITY), |best, (i, &p)| if p > best.1 { (i, p) } else { best })
                    .0 as f64;
                TreeNode::Leaf {
                    value,
                    distribution,
                    n_samples: *n as usize,
                }
            }
            SideStats::Moments { sum, n, .. } => TreeNode::Leaf {
                value: if *n > 0.0 { sum / n } else { 0.0 },
                distribution: Vec::new(),
                n_samples: *n as usize,
            },
        }
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let stats = self.stats_for(y, &indices);
        let parent_impurity = stats.impurity();

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || parent_impurity <= 1e-12;

        if should_stop {
            return self.make_leaf(&stats);
        }

        let features: Vec<usize> = match self.max_features {
            Some(k) if k < self.n_features => sample(rng, self.n_features, k).into_vec(),
            _ => (0..self.n_features).collect(),
        };

        let Some((feature_idx, threshold, child_impurity)) =
            self.find_best_split(x, y, &indices, &features, &stats)
        else {
            return self.make_leaf(&stats);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, feature_idx]] <= threshold);

        importances[feature_idx] += n_samples as f64 * (parent_impurity - child_impurity);

        let left = Box::new(self.build_tree(x, y, left_indices, depth + 1, rng, importances));
        let right = Box::new(self.build_tree(x, y, right_indices, depth + 1, rng, importances));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity: parent_impurity,
        }
    }

    /// Sweep each candidate feature in sorted order, moving one sample at a
    /// time from the right side to the left. Returns the split with the lowest
    /// weighted child impurity, if it improves on the parent.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        features: &[usize],
        parent: &SideStats,
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len() as f64;
        let min_leaf = self.min_samples_leaf as f64;
        let mut best: Option<(usize, f64, f64)> = None;
        let mut best_score = parent.impurity() - 1e-12;

        for &feature_idx in features {
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                x[[a, feature_idx]]
                    .partial_cmp(&x[[b, feature_idx]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left = SideStats::empty(self.criterion, self.n_classes);
            let mut right = parent.clone();

            for pos in 0..order.len() - 1 {
                let i = order[pos];
                left.add(y[i], 1.0);
                right.add(y[i], -1.0);

                let current = x[[i, feature_idx]];
                let next = x[[order[pos + 1], feature_idx]];
                if next <= current {
                    continue;
                }
                if left.n() < min_leaf || right.n() < min_leaf {
                    continue;
                }

                let score = (left.n() * left.impurity() + right.n() * right.impurity()) / n;
                if score < best_score {
                    best_score = score;
                    best = Some((feature_idx, (current + next) / 2.0, score));
                }
            }
        }

        best
    }

    fn leaf_for<'a>(&'a self, root: &'a TreeNode, row: ndarray::ArrayView1<f64>) -> &'a TreeNode {
        let mut node = root;
        loop {
            match node {
                TreeNode::Leaf { .. } => return node,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature_idx] <= *threshold { left } else { right };
                }
            }
        }
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<&TreeNode> {
        let root = self.root.as_ref().ok_or(MivError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(MivError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(root)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.check_input(x)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| match self.leaf_for(root, row) {
                TreeNode::Leaf { value, .. } => *value,
                TreeNode::Split { .. } => 0.0,
            })
            .collect())
    }

    /// Class fractions of the leaf each row lands in
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_classification() {
            return Err(MivError::ValidationError(
                "predict_proba requires a classifier".to_string(),
            ));
        }
        let root = self.check_input(x)?;
        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (r, row) in x.rows().into_iter().enumerate() {
            if let TreeNode::Leaf { distribution, .. } = self.leaf_for(root, row) {
                for (c, p) in distribution.iter().enumerate() {
                    proba[[r, c]] = *p;
                }
            }
        }
        Ok(proba)
    }

    /// Normalized impurity decrease per feature
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_separates_classes() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 1.0], [10.0, 1.0], [11.0, 0.0], [12.0, 1.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.get_depth(), 1);

        let imp = tree.feature_importances().unwrap();
        assert!((imp[0] - 1.0).abs() < 1e-12);
        assert_eq!(imp[1], 0.0);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let x = array![[0.0], [0.0], [1.0], [1.0]];
        let y = array![0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier().with_n_classes(3);
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&array![[0.0], [1.0]]).unwrap();
        assert_eq!(proba.ncols(), 3);
        assert!((proba[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((proba[[1, 1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regressor_fits_step() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![5.0, 5.0, 9.0, 9.0];

        let mut tree = DecisionTree::new_regressor().with_max_depth(3);
        tree.fit(&x, &y).unwrap();

        let pred = tree.predict(&array![[1.5], [3.5]]).unwrap();
        assert_eq!(pred.to_vec(), vec![5.0, 9.0]);
    }

    #[test]
    fn test_negative_labels_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![-1.0, 0.0];
        assert!(DecisionTree::new_classifier().fit(&x, &y).is_err());
    }

    #[test]
    fn test_unfitted_predict() {
        let tree = DecisionTree::new_regressor();
        assert!(matches!(tree.predict(&array![[1.0]]), Err(MivError::ModelNotFitted)));
    }
}
