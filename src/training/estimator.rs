//! Candidate estimators and their fitted forms

use super::decision_tree::DecisionTree;
use super::engine::TaskKind;
use super::knn::{KNNClassifier, KNNRegressor};
use super::linear_models::{LinearRegression, LogisticRegression};
use super::naive_bayes::GaussianNaiveBayes;
use super::random_forest::RandomForest;
use crate::error::{MivError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Estimator families the automated search can evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Estimator {
    LogisticRegression,
    LinearRegression,
    RidgeRegression,
    DecisionTree,
    RandomForest,
    KNeighbors,
    GaussianNaiveBayes,
}

/// Shared hyperparameters for a search run
#[derive(Debug, Clone, Copy)]
pub struct FitParams {
    pub n_classes: usize,
    pub seed: u64,
    pub n_estimators: usize,
    pub n_neighbors: usize,
    pub ridge_alpha: f64,
}

impl Estimator {
    pub const ALL: [Estimator; 7] = [
        Estimator::LogisticRegression,
        Estimator::LinearRegression,
        Estimator::RidgeRegression,
        Estimator::DecisionTree,
        Estimator::RandomForest,
        Estimator::KNeighbors,
        Estimator::GaussianNaiveBayes,
    ];

    pub fn supports(&self, task: TaskKind) -> bool {
        match self {
            Estimator::LogisticRegression | Estimator::GaussianNaiveBayes => {
                task == TaskKind::Classification
            }
            Estimator::LinearRegression | Estimator::RidgeRegression => task == TaskKind::Regression,
            Estimator::DecisionTree | Estimator::RandomForest | Estimator::KNeighbors => true,
        }
    }

    /// Display name used on the leaderboard
    pub fn display_name(&self, task: TaskKind) -> &'static str {
        let classification = task == TaskKind::Classification;
        match self {
            Estimator::LogisticRegression => "Logistic Regression",
            Estimator::LinearRegression => "Linear Regression",
            Estimator::RidgeRegression => "Ridge Regression",
            Estimator::DecisionTree if classification => "Decision Tree Classifier",
            Estimator::DecisionTree => "Decision Tree Regressor",
            Estimator::RandomForest if classification => "Random Forest Classifier",
            Estimator::RandomForest => "Random Forest Regressor",
            Estimator::KNeighbors if classification => "K Neighbors Classifier",
            Estimator::KNeighbors => "K Neighbors Regressor",
            Estimator::GaussianNaiveBayes => "Naive Bayes",
        }
    }

    pub fn fit(
        &self,
        task: TaskKind,
        x: &Array2<f64>,
        y: &Array1<f64>,
        params: &FitParams,
    ) -> Result<FittedModel> {
        if !self.supports(task) {
            return Err(MivError::ValidationError(format!(
                "{:?} does not support {}",
                self, task
            )));
        }

        let classification = task == TaskKind::Classification;
        let fitted = match self {
            Estimator::LogisticRegression => {
                let mut model = LogisticRegression::new();
                model.fit(x, y, params.n_classes)?;
                FittedModel::Logistic(model)
            }
            Estimator::LinearRegression => {
                let mut model = LinearRegression::new();
                model.fit(x, y)?;
                FittedModel::Linear(model)
            }
            Estimator::RidgeRegression => {
                let mut model = LinearRegression::ridge(params.ridge_alpha);
                model.fit(x, y)?;
                FittedModel::Linear(model)
            }
            Estimator::DecisionTree => {
                let mut model = if classification {
                    DecisionTree::new_classifier().with_n_classes(params.n_classes)
                } else {
                    DecisionTree::new_regressor()
                }
                .with_random_state(params.seed);
                model.fit(x, y)?;
                FittedModel::Tree(model)
            }
            Estimator::RandomForest => {
                let mut model = if classification {
                    RandomForest::new_classifier(params.n_estimators).with_n_classes(params.n_classes)
                } else {
                    RandomForest::new_regressor(params.n_estimators)
                }
                .with_random_state(params.seed);
                model.fit(x, y)?;
                FittedModel::Forest(model)
            }
            Estimator::KNeighbors if classification => {
                let mut model = KNNClassifier::with_k(params.n_neighbors);
                model.fit(x, y, params.n_classes)?;
                FittedModel::KnnClassifier(model)
            }
            Estimator::KNeighbors => {
                let mut model = KNNRegressor::with_k(params.n_neighbors);
                model.fit(x, y)?;
                FittedModel::KnnRegressor(model)
            }
            Estimator::GaussianNaiveBayes => {
                let mut model = GaussianNaiveBayes::new();
                model.fit(x, y, params.n_classes)?;
                FittedModel::NaiveBayes(model)
            }
        };
        Ok(fitted)
    }
}

/// A fitted estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedModel {
    Linear(LinearRegression),
    Logistic(LogisticRegression),
    Tree(DecisionTree),
    Forest(RandomForest),
    KnnClassifier(KNNClassifier),
    KnnRegressor(KNNRegressor),
    NaiveBayes(GaussianNaiveBayes),
}

impl FittedModel {
    /// Label codes for classifiers, values for regressors
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            FittedModel::Linear(m) => m.predict(x),
            FittedModel::Logistic(m) => m.predict(x),
            FittedModel::Tree(m) => m.predict(x),
            FittedModel::Forest(m) => m.predict(x),
            FittedModel::KnnClassifier(m) => m.predict(x),
            FittedModel::KnnRegressor(m) => m.predict(x),
            FittedModel::NaiveBayes(m) => m.predict(x),
        }
    }

    /// Class probabilities; `None` for regressors
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Option<Array2<f64>>> {
        let proba = match self {
            FittedModel::Logistic(m) => m.predict_proba(x)?,
            FittedModel::Tree(m) if m.criterion == super::decision_tree::Criterion::Gini => {
                m.predict_proba(x)?
            }
            FittedModel::Forest(m) => match m.predict_proba(x) {
                Ok(p) => p,
                Err(MivError::ValidationError(_)) => return Ok(None),
                Err(e) => return Err(e),
            },
            FittedModel::KnnClassifier(m) => m.predict_proba(x)?,
            FittedModel::NaiveBayes(m) => m.predict_proba(x)?,
            _ => return Ok(None),
        };
        Ok(Some(proba))
    }

    /// Importance per feature column, or `None` when the model has no notion of it
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        match self {
            FittedModel::Tree(m) => m.feature_importances().cloned(),
            FittedModel::Forest(m) => m.feature_importances().cloned(),
            FittedModel::Linear(m) => m.coefficients.as_ref().map(|c| c.mapv(f64::abs)),
            FittedModel::Logistic(m) => m.coefficient_magnitudes(),
            FittedModel::KnnClassifier(_) | FittedModel::KnnRegressor(_) | FittedModel::NaiveBayes(_) => None,
        }
    }

    /// Hyperparameters as shown after training
    pub fn params(&self) -> serde_json::Value {
        match self {
            FittedModel::Linear(m) => json!({ "alpha": m.alpha, "fit_intercept": true }),
            FittedModel::Logistic(m) => json!({
                "alpha": m.alpha,
                "max_iter": m.max_iter,
                "tol": m.tol,
                "multi_class": "ovr",
            }),
            FittedModel::Tree(m) => json!({
                "criterion": format!("{:?}", m.criterion).to_lowercase(),
                "max_depth": m.max_depth,
                "min_samples_split": m.min_samples_split,
                "min_samples_leaf": m.min_samples_leaf,
                "random_state": m.random_state,
            }),
            FittedModel::Forest(m) => json!({
                "n_estimators": m.n_estimators,
                "max_depth": m.max_depth,
                "min_samples_leaf": m.min_samples_leaf,
                "max_features": format!("{:?}", m.max_features).to_lowercase(),
                "random_state": m.random_state,
            }),
            FittedModel::KnnClassifier(m) => knn_params(m.config()),
            FittedModel::KnnRegressor(m) => knn_params(m.config()),
            FittedModel::NaiveBayes(m) => json!({ "var_smoothing": m.var_smoothing }),
        }
    }
}

fn knn_params(config: &super::knn::KNNConfig) -> serde_json::Value {
    json!({
        "n_neighbors": config.n_neighbors,
        "metric": format!("{:?}", config.metric).to_lowercase(),
        "weights": format!("{:?}", config.weights).to_lowercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params() -> FitParams {
        FitParams {
            n_classes: 2,
            seed: 123,
            n_estimators: 10,
            n_neighbors: 3,
            ridge_alpha: 1.0,
        }
    }

    #[test]
    fn test_task_support() {
        assert!(Estimator::LogisticRegression.supports(TaskKind::Classification));
        assert!(!Estimator::LogisticRegression.supports(TaskKind::Regression));
        assert!(!Estimator::RidgeRegression.supports(TaskKind::Classification));
        assert!(Estimator::KNeighbors.supports(TaskKind::Regression));
        assert_eq!(
            Estimator::RandomForest.display_name(TaskKind::Regression),
            "Random Forest Regressor"
        );
    }

    #[test]
    fn test_importance_availability() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [0.1, 0.9], [0.9, 0.2], [0.2, 1.0], [1.0, 0.1]];
        let y = array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

        let tree = Estimator::DecisionTree.fit(TaskKind::Classification, &x, &y, &params()).unwrap();
        assert_eq!(tree.feature_importances().unwrap().len(), 2);

        let knn = Estimator::KNeighbors.fit(TaskKind::Classification, &x, &y, &params()).unwrap();
        assert!(knn.feature_importances().is_none());
        assert_eq!(knn.params()["n_neighbors"], 3);

        let nb = Estimator::GaussianNaiveBayes.fit(TaskKind::Classification, &x, &y, &params()).unwrap();
        assert!(nb.predict_proba(&x).unwrap().is_some());
    }

    #[test]
    fn test_unsupported_task_rejected() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];
        assert!(Estimator::LinearRegression
            .fit(TaskKind::Classification, &x, &y, &params())
            .is_err());
    }
}
