//! Model training module
//!
//! Provides the automated model search used by the wizard:
//! - Linear models (OLS, Ridge, one-vs-rest Logistic Regression)
//! - Decision trees and Random Forests
//! - K-Nearest Neighbors
//! - Gaussian Naive Bayes
//! - Seeded cross-validation and leaderboard ranking

mod auto_search;
mod config;
mod engine;
mod estimator;
mod leaderboard;
mod models;
pub mod cross_validation;
pub mod decision_tree;
pub mod knn;
pub mod linear_models;
pub mod naive_bayes;
pub mod random_forest;

pub use auto_search::{AutoSearchEngine, SearchArtifact, PREDICTION_LABEL, PREDICTION_SCORE};
pub use config::{SearchConfig, SESSION_SEED};
pub use cross_validation::{CVSplit, CVStrategy, CrossValidator};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use engine::{SearchOutcome, TabularSearchEngine, TaskKind, TrainedModel};
pub use estimator::{Estimator, FitParams, FittedModel};
pub use knn::{DistanceMetric, KNNClassifier, KNNConfig, KNNRegressor, WeightScheme};
pub use leaderboard::{Leaderboard, LeaderboardEntry, SortMetric};
pub use linear_models::{LinearRegression, LogisticRegression};
pub use models::ModelMetrics;
pub use naive_bayes::GaussianNaiveBayes;
pub use random_forest::{MaxFeatures, RandomForest};
