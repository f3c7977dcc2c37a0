//! Search engine capability used by the wizard stages

use super::leaderboard::Leaderboard;
use crate::error::Result;
use crate::explainability::FeatureImportancePlot;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Learning task a search runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    Classification,
    Regression,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Classification => write!(f, "classification"),
            TaskKind::Regression => write!(f, "regression"),
        }
    }
}

/// Opaque handle to the model a search selected.
///
/// The handle carries the task it was trained for, a display name and a JSON
/// description of its hyperparameters. Whatever the engine needs to predict
/// later lives behind `inner` and is only visible to that engine.
#[derive(Clone)]
pub struct TrainedModel {
    task: TaskKind,
    name: String,
    description: serde_json::Value,
    inner: Arc<dyn Any + Send + Sync>,
}

impl TrainedModel {
    pub fn new<T: Any + Send + Sync>(
        task: TaskKind,
        name: impl Into<String>,
        description: serde_json::Value,
        inner: T,
    ) -> Self {
        Self {
            task,
            name: name.into(),
            description,
            inner: Arc::new(inner),
        }
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &serde_json::Value {
        &self.description
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedModel")
            .field("task", &self.task)
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Winning model plus the ranking of every candidate evaluated
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub model: TrainedModel,
    pub leaderboard: Leaderboard,
}

/// Automated model search, plotting and scoring over tabular data
pub trait TabularSearchEngine {
    /// Evaluate candidate models for `target` and return the best one.
    /// The same inputs and seed must give the same ranking.
    fn compare_models(
        &self,
        data: &DataFrame,
        target: &str,
        task: TaskKind,
        seed: u64,
    ) -> Result<SearchOutcome>;

    /// Feature-importance artifact for a model produced by this engine
    fn plot_feature_importance(&self, model: &TrainedModel) -> Result<FeatureImportancePlot>;

    /// `data` with prediction columns appended
    fn predict(&self, model: &TrainedModel, data: &DataFrame) -> Result<DataFrame>;
}
