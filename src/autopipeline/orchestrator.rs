//! Runs the model search for a dataset and target

use super::detector::ProblemType;
use crate::error::{MivError, Result};
use crate::training::{Leaderboard, TabularSearchEngine, TrainedModel};
use polars::prelude::*;
use tracing::{error, info};

pub use crate::training::SESSION_SEED;

/// Model and leaderboard from one successful search
#[derive(Debug, Clone)]
pub struct TrainingResult {
    pub model: TrainedModel,
    pub leaderboard: Leaderboard,
    pub problem_type: ProblemType,
}

/// Dispatches a search to the engine and normalizes its failures
pub struct ModelOrchestrator<'e> {
    engine: &'e dyn TabularSearchEngine,
    seed: u64,
}

impl<'e> ModelOrchestrator<'e> {
    pub fn new(engine: &'e dyn TabularSearchEngine) -> Self {
        Self {
            engine,
            seed: SESSION_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train for `target` under `problem_type`.
    ///
    /// `Unknown` is refused before the engine is called. Any engine error is
    /// returned as [`MivError::ModelSearchFailure`].
    pub fn train(
        &self,
        data: &DataFrame,
        target: &str,
        problem_type: ProblemType,
    ) -> Result<TrainingResult> {
        let task = problem_type
            .task()
            .ok_or_else(|| MivError::UnknownProblemType(target.to_string()))?;

        info!(target_column = %target, problem_type = %problem_type, seed = self.seed, "Starting model search");

        let outcome = self
            .engine
            .compare_models(data, target, task, self.seed)
            .map_err(|e| {
                error!(error = %e, "Model search failed");
                match e {
                    MivError::ModelSearchFailure(_) => e,
                    other => MivError::ModelSearchFailure(other.to_string()),
                }
            })?;

        if outcome.model.task() != task {
            return Err(MivError::ModelSearchFailure(format!(
                "engine returned a {} model for a {} search",
                outcome.model.task(),
                task
            )));
        }

        info!(model = outcome.model.name(), candidates = outcome.leaderboard.len(), "Model search finished");

        Ok(TrainingResult {
            model: outcome.model,
            leaderboard: outcome.leaderboard,
            problem_type,
        })
    }
}
