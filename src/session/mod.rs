//! Per-session state shared by the wizard stages
//!
//! Every stage receives the state explicitly. Absent fields are valid states;
//! stages check for them instead of falling back to defaults.

use crate::autopipeline::{ProblemType, TrainingResult};
use crate::error::{MivError, Result};
use crate::training::{Leaderboard, TrainedModel};
use crate::utils::Dataset;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SessionState {
    dataset: Option<Dataset>,
    target_column: Option<String>,
    problem_type: Option<ProblemType>,
    model: Option<TrainedModel>,
    leaderboard: Option<Leaderboard>,
    /// Whether uploads are parsed with a header row
    header_present: bool,
    /// Set once the user asks for results; cleared whenever the model is
    results_requested: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            dataset: None,
            target_column: None,
            problem_type: None,
            model: None,
            leaderboard: None,
            header_present: true,
            results_requested: false,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn target_column(&self) -> Option<&str> {
        self.target_column.as_deref()
    }

    pub fn problem_type(&self) -> Option<ProblemType> {
        self.problem_type
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    pub fn leaderboard(&self) -> Option<&Leaderboard> {
        self.leaderboard.as_ref()
    }

    pub fn header_present(&self) -> bool {
        self.header_present
    }

    pub fn set_header_present(&mut self, header_present: bool) {
        self.header_present = header_present;
    }

    pub fn results_requested(&self) -> bool {
        self.results_requested
    }

    pub fn request_results(&mut self) {
        self.results_requested = true;
    }

    fn clear_training(&mut self) {
        if self.model.is_some() || self.leaderboard.is_some() {
            debug!("Clearing trained model and leaderboard");
        }
        self.model = None;
        self.leaderboard = None;
        self.results_requested = false;
    }

    /// Install a newly loaded dataset.
    ///
    /// Always drops the trained model, leaderboard, results flag and problem
    /// type. The target column survives only if the new dataset has a column
    /// of that name; otherwise it falls back to the first column.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        self.clear_training();
        self.problem_type = None;

        let keep_target = self
            .target_column
            .as_deref()
            .map_or(false, |t| dataset.has_column(t));
        if !keep_target {
            self.target_column = dataset.first_column();
        }

        info!(
            rows = dataset.n_rows(),
            columns = dataset.n_cols(),
            target_column = ?self.target_column,
            "Dataset replaced"
        );
        self.dataset = Some(dataset);
    }

    /// Select the target column. Choosing a different column invalidates any
    /// trained model. Returns whether the target changed.
    pub fn set_target_column(&mut self, name: &str) -> Result<bool> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| MivError::ValidationError("no dataset loaded".to_string()))?;
        if !dataset.has_column(name) {
            return Err(MivError::ColumnNotFound(name.to_string()));
        }

        if self.target_column.as_deref() == Some(name) {
            return Ok(false);
        }

        info!(target_column = name, "Target column changed");
        self.target_column = Some(name.to_string());
        self.problem_type = None;
        self.clear_training();
        Ok(true)
    }

    pub fn set_problem_type(&mut self, problem_type: ProblemType) {
        self.problem_type = Some(problem_type);
    }

    /// Store the outcome of a successful search
    pub fn store_training(&mut self, result: TrainingResult) {
        self.problem_type = Some(result.problem_type);
        self.model = Some(result.model);
        self.leaderboard = Some(result.leaderboard);
        self.results_requested = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{SortMetric, TaskKind};
    use crate::utils::Dataset;
    use polars::prelude::*;

    fn dataset(columns: &[&str]) -> Dataset {
        let cols: Vec<Column> = columns
            .iter()
            .map(|c| Column::new((*c).into(), &[1i64, 2, 3]))
            .collect();
        Dataset::from_frame(DataFrame::new(cols).unwrap())
    }

    fn trained() -> TrainingResult {
        TrainingResult {
            model: TrainedModel::new(TaskKind::Classification, "Stub", serde_json::Value::Null, ()),
            leaderboard: Leaderboard::new(TaskKind::Classification, SortMetric::Accuracy, Vec::new()),
            problem_type: ProblemType::Classification,
        }
    }

    #[test]
    fn test_defaults() {
        let state = SessionState::new();
        assert!(state.header_present());
        assert!(state.dataset().is_none());
        assert!(state.model().is_none());
        assert!(!state.results_requested());
    }

    #[test]
    fn test_new_dataset_clears_training() {
        let mut state = SessionState::new();
        state.replace_dataset(dataset(&["a", "b"]));
        state.store_training(trained());
        state.request_results();

        state.replace_dataset(dataset(&["a", "b"]));
        assert!(state.model().is_none());
        assert!(state.leaderboard().is_none());
        assert!(!state.results_requested());
        assert!(state.problem_type().is_none());
    }

    #[test]
    fn test_target_reset_when_column_disappears() {
        let mut state = SessionState::new();
        state.replace_dataset(dataset(&["a", "b"]));
        assert_eq!(state.target_column(), Some("a"));
        state.set_target_column("b").unwrap();

        state.replace_dataset(dataset(&["b", "c"]));
        assert_eq!(state.target_column(), Some("b"));

        state.replace_dataset(dataset(&["x", "y"]));
        assert_eq!(state.target_column(), Some("x"));
    }

    #[test]
    fn test_target_change_invalidates_model() {
        let mut state = SessionState::new();
        state.replace_dataset(dataset(&["a", "b"]));
        state.store_training(trained());

        assert!(!state.set_target_column("a").unwrap());
        assert!(state.model().is_some());

        assert!(state.set_target_column("b").unwrap());
        assert!(state.model().is_none());
        assert!(state.leaderboard().is_none());
    }

    #[test]
    fn test_target_must_exist() {
        let mut state = SessionState::new();
        assert!(state.set_target_column("a").is_err());

        state.replace_dataset(dataset(&["a"]));
        assert!(matches!(
            state.set_target_column("zzz"),
            Err(MivError::ColumnNotFound(_))
        ));
    }
}
