//! Builds the three results sections for a trained model

use super::detector::ProblemType;
use crate::error::MivError;
use crate::explainability::FeatureImportancePlot;
use crate::training::{Leaderboard, TabularSearchEngine, TrainedModel};
use polars::prelude::*;
use tracing::warn;

pub const FEATURE_IMPORTANCE_SECTION: &str = "Feature Importance";
pub const LEADERBOARD_SECTION: &str = "Model Leaderboard";
pub const PREDICTIONS_SECTION: &str = "Predictions on Dataset";

/// Result of one results section
#[derive(Debug)]
pub enum SectionOutcome<T> {
    Ready(T),
    /// Nothing to show; not an error
    Warning(String),
    /// Always a [`MivError::PresentationFailure`]
    Failed(MivError),
}

impl<T> SectionOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, SectionOutcome::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SectionOutcome::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            SectionOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    fn failed(section: &str, err: MivError) -> Self {
        warn!(section, error = %err, "Results section failed");
        SectionOutcome::Failed(MivError::PresentationFailure {
            section: section.to_string(),
            reason: err.to_string(),
        })
    }
}

#[derive(Debug)]
pub struct PresentationReport {
    pub problem_type: ProblemType,
    pub feature_importance: SectionOutcome<FeatureImportancePlot>,
    pub leaderboard: SectionOutcome<DataFrame>,
    /// First rows of the scored dataset
    pub predictions: SectionOutcome<DataFrame>,
}

/// Computes each results section independently
pub struct ResultsPresenter<'e> {
    engine: &'e dyn TabularSearchEngine,
    prediction_rows: usize,
}

impl<'e> ResultsPresenter<'e> {
    pub fn new(engine: &'e dyn TabularSearchEngine) -> Self {
        Self {
            engine,
            prediction_rows: 10,
        }
    }

    pub fn with_prediction_rows(mut self, rows: usize) -> Self {
        self.prediction_rows = rows;
        self
    }

    /// A failure in one section never stops the others from being built.
    /// The problem type comes from the model's own tag.
    pub fn present(
        &self,
        model: &TrainedModel,
        data: &DataFrame,
        leaderboard: Option<&Leaderboard>,
    ) -> PresentationReport {
        let feature_importance = match self.engine.plot_feature_importance(model) {
            Ok(plot) => SectionOutcome::Ready(plot),
            Err(e) => SectionOutcome::failed(FEATURE_IMPORTANCE_SECTION, e),
        };

        let leaderboard = match leaderboard {
            Some(board) => match board.to_frame() {
                Ok(frame) => SectionOutcome::Ready(frame),
                Err(e) => SectionOutcome::failed(LEADERBOARD_SECTION, e),
            },
            None => SectionOutcome::Warning("Leaderboard not available.".to_string()),
        };

        let predictions = match self.engine.predict(model, data) {
            Ok(scored) => SectionOutcome::Ready(scored.head(Some(self.prediction_rows))),
            Err(e) => SectionOutcome::failed(PREDICTIONS_SECTION, e),
        };

        PresentationReport {
            problem_type: ProblemType::from(model.task()),
            feature_importance,
            leaderboard,
            predictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::training::{SearchOutcome, SortMetric, TaskKind};

    struct BrokenPlotEngine;

    impl TabularSearchEngine for BrokenPlotEngine {
        fn compare_models(&self, _: &DataFrame, _: &str, _: TaskKind, _: u64) -> Result<SearchOutcome> {
            unreachable!()
        }

        fn plot_feature_importance(&self, model: &TrainedModel) -> Result<FeatureImportancePlot> {
            Err(MivError::UnsupportedPlot {
                plot: "Feature Importance".to_string(),
                model: model.name().to_string(),
            })
        }

        fn predict(&self, _: &TrainedModel, data: &DataFrame) -> Result<DataFrame> {
            let mut out = data.clone();
            out.with_column(Series::new("prediction_label".into(), vec![0.0; data.height()]))?;
            Ok(out)
        }
    }

    #[test]
    fn test_sections_fail_independently() {
        let data = df!("x" => (0..20).collect::<Vec<i32>>()).unwrap();
        let model = TrainedModel::new(TaskKind::Regression, "Stub", serde_json::Value::Null, ());
        let board = Leaderboard::new(TaskKind::Regression, SortMetric::R2, Vec::new());

        let report = ResultsPresenter::new(&BrokenPlotEngine).present(&model, &data, Some(&board));

        assert!(report.feature_importance.is_failed());
        assert!(report.leaderboard.is_ready());
        assert_eq!(report.predictions.ready().unwrap().height(), 10);
        assert_eq!(report.problem_type, ProblemType::Regression);
    }

    #[test]
    fn test_missing_leaderboard_is_a_warning() {
        let data = df!("x" => &[1, 2]).unwrap();
        let model = TrainedModel::new(TaskKind::Classification, "Stub", serde_json::Value::Null, ());

        let report = ResultsPresenter::new(&BrokenPlotEngine).present(&model, &data, None);
        assert!(matches!(report.leaderboard, SectionOutcome::Warning(_)));
        assert!(report.predictions.is_ready());
    }
}
