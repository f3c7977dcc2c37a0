//! Integration tests for the three-stage wizard driven through a scripted surface

use miv_automl::error::{MivError, Result};
use miv_automl::explainability::FeatureImportancePlot;
use miv_automl::session::SessionState;
use miv_automl::stages::{NavigationController, Stage, StageContext, WizardConfig};
use miv_automl::surface::{RecordingSurface, ScriptedResponse, SurfaceEvent};
use miv_automl::training::{
    AutoSearchEngine, Estimator, SearchConfig, SearchOutcome, TabularSearchEngine, TaskKind, TrainedModel,
};
use miv_automl::utils::{Dataset, Upload};
use polars::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn visit(
    stage: Stage,
    session: &mut SessionState,
    engine: &dyn TabularSearchEngine,
    config: &WizardConfig,
    script: Vec<ScriptedResponse>,
) -> RecordingSurface {
    let mut surface = RecordingSurface::with_script(script);
    let mut ctx = StageContext {
        session,
        surface: &mut surface,
        engine,
        config,
    };
    NavigationController::new().dispatch(stage, &mut ctx).unwrap();
    surface
}

fn upload(name: &str, content: String) -> Vec<ScriptedResponse> {
    vec![
        ScriptedResponse::Upload(Some(Upload::new(name, content.into_bytes()))),
        ScriptedResponse::Checkbox(true),
    ]
}

fn train(target: &str) -> Vec<ScriptedResponse> {
    vec![
        ScriptedResponse::SelectText(target.to_string()),
        ScriptedResponse::Button(true),
    ]
}

fn show_results() -> Vec<ScriptedResponse> {
    vec![ScriptedResponse::Button(true)]
}

/// Comma separated, text target with three well separated classes
fn flowers_csv() -> String {
    let mut text = String::from("length,width,color,species\n");
    for i in 0..60 {
        let (species, base, color) = match i % 3 {
            0 => ("setosa", 1.0, "red"),
            1 => ("versicolor", 5.0, "blue"),
            _ => ("virginica", 9.0, "green"),
        };
        let jitter = (i % 7) as f64 * 0.1;
        text.push_str(&format!(
            "{:.2},{:.2},{},{}\n",
            base + jitter,
            base * 0.3 + jitter,
            color,
            species
        ));
    }
    text
}

/// Semicolon separated, numeric target with 500 distinct values
fn houses_csv() -> String {
    let mut text = String::from("rooms;age;price\n");
    for i in 0..500 {
        let rooms = (i % 17) as f64;
        let age = ((i * 7) % 23) as f64;
        let price = 3.0 * rooms - 2.0 * age + i as f64 * 0.001;
        text.push_str(&format!("{:.1};{:.1};{:.3}\n", rooms, age, price));
    }
    text
}

fn subheaders(surface: &RecordingSurface) -> Vec<&str> {
    surface
        .events()
        .iter()
        .filter_map(|e| match e {
            SurfaceEvent::Subheader(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

struct FailingEngine;

impl TabularSearchEngine for FailingEngine {
    fn compare_models(&self, _: &DataFrame, _: &str, _: TaskKind, _: u64) -> Result<SearchOutcome> {
        Err(MivError::ComputationError("all candidates diverged".to_string()))
    }

    fn plot_feature_importance(&self, _: &TrainedModel) -> Result<FeatureImportancePlot> {
        Err(MivError::ModelNotFitted)
    }

    fn predict(&self, _: &TrainedModel, _: &DataFrame) -> Result<DataFrame> {
        Err(MivError::ModelNotFitted)
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_text_target_classification_flow() {
    let config = WizardConfig::default();
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    let surface = visit(Stage::LoadData, &mut session, &engine, &config, upload("flowers.csv", flowers_csv()));
    assert!(surface.infos().contains(&"Auto-detected separator: ','"));
    assert!(surface.errors().is_empty());

    let surface = visit(Stage::ModelOptions, &mut session, &engine, &config, train("species"));
    assert!(surface.infos().contains(&"Detected problem type: Classification"));
    assert!(surface
        .events()
        .contains(&SurfaceEvent::Success("Best model generated successfully.".to_string())));
    assert_eq!(session.leaderboard().map(|l| l.len()), Some(5));

    let surface = visit(Stage::ModelSummary, &mut session, &engine, &config, show_results());
    assert_eq!(
        subheaders(&surface),
        vec!["Model Summary", "Feature Importance", "Model Leaderboard", "Predictions on Dataset", "Summary"]
    );

    let tables = surface.tables();
    assert_eq!(tables.len(), 2);
    let (board_columns, board_rows) = tables[0];
    assert_eq!(board_columns[1], "Accuracy");
    assert_eq!(board_rows, 5);
    let (prediction_columns, prediction_rows) = tables[1];
    assert_eq!(prediction_rows, 10);
    assert!(prediction_columns.iter().any(|c| c == "prediction_label"));
    assert!(prediction_columns.iter().any(|c| c == "prediction_score"));
}

#[test]
fn test_numeric_target_regression_flow() {
    let config = WizardConfig::default();
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    let surface = visit(Stage::LoadData, &mut session, &engine, &config, upload("houses.csv", houses_csv()));
    assert!(surface.infos().contains(&"Auto-detected separator: ';'"));
    assert_eq!(session.dataset().map(|d| d.n_cols()), Some(3));

    let surface = visit(Stage::ModelOptions, &mut session, &engine, &config, train("price"));
    assert!(surface.infos().contains(&"Detected problem type: Regression"));
    assert_eq!(session.model().map(|m| m.task()), Some(TaskKind::Regression));

    let surface = visit(Stage::ModelSummary, &mut session, &engine, &config, show_results());
    let tables = surface.tables();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].0, ["Model", "MAE", "MSE", "RMSE", "R2", "TT (Sec)"]);
    assert_eq!(tables[1].1, 10);
    assert!(tables[1].0.iter().any(|c| c == "prediction_label"));
}

#[test]
fn test_feature_importance_failure_is_isolated() {
    let search = SearchConfig::default().with_candidates(vec![Estimator::KNeighbors]);
    let config = WizardConfig::default().with_search(search);
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    visit(Stage::LoadData, &mut session, &engine, &config, upload("flowers.csv", flowers_csv()));
    visit(Stage::ModelOptions, &mut session, &engine, &config, train("species"));
    assert!(session.model().is_some());

    let surface = visit(Stage::ModelSummary, &mut session, &engine, &config, show_results());
    let errors = surface.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Feature Importance"));
    assert!(surface.images().is_empty());
    // Leaderboard and predictions still rendered
    assert_eq!(surface.tables().len(), 2);
}

// ============================================================================
// Session invalidation
// ============================================================================

#[test]
fn test_new_upload_clears_trained_model() {
    let config = WizardConfig::default()
        .with_search(SearchConfig::default().with_candidates(vec![Estimator::DecisionTree]));
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    visit(Stage::LoadData, &mut session, &engine, &config, upload("flowers.csv", flowers_csv()));
    visit(Stage::ModelOptions, &mut session, &engine, &config, train("species"));
    visit(Stage::ModelSummary, &mut session, &engine, &config, show_results());
    assert!(session.results_requested());

    visit(Stage::LoadData, &mut session, &engine, &config, upload("houses.csv", houses_csv()));
    assert!(session.model().is_none());
    assert!(session.leaderboard().is_none());
    assert!(!session.results_requested());

    let surface = visit(Stage::ModelSummary, &mut session, &engine, &config, vec![]);
    assert_eq!(
        surface.warnings(),
        vec!["No model generated. Please train a model in 'Model Options' section."]
    );
}

#[test]
fn test_failed_upload_keeps_previous_dataset() {
    let config = WizardConfig::default();
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    visit(Stage::LoadData, &mut session, &engine, &config, upload("flowers.csv", flowers_csv()));
    let surface = visit(Stage::LoadData, &mut session, &engine, &config, upload("notes.txt", "a,b\n1,2\n".to_string()));

    let errors = surface.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error loading file:"));
    assert_eq!(session.dataset().map(|d| d.n_rows()), Some(60));
}

#[test]
fn test_target_change_clears_model() {
    let config = WizardConfig::default()
        .with_search(SearchConfig::default().with_candidates(vec![Estimator::DecisionTree]));
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    visit(Stage::LoadData, &mut session, &engine, &config, upload("flowers.csv", flowers_csv()));
    visit(Stage::ModelOptions, &mut session, &engine, &config, train("species"));
    assert!(session.model().is_some());

    // Pick another target without generating
    let surface = visit(
        Stage::ModelOptions,
        &mut session,
        &engine,
        &config,
        vec![ScriptedResponse::SelectText("length".to_string()), ScriptedResponse::Button(false)],
    );
    assert!(surface.infos().contains(&"Detected problem type: Regression"));
    assert_eq!(session.target_column(), Some("length"));
    assert!(session.model().is_none());
    assert_eq!(surface.spinner_count(), 0);
}

// ============================================================================
// Guard rails
// ============================================================================

#[test]
fn test_model_options_without_dataset() {
    let config = WizardConfig::default();
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    let surface = visit(Stage::ModelOptions, &mut session, &engine, &config, train("species"));
    assert_eq!(
        surface.warnings(),
        vec!["No dataset loaded. Please upload data first in 'Load Data' section."]
    );
    // Nothing was asked
    assert_eq!(surface.remaining_script(), 2);
}

#[test]
fn test_summary_without_model_has_no_side_effects() {
    let config = WizardConfig::default();
    let engine = AutoSearchEngine::new(config.search.clone());
    let mut session = SessionState::new();

    visit(Stage::LoadData, &mut session, &engine, &config, upload("flowers.csv", flowers_csv()));
    let surface = visit(Stage::ModelSummary, &mut session, &engine, &config, show_results());

    assert_eq!(surface.warnings().len(), 1);
    assert!(surface.tables().is_empty());
    assert!(!session.results_requested());
    assert!(session.dataset().is_some());
}

#[test]
fn test_search_failure_is_reported() {
    let config = WizardConfig::default();
    let mut session = SessionState::new();

    visit(Stage::LoadData, &mut session, &FailingEngine, &config, upload("flowers.csv", flowers_csv()));
    let surface = visit(Stage::ModelOptions, &mut session, &FailingEngine, &config, train("species"));

    let errors = surface.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Model search failed"));
    assert!(errors[0].contains("all candidates diverged"));
    assert!(session.model().is_none());
    // Spinner closed before the error is shown
    let stop = surface.events().iter().position(|e| *e == SurfaceEvent::SpinnerStop);
    let shown = surface.events().iter().position(|e| matches!(e, SurfaceEvent::Error(_)));
    assert!(stop.is_some() && stop < shown);
}

#[test]
fn test_unknown_problem_type_never_searches() {
    let config = WizardConfig::default();
    let mut session = SessionState::new();

    let frame = DataFrame::new(vec![
        Column::new("x".into(), &[1.0, 2.0, 3.0]),
        Column::new("blob".into(), &[b"a".as_ref(), b"b".as_ref(), b"c".as_ref()]),
    ])
    .unwrap();
    session.replace_dataset(Dataset::from_frame(frame));

    let surface = visit(Stage::ModelOptions, &mut session, &FailingEngine, &config, train("blob"));

    assert!(surface.infos().contains(&"Detected problem type: Unknown"));
    assert_eq!(surface.errors(), vec!["Unknown problem type. Cannot generate model."]);
    assert_eq!(surface.spinner_count(), 0);
}
