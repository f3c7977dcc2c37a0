//! Wizard stages and navigation
//!
//! Each stage is a plain function over a [`StageContext`]. The controller
//! renders the stage title and hands over to the stage entry. Only prompt
//! failures escape a stage; everything else is shown on the surface.

mod config;
mod load_data;
mod model_options;
mod model_summary;

pub use config::WizardConfig;

use crate::error::{MivError, Result};
use crate::session::SessionState;
use crate::surface::InteractionSurface;
use crate::training::TabularSearchEngine;
use std::fmt;
use tracing::debug;

/// The three wizard stages, in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    LoadData,
    ModelOptions,
    ModelSummary,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::LoadData, Stage::ModelOptions, Stage::ModelSummary];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::LoadData => "Load Data",
            Stage::ModelOptions => "Model Options",
            Stage::ModelSummary => "Model Summary",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Stage::LoadData => "📂",
            Stage::ModelOptions => "⚙",
            Stage::ModelSummary => "📊",
        }
    }

    /// Title shown when the stage is entered
    pub fn heading(&self) -> String {
        format!("{} {}", self.label(), self.icon())
    }

    pub fn from_label(label: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.label() == label)
    }

    fn entry(&self) -> StageEntry {
        match self {
            Stage::LoadData => load_data::upload_data,
            Stage::ModelOptions => model_options::configure_model,
            Stage::ModelSummary => model_summary::show_summary,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a stage may read or change during one visit
pub struct StageContext<'a> {
    pub session: &'a mut SessionState,
    pub surface: &'a mut dyn InteractionSurface,
    pub engine: &'a dyn TabularSearchEngine,
    pub config: &'a WizardConfig,
}

type StageEntry = fn(&mut StageContext<'_>) -> Result<()>;

/// Routes a stage selection to its entry function
#[derive(Debug, Default, Clone, Copy)]
pub struct NavigationController;

impl NavigationController {
    pub fn new() -> Self {
        Self
    }

    pub fn stages(&self) -> &'static [Stage] {
        &Stage::ALL
    }

    pub fn dispatch(&self, stage: Stage, ctx: &mut StageContext<'_>) -> Result<()> {
        debug!(stage = %stage, "Entering stage");
        ctx.surface.title(&stage.heading());
        (stage.entry())(ctx)
    }

    pub fn dispatch_by_name(&self, name: &str, ctx: &mut StageContext<'_>) -> Result<()> {
        let stage = Stage::from_label(name)
            .ok_or_else(|| MivError::ValidationError(format!("Unknown stage '{}'", name)))?;
        self.dispatch(stage, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, ScriptedResponse, SurfaceEvent};
    use crate::training::{AutoSearchEngine, Estimator, SearchConfig};
    use crate::utils::Upload;

    fn iris_like_csv() -> Vec<u8> {
        let mut text = String::from("sepal,petal,species\n");
        for i in 0..30 {
            let (class, base) = match i % 3 {
                0 => ("setosa", 1.0),
                1 => ("versicolor", 4.0),
                _ => ("virginica", 7.0),
            };
            let jitter = (i as f64) * 0.01;
            text.push_str(&format!("{:.2},{:.2},{}\n", base + jitter, base * 0.5 + jitter, class));
        }
        text.into_bytes()
    }

    #[test]
    fn test_stage_labels_and_headings() {
        assert_eq!(Stage::ALL.len(), 3);
        assert_eq!(Stage::LoadData.heading(), "Load Data 📂");
        assert_eq!(Stage::ModelOptions.heading(), "Model Options ⚙");
        assert_eq!(Stage::ModelSummary.heading(), "Model Summary 📊");
        assert_eq!(Stage::from_label("Model Options"), Some(Stage::ModelOptions));
        assert_eq!(Stage::from_label("Deploy"), None);
    }

    #[test]
    fn test_dispatch_unknown_name() {
        let engine = AutoSearchEngine::default();
        let config = WizardConfig::default();
        let mut session = SessionState::new();
        let mut surface = RecordingSurface::new();
        let mut ctx = StageContext {
            session: &mut session,
            surface: &mut surface,
            engine: &engine,
            config: &config,
        };

        let err = NavigationController::new().dispatch_by_name("Deploy", &mut ctx);
        assert!(matches!(err, Err(MivError::ValidationError(_))));
    }

    #[test]
    fn test_load_without_file_prompts_for_upload() {
        let engine = AutoSearchEngine::default();
        let config = WizardConfig::default();
        let mut session = SessionState::new();
        let mut surface = RecordingSurface::new();
        let mut ctx = StageContext {
            session: &mut session,
            surface: &mut surface,
            engine: &engine,
            config: &config,
        };

        NavigationController::new().dispatch(Stage::LoadData, &mut ctx).unwrap();

        assert_eq!(surface.events()[0], SurfaceEvent::Title("Load Data 📂".to_string()));
        assert!(surface.infos().contains(&"Please upload a file to proceed."));
        assert!(session.dataset().is_none());
    }

    #[test]
    fn test_load_then_train_then_summary() {
        let config = WizardConfig::default().with_search(
            SearchConfig::default().with_candidates(vec![Estimator::DecisionTree, Estimator::RandomForest]),
        );
        let engine = AutoSearchEngine::new(config.search.clone());
        let mut session = SessionState::new();
        let nav = NavigationController::new();

        let mut surface = RecordingSurface::with_script([
            ScriptedResponse::Upload(Some(Upload::new("iris.csv", iris_like_csv()))),
            ScriptedResponse::Checkbox(true),
        ]);
        {
            let mut ctx = StageContext {
                session: &mut session,
                surface: &mut surface,
                engine: &engine,
                config: &config,
            };
            nav.dispatch(Stage::LoadData, &mut ctx).unwrap();
        }
        assert!(surface.infos().contains(&"Auto-detected separator: ','"));
        assert_eq!(surface.tables()[0].1, 5);
        assert_eq!(session.dataset().map(|d| d.n_rows()), Some(30));

        let mut surface = RecordingSurface::with_script([
            ScriptedResponse::SelectText("species".to_string()),
            ScriptedResponse::Button(true),
        ]);
        {
            let mut ctx = StageContext {
                session: &mut session,
                surface: &mut surface,
                engine: &engine,
                config: &config,
            };
            nav.dispatch(Stage::ModelOptions, &mut ctx).unwrap();
        }
        assert!(surface.infos().contains(&"Detected problem type: Classification"));
        assert_eq!(surface.spinner_count(), 1);
        assert!(surface.errors().is_empty(), "{:?}", surface.errors());
        assert!(session.model().is_some());

        let mut surface = RecordingSurface::with_script([ScriptedResponse::Button(true)]);
        {
            let mut ctx = StageContext {
                session: &mut session,
                surface: &mut surface,
                engine: &engine,
                config: &config,
            };
            nav.dispatch(Stage::ModelSummary, &mut ctx).unwrap();
        }
        assert!(session.results_requested());
        assert_eq!(surface.images(), vec!["Feature Importance"]);
        // Leaderboard then predictions
        let tables = surface.tables();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].1, 10);
    }

    #[test]
    fn test_summary_without_model_warns() {
        let engine = AutoSearchEngine::default();
        let config = WizardConfig::default();
        let mut session = SessionState::new();
        let mut surface = RecordingSurface::with_script([ScriptedResponse::Button(true)]);
        let mut ctx = StageContext {
            session: &mut session,
            surface: &mut surface,
            engine: &engine,
            config: &config,
        };

        NavigationController::new().dispatch(Stage::ModelSummary, &mut ctx).unwrap();

        assert_eq!(
            surface.warnings(),
            vec!["No model generated. Please train a model in 'Model Options' section."]
        );
        // Button never offered
        assert_eq!(surface.remaining_script(), 1);
        assert!(!session.results_requested());
    }
}
