//! MIV AutoML - guided AutoML wizard
//!
//! Takes a delimited table, infers whether the chosen target calls for
//! classification or regression, compares a family of models under
//! cross-validation and reports the winner.
//!
//! # Modules
//!
//! ## Data
//! - [`utils`] - Separator detection and dataset loading
//! - [`preprocessing`] - Feature encoding and scaling
//!
//! ## Modeling
//! - [`training`] - Estimators, cross-validation and the model search engine
//! - [`explainability`] - Feature importance plot
//! - [`autopipeline`] - Problem type detection, orchestration and presentation
//!
//! ## Workflow
//! - [`session`] - State shared across wizard stages
//! - [`surface`] - Interaction capability used by stages
//! - [`stages`] - Load Data, Model Options and Model Summary
//! - [`cli`] - Terminal front end

// Core error handling
pub mod error;

// Data
pub mod preprocessing;
pub mod utils;

// Modeling
pub mod autopipeline;
pub mod explainability;
pub mod training;

// Workflow
pub mod session;
pub mod stages;
pub mod surface;

// Front end
pub mod cli;

pub use error::{MivError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{MivError, Result};

    // Data
    pub use crate::utils::{detect_separator, Dataset, DatasetLoader, Separator, Upload};

    // Modeling
    pub use crate::autopipeline::{ModelOrchestrator, ProblemType, ProblemTypeDetector, ResultsPresenter};
    pub use crate::explainability::FeatureImportancePlot;
    pub use crate::training::{
        AutoSearchEngine, Estimator, Leaderboard, SearchConfig, TabularSearchEngine, TaskKind, TrainedModel,
    };

    // Workflow
    pub use crate::session::SessionState;
    pub use crate::stages::{NavigationController, Stage, StageContext, WizardConfig};
    pub use crate::surface::{InteractionSurface, RecordingSurface, ScriptedResponse};
}
