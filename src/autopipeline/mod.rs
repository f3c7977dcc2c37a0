//! Wizard pipeline core
//!
//! - Problem type detection from the target column
//! - Model search orchestration with a fixed session seed
//! - Results presentation with per-section failure isolation

mod detector;
mod orchestrator;
mod presenter;

pub use detector::{
    ProblemType, ProblemTypeDetector, TargetProfile, ValueKind, CLASSIFICATION_CARDINALITY_THRESHOLD,
};
pub use orchestrator::{ModelOrchestrator, TrainingResult, SESSION_SEED};
pub use presenter::{
    PresentationReport, ResultsPresenter, SectionOutcome, FEATURE_IMPORTANCE_SECTION, LEADERBOARD_SECTION,
    PREDICTIONS_SECTION,
};
