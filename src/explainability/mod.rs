//! Model explainability artifacts
//!
//! Only built-in feature importance is provided: tree models report impurity
//! decrease and linear models report coefficient magnitudes.

mod importance_plot;

pub use importance_plot::{FeatureImportancePlot, ImportanceEntry, FEATURE_IMPORTANCE_PLOT};
