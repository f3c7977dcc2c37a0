//! User interaction capability
//!
//! Stages talk to the user only through [`InteractionSurface`], so the
//! workflow runs the same against the terminal and against a scripted
//! [`RecordingSurface`].

mod recording;

pub use recording::{RecordingSurface, ScriptedResponse, SurfaceEvent};

use crate::error::Result;
use crate::explainability::FeatureImportancePlot;
use crate::utils::Upload;
use polars::prelude::*;

/// Widgets and messages a stage can use
pub trait InteractionSurface {
    /// Page title for the active stage
    fn title(&mut self, text: &str);
    fn subheader(&mut self, text: &str);

    fn info(&mut self, text: &str);
    fn success(&mut self, text: &str);
    fn warning(&mut self, text: &str);
    fn error(&mut self, text: &str);

    fn table(&mut self, frame: &DataFrame);
    fn json(&mut self, value: &serde_json::Value);
    fn image(&mut self, plot: &FeatureImportancePlot);

    /// File picker restricted to `extensions`; `None` when nothing was chosen
    fn file_upload(&mut self, label: &str, extensions: &[&str]) -> Result<Option<Upload>>;
    fn checkbox(&mut self, label: &str, default: bool) -> Result<bool>;
    /// Index of the chosen option
    fn select(&mut self, label: &str, options: &[String], default: usize) -> Result<usize>;
    /// Whether the button was pressed
    fn button(&mut self, label: &str) -> Result<bool>;

    /// Shown while a blocking call runs
    fn spinner_start(&mut self, label: &str);
    fn spinner_stop(&mut self);
}
