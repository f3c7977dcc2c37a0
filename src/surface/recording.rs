//! Scripted surface that records everything shown to the user

use super::InteractionSurface;
use crate::error::{MivError, Result};
use crate::explainability::FeatureImportancePlot;
use crate::utils::Upload;
use polars::prelude::*;
use std::collections::VecDeque;

/// Answer to the next prompt
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Upload(Option<Upload>),
    Checkbox(bool),
    Select(usize),
    /// Pick an option by its text
    SelectText(String),
    Button(bool),
}

/// Something a stage showed or asked
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Title(String),
    Subheader(String),
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
    Table { columns: Vec<String>, rows: usize },
    Json(serde_json::Value),
    Image { name: String, features: Vec<String> },
    Prompt(String),
    SpinnerStart(String),
    SpinnerStop,
}

/// Answers prompts from a script and keeps a log of events.
///
/// When the script runs out, prompts take their defaults: no file, the
/// default checkbox value, the default option and an unpressed button.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    script: VecDeque<ScriptedResponse>,
    events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            script: script.into_iter().collect(),
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, response: ScriptedResponse) -> &mut Self {
        self.script.push_back(response);
        self
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn remaining_script(&self) -> usize {
        self.script.len()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Error(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Warning(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn infos(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Info(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(columns, rows)` of every table shown
    pub fn tables(&self) -> Vec<(&[String], usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Table { columns, rows } => Some((columns.as_slice(), *rows)),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Image { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn spinner_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::SpinnerStart(_)))
            .count()
    }

    fn next(&mut self, label: &str) -> Option<ScriptedResponse> {
        self.events.push(SurfaceEvent::Prompt(label.to_string()));
        self.script.pop_front()
    }

    fn mismatch(label: &str, response: &ScriptedResponse) -> MivError {
        MivError::Prompt(format!("scripted {:?} does not answer '{}'", response, label))
    }
}

impl InteractionSurface for RecordingSurface {
    fn title(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Title(text.to_string()));
    }

    fn subheader(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Subheader(text.to_string()));
    }

    fn info(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Info(text.to_string()));
    }

    fn success(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Success(text.to_string()));
    }

    fn warning(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Warning(text.to_string()));
    }

    fn error(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Error(text.to_string()));
    }

    fn table(&mut self, frame: &DataFrame) {
        self.events.push(SurfaceEvent::Table {
            columns: frame.get_column_names().iter().map(|c| c.to_string()).collect(),
            rows: frame.height(),
        });
    }

    fn json(&mut self, value: &serde_json::Value) {
        self.events.push(SurfaceEvent::Json(value.clone()));
    }

    fn image(&mut self, plot: &FeatureImportancePlot) {
        self.events.push(SurfaceEvent::Image {
            name: plot.name().to_string(),
            features: plot.entries().iter().map(|e| e.feature.clone()).collect(),
        });
    }

    fn file_upload(&mut self, label: &str, _extensions: &[&str]) -> Result<Option<Upload>> {
        match self.next(label) {
            None => Ok(None),
            Some(ScriptedResponse::Upload(upload)) => Ok(upload),
            Some(other) => Err(Self::mismatch(label, &other)),
        }
    }

    fn checkbox(&mut self, label: &str, default: bool) -> Result<bool> {
        match self.next(label) {
            None => Ok(default),
            Some(ScriptedResponse::Checkbox(value)) => Ok(value),
            Some(other) => Err(Self::mismatch(label, &other)),
        }
    }

    fn select(&mut self, label: &str, options: &[String], default: usize) -> Result<usize> {
        match self.next(label) {
            None => Ok(default),
            Some(ScriptedResponse::Select(idx)) if idx < options.len() => Ok(idx),
            Some(ScriptedResponse::SelectText(text)) => options
                .iter()
                .position(|o| *o == text)
                .ok_or_else(|| MivError::Prompt(format!("'{}' is not an option for '{}'", text, label))),
            Some(other) => Err(Self::mismatch(label, &other)),
        }
    }

    fn button(&mut self, label: &str) -> Result<bool> {
        match self.next(label) {
            None => Ok(false),
            Some(ScriptedResponse::Button(pressed)) => Ok(pressed),
            Some(other) => Err(Self::mismatch(label, &other)),
        }
    }

    fn spinner_start(&mut self, label: &str) {
        self.events.push(SurfaceEvent::SpinnerStart(label.to_string()));
    }

    fn spinner_stop(&mut self) {
        self.events.push(SurfaceEvent::SpinnerStop);
    }
}
