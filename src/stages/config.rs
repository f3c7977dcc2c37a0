//! Wizard configuration

use crate::training::SearchConfig;
use serde::{Deserialize, Serialize};

/// Fixed settings shaping the wizard stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Rows shown after a successful load
    pub preview_rows: usize,
    /// Rows of scored data shown in the summary
    pub prediction_rows: usize,
    pub search: SearchConfig,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            prediction_rows: 10,
            search: SearchConfig::default(),
        }
    }
}

impl WizardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn with_prediction_rows(mut self, rows: usize) -> Self {
        self.prediction_rows = rows;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }
}
