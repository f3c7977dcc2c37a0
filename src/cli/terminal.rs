//! Terminal rendering of the wizard widgets

use super::{accent, dim, muted, ok, section, step_done, step_run, wizard_theme};
use crate::error::Result;
use crate::explainability::FeatureImportancePlot;
use crate::surface::InteractionSurface;
use crate::utils::Upload;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use polars::prelude::*;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

const BAR_WIDTH: usize = 40;

/// [`InteractionSurface`] backed by stdout and dialoguer prompts
pub struct TerminalSurface {
    theme: ColorfulTheme,
    spinner: Option<Instant>,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            theme: wizard_theme(),
            spinner: None,
        }
    }
}

impl InteractionSurface for TerminalSurface {
    fn title(&mut self, text: &str) {
        println!();
        println!("  {}", accent(text).bold());
    }

    fn subheader(&mut self, text: &str) {
        section(text);
    }

    fn info(&mut self, text: &str) {
        println!("  {} {}", accent("i"), muted(text));
    }

    fn success(&mut self, text: &str) {
        println!("  {} {}", ok("✓"), text);
    }

    fn warning(&mut self, text: &str) {
        println!("  {} {}", "!".yellow().bold(), text.yellow());
    }

    fn error(&mut self, text: &str) {
        println!("  {} {}", "✗".red().bold(), text.red());
    }

    fn table(&mut self, frame: &DataFrame) {
        for line in frame.to_string().lines() {
            println!("  {}", line);
        }
    }

    fn json(&mut self, value: &serde_json::Value) {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        for line in pretty.lines() {
            println!("  {}", dim(line));
        }
    }

    fn image(&mut self, plot: &FeatureImportancePlot) {
        for line in plot.to_text_bars(BAR_WIDTH) {
            println!("  {}", line);
        }
    }

    fn file_upload(&mut self, label: &str, extensions: &[&str]) -> Result<Option<Upload>> {
        let prompt = format!("{} ({}, empty to skip)", label, extensions.join(", "));
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;

        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        match Upload::from_path(Path::new(raw)) {
            Ok(upload) => Ok(Some(upload)),
            Err(e) => {
                self.error(&format!("Cannot read '{}': {}", raw, e));
                Ok(None)
            }
        }
    }

    fn checkbox(&mut self, label: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(default)
            .interact()?)
    }

    fn select(&mut self, label: &str, options: &[String], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(options)
            .default(default.min(options.len().saturating_sub(1)))
            .interact()?)
    }

    fn button(&mut self, label: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(true)
            .interact()?)
    }

    fn spinner_start(&mut self, label: &str) {
        step_run(label);
        let _ = std::io::stdout().flush();
        self.spinner = Some(Instant::now());
    }

    fn spinner_stop(&mut self) {
        if let Some(started) = self.spinner.take() {
            step_done(&format!("{:.1}s", started.elapsed().as_secs_f64()));
        }
    }
}
