//! Feature-importance bar chart rendered as an in-memory SVG

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Canonical key of the feature-importance artifact
pub const FEATURE_IMPORTANCE_PLOT: &str = "Feature Importance";

const WIDTH: f64 = 720.0;
const ROW_HEIGHT: f64 = 24.0;
const LABEL_WIDTH: f64 = 200.0;
const TOP: f64 = 50.0;

/// One ranked bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceEntry {
    pub feature: String,
    pub importance: f64,
}

/// Ranked feature importances plus their SVG rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportancePlot {
    name: String,
    entries: Vec<ImportanceEntry>,
    svg: String,
}

impl FeatureImportancePlot {
    /// Build from parallel feature/importance lists; entries are ranked
    /// largest first with ties kept in feature order
    pub fn new(features: &[String], importances: &[f64]) -> Self {
        let mut entries: Vec<ImportanceEntry> = features
            .iter()
            .zip(importances.iter())
            .map(|(f, &v)| ImportanceEntry {
                feature: f.clone(),
                importance: if v.is_finite() { v } else { 0.0 },
            })
            .collect();
        entries.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let svg = render_svg(&entries);
        Self {
            name: FEATURE_IMPORTANCE_PLOT.to_string(),
            entries,
            svg,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[ImportanceEntry] {
        &self.entries
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Text bars for terminals, `width` characters for the largest value
    pub fn to_text_bars(&self, width: usize) -> Vec<String> {
        let max = self.max_importance();
        let label_width = self.entries.iter().map(|e| e.feature.len()).max().unwrap_or(0);
        self.entries
            .iter()
            .map(|e| {
                let len = if max > 0.0 {
                    ((e.importance / max) * width as f64).round() as usize
                } else {
                    0
                };
                format!(
                    "{:<label_width$}  {:<width$}  {:.4}",
                    e.feature,
                    "█".repeat(len),
                    e.importance,
                    label_width = label_width,
                    width = width
                )
            })
            .collect()
    }

    fn max_importance(&self) -> f64 {
        self.entries.iter().map(|e| e.importance).fold(0.0, f64::max)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_svg(entries: &[ImportanceEntry]) -> String {
    let height = TOP + ROW_HEIGHT * entries.len().max(1) as f64 + 30.0;
    let bar_space = WIDTH - LABEL_WIDTH - 80.0;
    let max = entries.iter().map(|e| e.importance).fold(0.0, f64::max);

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{height}\">"
    );
    svg.push_str("  <style>\n");
    svg.push_str("    .label { font-family: monospace; font-size: 12px; }\n");
    svg.push_str("  </style>\n");
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    let _ = writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"30\" text-anchor=\"middle\" font-size=\"16\" font-weight=\"bold\">{}</text>",
        WIDTH / 2.0,
        FEATURE_IMPORTANCE_PLOT
    );

    // Largest bar at the top
    for (i, entry) in entries.iter().enumerate() {
        let y = TOP + i as f64 * ROW_HEIGHT;
        let bar = if max > 0.0 {
            entry.importance / max * bar_space
        } else {
            0.0
        };
        let _ = writeln!(
            svg,
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" class=\"label\">{}</text>",
            LABEL_WIDTH - 8.0,
            y + ROW_HEIGHT * 0.65,
            escape(&entry.feature)
        );
        let _ = writeln!(
            svg,
            "  <rect x=\"{LABEL_WIDTH:.1}\" y=\"{:.1}\" width=\"{bar:.1}\" height=\"{:.1}\" fill=\"#4c72b0\"/>",
            y + 3.0,
            ROW_HEIGHT - 6.0
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{:.1}\" y=\"{:.1}\" class=\"label\">{:.4}</text>",
            LABEL_WIDTH + bar + 6.0,
            y + ROW_HEIGHT * 0.65,
            entry.importance
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entries_ranked_descending() {
        let plot = FeatureImportancePlot::new(&names(&["a", "b", "c"]), &[0.2, 0.5, 0.3]);
        let order: Vec<&str> = plot.entries().iter().map(|e| e.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(plot.name(), FEATURE_IMPORTANCE_PLOT);
    }

    #[test]
    fn test_svg_contains_every_feature_escaped() {
        let plot = FeatureImportancePlot::new(&names(&["x<1", "y"]), &[1.0, 0.0]);
        let svg = plot.svg();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("x&lt;1"));
        assert!(svg.contains(">y<"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_text_bars_scale_to_max() {
        let plot = FeatureImportancePlot::new(&names(&["big", "half"]), &[1.0, 0.5]);
        let bars = plot.to_text_bars(10);
        assert_eq!(bars[0].matches('█').count(), 10);
        assert_eq!(bars[1].matches('█').count(), 5);
    }
}
