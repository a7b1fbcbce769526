//! Rendering of ranked results
//!
//! Renderers receive `(label, value)` rows already sorted and truncated by
//! the ranker, plus a display title.

mod bar_chart;

pub use bar_chart::TextBarChart;

use crate::error::{PipelineError, Result};
use crate::pipeline::RankedEntry;
use clap::ValueEnum;
use serde::Serialize;

/// One row handed to a renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub label: String,
    pub value: u64,
}

impl From<&RankedEntry> for ChartEntry {
    fn from(entry: &RankedEntry) -> Self {
        Self {
            label: entry.token.clone(),
            value: entry.count,
        }
    }
}

/// Turns ranked rows into displayable text
pub trait ChartRenderer {
    fn render(&self, title: &str, entries: &[ChartEntry]) -> Result<String>;
}

/// Output formats selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Horizontal bar chart
    #[default]
    Chart,
    /// JSON document with title and entries
    Json,
    /// Tab-separated `label value` lines
    Plain,
}

/// Default title, matching the number of rows requested
pub fn default_title(top_n: usize) -> String {
    format!("Top {top_n} most frequent words")
}

pub fn renderer_for(format: OutputFormat, chart_width: usize) -> Box<dyn ChartRenderer> {
    match format {
        OutputFormat::Chart => Box::new(TextBarChart::new(chart_width)),
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Plain => Box::new(PlainRenderer),
    }
}

pub fn chart_entries(ranked: &[RankedEntry]) -> Vec<ChartEntry> {
    ranked.iter().map(ChartEntry::from).collect()
}

/// Pretty-printed JSON: `{"title": .., "entries": [{"label", "value"}]}`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ChartRenderer for JsonRenderer {
    fn render(&self, title: &str, entries: &[ChartEntry]) -> Result<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            title: &'a str,
            entries: &'a [ChartEntry],
        }

        serde_json::to_string_pretty(&Document { title, entries })
            .map_err(|e| PipelineError::Render(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl ChartRenderer for PlainRenderer {
    fn render(&self, _title: &str, entries: &[ChartEntry]) -> Result<String> {
        Ok(entries
            .iter()
            .map(|entry| format!("{}\t{}\n", entry.label, entry.value))
            .collect())
    }
}
