//! Output reporters for non-interactive runs
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::navigation::Dataset;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a loaded dataset in the specified format
pub fn report(dataset: &Dataset, format: OutputFormat) -> Result<String> {
    match (dataset, format) {
        (Dataset::Comparison(result), OutputFormat::Text) => text::render_comparison(result),
        (Dataset::History(report), OutputFormat::Text) => text::render_history(report),
        (Dataset::Comparison(result), OutputFormat::Json) => json::render(result.as_ref()),
        (Dataset::History(report), OutputFormat::Json) => json::render(report.as_ref()),
    }
}
