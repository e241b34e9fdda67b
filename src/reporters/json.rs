//! JSON reporter
//!
//! Outputs a comparison or history report as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use anyhow::Result;
use serde::Serialize;

/// Render any report as JSON
pub fn render<T: Serialize + ?Sized>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
