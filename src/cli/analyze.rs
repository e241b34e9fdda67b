//! One-shot analysis for scripts and pipes
//!
//! Runs the same loader the TUI uses, once, with a spinner on stderr, then
//! prints the report to stdout.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::analysis::WalkLimits;
use crate::navigation::search::matches;
use crate::navigation::{worker, Dataset, Flow};
use crate::reporters::{self, OutputFormat};

pub(crate) fn run(
    repo_path: &Path,
    flow: &Flow,
    search: Option<&str>,
    limits: WalkLimits,
    format: &str,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style());
    spinner.set_message(format!("Walking {}...", flow.describe()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let loaded = worker::load(repo_path, flow, limits);
    spinner.finish_and_clear();

    let mut dataset =
        loaded.with_context(|| format!("Failed to analyze {}", flow.describe()))?;

    if let Some(query) = search.filter(|q| !q.trim().is_empty()) {
        apply_search(&mut dataset, query);
        eprintln!("{} {}", style("Filter:").dim(), query);
    }

    debug!("Rendering {} report for {}", format, flow.describe());
    let output = reporters::report(&dataset, format)?;
    println!("{}", output);
    Ok(())
}

/// Narrow every listed collection to entries matching `query`. Counts in
/// the stats are left untouched since they describe the full walk.
pub(crate) fn apply_search(dataset: &mut Dataset, query: &str) {
    let keep = |commit: &crate::git::CommitInfo| matches(&commit.search_text(), query);
    match dataset {
        Dataset::Comparison(result) => {
            result.ref1_ahead.retain(keep);
            result.ref2_ahead.retain(keep);
            result.shared_commits.retain(keep);
        }
        Dataset::History(report) => {
            report.timeline.retain(keep);
            report.merges.retain(keep);
            report
                .tags
                .retain(|tag| matches(&tag.name, query) || keep(&tag.target));
        }
    }
}

fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
