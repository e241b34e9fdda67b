//! Text (terminal) reporter with colors and formatting

use anyhow::Result;
use console::style;
use std::fmt::Write as _;

use crate::analysis::{ComparisonResult, FrequencyData, HistoryReport};
use crate::git::CommitInfo;

/// Commits printed per list before summarizing the rest
const MAX_LISTED: usize = 10;

/// Width of the frequency bars
const BAR_WIDTH: usize = 30;

const RULE: &str = "──────────────────────────────────────";

/// Render a two-ref comparison as formatted terminal output
pub fn render_comparison(result: &ComparisonResult) -> Result<String> {
    let mut out = String::new();
    let stats = &result.stats;

    writeln!(
        out,
        "\n{} {} {}",
        style(&result.ref1).cyan().bold(),
        style("...").dim(),
        style(&result.ref2).cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).dim())?;

    if result.is_identical() {
        writeln!(out, "{}\n", style("Both refs point at the same commit.").green())?;
    }

    match &result.merge_base {
        Some(base) => writeln!(
            out,
            "Merge base: {}  {}  {}",
            style(&base.hash).yellow(),
            base.message,
            style(format!("({} days ago)", stats.days_since_base)).dim()
        )?,
        None => writeln!(
            out,
            "Merge base: {}",
            style("none (histories are unrelated)").red()
        )?,
    }
    writeln!(
        out,
        "Ahead: {} {} / {} {}  Shared: {}  Total: {}\n",
        style(&result.ref1).bold(),
        count(stats.ref1_ahead_by, result.ref1_truncated),
        style(&result.ref2).bold(),
        count(stats.ref2_ahead_by, result.ref2_truncated),
        count(stats.shared_commits, result.shared_truncated),
        stats.total_commits
    )?;
    if result.is_truncated() {
        writeln!(
            out,
            "{}\n",
            style("Some lists stopped at the walk limit; raise it with --limit or [walk] in the config.").yellow()
        )?;
    }

    commit_section(
        &mut out,
        &format!("ONLY IN {}", result.ref1),
        &result.ref1_ahead,
        result.ref1_truncated,
    )?;
    commit_section(
        &mut out,
        &format!("ONLY IN {}", result.ref2),
        &result.ref2_ahead,
        result.ref2_truncated,
    )?;
    commit_section(
        &mut out,
        "SHARED HISTORY",
        &result.shared_commits,
        result.shared_truncated,
    )?;

    Ok(out)
}

/// Render a single-ref history report as formatted terminal output
pub fn render_history(report: &HistoryReport) -> Result<String> {
    let mut out = String::new();

    writeln!(
        out,
        "\n{} {}",
        style("History of").bold(),
        style(&report.reference).cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).dim())?;
    writeln!(
        out,
        "Head: {}  {}  {}\n",
        style(&report.head.hash).yellow(),
        report.head.message,
        style(&report.head.author).dim()
    )?;

    frequency_section(&mut out, &report.frequency)?;
    commit_section(
        &mut out,
        "Timeline",
        &report.timeline,
        report.timeline_truncated,
    )?;
    commit_section(&mut out, "Merges", &report.merges, false)?;

    writeln!(out, "{} ({})", style("Tags").bold(), report.tags.len())?;
    for tag in report.tags.iter().take(MAX_LISTED) {
        writeln!(
            out,
            "  {:<20} {}  {}",
            tag.name,
            style(&tag.target.hash).yellow(),
            style(tag.target.timestamp.format("%Y-%m-%d")).dim()
        )?;
    }
    more(&mut out, report.tags.len(), false)?;

    Ok(out)
}

fn frequency_section(out: &mut String, freq: &FrequencyData) -> Result<()> {
    writeln!(
        out,
        "{} {} commits on {} days, {:.1} per active day{}",
        style("Activity").bold(),
        freq.total_commits,
        freq.total_active_days,
        freq.average_per_active_day(),
        if freq.truncated {
            style(" (scan limit reached)").yellow().to_string()
        } else {
            String::new()
        }
    )?;

    let streaks = &freq.streaks;
    let since = streaks
        .current_start
        .map(|d| format!(" since {d}"))
        .unwrap_or_default();
    let span = match (streaks.longest_start, streaks.longest_end) {
        (Some(start), Some(end)) => format!(" ({start} to {end})"),
        _ => String::new(),
    };
    writeln!(
        out,
        "  Streak: current {} day(s){}, longest {} day(s){}",
        style(streaks.current).green().bold(),
        since,
        style(streaks.longest).green().bold(),
        span
    )?;
    if let (Some(day), Some(hour)) = (freq.busiest_weekday(), freq.busiest_hour()) {
        writeln!(out, "  Busiest: {day} around {hour:02}:00")?;
    }
    writeln!(out)?;

    let max_day = freq.commits_by_weekday.iter().copied().max().unwrap_or(0);
    for (weekday, n) in freq.weekday_counts() {
        writeln!(out, "  {}  {} {}", weekday, style(bar(n, max_day)).cyan(), n)?;
    }
    writeln!(out)?;

    let authors = freq.authors_by_count();
    if !authors.is_empty() {
        writeln!(out, "{}", style("Authors").bold())?;
        for (name, n) in authors.iter().take(MAX_LISTED) {
            writeln!(out, "  {:>5}  {}", n, name)?;
        }
        more(out, authors.len(), false)?;
    }
    Ok(())
}

fn commit_section(out: &mut String, title: &str, commits: &[CommitInfo], truncated: bool) -> Result<()> {
    writeln!(
        out,
        "{} ({})",
        style(title).bold(),
        count(commits.len(), truncated)
    )?;
    for commit in commits.iter().take(MAX_LISTED) {
        writeln!(out, "  {}", commit_line(commit))?;
    }
    more(out, commits.len(), truncated)
}

fn more(out: &mut String, len: usize, truncated: bool) -> Result<()> {
    let remaining = len.saturating_sub(MAX_LISTED);
    if remaining > 0 || truncated {
        let suffix = if truncated { "+" } else { "" };
        writeln!(
            out,
            "  {}",
            style(format!("...and {remaining}{suffix} more (use --format tui to browse)")).dim()
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn commit_line(commit: &CommitInfo) -> String {
    // chars() keeps multi-byte messages intact
    let message: String = commit.message.chars().take(60).collect();
    let message = if commit.message.chars().count() > 60 {
        format!("{message}...")
    } else {
        message
    };
    format!(
        "{}  {}  {:<63}  {}",
        style(&commit.hash).yellow(),
        style(commit.timestamp.format("%Y-%m-%d")).dim(),
        message,
        style(&commit.author).dim()
    )
}

/// Count with a `+` when the walk behind it was cut short
fn count(n: usize, truncated: bool) -> String {
    if truncated {
        format!("{n}+")
    } else {
        n.to_string()
    }
}

fn bar(n: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = (n * BAR_WIDTH).div_ceil(max);
    "█".repeat(filled)
}
