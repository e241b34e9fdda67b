//! Repository history analysis
//!
//! Turns the raw commit graph exposed by a [`CommitSource`] into:
//!
//! - a two-ref divergence report ([`DivergenceResolver`], [`ComparisonResult`])
//! - temporal activity statistics ([`FrequencyData`], [`StreakInfo`])
//! - the single-ref history report behind the timeline views ([`HistoryReport`])
//!
//! Every walk is bounded by [`WalkLimits`]. Lists produced by a bounded walk
//! are previews; each result says explicitly whether its walk was cut short.

pub mod divergence;
pub mod frequency;
pub mod history;
pub mod streak;

pub use divergence::{ComparisonResult, ComparisonStats, DivergenceResolver};
pub use frequency::{FrequencyAccumulator, FrequencyData};
pub use history::HistoryReport;
pub use streak::StreakInfo;

use crate::git::{CommitInfo, CommitSource, GitResult};
use git2::Oid;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AHEAD_LIMIT: usize = 100;
pub const DEFAULT_SHARED_LIMIT: usize = 20;
pub const DEFAULT_HISTORY_LIMIT: usize = 100_000;
pub const DEFAULT_TIMELINE_LIMIT: usize = 500;

/// Upper bounds for every graph walk the analyzers perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkLimits {
    /// Commits listed per side of a comparison
    pub ahead_limit: usize,
    /// Shared-history preview length behind the merge base
    pub shared_limit: usize,
    /// Commits scanned for frequency statistics
    pub history_limit: usize,
    /// Commits kept for the timeline view
    pub timeline_limit: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            ahead_limit: DEFAULT_AHEAD_LIMIT,
            shared_limit: DEFAULT_SHARED_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            timeline_limit: DEFAULT_TIMELINE_LIMIT,
        }
    }
}

/// Walk at most `limit` commits and report whether more were available.
pub(crate) fn walk_bounded<S: CommitSource + ?Sized>(
    source: &S,
    from: Oid,
    stop: Option<Oid>,
    limit: usize,
) -> GitResult<(Vec<CommitInfo>, bool)> {
    let mut commits = source
        .walk_ancestors(from, stop, limit.saturating_add(1))?
        .collect::<GitResult<Vec<_>>>()?;
    let truncated = commits.len() > limit;
    commits.truncate(limit);
    Ok((commits, truncated))
}
