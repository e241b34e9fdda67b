//! Single-ref history report
//!
//! One walk from the ref's tip feeds the timeline, the merge list and the
//! frequency histograms. Tags are listed separately since they are not
//! tied to the walked ref.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use super::frequency::{FrequencyAccumulator, FrequencyData};
use super::WalkLimits;
use crate::git::{CommitInfo, CommitSource, GitResult, TagInfo};

/// Everything the history views show for one ref.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub reference: String,
    pub head: CommitInfo,
    /// Most recent commits, newest first
    pub timeline: Vec<CommitInfo>,
    /// More commits exist beyond the timeline
    pub timeline_truncated: bool,
    /// Merge commits found in the walked history, newest first
    pub merges: Vec<CommitInfo>,
    pub tags: Vec<TagInfo>,
    pub frequency: FrequencyData,
}

impl HistoryReport {
    /// Walk `reference` and summarize its history as of `now`.
    pub fn build<S: CommitSource + ?Sized>(
        source: &S,
        reference: &str,
        limits: WalkLimits,
        now: NaiveDateTime,
    ) -> GitResult<Self> {
        let tip = source.resolve_ref(reference)?;
        let head = source.commit_info(tip)?;

        let mut timeline = Vec::new();
        let mut timeline_truncated = false;
        let mut merges = Vec::new();
        let mut frequency = FrequencyAccumulator::default();
        let mut walk_truncated = false;

        for commit in source.walk_ancestors(tip, None, limits.history_limit.saturating_add(1))? {
            let commit = commit?;
            if frequency.total() == limits.history_limit {
                walk_truncated = true;
                break;
            }
            frequency.record(&commit);
            if commit.is_merge() {
                merges.push(commit.clone());
            }
            if timeline.len() < limits.timeline_limit {
                timeline.push(commit);
            } else {
                timeline_truncated = true;
            }
        }
        if walk_truncated {
            timeline_truncated = true;
            debug!(
                "History walk of {} stopped at {} commits",
                reference, limits.history_limit
            );
        }

        let tags = source.tags()?;
        let frequency = frequency.finish(now, walk_truncated);

        info!(
            "History of {}: {} commits, {} active days, {} merges, {} tags",
            reference,
            frequency.total_commits,
            frequency.total_active_days,
            merges.len(),
            tags.len()
        );

        Ok(Self {
            reference: reference.to_string(),
            head,
            timeline,
            timeline_truncated,
            merges,
            tags,
            frequency,
        })
    }
}
