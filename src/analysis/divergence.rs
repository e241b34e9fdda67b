//! Branch divergence between two refs
//!
//! Finds the merge base of two refs and lists, for each side, the commits
//! made since the histories split, plus a short preview of the history they
//! still share.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::{walk_bounded, WalkLimits};
use crate::git::{CommitInfo, CommitSource, GitResult};

/// Summary counts for a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonStats {
    pub ref1_ahead_by: usize,
    pub ref2_ahead_by: usize,
    pub shared_commits: usize,
    /// Whole days between the merge-base commit and now (0 without a merge base)
    pub days_since_base: i64,
    pub total_commits: usize,
}

/// How two refs relate to each other.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub ref1: String,
    pub ref2: String,
    /// Commit ref1 resolved to
    pub ref1_tip: CommitInfo,
    /// Commit ref2 resolved to
    pub ref2_tip: CommitInfo,
    /// Nearest common ancestor, `None` for unrelated histories
    pub merge_base: Option<CommitInfo>,
    /// Commits on ref1 that ref2 does not have, newest first
    pub ref1_ahead: Vec<CommitInfo>,
    /// Commits on ref2 that ref1 does not have, newest first
    pub ref2_ahead: Vec<CommitInfo>,
    /// History leading up to the merge base, newest first
    pub shared_commits: Vec<CommitInfo>,
    pub ref1_truncated: bool,
    pub ref2_truncated: bool,
    pub shared_truncated: bool,
    pub stats: ComparisonStats,
}

impl ComparisonResult {
    /// Full hash of the merge base, or an empty string when there is none.
    pub fn merge_base_hash(&self) -> &str {
        self.merge_base
            .as_ref()
            .map(|c| c.full_hash.as_str())
            .unwrap_or("")
    }

    /// True when the refs point at the same commit.
    pub fn is_identical(&self) -> bool {
        self.ref1_tip.full_hash == self.ref2_tip.full_hash
    }

    /// True when any of the three lists stopped at its walk limit.
    pub fn is_truncated(&self) -> bool {
        self.ref1_truncated || self.ref2_truncated || self.shared_truncated
    }
}

/// Computes [`ComparisonResult`]s against a commit source.
pub struct DivergenceResolver<'a, S: CommitSource + ?Sized> {
    source: &'a S,
    limits: WalkLimits,
}

impl<'a, S: CommitSource + ?Sized> DivergenceResolver<'a, S> {
    pub fn new(source: &'a S, limits: WalkLimits) -> Self {
        Self { source, limits }
    }

    /// Compare `ref1` against `ref2` as of `now`.
    ///
    /// Fails with `RefNotFound` naming whichever ref does not resolve.
    pub fn compare(&self, ref1: &str, ref2: &str, now: DateTime<Utc>) -> GitResult<ComparisonResult> {
        let id1 = self.source.resolve_ref(ref1)?;
        let id2 = self.source.resolve_ref(ref2)?;
        debug!("Resolved {} -> {}, {} -> {}", ref1, id1, ref2, id2);

        let base_id = self.source.merge_base(id1, id2)?;
        let ahead_limit = self.limits.ahead_limit;

        // Without a merge base each side is walked as a plain history.
        let (ref1_ahead, ref1_truncated) = walk_bounded(self.source, id1, base_id, ahead_limit)?;
        let (ref2_ahead, ref2_truncated) = walk_bounded(self.source, id2, base_id, ahead_limit)?;

        let (merge_base, shared_commits, shared_truncated) = match base_id {
            Some(base) => {
                let (shared, truncated) =
                    walk_bounded(self.source, base, None, self.limits.shared_limit)?;
                (Some(self.source.commit_info(base)?), shared, truncated)
            }
            None => (None, Vec::new(), false),
        };

        let days_since_base = merge_base
            .as_ref()
            .map(|base| {
                now.signed_duration_since(base.timestamp.with_timezone(&Utc))
                    .num_days()
                    .max(0)
            })
            .unwrap_or(0);

        let stats = ComparisonStats {
            ref1_ahead_by: ref1_ahead.len(),
            ref2_ahead_by: ref2_ahead.len(),
            shared_commits: shared_commits.len(),
            days_since_base,
            total_commits: ref1_ahead.len() + ref2_ahead.len() + shared_commits.len(),
        };

        info!(
            "Compared {} and {}: {} ahead, {} behind, base {}",
            ref1,
            ref2,
            stats.ref1_ahead_by,
            stats.ref2_ahead_by,
            merge_base.as_ref().map(|c| c.hash.as_str()).unwrap_or("<none>")
        );

        Ok(ComparisonResult {
            ref1: ref1.to_string(),
            ref2: ref2.to_string(),
            ref1_tip: self.source.commit_info(id1)?,
            ref2_tip: self.source.commit_info(id2)?,
            merge_base,
            ref1_ahead,
            ref2_ahead,
            shared_commits,
            ref1_truncated,
            ref2_truncated,
            shared_truncated,
            stats,
        })
    }
}
