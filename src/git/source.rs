//! The commit source contract consumed by the analyzers

use chrono::{DateTime, FixedOffset};
use git2::Oid;
use serde::Serialize;

use super::GitResult;

/// Information about a git commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// Short hash (7 characters)
    pub hash: String,
    /// Full commit hash
    pub full_hash: String,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp, in the author's own UTC offset
    pub timestamp: DateTime<FixedOffset>,
    /// Commit message (first line)
    pub message: String,
    /// Full hashes of the parent commits
    pub parents: Vec<String>,
}

impl CommitInfo {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Text matched by the search filter: hash, message and author.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.full_hash, self.message, self.author, self.author_email
        )
    }
}

/// A tag and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    pub name: String,
    pub target: CommitInfo,
}

/// A lazy, bounded ancestor walk. Each call to
/// [`CommitSource::walk_ancestors`] starts a fresh traversal.
pub type CommitWalk<'a> = Box<dyn Iterator<Item = GitResult<CommitInfo>> + 'a>;

/// Read-only view of a repository's commit graph.
pub trait CommitSource {
    /// Resolve a branch, tag, symbolic name or (abbreviated) hash to a commit.
    fn resolve_ref(&self, name: &str) -> GitResult<Oid>;

    /// Metadata of a single commit.
    fn commit_info(&self, id: Oid) -> GitResult<CommitInfo>;

    /// Nearest common ancestor of two commits, `None` when the histories
    /// share nothing.
    fn merge_base(&self, a: Oid, b: Oid) -> GitResult<Option<Oid>>;

    /// Commits reachable from `from`, newest first.
    ///
    /// When `stop` is given, `stop` and every commit reachable from it are
    /// excluded. At most `limit` commits are produced.
    fn walk_ancestors(&self, from: Oid, stop: Option<Oid>, limit: usize)
        -> GitResult<CommitWalk<'_>>;

    /// All tags with their peeled target commits.
    fn tags(&self) -> GitResult<Vec<TagInfo>>;
}
