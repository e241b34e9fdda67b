//! Commit graph access
//!
//! Everything the analyzers know about a repository goes through the
//! [`CommitSource`] trait. The production implementation is [`GitHistory`],
//! a thin layer over libgit2 (the `git2` crate).
//!
//! # Example
//!
//! ```no_run
//! use gitpulse::git::{CommitSource, GitHistory};
//! use std::path::Path;
//!
//! let history = GitHistory::open(Path::new("/path/to/repo")).unwrap();
//! let head = history.resolve_ref("HEAD").unwrap();
//! for commit in history.walk_ancestors(head, None, 10).unwrap() {
//!     println!("{}", commit.unwrap().message);
//! }
//! ```

pub mod history;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use history::GitHistory;
pub use source::{CommitInfo, CommitSource, CommitWalk, TagInfo};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the commit graph
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Ref not found: '{name}'")]
    RefNotFound { name: String },

    #[error("Repository unavailable at {path}: {reason}")]
    RepositoryUnavailable { path: PathBuf, reason: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

pub type GitResult<T> = Result<T, GitError>;
