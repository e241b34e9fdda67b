//! Git history access using libgit2
//!
//! Implements [`CommitSource`] on top of the git2 crate (Rust bindings to
//! libgit2). One `GitHistory` wraps one open repository handle; background
//! analysis tasks each open their own.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use git2::{ErrorCode, Oid, Repository, Sort};
use std::path::Path;
use tracing::debug;

use super::source::{CommitInfo, CommitSource, CommitWalk, TagInfo};
use super::{GitError, GitResult};

/// Length of the abbreviated hash shown in lists
const SHORT_HASH_LEN: usize = 7;

/// Git history reader using libgit2.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open a git repository.
    ///
    /// # Arguments
    /// * `path` - Path to the repository (or any subdirectory)
    pub fn open(path: &Path) -> GitResult<Self> {
        let repo = Repository::discover(path).map_err(|e| GitError::RepositoryUnavailable {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo })
    }
}

impl CommitSource for GitHistory {
    fn resolve_ref(&self, name: &str) -> GitResult<Oid> {
        let not_found = || GitError::RefNotFound {
            name: name.to_string(),
        };
        let object = self.repo.revparse_single(name).map_err(|e| {
            debug!("Failed to resolve '{}': {}", name, e.message());
            not_found()
        })?;
        let commit = object.peel_to_commit().map_err(|_| not_found())?;
        Ok(commit.id())
    }

    fn commit_info(&self, id: Oid) -> GitResult<CommitInfo> {
        let commit = self.repo.find_commit(id).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::RefNotFound {
                name: id.to_string(),
            },
            _ => GitError::Git(e),
        })?;
        Ok(extract_commit_info(&commit))
    }

    fn merge_base(&self, a: Oid, b: Oid) -> GitResult<Option<Oid>> {
        match self.repo.merge_base(a, b) {
            Ok(base) => Ok(Some(base)),
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!("No merge base between {} and {}", a, b);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn walk_ancestors(
        &self,
        from: Oid,
        stop: Option<Oid>,
        limit: usize,
    ) -> GitResult<CommitWalk<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(from)?;
        if let Some(stop) = stop {
            revwalk.hide(stop)?;
        }

        let repo = &self.repo;
        Ok(Box::new(revwalk.take(limit).map(move |oid_result| -> GitResult<CommitInfo> {
            let oid = oid_result?;
            let commit = repo.find_commit(oid)?;
            Ok(extract_commit_info(&commit))
        })))
    }

    fn tags(&self) -> GitResult<Vec<TagInfo>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let object = match self.repo.revparse_single(&format!("refs/tags/{}", name)) {
                Ok(object) => object,
                Err(e) => {
                    debug!("Skipping tag {} (cannot resolve: {})", name, e.message());
                    continue;
                }
            };
            match object.peel_to_commit() {
                Ok(commit) => tags.push(TagInfo {
                    name: name.to_string(),
                    target: extract_commit_info(&commit),
                }),
                Err(_) => debug!("Skipping tag {} (does not point at a commit)", name),
            }
        }

        tags.sort_by(|a, b| {
            b.target
                .timestamp
                .cmp(&a.target.timestamp)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(tags)
    }
}

/// Extract commit information from a git2 Commit object.
fn extract_commit_info(commit: &git2::Commit) -> CommitInfo {
    let author = commit.author();
    let message = commit
        .message()
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .to_string();
    let full_hash = commit.id().to_string();

    CommitInfo {
        hash: short_hash(&full_hash),
        full_hash,
        author: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        timestamp: git_time_to_datetime(&author.when()),
        message,
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
    }
}

fn short_hash(full: &str) -> String {
    full.chars().take(SHORT_HASH_LEN).collect()
}

/// Convert a git timestamp, keeping the recorded UTC offset.
fn git_time_to_datetime(time: &git2::Time) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or(Utc.fix());
    offset
        .timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::default().with_timezone(&offset))
}
