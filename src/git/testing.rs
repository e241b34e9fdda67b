//! Fixture repositories with hand-built commit graphs

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use super::GitHistory;

pub(crate) struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    empty_tree: Oid,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init repository");
        let empty_tree = repo
            .treebuilder(None)
            .and_then(|builder| builder.write())
            .expect("write empty tree");
        Self {
            dir,
            repo,
            empty_tree,
        }
    }

    pub fn history(&self) -> GitHistory {
        GitHistory::open(self.dir.path()).expect("open fixture repository")
    }

    pub fn commit(&self, message: &str, parents: &[Oid], at: DateTime<FixedOffset>) -> Oid {
        self.commit_as("Test User", message, parents, at)
    }

    pub fn commit_as(
        &self,
        author: &str,
        message: &str,
        parents: &[Oid],
        at: DateTime<FixedOffset>,
    ) -> Oid {
        let time = Time::new(at.timestamp(), at.offset().local_minus_utc() / 60);
        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let sig = Signature::new(author, &email, &time).expect("signature");
        let tree = self.repo.find_tree(self.empty_tree).expect("empty tree");
        let parents: Vec<_> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).expect("parent commit"))
            .collect();
        let parent_refs: Vec<_> = parents.iter().collect();
        self.repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("write commit")
    }

    /// Linear run of `count` commits, one per `step`, starting after `parent`.
    pub fn chain(
        &self,
        label: &str,
        parent: Option<Oid>,
        count: usize,
        start: DateTime<FixedOffset>,
        step: Duration,
    ) -> Vec<Oid> {
        let mut ids = Vec::with_capacity(count);
        let mut prev = parent;
        for i in 0..count {
            let parents: Vec<Oid> = prev.into_iter().collect();
            let at = start + step * i as i32;
            let id = self.commit(&format!("{label} {i}"), &parents, at);
            ids.push(id);
            prev = Some(id);
        }
        ids
    }

    pub fn branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).expect("branch target");
        self.repo.branch(name, &commit, true).expect("create branch");
    }

    pub fn checkout(&self, name: &str) {
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .expect("set HEAD");
    }

    pub fn tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).expect("tag target");
        self.repo
            .tag_lightweight(name, &object, true)
            .expect("create tag");
    }

    /// Tag ref whose target object does not exist.
    pub fn dangling_tag(&self, name: &str) {
        let dir = self.repo.path().join("refs").join("tags");
        std::fs::create_dir_all(&dir).expect("create tags dir");
        std::fs::write(dir.join(name), format!("{}\n", "ab".repeat(20))).expect("write tag ref");
    }
}

/// Noon UTC on the given calendar day.
pub(crate) fn day(year: i32, month: u32, day: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid date")
        .fixed_offset()
}
