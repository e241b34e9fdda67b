//! Background analysis tasks
//!
//! Each [`Effect::Load`] runs on its own thread with its own repository
//! handle. The thread never touches [`NavigationState`](super::NavigationState);
//! it posts a single [`Msg::Loaded`] back to the update loop and exits.
//! Running walks cannot be cancelled; a superseded result is simply dropped
//! by the update loop when its generation no longer matches.

use chrono::{Local, Utc};
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, warn};

use super::controller::{Effect, Msg};
use super::state::{Dataset, Flow};
use crate::analysis::{DivergenceResolver, HistoryReport, WalkLimits};
use crate::git::{GitHistory, GitResult};

/// Run the analysis behind `flow` against the repository at `repo_path`.
pub fn load(repo_path: &Path, flow: &Flow, limits: WalkLimits) -> GitResult<Dataset> {
    let history = GitHistory::open(repo_path)?;
    match flow {
        Flow::Compare { ref1, ref2 } => {
            let result = DivergenceResolver::new(&history, limits).compare(ref1, ref2, Utc::now())?;
            Ok(Dataset::Comparison(Box::new(result)))
        }
        Flow::History { reference } => {
            let report =
                HistoryReport::build(&history, reference, limits, Local::now().naive_local())?;
            Ok(Dataset::History(Box::new(report)))
        }
    }
}

/// Executes effects off the UI thread.
#[derive(Debug, Clone)]
pub struct Worker {
    repo_path: PathBuf,
    limits: WalkLimits,
    results: Sender<Msg>,
}

impl Worker {
    pub fn new(repo_path: PathBuf, limits: WalkLimits, results: Sender<Msg>) -> Self {
        Self {
            repo_path,
            limits,
            results,
        }
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::Load { generation, flow } => self.spawn_load(generation, flow),
        }
    }

    fn spawn_load(&self, generation: u64, flow: Flow) {
        let repo_path = self.repo_path.clone();
        let limits = self.limits;
        let results = self.results.clone();

        let spawned = thread::Builder::new()
            .name(format!("gitpulse-load-{generation}"))
            .spawn(move || {
                debug!("Loading {} (generation {})", flow.describe(), generation);
                let outcome = load(&repo_path, &flow, limits).map_err(|e| e.to_string());
                // The receiver is gone once the session has ended.
                let _ = results.send(Msg::Loaded {
                    generation,
                    outcome,
                });
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn load thread: {}", e);
            let _ = self.results.send(Msg::Loaded {
                generation,
                outcome: Err(format!("Failed to start analysis: {e}")),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::{day, TestRepo};
    use chrono::Duration;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_worker_posts_result_with_generation() {
        let fixture = TestRepo::new();
        let ids = fixture.chain("c", None, 3, day(2024, 5, 1), Duration::days(1));
        fixture.branch("main", ids[1]);
        fixture.branch("topic", ids[2]);

        let (tx, rx) = unbounded();
        let worker = Worker::new(fixture.dir.path().to_path_buf(), WalkLimits::default(), tx);
        worker.run(Effect::Load {
            generation: 7,
            flow: Flow::Compare {
                ref1: "main".to_string(),
                ref2: "topic".to_string(),
            },
        });

        match rx.recv_timeout(std::time::Duration::from_secs(10)).unwrap() {
            Msg::Loaded {
                generation,
                outcome: Ok(Dataset::Comparison(result)),
            } => {
                assert_eq!(generation, 7);
                assert_eq!(result.ref2_ahead.len(), 1);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_missing_repository_becomes_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = unbounded();
        let worker = Worker::new(dir.path().to_path_buf(), WalkLimits::default(), tx);
        worker.run(Effect::Load {
            generation: 1,
            flow: Flow::History {
                reference: "HEAD".to_string(),
            },
        });

        match rx.recv_timeout(std::time::Duration::from_secs(10)).unwrap() {
            Msg::Loaded {
                outcome: Err(message),
                ..
            } => assert!(message.contains("Repository unavailable")),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_load_history_flow() {
        let fixture = TestRepo::new();
        let ids = fixture.chain("c", None, 4, day(2024, 5, 1), Duration::days(1));
        fixture.branch("main", ids[3]);

        let flow = Flow::History {
            reference: "main".to_string(),
        };
        match load(fixture.dir.path(), &flow, WalkLimits::default()).unwrap() {
            Dataset::History(report) => assert_eq!(report.frequency.total_commits, 4),
            other => panic!("unexpected dataset: {:?}", other),
        }
    }
}
