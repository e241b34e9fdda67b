//! The navigation state machine
//!
//! [`NavigationState::update`] is the only function that mutates
//! presentation state. It consumes one [`Msg`] at a time (user input or a
//! finished background load) and returns the [`Effect`]s the caller must run.
//!
//! Every load request carries the generation it was issued under. A refresh
//! bumps the generation, so a slow result from an earlier request is dropped
//! instead of overwriting newer data.

use tracing::{debug, warn};

use super::state::{Dataset, Flow, NavigationState, Row, View};

/// Rows skipped by page up / page down
const PAGE_SIZE: usize = 10;

/// Abstract user input, already decoded from key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// Numbered selector on a hub (1-based)
    Select(usize),
    Enter,
    Back,
    Refresh,
    ToggleSearch,
    Escape,
    Char(char),
    Backspace,
    Quit,
}

/// Messages fed into the update loop.
#[derive(Debug)]
pub enum Msg {
    /// Kick off the first load
    Start,
    Input(Input),
    /// A background load finished
    Loaded {
        generation: u64,
        outcome: Result<Dataset, String>,
    },
}

/// Work requested by the update loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load { generation: u64, flow: Flow },
}

impl NavigationState {
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Start => vec![self.request_load()],
            Msg::Input(input) => self.handle_input(input),
            Msg::Loaded {
                generation,
                outcome,
            } => {
                self.apply_loaded(generation, outcome);
                Vec::new()
            }
        }
    }

    fn request_load(&mut self) -> Effect {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        debug!(
            "Requesting load of {} (generation {})",
            self.flow.describe(),
            self.generation
        );
        Effect::Load {
            generation: self.generation,
            flow: self.flow.clone(),
        }
    }

    fn apply_loaded(&mut self, generation: u64, outcome: Result<Dataset, String>) {
        if generation != self.generation {
            debug!(
                "Discarding stale result (generation {}, current {})",
                generation, self.generation
            );
            return;
        }
        self.loading = false;
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(message) => {
                warn!("Load failed: {}", message);
                self.error = Some(message);
            }
        }
        self.clamp_cursor();
    }

    fn handle_input(&mut self, input: Input) -> Vec<Effect> {
        if input == Input::Quit {
            self.should_quit = true;
            return Vec::new();
        }

        if self.search.active {
            self.handle_search_input(input);
            return Vec::new();
        }

        match input {
            Input::Up => self.move_cursor(-1),
            Input::Down => self.move_cursor(1),
            Input::PageUp => self.move_cursor(-(PAGE_SIZE as isize)),
            Input::PageDown => self.move_cursor(PAGE_SIZE as isize),
            Input::Home => self.cursor = 0,
            Input::End => {
                let last = self.visible_rows().len().saturating_sub(1);
                self.cursor = last;
            }
            Input::Select(n) if self.view.is_hub() => {
                if let Some(view) = self.flow.details().get(n.wrapping_sub(1)).copied() {
                    return self.enter(view);
                }
            }
            Input::Enter => {
                let target = match self.selected_row() {
                    Some(Row::Menu { view, .. }) => Some(view),
                    _ => None,
                };
                if let Some(view) = target {
                    return self.enter(view);
                }
            }
            Input::Back if !self.view.is_hub() => {
                let hub = self.flow.hub();
                return self.enter(hub);
            }
            Input::Escape => {
                if self.view.is_hub() {
                    self.search.query.clear();
                    self.clamp_cursor();
                } else {
                    let hub = self.flow.hub();
                    return self.enter(hub);
                }
            }
            Input::Refresh => return vec![self.request_load()],
            Input::ToggleSearch => self.search.active = true,
            _ => {}
        }
        Vec::new()
    }

    fn handle_search_input(&mut self, input: Input) {
        match input {
            Input::Char(c) => {
                self.search.query.push(c);
                self.cursor = 0;
            }
            Input::Backspace => {
                self.search.query.pop();
                self.cursor = 0;
            }
            Input::ToggleSearch | Input::Enter => self.search.active = false,
            Input::Escape => {
                self.search.active = false;
                self.search.query.clear();
                self.cursor = 0;
            }
            Input::Up => self.move_cursor(-1),
            Input::Down => self.move_cursor(1),
            _ => {}
        }
    }

    /// Switch views. The new view starts unfiltered at the top, and a load
    /// is dispatched if nothing is loaded or in flight. A failed load is only
    /// retried by an explicit refresh.
    fn enter(&mut self, view: View) -> Vec<Effect> {
        debug!("View {:?} -> {:?}", self.view, view);
        self.view = view;
        self.cursor = 0;
        self.search.active = false;
        self.search.query.clear();

        if self.data.is_none() && !self.loading && self.error.is_none() {
            vec![self.request_load()]
        } else {
            Vec::new()
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, len as isize - 1) as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_rows().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ComparisonResult, ComparisonStats, FrequencyData, HistoryReport};
    use crate::git::{CommitInfo, TagInfo};
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn commit(n: usize, message: &str) -> CommitInfo {
        let full_hash = format!("{:040x}", n);
        CommitInfo {
            hash: full_hash[..7].to_string(),
            full_hash,
            author: "Test User".to_string(),
            author_email: "test@example.com".to_string(),
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .unwrap(),
            message: message.to_string(),
            parents: Vec::new(),
        }
    }

    fn comparison(ahead: usize) -> Dataset {
        let ref1_ahead: Vec<_> = (0..ahead).map(|i| commit(i + 1, &format!("left {i}"))).collect();
        let ref2_ahead = vec![commit(100, "right fix parser")];
        let base = commit(500, "base");
        Dataset::Comparison(Box::new(ComparisonResult {
            ref1: "main".to_string(),
            ref2: "HEAD".to_string(),
            ref1_tip: ref1_ahead.first().cloned().unwrap_or_else(|| base.clone()),
            ref2_tip: ref2_ahead[0].clone(),
            merge_base: Some(base.clone()),
            stats: ComparisonStats {
                ref1_ahead_by: ref1_ahead.len(),
                ref2_ahead_by: 1,
                shared_commits: 1,
                days_since_base: 3,
                total_commits: ref1_ahead.len() + 2,
            },
            ref1_ahead,
            ref2_ahead,
            shared_commits: vec![base],
            ref1_truncated: false,
            ref2_truncated: false,
            shared_truncated: false,
        }))
    }

    fn compare_flow() -> Flow {
        Flow::Compare {
            ref1: "main".to_string(),
            ref2: "HEAD".to_string(),
        }
    }

    fn loaded_state(ahead: usize) -> NavigationState {
        let mut state = NavigationState::new(compare_flow(), None);
        state.update(Msg::Start);
        state.update(Msg::Loaded {
            generation: state.generation,
            outcome: Ok(comparison(ahead)),
        });
        state
    }

    fn authored(n: usize, author: &str, message: &str) -> CommitInfo {
        let mut c = commit(n, message);
        c.author = author.to_string();
        c.author_email = format!("{}@example.com", author.to_lowercase());
        c
    }

    fn history() -> Dataset {
        let mut merge = authored(10, "Alice", "Merge branch 'feature'");
        merge.parents = vec![format!("{:040x}", 11), format!("{:040x}", 12)];
        let timeline = vec![
            merge.clone(),
            authored(11, "Bob", "Add release notes"),
            authored(12, "Alice", "Fix parser crash"),
            authored(13, "Carol", "Initial commit"),
        ];
        let now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Dataset::History(Box::new(HistoryReport {
            reference: "HEAD".to_string(),
            head: merge.clone(),
            frequency: FrequencyData::from_commits(&timeline, now),
            tags: vec![
                TagInfo {
                    name: "v1.0.0".to_string(),
                    target: timeline[1].clone(),
                },
                TagInfo {
                    name: "v1.1.0-rc1".to_string(),
                    target: timeline[0].clone(),
                },
            ],
            merges: vec![merge],
            timeline,
            timeline_truncated: false,
        }))
    }

    fn history_state() -> NavigationState {
        let mut state = NavigationState::new(
            Flow::History {
                reference: "HEAD".to_string(),
            },
            None,
        );
        state.update(Msg::Start);
        state.update(Msg::Loaded {
            generation: state.generation,
            outcome: Ok(history()),
        });
        state
    }

    fn press(state: &mut NavigationState, input: Input) -> Vec<Effect> {
        state.update(Msg::Input(input))
    }

    #[test]
    fn test_initial_state_is_loading_hub() {
        let mut state = NavigationState::new(compare_flow(), None);
        assert_eq!(state.view, View::Overview);
        assert!(state.loading);
        assert!(state.data.is_none());

        let effects = state.update(Msg::Start);
        assert_eq!(
            effects,
            vec![Effect::Load {
                generation: 1,
                flow: compare_flow()
            }]
        );
    }

    #[test]
    fn test_history_flow_starts_on_timeline() {
        let state = NavigationState::new(
            Flow::History {
                reference: "HEAD".to_string(),
            },
            None,
        );
        assert_eq!(state.view, View::Timeline);
    }

    #[test]
    fn test_history_selectors_return_to_timeline() {
        let mut state = history_state();
        assert_eq!(state.view, View::Timeline);
        assert_eq!(state.visible_rows().len(), 4);

        assert!(press(&mut state, Input::Select(1)).is_empty());
        assert_eq!(state.view, View::Frequency);
        press(&mut state, Input::Back);
        assert_eq!(state.view, View::Timeline);

        press(&mut state, Input::Select(2));
        assert_eq!(state.view, View::Tags);
        assert_eq!(state.visible_rows().len(), 2);
        press(&mut state, Input::Escape);
        assert_eq!(state.view, View::Timeline);

        press(&mut state, Input::Select(3));
        assert_eq!(state.view, View::Merges);
        assert_eq!(state.visible_rows().len(), 1);
        press(&mut state, Input::Back);
        assert_eq!(state.view, View::Timeline);

        // Only three detail views exist in this flow.
        press(&mut state, Input::Select(4));
        assert_eq!(state.view, View::Timeline);
    }

    #[test]
    fn test_history_search_uses_row_text() {
        let mut state = history_state();

        press(&mut state, Input::ToggleSearch);
        for c in "bob@".chars() {
            press(&mut state, Input::Char(c));
        }
        let rows = state.visible_rows();
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0], Row::Commit { commit, .. } if commit.message == "Add release notes"));

        // Entering a detail view starts unfiltered.
        press(&mut state, Input::Enter);
        press(&mut state, Input::Select(2));
        assert_eq!(state.view, View::Tags);
        assert!(state.search.query.is_empty());

        // Tags match on name and on their target's message.
        press(&mut state, Input::ToggleSearch);
        for c in "RC1".chars() {
            press(&mut state, Input::Char(c));
        }
        let rows = state.visible_rows();
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0], Row::Tag(tag) if tag.name == "v1.1.0-rc1"));
        press(&mut state, Input::Escape);
        press(&mut state, Input::ToggleSearch);
        for c in "release notes".chars() {
            press(&mut state, Input::Char(c));
        }
        let rows = state.visible_rows();
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0], Row::Tag(tag) if tag.name == "v1.0.0"));

        // Frequency rows match on author name only.
        press(&mut state, Input::Enter);
        press(&mut state, Input::Back);
        press(&mut state, Input::Select(1));
        assert_eq!(state.view, View::Frequency);
        assert_eq!(
            state.visible_rows(),
            vec![
                Row::Author { name: "Alice", count: 2 },
                Row::Author { name: "Bob", count: 1 },
                Row::Author { name: "Carol", count: 1 },
            ]
        );
        press(&mut state, Input::ToggleSearch);
        for c in "CAR".chars() {
            press(&mut state, Input::Char(c));
        }
        assert_eq!(
            state.visible_rows(),
            vec![Row::Author { name: "Carol", count: 1 }]
        );
        press(&mut state, Input::Enter);
        press(&mut state, Input::Char('x'));
        assert_eq!(state.search.query, "CAR");
    }

    #[test]
    fn test_loaded_result_clears_loading() {
        let state = loaded_state(3);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.comparison().is_some());
    }

    #[test]
    fn test_selectors_and_back() {
        let mut state = loaded_state(3);

        assert!(press(&mut state, Input::Select(1)).is_empty());
        assert_eq!(state.view, View::DivergenceDetail);
        assert_eq!(state.visible_rows().len(), 4);

        press(&mut state, Input::Back);
        assert_eq!(state.view, View::Overview);

        press(&mut state, Input::Select(3));
        assert_eq!(state.view, View::MergeBaseDetail);
        press(&mut state, Input::Escape);
        assert_eq!(state.view, View::Overview);

        press(&mut state, Input::Select(4));
        assert_eq!(state.view, View::BranchInfoDetail);
    }

    #[test]
    fn test_selectors_ignored_outside_hub_and_out_of_range() {
        let mut state = loaded_state(3);
        press(&mut state, Input::Select(9));
        assert_eq!(state.view, View::Overview);
        press(&mut state, Input::Select(0));
        assert_eq!(state.view, View::Overview);

        press(&mut state, Input::Select(2));
        press(&mut state, Input::Select(1));
        assert_eq!(state.view, View::SharedHistoryDetail);
    }

    #[test]
    fn test_enter_on_menu_row() {
        let mut state = loaded_state(3);
        press(&mut state, Input::Down);
        press(&mut state, Input::Enter);
        assert_eq!(state.view, View::SharedHistoryDetail);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut state = loaded_state(25);
        press(&mut state, Input::Select(1));
        press(&mut state, Input::Up);
        assert_eq!(state.cursor, 0);
        press(&mut state, Input::PageDown);
        assert_eq!(state.cursor, 10);
        press(&mut state, Input::End);
        assert_eq!(state.cursor, 25);
        press(&mut state, Input::Down);
        assert_eq!(state.cursor, 25);
        press(&mut state, Input::Home);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_refresh_discards_stale_result() {
        let mut state = loaded_state(3);
        let first = press(&mut state, Input::Refresh);
        let second = press(&mut state, Input::Refresh);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert!(state.loading);
        let (Effect::Load { generation: old, .. }, Effect::Load { generation: new, .. }) =
            (&first[0], &second[0]);
        assert!(new > old);

        // The newer request finishes first, then the stale one arrives.
        state.update(Msg::Loaded {
            generation: *new,
            outcome: Ok(comparison(7)),
        });
        state.update(Msg::Loaded {
            generation: *old,
            outcome: Ok(comparison(1)),
        });

        assert!(!state.loading);
        assert_eq!(state.comparison().unwrap().ref1_ahead.len(), 7);
    }

    #[test]
    fn test_error_is_stored_and_navigation_survives() {
        let mut state = NavigationState::new(compare_flow(), None);
        state.update(Msg::Start);
        state.update(Msg::Loaded {
            generation: 1,
            outcome: Err("Ref not found: 'main'".to_string()),
        });
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Ref not found: 'main'"));

        // Views stay reachable and keep showing the error; nothing reloads.
        let effects = press(&mut state, Input::Select(1));
        assert_eq!(state.view, View::DivergenceDetail);
        assert!(effects.is_empty());
        assert!(state.error.is_some());
        press(&mut state, Input::Back);
        assert_eq!(state.view, View::Overview);

        // Refresh is the only retry.
        let effects = press(&mut state, Input::Refresh);
        assert_eq!(effects.len(), 1);
        assert!(state.loading);
        assert!(state.error.is_none());

        press(&mut state, Input::Quit);
        assert!(state.should_quit);
    }

    #[test]
    fn test_no_duplicate_load_while_in_flight() {
        let mut state = NavigationState::new(compare_flow(), None);
        state.update(Msg::Start);
        assert!(press(&mut state, Input::Select(2)).is_empty());
    }

    #[test]
    fn test_search_filters_and_restores() {
        let mut state = loaded_state(3);
        press(&mut state, Input::Select(1));
        press(&mut state, Input::ToggleSearch);
        assert!(state.search.active);

        for c in "PARSER".chars() {
            press(&mut state, Input::Char(c));
        }
        assert_eq!(state.visible_rows().len(), 1);

        // Toggling again closes the box but keeps the filter.
        press(&mut state, Input::ToggleSearch);
        assert!(!state.search.active);
        assert_eq!(state.visible_rows().len(), 1);

        // Escape in the box clears it.
        press(&mut state, Input::ToggleSearch);
        press(&mut state, Input::Escape);
        assert!(!state.search.active);
        assert_eq!(state.view, View::DivergenceDetail);
        assert_eq!(state.visible_rows().len(), 4);
    }

    #[test]
    fn test_quit_while_searching() {
        let mut state = loaded_state(3);
        press(&mut state, Input::ToggleSearch);
        press(&mut state, Input::Char('q'));
        assert!(!state.should_quit);
        assert_eq!(state.search.query, "q");
        press(&mut state, Input::Quit);
        assert!(state.should_quit);
    }

    #[test]
    fn test_initial_query_filters_first_view() {
        let mut state = NavigationState::new(compare_flow(), Some("merge".to_string()));
        state.update(Msg::Start);
        state.update(Msg::Loaded {
            generation: 1,
            outcome: Ok(comparison(2)),
        });
        assert_eq!(state.search.query, "merge");
        assert!(!state.search.active);
        let rows = state.visible_rows();
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0], Row::Menu { view: View::MergeBaseDetail, .. }));
    }
}
