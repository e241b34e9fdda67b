//! Presentation state owned by the navigation controller

use crate::analysis::{ComparisonResult, HistoryReport};
use crate::git::{CommitInfo, TagInfo};

use super::search;

/// Which analysis the session is built around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Divergence between two refs
    Compare { ref1: String, ref2: String },
    /// Activity along one ref
    History { reference: String },
}

impl Flow {
    /// The view a session of this flow starts in and returns to.
    pub fn hub(&self) -> View {
        match self {
            Flow::Compare { .. } => View::Overview,
            Flow::History { .. } => View::Timeline,
        }
    }

    /// Detail views reachable from the hub, in selector order (1-based).
    pub fn details(&self) -> &'static [View] {
        match self {
            Flow::Compare { .. } => &[
                View::DivergenceDetail,
                View::SharedHistoryDetail,
                View::MergeBaseDetail,
                View::BranchInfoDetail,
            ],
            Flow::History { .. } => &[View::Frequency, View::Tags, View::Merges],
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Flow::Compare { ref1, ref2 } => format!("{ref1}...{ref2}"),
            Flow::History { reference } => reference.clone(),
        }
    }
}

/// The closed set of screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    DivergenceDetail,
    SharedHistoryDetail,
    MergeBaseDetail,
    BranchInfoDetail,
    Timeline,
    Frequency,
    Tags,
    Merges,
}

impl View {
    pub fn is_hub(self) -> bool {
        matches!(self, View::Overview | View::Timeline)
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::DivergenceDetail => "Divergence",
            View::SharedHistoryDetail => "Shared history",
            View::MergeBaseDetail => "Merge base",
            View::BranchInfoDetail => "Branch info",
            View::Timeline => "Timeline",
            View::Frequency => "Frequency",
            View::Tags => "Tags",
            View::Merges => "Merges",
        }
    }
}

/// A loaded analysis result. Replaced wholesale on reload.
#[derive(Debug, Clone)]
pub enum Dataset {
    Comparison(Box<ComparisonResult>),
    History(Box<HistoryReport>),
}

/// Which side of a comparison a commit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Ref1,
    Ref2,
}

/// One line of the active view's list.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<'a> {
    /// Hub entry leading to a detail view
    Menu { key: usize, view: View },
    Commit {
        commit: &'a CommitInfo,
        side: Option<Side>,
    },
    Tag(&'a TagInfo),
    Author { name: &'a str, count: usize },
    Field { label: &'static str, value: String },
}

impl Row<'_> {
    /// Composite text the search filter matches against.
    pub fn search_text(&self) -> String {
        match self {
            Row::Menu { view, .. } => view.title().to_string(),
            Row::Commit { commit, .. } => commit.search_text(),
            Row::Tag(tag) => format!(
                "{} {} {}",
                tag.name, tag.target.full_hash, tag.target.message
            ),
            Row::Author { name, .. } => name.to_string(),
            Row::Field { label, value } => format!("{label} {value}"),
        }
    }
}

/// Search box state for the active view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// The search box is capturing keystrokes
    pub active: bool,
    /// Filter applied to the list (kept after the box closes)
    pub query: String,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub flow: Flow,
    pub view: View,
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<Dataset>,
    pub cursor: usize,
    pub search: SearchState,
    /// Incremented for every load request; older results are discarded
    pub generation: u64,
    pub should_quit: bool,
}

impl NavigationState {
    /// Fresh session in the flow's hub, waiting for its first load.
    pub fn new(flow: Flow, initial_query: Option<String>) -> Self {
        let view = flow.hub();
        Self {
            flow,
            view,
            loading: true,
            error: None,
            data: None,
            cursor: 0,
            search: SearchState {
                active: false,
                query: initial_query.unwrap_or_default(),
            },
            generation: 0,
            should_quit: false,
        }
    }

    pub fn comparison(&self) -> Option<&ComparisonResult> {
        match &self.data {
            Some(Dataset::Comparison(result)) => Some(result),
            _ => None,
        }
    }

    pub fn history(&self) -> Option<&HistoryReport> {
        match &self.data {
            Some(Dataset::History(report)) => Some(report),
            _ => None,
        }
    }

    /// Unfiltered list for the active view.
    pub fn rows(&self) -> Vec<Row<'_>> {
        if self.view == View::Overview {
            return self
                .flow
                .details()
                .iter()
                .enumerate()
                .map(|(i, view)| Row::Menu {
                    key: i + 1,
                    view: *view,
                })
                .collect();
        }

        match (&self.data, self.view) {
            (Some(Dataset::Comparison(result)), view) => comparison_rows(result, view),
            (Some(Dataset::History(report)), view) => history_rows(report, view),
            (None, _) => Vec::new(),
        }
    }

    /// List for the active view after the search filter.
    pub fn visible_rows(&self) -> Vec<Row<'_>> {
        search::filter_rows(self.rows(), &self.search.query)
    }

    pub fn selected_row(&self) -> Option<Row<'_>> {
        self.visible_rows().into_iter().nth(self.cursor)
    }
}

fn comparison_rows(result: &ComparisonResult, view: View) -> Vec<Row<'_>> {
    match view {
        View::DivergenceDetail => {
            let mut rows = commit_rows(&result.ref1_ahead, Some(Side::Ref1));
            rows.extend(commit_rows(&result.ref2_ahead, Some(Side::Ref2)));
            rows
        }
        View::SharedHistoryDetail => commit_rows(&result.shared_commits, None),
        View::MergeBaseDetail => match &result.merge_base {
            Some(base) => {
                let mut rows = commit_fields(base);
                rows.push(Row::Field {
                    label: "Age",
                    value: format!("{} days", result.stats.days_since_base),
                });
                rows
            }
            None => vec![Row::Field {
                label: "Merge base",
                value: "none (histories are unrelated)".to_string(),
            }],
        },
        View::BranchInfoDetail => {
            let mut rows = Vec::new();
            for (name, tip, ahead, truncated) in [
                (&result.ref1, &result.ref1_tip, result.stats.ref1_ahead_by, result.ref1_truncated),
                (&result.ref2, &result.ref2_tip, result.stats.ref2_ahead_by, result.ref2_truncated),
            ] {
                rows.push(Row::Field {
                    label: "Ref",
                    value: name.clone(),
                });
                rows.extend(commit_fields(tip));
                rows.push(Row::Field {
                    label: "Ahead",
                    value: format!("{}{}", ahead, if truncated { "+" } else { "" }),
                });
            }
            rows
        }
        _ => Vec::new(),
    }
}

fn history_rows(report: &HistoryReport, view: View) -> Vec<Row<'_>> {
    match view {
        View::Timeline => commit_rows(&report.timeline, None),
        View::Merges => commit_rows(&report.merges, None),
        View::Tags => report.tags.iter().map(Row::Tag).collect(),
        View::Frequency => report
            .frequency
            .authors_by_count()
            .into_iter()
            .map(|(name, count)| Row::Author { name, count })
            .collect(),
        _ => Vec::new(),
    }
}

fn commit_rows(list: &[CommitInfo], side: Option<Side>) -> Vec<Row<'_>> {
    list.iter().map(|commit| Row::Commit { commit, side }).collect()
}

fn commit_fields<'a>(commit: &CommitInfo) -> Vec<Row<'a>> {
    vec![
        Row::Field {
            label: "Commit",
            value: commit.full_hash.clone(),
        },
        Row::Field {
            label: "Author",
            value: format!("{} <{}>", commit.author, commit.author_email),
        },
        Row::Field {
            label: "Date",
            value: commit.timestamp.format("%Y-%m-%d %H:%M %z").to_string(),
        },
        Row::Field {
            label: "Message",
            value: commit.message.clone(),
        },
        Row::Field {
            label: "Parents",
            value: if commit.parents.is_empty() {
                "(root commit)".to_string()
            } else {
                commit
                    .parents
                    .iter()
                    .map(|p| p.chars().take(7).collect::<String>())
                    .collect::<Vec<_>>()
                    .join(" ")
            },
        },
    ]
}
