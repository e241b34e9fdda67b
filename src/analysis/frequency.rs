//! Commit frequency histograms
//!
//! Every walked commit is counted once in each of four projections (calendar
//! day, weekday, hour of day, author), so all four always sum to the number
//! of commits walked. Buckets use the author's own clock, i.e. the UTC
//! offset recorded in the commit.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

use super::streak::StreakInfo;
use crate::git::CommitInfo;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Activity statistics for one ref's history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyData {
    pub commits_by_date: BTreeMap<NaiveDate, usize>,
    /// Indexed by days since Monday (0 = Monday, 6 = Sunday)
    pub commits_by_weekday: [usize; 7],
    /// Indexed by hour of day (0-23)
    pub commits_by_hour: [usize; 24],
    pub commits_by_author: BTreeMap<String, usize>,
    pub max_commits_per_day: usize,
    pub total_active_days: usize,
    pub total_commits: usize,
    /// The walk stopped at its limit before reaching the root
    pub truncated: bool,
    pub streaks: StreakInfo,
}

impl FrequencyData {
    /// Convenience for callers that already hold the commits in memory.
    pub fn from_commits(commits: &[CommitInfo], now: NaiveDateTime) -> Self {
        let mut acc = FrequencyAccumulator::default();
        for commit in commits {
            acc.record(commit);
        }
        acc.finish(now, false)
    }

    /// Authors ordered by commit count, most active first.
    pub fn authors_by_count(&self) -> Vec<(&str, usize)> {
        let mut authors: Vec<_> = self
            .commits_by_author
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        authors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        authors
    }

    /// Weekday with the most commits (ties go to the earlier day).
    pub fn busiest_weekday(&self) -> Option<Weekday> {
        busiest(&self.commits_by_weekday).map(|i| WEEKDAYS[i])
    }

    /// Hour of day with the most commits (ties go to the earlier hour).
    pub fn busiest_hour(&self) -> Option<u32> {
        busiest(&self.commits_by_hour).map(|i| i as u32)
    }

    /// Weekday counts labelled for display, Monday first.
    pub fn weekday_counts(&self) -> impl Iterator<Item = (Weekday, usize)> + '_ {
        WEEKDAYS.iter().copied().zip(self.commits_by_weekday.iter().copied())
    }

    /// Mean commits per active day.
    pub fn average_per_active_day(&self) -> f64 {
        if self.total_active_days == 0 {
            0.0
        } else {
            self.total_commits as f64 / self.total_active_days as f64
        }
    }
}

fn busiest(counts: &[usize]) -> Option<usize> {
    let max = *counts.iter().max()?;
    if max == 0 {
        return None;
    }
    counts.iter().position(|&c| c == max)
}

/// Streaming builder for [`FrequencyData`], fed one commit at a time.
#[derive(Debug, Default)]
pub struct FrequencyAccumulator {
    data: FrequencyData,
}

impl FrequencyAccumulator {
    pub fn record(&mut self, commit: &CommitInfo) {
        let ts = commit.timestamp;
        let data = &mut self.data;

        let per_day = data.commits_by_date.entry(ts.date_naive()).or_insert(0);
        *per_day += 1;
        data.max_commits_per_day = data.max_commits_per_day.max(*per_day);

        data.commits_by_weekday[ts.weekday().num_days_from_monday() as usize] += 1;
        data.commits_by_hour[ts.hour() as usize] += 1;
        *data
            .commits_by_author
            .entry(commit.author.clone())
            .or_insert(0) += 1;
        data.total_commits += 1;
    }

    pub fn total(&self) -> usize {
        self.data.total_commits
    }

    /// Close the histograms and compute streaks relative to `now`.
    pub fn finish(mut self, now: NaiveDateTime, truncated: bool) -> FrequencyData {
        let active_days: Vec<NaiveDate> = self.data.commits_by_date.keys().copied().collect();
        self.data.total_active_days = active_days.len();
        self.data.streaks = StreakInfo::compute(&active_days, now);
        self.data.truncated = truncated;
        self.data
    }
}
