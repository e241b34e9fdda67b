//! Commit streak detection
//!
//! A streak is a run of calendar days that each saw at least one commit.
//! Two tolerances are applied, matching how the numbers have always been
//! reported:
//!
//! - the longest run continues while consecutive active days are at most
//!   [`LONGEST_GAP_HOURS`] apart;
//! - the current run is anchored at "now" and accepts the n-th most recent
//!   active day while its midnight lies within `(n + 1) * 24 + 12` hours of now.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Largest gap between two active days that keeps a historical run alive
pub const LONGEST_GAP_HOURS: i64 = 36;

/// Slack added to the widening window of the current streak
const CURRENT_SLACK_HOURS: i64 = 12;

/// Current and longest runs of consecutive active days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakInfo {
    /// Length of the run that reaches up to now (0 when it is broken)
    pub current: usize,
    /// First day of the current run
    pub current_start: Option<NaiveDate>,
    /// Length of the longest run ever seen, including the current one
    pub longest: usize,
    pub longest_start: Option<NaiveDate>,
    pub longest_end: Option<NaiveDate>,
}

impl StreakInfo {
    /// Compute streaks from distinct active days sorted ascending.
    pub fn compute(active_days: &[NaiveDate], now: NaiveDateTime) -> Self {
        let mut info = StreakInfo::default();

        let mut run = 0usize;
        let mut run_start: Option<NaiveDate> = None;
        let mut prev: Option<NaiveDate> = None;
        for &day in active_days {
            let continues = prev
                .map(|p| day.signed_duration_since(p).num_hours() <= LONGEST_GAP_HOURS)
                .unwrap_or(false);
            if continues {
                run += 1;
            } else {
                run = 1;
                run_start = Some(day);
            }
            if run > info.longest {
                info.longest = run;
                info.longest_start = run_start;
                info.longest_end = Some(day);
            }
            prev = Some(day);
        }

        for &day in active_days.iter().rev() {
            let elapsed = now.signed_duration_since(day.and_time(NaiveTime::MIN));
            let window = Duration::hours((info.current as i64 + 1) * 24 + CURRENT_SLACK_HOURS);
            if elapsed > window {
                break;
            }
            info.current += 1;
            info.current_start = Some(day);
        }

        if info.current > info.longest {
            info.longest = info.current;
            info.longest_start = info.current_start;
            info.longest_end = active_days.last().copied();
        }

        info
    }
}
