use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streaks {
    pub current: i64,
    pub longest: i64,
}

/// Streaks over completion timestamps, counted in unique calendar days.
///
/// The current streak is anchored at `today` or yesterday; any older most
/// recent activity zeroes it. The longest streak is the longest run of
/// consecutive days anywhere in the history.
pub fn compute_streaks(timestamps: &[DateTime<Utc>], today: NaiveDate) -> Streaks {
    let unique: HashSet<NaiveDate> = timestamps.iter().map(|ts| ts.date_naive()).collect();
    if unique.is_empty() {
        return Streaks {
            current: 0,
            longest: 0,
        };
    }

    let mut days: Vec<NaiveDate> = unique.into_iter().collect();
    days.sort_by(|a, b| b.cmp(a));

    let anchor = days[0];
    let current = if anchor == today || anchor == today - Duration::days(1) {
        trailing_run(&days)
    } else {
        0
    };

    let mut longest = 1i64;
    let mut run = 1i64;
    for pair in days.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    Streaks { current, longest }
}

fn trailing_run(days_desc: &[NaiveDate]) -> i64 {
    let mut run = 1i64;
    for pair in days_desc.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
        } else {
            break;
        }
    }
    run
}
