use super::types::{GrammarTrend, Trend};

/// Deadband in score points. Differences inside it read as noise, not a
/// trend, so the direction stays stable instead of flapping.
pub const TREND_DEADBAND: f64 = 5.0;

const WINDOW: usize = 3;

/// Direction of a recency-ordered score sequence (most recent first).
///
/// Compares the mean of the first three scores against the mean of the
/// next three. An empty window on either side means there is nothing to
/// compare, which is reported as stable.
pub fn score_trend(scores_recent_first: &[f64]) -> Trend {
    let recent = &scores_recent_first[..scores_recent_first.len().min(WINDOW)];
    let older_end = scores_recent_first.len().min(WINDOW * 2);
    let older = if scores_recent_first.len() > WINDOW {
        &scores_recent_first[WINDOW..older_end]
    } else {
        &[]
    };

    if recent.is_empty() || older.is_empty() {
        return Trend::Stable;
    }

    let recent_mean = mean(recent);
    let older_mean = mean(older);

    if recent_mean > older_mean + TREND_DEADBAND {
        Trend::Up
    } else if recent_mean < older_mean - TREND_DEADBAND {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Grammar direction over high-severity flags, most recent record first.
///
/// Looks at the most recent 10 records split into two equal halves; fewer
/// HIGH errors in the newer half is an improvement.
pub fn grammar_trend(high_severity_recent_first: &[bool]) -> GrammarTrend {
    let window: Vec<bool> = high_severity_recent_first.iter().take(10).copied().collect();
    let half = window.len() / 2;
    if half == 0 {
        return GrammarTrend::Stable;
    }

    let recent_high = window[..half].iter().filter(|&&h| h).count();
    let older_high = window[half..half * 2].iter().filter(|&&h| h).count();

    match recent_high.cmp(&older_high) {
        std::cmp::Ordering::Less => GrammarTrend::Improving,
        std::cmp::Ordering::Greater => GrammarTrend::Declining,
        std::cmp::Ordering::Equal => GrammarTrend::Stable,
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_scores_are_stable() {
        assert_eq!(score_trend(&[]), Trend::Stable);
        assert_eq!(score_trend(&[80.0]), Trend::Stable);
        assert_eq!(score_trend(&[80.0, 70.0, 60.0]), Trend::Stable);
    }

    #[test]
    fn clear_improvement_reads_up() {
        let scores = [90.0, 88.0, 86.0, 70.0, 72.0, 71.0];
        assert_eq!(score_trend(&scores), Trend::Up);
    }

    #[test]
    fn clear_decline_reads_down() {
        let scores = [50.0, 52.0, 48.0, 75.0, 70.0, 72.0];
        assert_eq!(score_trend(&scores), Trend::Down);
    }

    #[test]
    fn deadband_suppresses_small_moves() {
        // Recent mean 72, older mean 70: inside the 5-point deadband.
        let scores = [72.0, 72.0, 72.0, 70.0, 70.0, 70.0];
        assert_eq!(score_trend(&scores), Trend::Stable);
    }

    #[test]
    fn exactly_five_points_apart_is_stable() {
        let scores = [75.0, 75.0, 75.0, 70.0, 70.0, 70.0];
        assert_eq!(score_trend(&scores), Trend::Stable);
    }

    #[test]
    fn partial_older_window_still_compares() {
        // Four scores: recent [90, 90, 90] vs older [60].
        let scores = [90.0, 90.0, 90.0, 60.0];
        assert_eq!(score_trend(&scores), Trend::Up);
    }

    #[test]
    fn grammar_fewer_recent_highs_is_improving() {
        let flags = [
            false, false, true, false, false, // recent half, 1 high
            true, true, false, true, false, // older half, 3 high
        ];
        assert_eq!(grammar_trend(&flags), GrammarTrend::Improving);
    }

    #[test]
    fn grammar_more_recent_highs_is_declining() {
        let flags = [
            true, true, true, false, false, //
            true, false, false, false, false,
        ];
        assert_eq!(grammar_trend(&flags), GrammarTrend::Declining);
    }

    #[test]
    fn grammar_single_record_is_stable() {
        assert_eq!(grammar_trend(&[true]), GrammarTrend::Stable);
        assert_eq!(grammar_trend(&[]), GrammarTrend::Stable);
    }

    #[test]
    fn grammar_short_history_splits_in_half() {
        // Four records: halves of two. Recent [t, f] vs older [t, t].
        let flags = [true, false, true, true];
        assert_eq!(grammar_trend(&flags), GrammarTrend::Improving);
    }
}
