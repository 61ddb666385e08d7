use chrono::{DateTime, Duration, SecondsFormat, Utc};

use super::types::{LearningPace, PaceStatus};

const AHEAD_FACTOR: f64 = 1.2;
const BEHIND_FACTOR: f64 = 0.8;

/// Lessons-per-week velocity and completion prediction.
///
/// Zero velocity yields no prediction at all; the division is guarded so
/// neither NaN nor infinity can appear in a card.
pub fn learning_pace(
    completed_lessons: i64,
    total_lessons: i64,
    weeks_since_enrollment: f64,
    expected_lessons_per_week: f64,
    now: DateTime<Utc>,
) -> LearningPace {
    let weeks = weeks_since_enrollment.max(1.0);
    let actual = (completed_lessons as f64) / weeks;

    let status = if actual > expected_lessons_per_week * AHEAD_FACTOR {
        PaceStatus::Ahead
    } else if actual < expected_lessons_per_week * BEHIND_FACTOR {
        PaceStatus::Behind
    } else {
        PaceStatus::OnTrack
    };

    let remaining = (total_lessons - completed_lessons).max(0);
    let predicted_completion_weeks = if actual > 0.0 {
        Some(((remaining as f64) / actual).round() as i64)
    } else {
        None
    };

    let expected_completion = predicted_completion_weeks.map(|weeks| {
        (now + Duration::days(weeks * 7)).to_rfc3339_opts(SecondsFormat::Millis, true)
    });

    LearningPace {
        lessons_per_week: (actual * 100.0).round() / 100.0,
        status,
        predicted_completion_weeks,
        expected_completion,
    }
}
