//! Property-based checks for the progress aggregation invariants:
//! streak day-truncation idempotence, trend deadband, score clamping,
//! zero-velocity prediction safety, and risk-flag consistency.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use lingodash_backend::config::EngineConfig;
use lingodash_backend::engine::card::{build_card, LearnerRows};
use lingodash_backend::engine::pace::learning_pace;
use lingodash_backend::engine::scorecard::{at_risk_of_dropout, engagement_score};
use lingodash_backend::engine::skills::skill_report;
use lingodash_backend::engine::streak::compute_streaks;
use lingodash_backend::engine::trend::{score_trend, TREND_DEADBAND};
use lingodash_backend::engine::types::Trend;
use lingodash_backend::identity::LearnerIdentity;
use lingodash_backend::store::{ActivityRecord, Skill, SkillScoreRecord};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn arb_timestamps() -> impl Strategy<Value = Vec<DateTime<Utc>>> {
    prop::collection::vec((0i64..90, 0u32..24, 0u32..60), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(days_ago, hour, minute)| {
                let date = fixed_now().date_naive() - Duration::days(days_ago);
                Utc.from_utc_datetime(
                    &date.and_hms_opt(hour, minute, 0).expect("valid time"),
                )
            })
            .collect()
    })
}

fn arb_scores() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u32..=1000).prop_map(|v| v as f64 / 10.0), 0..12)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

proptest! {
    #[test]
    fn streaks_are_idempotent_under_day_truncation(timestamps in arb_timestamps()) {
        let today = fixed_now().date_naive();
        let truncated: Vec<DateTime<Utc>> = timestamps
            .iter()
            .map(|ts| Utc.from_utc_datetime(&ts.date_naive().and_hms_opt(0, 0, 0).unwrap()))
            .collect();

        prop_assert_eq!(
            compute_streaks(&timestamps, today),
            compute_streaks(&truncated, today)
        );
    }

    #[test]
    fn current_streak_never_exceeds_longest(timestamps in arb_timestamps()) {
        let streaks = compute_streaks(&timestamps, fixed_now().date_naive());
        prop_assert!(streaks.current >= 0);
        prop_assert!(streaks.current <= streaks.longest);
    }

    #[test]
    fn trend_respects_deadband(scores in arb_scores()) {
        let trend = score_trend(&scores);
        let recent = &scores[..scores.len().min(3)];
        let older = if scores.len() > 3 {
            &scores[3..scores.len().min(6)]
        } else {
            &[]
        };

        if recent.is_empty() || older.is_empty() {
            prop_assert_eq!(trend, Trend::Stable);
        } else {
            let delta = mean(recent) - mean(older);
            match trend {
                Trend::Up => prop_assert!(delta > TREND_DEADBAND),
                Trend::Down => prop_assert!(delta < -TREND_DEADBAND),
                Trend::Stable => prop_assert!(delta.abs() <= TREND_DEADBAND),
            }
        }
    }

    #[test]
    fn engagement_always_in_range(
        streak in 0i64..500,
        inactivity in 0i64..2000,
        minutes in 0.0f64..10_000.0,
        progress in 0i64..=100,
    ) {
        let score = engagement_score(streak, inactivity, minutes, progress);
        prop_assert!((0..=100).contains(&score));
    }

    #[test]
    fn skill_scores_always_in_range(scores in arb_scores()) {
        let records: Vec<SkillScoreRecord> = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| SkillScoreRecord {
                learner_id: "learner".to_string(),
                skill: Skill::Reading,
                score,
                created_at: fixed_now() - Duration::days(i as i64),
                session_id: format!("s{i}"),
            })
            .collect();
        let report = skill_report(&records);
        prop_assert!((0..=100).contains(&report.score));
    }

    #[test]
    fn zero_velocity_never_predicts(
        total in 0i64..200,
        weeks in 0.0f64..100.0,
        target in 0.1f64..20.0,
    ) {
        let pace = learning_pace(0, total, weeks, target, fixed_now());
        prop_assert!(pace.predicted_completion_weeks.is_none());
        prop_assert!(pace.expected_completion.is_none());
        prop_assert!(pace.lessons_per_week.is_finite());
    }

    #[test]
    fn pace_is_always_finite(
        completed in 0i64..200,
        extra in 0i64..200,
        weeks in 0.0f64..100.0,
        target in 0.1f64..20.0,
    ) {
        let pace = learning_pace(completed, completed + extra, weeks, target, fixed_now());
        prop_assert!(pace.lessons_per_week.is_finite());
        if let Some(predicted) = pace.predicted_completion_weeks {
            prop_assert!(predicted >= 0);
        }
    }

    #[test]
    fn risk_flag_matches_rule_on_cards(timestamps in arb_timestamps()) {
        let identity = LearnerIdentity::placeholder("learner-prop");
        let mut rows = LearnerRows::default();
        for (i, ts) in timestamps.iter().enumerate() {
            rows.activity.push(ActivityRecord {
                learner_id: identity.learner_id.clone(),
                completed_at: *ts,
                task_id: format!("task-{i}"),
                course_id: "course".to_string(),
            });
        }

        let card = build_card(&identity, rows, fixed_now(), &EngineConfig::default());
        let expected = card.inactivity_days > 7
            || (card.current_streak == 0 && card.inactivity_days > 3);
        prop_assert_eq!(card.at_risk_of_dropout, expected);
        prop_assert_eq!(
            card.at_risk_of_dropout,
            at_risk_of_dropout(card.current_streak, card.inactivity_days)
        );
        prop_assert!((0..=100).contains(&card.engagement_score));
        prop_assert!((0..=100).contains(&card.overall_progress));
        prop_assert!(card.lessons_completed <= card.total_lessons);
    }
}
