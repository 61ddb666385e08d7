use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};

use crate::config::EngineConfig;
use crate::identity::LearnerIdentity;
use crate::store::{
    ActivityRecord, GrammarErrorRecord, LessonProgressRecord, Skill, SkillScoreRecord,
    VocabularyRecord,
};

use super::pace::learning_pace;
use super::recommend::{achievements, recommended_focus};
use super::scorecard::{
    at_risk_of_dropout, average_score, engagement_score, needs_attention, six_scores,
    strongest_skill, struggling_areas, weakest_skill,
};
use super::skills::{grammar_report, skill_report, vocabulary_report};
use super::streak::compute_streaks;
use super::types::{ProgressCard, SkillBreakdown};

/// Inactivity reported for a learner with no activity rows at all. Far
/// past every threshold, so such a learner reads as maximally inactive.
pub const NO_ACTIVITY_SENTINEL_DAYS: i64 = 999;

/// Crude duration proxy: the platform records no task durations, so each
/// completion is assumed to take this long.
const MINUTES_PER_TASK: f64 = 15.0;

const CALENDAR_DAYS: i64 = 30;

/// One learner's raw rows, already partitioned out of the cohort fetches.
#[derive(Debug, Default)]
pub struct LearnerRows {
    pub activity: Vec<ActivityRecord>,
    pub skill_scores: HashMap<Skill, Vec<SkillScoreRecord>>,
    pub grammar_errors: Vec<GrammarErrorRecord>,
    pub vocabulary: Vec<VocabularyRecord>,
    pub lessons: Vec<LessonProgressRecord>,
}

/// Assemble one ProgressCard from one learner's rows. Pure with respect
/// to `now`; every call recomputes from scratch.
pub fn build_card(
    identity: &LearnerIdentity,
    mut rows: LearnerRows,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> ProgressCard {
    rows.activity.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    for records in rows.skill_scores.values_mut() {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    rows.grammar_errors.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let today = now.date_naive();
    let timestamps: Vec<DateTime<Utc>> = rows.activity.iter().map(|r| r.completed_at).collect();
    let streaks = compute_streaks(&timestamps, today);

    let last_active = rows.activity.first().map(|r| r.completed_at);
    let inactivity_days = last_active
        .map(|ts| (today - ts.date_naive()).num_days().max(0))
        .unwrap_or(NO_ACTIVITY_SENTINEL_DAYS);

    let activity_calendar = calendar(&rows.activity, now);
    let most_active_hour = most_active_hour(&rows.activity);

    let empty: Vec<SkillScoreRecord> = Vec::new();
    let report_for = |skill: Skill| skill_report(rows.skill_scores.get(&skill).unwrap_or(&empty));
    let skills = SkillBreakdown {
        speaking: report_for(Skill::Speaking),
        listening: report_for(Skill::Listening),
        reading: report_for(Skill::Reading),
        writing: report_for(Skill::Writing),
        pronunciation: report_for(Skill::Pronunciation),
    };

    let grammar = grammar_report(&rows.grammar_errors);
    let vocabulary = vocabulary_report(&rows.vocabulary, now);

    let lessons_completed = rows
        .lessons
        .iter()
        .filter(|l| l.completion_pct >= 100.0)
        .count() as i64;
    let total_lessons = if rows.lessons.is_empty() {
        config.course_lesson_fallback
    } else {
        rows.lessons.len() as i64
    }
    .max(lessons_completed);

    let overall_progress = overall_progress(
        &rows.lessons,
        vocabulary.words_learned,
        rows.activity.len(),
    );

    let scores = six_scores(&skills, &grammar);
    // With no assessments at all there is nothing to average; grammar's
    // inverted contribution must not read as a clean slate.
    let assessed = rows.skill_scores.values().any(|records| !records.is_empty())
        || !rows.grammar_errors.is_empty();
    let average = if assessed { average_score(&scores) } else { 0 };
    let strongest = strongest_skill(&scores);
    let weakest = weakest_skill(&scores);
    let weakest_score = scores
        .iter()
        .find(|(name, _)| *name == weakest)
        .map(|(_, s)| *s)
        .unwrap_or(0);

    let recent_tasks = rows
        .activity
        .iter()
        .filter(|r| r.completed_at >= now - Duration::days(7))
        .count();
    let average_daily_minutes = (recent_tasks as f64) * MINUTES_PER_TASK / 7.0;

    let engagement = engagement_score(
        streaks.current,
        inactivity_days,
        average_daily_minutes,
        overall_progress,
    );

    let weeks_since_enrollment = weeks_since_enrollment(&rows, now);
    let pace = learning_pace(
        lessons_completed,
        total_lessons,
        weeks_since_enrollment,
        config.expected_lessons_per_week,
        now,
    );

    let recommended_focus = recommended_focus(
        &skills,
        &grammar,
        &vocabulary,
        weakest,
        weakest_score,
        streaks.current,
    );
    let achievements = achievements(
        streaks.current,
        lessons_completed,
        vocabulary.words_learned,
        average,
    );

    ProgressCard {
        id: identity.learner_id.clone(),
        name: identity.name.clone(),
        email: identity.email.clone(),
        overall_progress,
        lessons_completed,
        total_lessons,
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        inactivity_days,
        last_active_date: last_active.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        activity_calendar,
        most_active_hour,
        grammar,
        vocabulary,
        average_score: average,
        strongest_skill: strongest.to_string(),
        weakest_skill: weakest.to_string(),
        struggling_areas: struggling_areas(&scores),
        engagement_score: engagement,
        needs_attention: needs_attention(average, inactivity_days),
        at_risk_of_dropout: at_risk_of_dropout(streaks.current, inactivity_days),
        pace,
        recommended_focus,
        achievements,
        skills,
    }
}

/// Mean lesson completion when lesson rows exist. Otherwise a synthetic
/// blend of vocabulary and task counts over a fixed 200-unit denominator
/// (the source used several denominators here; one is standardized).
fn overall_progress(
    lessons: &[LessonProgressRecord],
    words_learned: usize,
    tasks_completed: usize,
) -> i64 {
    if lessons.is_empty() {
        let synthetic = ((words_learned + tasks_completed) as f64) / 200.0 * 100.0;
        return synthetic.clamp(0.0, 100.0).round() as i64;
    }

    let sum: f64 = lessons.iter().map(|l| l.completion_pct.clamp(0.0, 100.0)).sum();
    (sum / lessons.len() as f64).round().clamp(0.0, 100.0) as i64
}

fn weeks_since_enrollment(rows: &LearnerRows, now: DateTime<Utc>) -> f64 {
    let mut earliest: Option<DateTime<Utc>> = None;
    let mut consider = |ts: DateTime<Utc>| {
        earliest = Some(match earliest {
            Some(current) if current <= ts => current,
            _ => ts,
        });
    };

    for record in &rows.activity {
        consider(record.completed_at);
    }
    for record in &rows.lessons {
        consider(record.last_accessed_at);
    }
    for record in &rows.vocabulary {
        consider(record.first_seen_at);
    }

    match earliest {
        Some(start) => ((now - start).num_days().max(0) as f64 / 7.0).max(1.0),
        None => 1.0,
    }
}

fn calendar(activity: &[ActivityRecord], now: DateTime<Utc>) -> BTreeMap<String, i64> {
    let cutoff = now - Duration::days(CALENDAR_DAYS);
    let mut days: BTreeMap<String, i64> = BTreeMap::new();
    for record in activity {
        if record.completed_at < cutoff {
            continue;
        }
        let key = record.completed_at.date_naive().format("%Y-%m-%d").to_string();
        *days.entry(key).or_insert(0) += 1;
    }
    days
}

fn most_active_hour(activity: &[ActivityRecord]) -> Option<u32> {
    if activity.is_empty() {
        return None;
    }
    let mut counts = [0i64; 24];
    for record in activity {
        counts[record.completed_at.hour() as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .max_by_key(|&(hour, &count)| (count, std::cmp::Reverse(hour)))
        .map(|(hour, _)| hour as u32)
}
