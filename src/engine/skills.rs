use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::store::{GrammarErrorRecord, Severity, SkillScoreRecord, VocabularyRecord};

use super::trend::{grammar_trend, mean, score_trend};
use super::types::{GrammarReport, SkillReport, VocabularyReport};

/// Per-skill report from one learner's records for that skill, most
/// recent first. No records means a zero score and a stable trend.
pub fn skill_report(records_recent_first: &[SkillScoreRecord]) -> SkillReport {
    let scores: Vec<f64> = records_recent_first.iter().map(|r| r.score).collect();
    let score = mean(&scores).round().clamp(0.0, 100.0) as i64;

    SkillReport {
        score,
        trend: score_trend(&scores),
        sessions: records_recent_first.len(),
    }
}

/// Grammar is inverted: errorRate is the share of HIGH-severity records,
/// so lower is better.
pub fn grammar_report(records_recent_first: &[GrammarErrorRecord]) -> GrammarReport {
    let total = records_recent_first.len();
    let high_flags: Vec<bool> = records_recent_first
        .iter()
        .map(|r| r.severity == Severity::High)
        .collect();

    let error_rate = if total == 0 {
        0
    } else {
        let high = high_flags.iter().filter(|&&h| h).count();
        ((high as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as i64
    };

    GrammarReport {
        error_rate,
        trend: grammar_trend(&high_flags),
        total_errors: total,
    }
}

/// All vocabulary metrics count distinct terms. Rows may repeat a term,
/// so exposure counts are pooled and first-seen takes the earliest row.
pub fn vocabulary_report(records: &[VocabularyRecord], now: DateTime<Utc>) -> VocabularyReport {
    let mut terms: BTreeMap<&str, (DateTime<Utc>, i64, i64)> = BTreeMap::new();
    for record in records {
        let entry = terms
            .entry(record.term.as_str())
            .or_insert((record.first_seen_at, 0, 0));
        entry.0 = entry.0.min(record.first_seen_at);
        entry.1 += record.times_seen;
        entry.2 += record.times_correct;
    }

    let words_learned = terms.len();

    let week_ago = now - Duration::days(7);
    let weekly_new = terms
        .values()
        .filter(|(first_seen, _, _)| *first_seen >= week_ago)
        .count();

    let retention_rate = if terms.is_empty() {
        0
    } else {
        let retained = terms
            .values()
            .filter(|(_, seen, correct)| *correct as f64 > *seen as f64 * 0.7)
            .count();
        ((retained as f64 / terms.len() as f64) * 100.0)
            .round()
            .clamp(0.0, 100.0) as i64
    };

    VocabularyReport {
        words_learned,
        weekly_new,
        retention_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{GrammarTrend, Trend};
    use crate::store::Skill;

    fn score_record(score: f64, days_ago: i64) -> SkillScoreRecord {
        SkillScoreRecord {
            learner_id: "learner-1".to_string(),
            skill: Skill::Speaking,
            score,
            created_at: Utc::now() - Duration::days(days_ago),
            session_id: format!("session-{days_ago}"),
        }
    }

    fn grammar_record(severity: Severity, days_ago: i64) -> GrammarErrorRecord {
        GrammarErrorRecord {
            learner_id: "learner-1".to_string(),
            severity,
            created_at: Utc::now() - Duration::days(days_ago),
            error_type: "word-order".to_string(),
        }
    }

    fn vocab_record(term: &str, seen: i64, correct: i64, days_ago: i64) -> VocabularyRecord {
        VocabularyRecord {
            learner_id: "learner-1".to_string(),
            term: term.to_string(),
            first_seen_at: Utc::now() - Duration::days(days_ago),
            times_seen: seen,
            times_correct: correct,
        }
    }

    #[test]
    fn empty_skill_is_zero_and_stable() {
        let report = skill_report(&[]);
        assert_eq!(report.score, 0);
        assert_eq!(report.trend, Trend::Stable);
        assert_eq!(report.sessions, 0);
    }

    #[test]
    fn skill_score_is_rounded_mean() {
        let records = vec![score_record(80.0, 0), score_record(71.0, 1)];
        let report = skill_report(&records);
        assert_eq!(report.score, 76); // (80 + 71) / 2 = 75.5 rounds up
        assert_eq!(report.sessions, 2);
    }

    #[test]
    fn improving_scores_trend_up() {
        let records: Vec<_> = [92.0, 90.0, 88.0, 70.0, 68.0, 72.0]
            .iter()
            .enumerate()
            .map(|(i, &s)| score_record(s, i as i64))
            .collect();
        assert_eq!(skill_report(&records).trend, Trend::Up);
    }

    #[test]
    fn grammar_error_rate_counts_high_only() {
        let records = vec![
            grammar_record(Severity::High, 0),
            grammar_record(Severity::Low, 1),
            grammar_record(Severity::Medium, 2),
            grammar_record(Severity::High, 3),
        ];
        let report = grammar_report(&records);
        assert_eq!(report.error_rate, 50);
        assert_eq!(report.total_errors, 4);
    }

    #[test]
    fn grammar_empty_is_clean() {
        let report = grammar_report(&[]);
        assert_eq!(report.error_rate, 0);
        assert_eq!(report.trend, GrammarTrend::Stable);
    }

    #[test]
    fn vocabulary_counts_distinct_terms() {
        let records = vec![
            vocab_record("hola", 10, 9, 30),
            vocab_record("hola", 5, 5, 30),
            vocab_record("gracias", 8, 2, 2),
        ];
        let report = vocabulary_report(&records, Utc::now());
        assert_eq!(report.words_learned, 2);
        assert_eq!(report.weekly_new, 1);
    }

    #[test]
    fn repeated_rows_of_a_recent_term_count_once() {
        let records = vec![
            vocab_record("hola", 3, 3, 2),
            vocab_record("hola", 2, 2, 2),
        ];
        let report = vocabulary_report(&records, Utc::now());
        assert_eq!(report.weekly_new, 1);
        assert_eq!(report.words_learned, 1);
    }

    #[test]
    fn retention_pools_exposure_per_term() {
        // "hola" pools to 9 of 15 and misses the bar; "sol" clears it.
        let records = vec![
            vocab_record("hola", 10, 9, 10),
            vocab_record("hola", 5, 0, 10),
            vocab_record("sol", 4, 4, 10),
        ];
        let report = vocabulary_report(&records, Utc::now());
        assert_eq!(report.retention_rate, 50);
    }

    #[test]
    fn retention_uses_seventy_percent_bar() {
        // 9/10 and 5/5 clear the bar, 2/8 does not.
        let records = vec![
            vocab_record("uno", 10, 9, 10),
            vocab_record("dos", 5, 5, 10),
            vocab_record("tres", 8, 2, 10),
        ];
        let report = vocabulary_report(&records, Utc::now());
        assert_eq!(report.retention_rate, 67);
    }
}
