use super::types::{GrammarReport, SkillBreakdown};

pub const ATTENTION_SCORE_FLOOR: i64 = 60;
pub const STRUGGLING_SCORE_FLOOR: i64 = 50;
pub const INACTIVITY_LIMIT_DAYS: i64 = 7;
pub const DROPOUT_GRACE_DAYS: i64 = 3;

/// The six comparable values, in the fixed ordering that breaks ties:
/// speaking, listening, reading, writing, pronunciation, grammar.
/// Grammar contributes as 100 - errorRate so all six read "higher is
/// better".
pub fn six_scores(skills: &SkillBreakdown, grammar: &GrammarReport) -> [(&'static str, i64); 6] {
    [
        ("speaking", skills.speaking.score),
        ("listening", skills.listening.score),
        ("reading", skills.reading.score),
        ("writing", skills.writing.score),
        ("pronunciation", skills.pronunciation.score),
        ("grammar", 100 - grammar.error_rate),
    ]
}

pub fn average_score(scores: &[(&'static str, i64); 6]) -> i64 {
    let sum: i64 = scores.iter().map(|(_, s)| *s).sum();
    ((sum as f64) / 6.0).round().clamp(0.0, 100.0) as i64
}

pub fn strongest_skill(scores: &[(&'static str, i64); 6]) -> &'static str {
    let mut best = scores[0];
    for &entry in &scores[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
    }
    best.0
}

pub fn weakest_skill(scores: &[(&'static str, i64); 6]) -> &'static str {
    let mut worst = scores[0];
    for &entry in &scores[1..] {
        if entry.1 < worst.1 {
            worst = entry;
        }
    }
    worst.0
}

pub fn struggling_areas(scores: &[(&'static str, i64); 6]) -> Vec<String> {
    scores
        .iter()
        .filter(|(_, s)| *s < STRUGGLING_SCORE_FLOOR)
        .map(|(name, _)| name.to_string())
        .collect()
}

pub fn needs_attention(average: i64, inactivity_days: i64) -> bool {
    average < ATTENTION_SCORE_FLOOR || inactivity_days > INACTIVITY_LIMIT_DAYS
}

pub fn at_risk_of_dropout(current_streak: i64, inactivity_days: i64) -> bool {
    inactivity_days > INACTIVITY_LIMIT_DAYS
        || (current_streak == 0 && inactivity_days > DROPOUT_GRACE_DAYS)
}

/// Composite 0..=100 engagement metric. Weighted sum over a base of 50:
/// capped streak bonus, recency bonus decaying to zero after ten idle
/// days, capped daily-time bonus, and a completion bonus.
pub fn engagement_score(
    current_streak: i64,
    inactivity_days: i64,
    average_daily_minutes: f64,
    overall_progress: i64,
) -> i64 {
    let streak_bonus = ((current_streak as f64) * 2.0).min(20.0);
    let recency_bonus = (20.0 - (inactivity_days as f64) * 2.0).max(0.0);
    let time_bonus = (average_daily_minutes / 3.0).min(20.0);
    let completion_bonus = (overall_progress as f64) * 0.1;

    let score = 50.0 + streak_bonus + recency_bonus + time_bonus + completion_bonus;
    score.clamp(0.0, 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{GrammarTrend, SkillReport, Trend};

    fn skills(scores: [i64; 5]) -> SkillBreakdown {
        let report = |score| SkillReport {
            score,
            trend: Trend::Stable,
            sessions: 1,
        };
        SkillBreakdown {
            speaking: report(scores[0]),
            listening: report(scores[1]),
            reading: report(scores[2]),
            writing: report(scores[3]),
            pronunciation: report(scores[4]),
        }
    }

    fn grammar(error_rate: i64) -> GrammarReport {
        GrammarReport {
            error_rate,
            trend: GrammarTrend::Stable,
            total_errors: 10,
        }
    }

    #[test]
    fn grammar_enters_average_inverted() {
        let scores = six_scores(&skills([60, 60, 60, 60, 60]), &grammar(40));
        // Five 60s plus grammar 60.
        assert_eq!(average_score(&scores), 60);
    }

    #[test]
    fn ties_break_on_fixed_order() {
        let scores = six_scores(&skills([70, 70, 70, 70, 70]), &grammar(30));
        assert_eq!(strongest_skill(&scores), "speaking");
        assert_eq!(weakest_skill(&scores), "speaking");
    }

    #[test]
    fn extremes_are_found() {
        let scores = six_scores(&skills([55, 90, 62, 48, 70]), &grammar(20));
        assert_eq!(strongest_skill(&scores), "listening");
        assert_eq!(weakest_skill(&scores), "writing");
    }

    #[test]
    fn struggling_areas_are_below_fifty() {
        let scores = six_scores(&skills([45, 80, 49, 50, 70]), &grammar(60));
        assert_eq!(struggling_areas(&scores), vec!["speaking", "reading", "grammar"]);
    }

    #[test]
    fn attention_flags_low_average_or_inactivity() {
        assert!(needs_attention(59, 0));
        assert!(needs_attention(90, 8));
        assert!(!needs_attention(60, 7));
    }

    #[test]
    fn dropout_risk_matches_rule() {
        assert!(at_risk_of_dropout(5, 8));
        assert!(at_risk_of_dropout(0, 4));
        assert!(!at_risk_of_dropout(0, 3));
        assert!(!at_risk_of_dropout(2, 5));
    }

    #[test]
    fn engagement_clamps_at_ceiling() {
        let score = engagement_score(100, 0, 1000.0, 100);
        assert_eq!(score, 100);
    }

    #[test]
    fn engagement_baseline_for_idle_learner() {
        // No streak, long idle, no time, no progress: base only.
        let score = engagement_score(0, 999, 0.0, 0);
        assert_eq!(score, 50);
    }

    #[test]
    fn engagement_recency_decays_to_zero_after_ten_days() {
        let at_ten = engagement_score(0, 10, 0.0, 0);
        let at_eleven = engagement_score(0, 11, 0.0, 0);
        assert_eq!(at_ten, at_eleven);
    }
}
