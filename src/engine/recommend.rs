use super::types::{GrammarReport, SkillBreakdown, VocabularyReport};

const GRAMMAR_ERROR_LIMIT: i64 = 30;
const PRONUNCIATION_FLOOR: i64 = 70;
const WEEKLY_VOCAB_TARGET: usize = 10;
const WEAK_SKILL_FLOOR: i64 = 60;

/// Rule-based focus suggestions. Each rule appends independently; the
/// order is the display order.
pub fn recommended_focus(
    skills: &SkillBreakdown,
    grammar: &GrammarReport,
    vocabulary: &VocabularyReport,
    weakest_skill: &str,
    weakest_score: i64,
    current_streak: i64,
) -> Vec<String> {
    let mut focus = Vec::new();

    if grammar.error_rate > GRAMMAR_ERROR_LIMIT {
        focus.push("Grammar practice: review recent error patterns".to_string());
    }
    if skills.pronunciation.score < PRONUNCIATION_FLOOR {
        focus.push("Pronunciation exercises: accuracy is below target".to_string());
    }
    if vocabulary.weekly_new < WEEKLY_VOCAB_TARGET {
        focus.push("Vocabulary expansion: fewer than 10 new words this week".to_string());
    }
    if weakest_score < WEAK_SKILL_FLOOR {
        focus.push(format!("Focus on {weakest_skill}: weakest skill area"));
    }
    if current_streak == 0 {
        focus.push("Re-establish a daily practice habit".to_string());
    }

    focus
}

/// Threshold badges. Every qualifying badge is included; none are
/// mutually exclusive.
pub fn achievements(
    current_streak: i64,
    lessons_completed: i64,
    words_learned: usize,
    average_score: i64,
) -> Vec<String> {
    let mut earned = Vec::new();

    if current_streak >= 7 {
        earned.push("week-streak".to_string());
    }
    if current_streak >= 30 {
        earned.push("month-streak".to_string());
    }
    if lessons_completed >= 10 {
        earned.push("ten-lessons".to_string());
    }
    if lessons_completed >= 50 {
        earned.push("fifty-lessons".to_string());
    }
    if words_learned >= 100 {
        earned.push("hundred-words".to_string());
    }
    if average_score >= 80 {
        earned.push("high-scorer".to_string());
    }

    earned
}
