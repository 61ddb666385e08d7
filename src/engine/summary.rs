use super::scorecard::INACTIVITY_LIMIT_DAYS;
use super::types::{CohortSummary, ProgressCard};

/// Simple reduction over all cards in the request. Active means activity
/// within the inactivity limit; at-risk reuses the per-card flag so the
/// counts can never disagree with the cards.
pub fn summarize(cards: &[ProgressCard]) -> CohortSummary {
    let total = cards.len();
    let active = cards
        .iter()
        .filter(|c| c.inactivity_days <= INACTIVITY_LIMIT_DAYS)
        .count();
    let at_risk = cards.iter().filter(|c| c.at_risk_of_dropout).count();

    CohortSummary {
        total_students: total,
        active_students: active,
        at_risk_students: at_risk,
        average_progress: rounded_mean(cards.iter().map(|c| c.overall_progress)),
        average_engagement: rounded_mean(cards.iter().map(|c| c.engagement_score)),
    }
}

fn rounded_mean(values: impl Iterator<Item = i64>) -> i64 {
    let collected: Vec<i64> = values.collect();
    if collected.is_empty() {
        return 0;
    }
    let sum: i64 = collected.iter().sum();
    ((sum as f64) / collected.len() as f64).round() as i64
}
