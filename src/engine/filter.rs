use std::collections::BTreeMap;

use serde::Serialize;

use super::scorecard::{ATTENTION_SCORE_FLOOR, INACTIVITY_LIMIT_DAYS};
use super::types::ProgressCard;

const HIGH_ACHIEVER_FLOOR: i64 = 80;
const LONG_STREAK_FLOOR: i64 = 7;
const GRAMMAR_ISSUE_LIMIT: i64 = 30;

/// Named boolean predicates over a ProgressCard. The thresholds must
/// match the per-card flags exactly; the UI shows per-filter counts next
/// to the flags and the two must never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressFilter {
    #[serde(rename = "high-achievers")]
    HighAchievers,
    #[serde(rename = "struggling")]
    Struggling,
    #[serde(rename = "long-streaks")]
    LongStreaks,
    #[serde(rename = "grammar-issues")]
    GrammarIssues,
    #[serde(rename = "at-risk")]
    AtRisk,
    #[serde(rename = "needs-attention")]
    NeedsAttention,
    #[serde(rename = "inactive")]
    Inactive,
}

impl ProgressFilter {
    pub const ALL: [ProgressFilter; 7] = [
        ProgressFilter::HighAchievers,
        ProgressFilter::Struggling,
        ProgressFilter::LongStreaks,
        ProgressFilter::GrammarIssues,
        ProgressFilter::AtRisk,
        ProgressFilter::NeedsAttention,
        ProgressFilter::Inactive,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "high-achievers" => Some(ProgressFilter::HighAchievers),
            "struggling" => Some(ProgressFilter::Struggling),
            "long-streaks" => Some(ProgressFilter::LongStreaks),
            "grammar-issues" => Some(ProgressFilter::GrammarIssues),
            "at-risk" => Some(ProgressFilter::AtRisk),
            "needs-attention" => Some(ProgressFilter::NeedsAttention),
            "inactive" => Some(ProgressFilter::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressFilter::HighAchievers => "high-achievers",
            ProgressFilter::Struggling => "struggling",
            ProgressFilter::LongStreaks => "long-streaks",
            ProgressFilter::GrammarIssues => "grammar-issues",
            ProgressFilter::AtRisk => "at-risk",
            ProgressFilter::NeedsAttention => "needs-attention",
            ProgressFilter::Inactive => "inactive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProgressFilter::HighAchievers => "average score at least 80",
            ProgressFilter::Struggling => "average score below 60",
            ProgressFilter::LongStreaks => "current streak of 7 days or more",
            ProgressFilter::GrammarIssues => "grammar error rate above 30%",
            ProgressFilter::AtRisk => "flagged at risk of dropout",
            ProgressFilter::NeedsAttention => "flagged as needing attention",
            ProgressFilter::Inactive => "no activity for more than 7 days",
        }
    }

    pub fn matches(&self, card: &ProgressCard) -> bool {
        match self {
            ProgressFilter::HighAchievers => card.average_score >= HIGH_ACHIEVER_FLOOR,
            ProgressFilter::Struggling => card.average_score < ATTENTION_SCORE_FLOOR,
            ProgressFilter::LongStreaks => card.current_streak >= LONG_STREAK_FLOOR,
            ProgressFilter::GrammarIssues => card.grammar.error_rate > GRAMMAR_ISSUE_LIMIT,
            ProgressFilter::AtRisk => card.at_risk_of_dropout,
            ProgressFilter::NeedsAttention => card.needs_attention,
            ProgressFilter::Inactive => card.inactivity_days > INACTIVITY_LIMIT_DAYS,
        }
    }
}

/// Multiple active filters combine with logical AND.
pub fn apply_filters(cards: Vec<ProgressCard>, filters: &[ProgressFilter]) -> Vec<ProgressCard> {
    if filters.is_empty() {
        return cards;
    }
    cards
        .into_iter()
        .filter(|card| filters.iter().all(|f| f.matches(card)))
        .collect()
}

/// Per-filter match counts over the unfiltered cohort.
pub fn filter_counts(cards: &[ProgressCard]) -> BTreeMap<&'static str, usize> {
    ProgressFilter::ALL
        .iter()
        .map(|filter| {
            (
                filter.as_str(),
                cards.iter().filter(|card| filter.matches(card)).count(),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Engagement,
    Progress,
    LastActive,
    Name,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "engagement" => Some(SortOrder::Engagement),
            "progress" => Some(SortOrder::Progress),
            "last-active" => Some(SortOrder::LastActive),
            "name" => Some(SortOrder::Name),
            _ => None,
        }
    }
}

pub fn sort_cards(cards: &mut [ProgressCard], order: SortOrder) {
    match order {
        SortOrder::Engagement => {
            cards.sort_by(|a, b| b.engagement_score.cmp(&a.engagement_score))
        }
        SortOrder::Progress => cards.sort_by(|a, b| b.overall_progress.cmp(&a.overall_progress)),
        SortOrder::LastActive => {
            // None (never active) sorts last.
            cards.sort_by(|a, b| b.last_active_date.cmp(&a.last_active_date))
        }
        SortOrder::Name => {
            cards.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::card::{build_card, LearnerRows};
    use crate::identity::LearnerIdentity;
    use chrono::Utc;

    fn idle_card(name: &str) -> ProgressCard {
        let identity = LearnerIdentity {
            learner_id: name.to_string(),
            name: name.to_string(),
            email: String::new(),
        };
        build_card(
            &identity,
            LearnerRows::default(),
            Utc::now(),
            &EngineConfig::default(),
        )
    }

    #[test]
    fn parse_round_trips_every_filter() {
        for filter in ProgressFilter::ALL {
            assert_eq!(ProgressFilter::parse(filter.as_str()), Some(filter));
        }
        assert_eq!(ProgressFilter::parse("unknown"), None);
    }

    #[test]
    fn filters_and_together() {
        let cards = vec![idle_card("a"), idle_card("b")];
        // Idle cards are struggling and at risk, but have no long streak.
        let kept = apply_filters(
            cards.clone(),
            &[ProgressFilter::Struggling, ProgressFilter::AtRisk],
        );
        assert_eq!(kept.len(), 2);

        let kept = apply_filters(cards, &[ProgressFilter::Struggling, ProgressFilter::LongStreaks]);
        assert!(kept.is_empty());
    }

    #[test]
    fn counts_agree_with_flags() {
        let cards = vec![idle_card("a"), idle_card("b"), idle_card("c")];
        let counts = filter_counts(&cards);
        let flagged = cards.iter().filter(|c| c.at_risk_of_dropout).count();
        assert_eq!(counts["at-risk"], flagged);
        assert_eq!(counts["needs-attention"], 3);
        assert_eq!(counts["long-streaks"], 0);
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut cards = vec![idle_card("zoe"), idle_card("Ana"), idle_card("ben")];
        sort_cards(&mut cards, SortOrder::Name);
        let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "ben", "zoe"]);
    }
}
