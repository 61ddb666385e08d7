use std::collections::BTreeMap;

use serde::Serialize;

/// Three-state direction for skill scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Grammar uses inverted labels: fewer high-severity errors is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaceStatus {
    #[serde(rename = "ahead")]
    Ahead,
    #[serde(rename = "on-track")]
    OnTrack,
    #[serde(rename = "behind")]
    Behind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillReport {
    pub score: i64,
    pub trend: Trend,
    pub sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillBreakdown {
    pub speaking: SkillReport,
    pub listening: SkillReport,
    pub reading: SkillReport,
    pub writing: SkillReport,
    pub pronunciation: SkillReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarReport {
    /// Percentage of error records with HIGH severity, 0..=100.
    pub error_rate: i64,
    pub trend: GrammarTrend,
    pub total_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyReport {
    pub words_learned: usize,
    pub weekly_new: usize,
    /// Percentage of terms with timesCorrect > timesSeen * 0.7.
    pub retention_rate: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPace {
    pub lessons_per_week: f64,
    pub status: PaceStatus,
    /// None when velocity is zero; a prediction cannot be made.
    pub predicted_completion_weeks: Option<i64>,
    pub expected_completion: Option<String>,
}

/// The derived per-learner metrics bundle. Rebuilt from raw rows on every
/// request; nothing here is persisted or cached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCard {
    pub id: String,
    pub name: String,
    pub email: String,

    pub overall_progress: i64,
    pub lessons_completed: i64,
    pub total_lessons: i64,

    pub current_streak: i64,
    pub longest_streak: i64,
    pub inactivity_days: i64,
    pub last_active_date: Option<String>,
    /// Completed-task counts per calendar day for the trailing 30 days.
    pub activity_calendar: BTreeMap<String, i64>,
    pub most_active_hour: Option<u32>,

    pub skills: SkillBreakdown,
    pub grammar: GrammarReport,
    pub vocabulary: VocabularyReport,

    pub average_score: i64,
    pub strongest_skill: String,
    pub weakest_skill: String,
    pub struggling_areas: Vec<String>,

    pub engagement_score: i64,
    pub needs_attention: bool,
    pub at_risk_of_dropout: bool,

    pub pace: LearningPace,
    pub recommended_focus: Vec<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub total_students: usize,
    pub active_students: usize,
    pub at_risk_students: usize,
    pub average_progress: i64,
    pub average_engagement: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortProgress {
    pub students: Vec<ProgressCard>,
    pub summary: CohortSummary,
}
