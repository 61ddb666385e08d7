pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                StoreError::Connection(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// The five scored language skills, in the fixed display order used for
/// deterministic tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Speaking,
    Listening,
    Reading,
    Writing,
    Pronunciation,
}

impl Skill {
    pub const ALL: [Skill; 5] = [
        Skill::Speaking,
        Skill::Listening,
        Skill::Reading,
        Skill::Writing,
        Skill::Pronunciation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Speaking => "speaking",
            Skill::Listening => "listening",
            Skill::Reading => "reading",
            Skill::Writing => "writing",
            Skill::Pronunciation => "pronunciation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Unknown,
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "LOW" => Severity::Low,
            "MEDIUM" => Severity::Medium,
            "HIGH" => Severity::High,
            _ => Severity::Unknown,
        }
    }
}

/// One row per completed task.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub learner_id: String,
    pub completed_at: DateTime<Utc>,
    pub task_id: String,
    pub course_id: String,
}

/// One scored session for a single skill.
#[derive(Debug, Clone)]
pub struct SkillScoreRecord {
    pub learner_id: String,
    pub skill: Skill,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub session_id: String,
}

#[derive(Debug, Clone)]
pub struct GrammarErrorRecord {
    pub learner_id: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub error_type: String,
}

#[derive(Debug, Clone)]
pub struct VocabularyRecord {
    pub learner_id: String,
    pub term: String,
    pub first_seen_at: DateTime<Utc>,
    pub times_seen: i64,
    pub times_correct: i64,
}

#[derive(Debug, Clone)]
pub struct LessonProgressRecord {
    pub learner_id: String,
    pub lesson_id: String,
    pub completion_pct: f64,
    pub last_accessed_at: DateTime<Utc>,
}

/// Read contract the aggregation engine needs from the relational store.
///
/// Injected at construction time so tests can substitute fixture rows; no
/// adapter keeps per-request state and every method is a plain read.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Learner ids belonging to an organization. Failure here is fatal to
    /// the whole aggregation request.
    async fn cohort_members(&self, organization_code: &str) -> Result<Vec<String>, StoreError>;

    async fn activity(&self, learner_ids: &[String]) -> Result<Vec<ActivityRecord>, StoreError>;

    async fn skill_scores(
        &self,
        skill: Skill,
        learner_ids: &[String],
    ) -> Result<Vec<SkillScoreRecord>, StoreError>;

    async fn grammar_errors(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<GrammarErrorRecord>, StoreError>;

    async fn vocabulary(&self, learner_ids: &[String])
        -> Result<Vec<VocabularyRecord>, StoreError>;

    async fn lesson_progress(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<LessonProgressRecord>, StoreError>;
}
