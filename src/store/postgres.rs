use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::{
    ActivityRecord, GrammarErrorRecord, LessonProgressRecord, ProgressStore, Severity, Skill,
    SkillScoreRecord, StoreError, VocabularyRecord,
};

/// sqlx-backed read adapter over the platform's Postgres schema.
#[derive(Clone)]
pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    pub async fn from_env() -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::Connection("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&url)
            .await
            .map_err(|err| StoreError::Connection(err.to_string()))?;

        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl ProgressStore for PgProgressStore {
    async fn cohort_members(&self, organization_code: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT "learnerId"
            FROM "organization_members"
            WHERE "organizationCode" = $1
            "#,
        )
        .bind(organization_code)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<String> = rows
            .into_iter()
            .filter_map(|row| row.try_get::<String, _>("learnerId").ok())
            .collect();

        // An organization can legitimately have zero members; only an
        // unknown code is a not-found.
        if ids.is_empty() {
            let known = sqlx::query(
                r#"
                SELECT 1 AS "one"
                FROM "organizations"
                WHERE "code" = $1
                "#,
            )
            .bind(organization_code)
            .fetch_optional(&self.pool)
            .await?;

            if known.is_none() {
                return Err(StoreError::OrganizationNotFound(
                    organization_code.to_string(),
                ));
            }
        }
        Ok(ids)
    }

    async fn activity(&self, learner_ids: &[String]) -> Result<Vec<ActivityRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT "learnerId", "completedAt", "taskId", "courseId"
            FROM "task_completions"
            WHERE "learnerId" = ANY($1)
            ORDER BY "completedAt" DESC
            "#,
        )
        .bind(learner_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(ActivityRecord {
                    learner_id: row.try_get("learnerId").ok()?,
                    completed_at: row.try_get::<DateTime<Utc>, _>("completedAt").ok()?,
                    task_id: row.try_get("taskId").unwrap_or_default(),
                    course_id: row.try_get("courseId").unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn skill_scores(
        &self,
        skill: Skill,
        learner_ids: &[String],
    ) -> Result<Vec<SkillScoreRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT "learnerId", "score", "createdAt", "sessionId"
            FROM "skill_assessments"
            WHERE "skill" = $1 AND "learnerId" = ANY($2)
            ORDER BY "createdAt" DESC
            "#,
        )
        .bind(skill.as_str())
        .bind(learner_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(SkillScoreRecord {
                    learner_id: row.try_get("learnerId").ok()?,
                    skill,
                    score: row.try_get::<f64, _>("score").unwrap_or(0.0),
                    created_at: row.try_get::<DateTime<Utc>, _>("createdAt").ok()?,
                    session_id: row.try_get("sessionId").unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn grammar_errors(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<GrammarErrorRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT "learnerId", "severity"::text AS "severity", "createdAt", "errorType"
            FROM "grammar_errors"
            WHERE "learnerId" = ANY($1)
            ORDER BY "createdAt" DESC
            "#,
        )
        .bind(learner_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(GrammarErrorRecord {
                    learner_id: row.try_get("learnerId").ok()?,
                    severity: Severity::parse(
                        row.try_get::<String, _>("severity").ok()?.as_str(),
                    ),
                    created_at: row.try_get::<DateTime<Utc>, _>("createdAt").ok()?,
                    error_type: row.try_get("errorType").unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn vocabulary(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<VocabularyRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT "learnerId", "term", "firstSeenAt", "timesSeen", "timesCorrect"
            FROM "vocabulary_entries"
            WHERE "learnerId" = ANY($1)
            "#,
        )
        .bind(learner_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(VocabularyRecord {
                    learner_id: row.try_get("learnerId").ok()?,
                    term: row.try_get("term").unwrap_or_default(),
                    first_seen_at: row.try_get::<DateTime<Utc>, _>("firstSeenAt").ok()?,
                    times_seen: row
                        .try_get::<i32, _>("timesSeen")
                        .map(|v| v as i64)
                        .unwrap_or(0),
                    times_correct: row
                        .try_get::<i32, _>("timesCorrect")
                        .map(|v| v as i64)
                        .unwrap_or(0),
                })
            })
            .collect())
    }

    async fn lesson_progress(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<LessonProgressRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT "learnerId", "lessonId", "completionPct", "lastAccessedAt"
            FROM "lesson_progress"
            WHERE "learnerId" = ANY($1)
            "#,
        )
        .bind(learner_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(LessonProgressRecord {
                    learner_id: row.try_get("learnerId").ok()?,
                    lesson_id: row.try_get("lessonId").unwrap_or_default(),
                    completion_pct: row.try_get::<f64, _>("completionPct").unwrap_or(0.0),
                    last_accessed_at: row.try_get::<DateTime<Utc>, _>("lastAccessedAt").ok()?,
                })
            })
            .collect())
    }
}
