use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    ActivityRecord, GrammarErrorRecord, LessonProgressRecord, ProgressStore, Skill,
    SkillScoreRecord, StoreError, VocabularyRecord,
};

/// Fixture-backed store for tests and local development.
///
/// Categories named in `failing` return a query error, which lets tests
/// exercise the engine's degradation paths without a database.
#[derive(Default)]
pub struct MemoryStore {
    cohorts: Mutex<HashMap<String, Vec<String>>>,
    activity: Mutex<Vec<ActivityRecord>>,
    skill_scores: Mutex<Vec<SkillScoreRecord>>,
    grammar_errors: Mutex<Vec<GrammarErrorRecord>>,
    vocabulary: Mutex<Vec<VocabularyRecord>>,
    lesson_progress: Mutex<Vec<LessonProgressRecord>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cohort(&self, organization_code: &str, learner_ids: &[&str]) {
        self.cohorts.lock().unwrap().insert(
            organization_code.to_string(),
            learner_ids.iter().map(|id| id.to_string()).collect(),
        );
    }

    pub fn add_activity(&self, record: ActivityRecord) {
        self.activity.lock().unwrap().push(record);
    }

    pub fn add_skill_score(&self, record: SkillScoreRecord) {
        self.skill_scores.lock().unwrap().push(record);
    }

    pub fn add_grammar_error(&self, record: GrammarErrorRecord) {
        self.grammar_errors.lock().unwrap().push(record);
    }

    pub fn add_vocabulary(&self, record: VocabularyRecord) {
        self.vocabulary.lock().unwrap().push(record);
    }

    pub fn add_lesson_progress(&self, record: LessonProgressRecord) {
        self.lesson_progress.lock().unwrap().push(record);
    }

    /// Mark a category ("cohort", "activity", "skills", "grammar",
    /// "vocabulary", "lessons") as failing.
    pub fn fail_category(&self, category: &str) {
        self.failing.lock().unwrap().insert(category.to_string());
    }

    fn check(&self, category: &str) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(category) {
            return Err(StoreError::Query(format!("{category} fetch failed")));
        }
        Ok(())
    }
}

fn for_learners<T: Clone>(records: &[T], ids: &[String], learner_of: impl Fn(&T) -> &str) -> Vec<T> {
    records
        .iter()
        .filter(|record| ids.iter().any(|id| id == learner_of(record)))
        .cloned()
        .collect()
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn cohort_members(&self, organization_code: &str) -> Result<Vec<String>, StoreError> {
        self.check("cohort")?;
        self.cohorts
            .lock()
            .unwrap()
            .get(organization_code)
            .cloned()
            .ok_or_else(|| StoreError::OrganizationNotFound(organization_code.to_string()))
    }

    async fn activity(&self, learner_ids: &[String]) -> Result<Vec<ActivityRecord>, StoreError> {
        self.check("activity")?;
        Ok(for_learners(
            &self.activity.lock().unwrap(),
            learner_ids,
            |r| &r.learner_id,
        ))
    }

    async fn skill_scores(
        &self,
        skill: Skill,
        learner_ids: &[String],
    ) -> Result<Vec<SkillScoreRecord>, StoreError> {
        self.check("skills")?;
        let mut records = for_learners(&self.skill_scores.lock().unwrap(), learner_ids, |r| {
            &r.learner_id
        });
        records.retain(|r| r.skill == skill);
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn grammar_errors(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<GrammarErrorRecord>, StoreError> {
        self.check("grammar")?;
        let mut records = for_learners(&self.grammar_errors.lock().unwrap(), learner_ids, |r| {
            &r.learner_id
        });
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn vocabulary(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<VocabularyRecord>, StoreError> {
        self.check("vocabulary")?;
        Ok(for_learners(
            &self.vocabulary.lock().unwrap(),
            learner_ids,
            |r| &r.learner_id,
        ))
    }

    async fn lesson_progress(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<LessonProgressRecord>, StoreError> {
        self.check("lessons")?;
        Ok(for_learners(
            &self.lesson_progress.lock().unwrap(),
            learner_ids,
            |r| &r.learner_id,
        ))
    }
}
