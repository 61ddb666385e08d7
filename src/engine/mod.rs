pub mod card;
pub mod filter;
pub mod pace;
pub mod recommend;
pub mod scorecard;
pub mod skills;
pub mod streak;
pub mod summary;
pub mod trend;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::identity::{IdentityError, IdentityProvider, LearnerIdentity};
use crate::store::{ProgressStore, Skill, StoreError};

use card::{build_card, LearnerRows};
use summary::summarize;
use types::{CohortProgress, ProgressCard};

#[derive(Debug, Error)]
pub enum EngineError {
    /// The only fatal case: without the member list there is nothing to
    /// aggregate.
    #[error("cohort lookup failed: {0}")]
    CohortLookup(#[from] StoreError),
}

/// The progress aggregation engine. Stateless across requests; every
/// aggregation refetches raw rows and rebuilds all derived metrics.
pub struct ProgressEngine {
    store: Arc<dyn ProgressStore>,
    identity: Arc<dyn IdentityProvider>,
    config: EngineConfig,
}

impl ProgressEngine {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        identity: Arc<dyn IdentityProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }

    pub async fn aggregate(&self, organization_code: &str) -> Result<CohortProgress, EngineError> {
        let members = self.store.cohort_members(organization_code).await?;
        let students = self.build_cards(&members).await;
        let summary = summarize(&students);
        Ok(CohortProgress { students, summary })
    }

    /// Single-learner card through the same derivation path. `None` when
    /// the learner is not a member of the organization.
    pub async fn learner_card(
        &self,
        organization_code: &str,
        learner_id: &str,
    ) -> Result<Option<ProgressCard>, EngineError> {
        let members = self.store.cohort_members(organization_code).await?;
        if !members.iter().any(|id| id == learner_id) {
            return Ok(None);
        }
        let cards = self.build_cards(&[learner_id.to_string()]).await;
        Ok(cards.into_iter().next())
    }

    /// Fan out all per-category fetches concurrently, partition rows per
    /// learner, and derive one card per member. Any fetch except cohort
    /// membership may fail without failing the request; the affected
    /// metrics fall back to their empty-input defaults.
    async fn build_cards(&self, members: &[String]) -> Vec<ProgressCard> {
        let now = Utc::now();
        let store = &self.store;

        let skill_fetches = join_all(Skill::ALL.iter().map(|&skill| async move {
            (skill, store.skill_scores(skill, members).await)
        }));

        let (activity, skill_results, grammar, vocabulary, lessons, identities) = tokio::join!(
            store.activity(members),
            skill_fetches,
            store.grammar_errors(members),
            store.vocabulary(members),
            store.lesson_progress(members),
            self.identity.fetch_identities(members),
        );

        let mut buckets: HashMap<String, LearnerRows> = members
            .iter()
            .map(|id| (id.clone(), LearnerRows::default()))
            .collect();

        for record in degraded_to_empty(activity, "activity") {
            if let Some(rows) = buckets.get_mut(&record.learner_id) {
                rows.activity.push(record);
            }
        }
        for (skill, result) in skill_results {
            for record in degraded_to_empty(result, skill.as_str()) {
                if let Some(rows) = buckets.get_mut(&record.learner_id) {
                    rows.skill_scores.entry(skill).or_default().push(record);
                }
            }
        }
        for record in degraded_to_empty(grammar, "grammar") {
            if let Some(rows) = buckets.get_mut(&record.learner_id) {
                rows.grammar_errors.push(record);
            }
        }
        for record in degraded_to_empty(vocabulary, "vocabulary") {
            if let Some(rows) = buckets.get_mut(&record.learner_id) {
                rows.vocabulary.push(record);
            }
        }
        for record in degraded_to_empty(lessons, "lessons") {
            if let Some(rows) = buckets.get_mut(&record.learner_id) {
                rows.lessons.push(record);
            }
        }

        let identities = identity_map(identities);

        members
            .iter()
            .map(|id| {
                let identity = identities
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| LearnerIdentity::placeholder(id));
                let rows = buckets.remove(id).unwrap_or_default();
                build_card(&identity, rows, now, &self.config)
            })
            .collect()
    }
}

fn degraded_to_empty<T>(result: Result<Vec<T>, StoreError>, category: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(error = %err, category, "record fetch failed, continuing without it");
            Vec::new()
        }
    }
}

fn identity_map(
    result: Result<Vec<LearnerIdentity>, IdentityError>,
) -> HashMap<String, LearnerIdentity> {
    match result {
        Ok(identities) => identities
            .into_iter()
            .map(|identity| (identity.learner_id.clone(), identity))
            .collect(),
        Err(IdentityError::NotConfigured) => HashMap::new(),
        Err(err) => {
            tracing::warn!(error = %err, "identity enrichment failed, using placeholders");
            HashMap::new()
        }
    }
}
