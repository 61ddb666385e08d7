use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct LearnerIdentity {
    pub learner_id: String,
    pub name: String,
    pub email: String,
}

impl LearnerIdentity {
    /// Synthetic fallback used whenever enrichment is unavailable for an id.
    pub fn placeholder(learner_id: &str) -> Self {
        let short: String = learner_id.chars().take(4).collect();
        Self {
            learner_id: learner_id.to_string(),
            name: format!("Student {short}"),
            email: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Best-effort display name / email lookup. Failure is always absorbed by
/// the caller; the aggregation never depends on this succeeding.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_identities(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<LearnerIdentity>, IdentityError>;
}

/// Provider that is never configured. Forces placeholder identities.
pub struct NullIdentityProvider;

#[async_trait]
impl IdentityProvider for NullIdentityProvider {
    async fn fetch_identities(
        &self,
        _learner_ids: &[String],
    ) -> Result<Vec<LearnerIdentity>, IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}

#[derive(Debug, Deserialize)]
struct IdentityDto {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// HTTP identity directory client, configured entirely from env.
pub struct HttpIdentityProvider {
    endpoint: Option<String>,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn from_env() -> Self {
        Self {
            endpoint: env_string("IDENTITY_API_URL"),
            api_key: env_string("IDENTITY_API_KEY"),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.endpoint.is_some()
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_identities(
        &self,
        learner_ids: &[String],
    ) -> Result<Vec<LearnerIdentity>, IdentityError> {
        let endpoint = self.endpoint.as_deref().ok_or(IdentityError::NotConfigured)?;

        let mut request = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "ids": learner_ids }));
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::HttpStatus { status, body });
        }

        let dtos: Vec<IdentityDto> = response.json().await?;
        Ok(dtos
            .into_iter()
            .map(|dto| {
                let name = dto
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| {
                        let joined = format!(
                            "{} {}",
                            dto.first_name.as_deref().unwrap_or(""),
                            dto.last_name.as_deref().unwrap_or("")
                        );
                        let joined = joined.trim().to_string();
                        if joined.is_empty() {
                            LearnerIdentity::placeholder(&dto.id).name
                        } else {
                            joined
                        }
                    });
                LearnerIdentity {
                    learner_id: dto.id,
                    name,
                    email: dto.email.unwrap_or_default(),
                }
            })
            .collect())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
