//! Storage collaborator for surveys and their responses.
//!
//! The service layer talks to storage only through [`SurveyStore`], so the
//! PostgreSQL implementation and [`InMemorySurveyStore`] are interchangeable.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::analytics::SurveyActivity;
use crate::models::question::Question;
use crate::models::response::{NewSurveyResponse, SurveyResponse};
use crate::models::survey::{CollectionSettings, NewSurvey, Survey};

/// Errors raised by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Partial survey update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub questions: Option<Vec<Question>>,
    pub settings: Option<CollectionSettings>,
    pub is_published: Option<bool>,
    pub share_token: Option<String>,
}

impl SurveyUpdate {
    pub fn is_empty(&self) -> bool {
        self == &SurveyUpdate::default()
    }

    /// Applies the changes to an in-memory survey.
    pub fn apply_to(self, survey: &mut Survey) {
        if let Some(title) = self.title {
            survey.title = title;
        }
        if let Some(description) = self.description {
            survey.description = description;
        }
        if let Some(questions) = self.questions {
            survey.questions = questions;
        }
        if let Some(settings) = self.settings {
            survey.settings = settings;
        }
        if let Some(is_published) = self.is_published {
            survey.is_published = is_published;
        }
        if let Some(token) = self.share_token {
            survey.share_token = Some(token);
        }
    }
}

/// Record storage for surveys and responses.
#[async_trait::async_trait]
pub trait SurveyStore: Send + Sync {
    /// Inserts a new draft survey.
    async fn create_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError>;

    async fn get_survey_by_id(&self, id: Uuid) -> Result<Option<Survey>, StoreError>;

    /// Looks up a survey by share token. Only published surveys are visible.
    async fn get_survey_by_token(&self, token: &str) -> Result<Option<Survey>, StoreError>;

    /// Surveys owned by `user_id`, newest first.
    async fn list_surveys_by_owner(&self, user_id: Uuid) -> Result<Vec<Survey>, StoreError>;

    /// Applies a partial update. A share token already held by another survey
    /// yields [`StoreError::Conflict`].
    async fn update_survey(&self, id: Uuid, changes: SurveyUpdate) -> Result<Survey, StoreError>;

    /// Deletes a survey together with all of its responses.
    async fn delete_survey(&self, id: Uuid) -> Result<(), StoreError>;

    async fn count_responses(&self, survey_id: Uuid) -> Result<i64, StoreError>;

    async fn insert_response(
        &self,
        response: NewSurveyResponse,
    ) -> Result<SurveyResponse, StoreError>;

    /// Responses of a survey, most recent first.
    async fn list_responses(&self, survey_id: Uuid) -> Result<Vec<SurveyResponse>, StoreError>;

    /// Per-survey response activity for an owner's dashboard, newest survey first.
    async fn survey_activity(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<SurveyActivity>, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    surveys: HashMap<Uuid, Survey>,
    responses: Vec<SurveyResponse>,
}

/// In-memory store for tests and local development.
#[derive(Debug, Default)]
pub struct InMemorySurveyStore {
    state: RwLock<MemoryState>,
    /// Whether every call should fail with a backend error.
    pub simulate_failure: bool,
}

impl InMemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails.
    pub fn failing() -> Self {
        Self {
            state: RwLock::default(),
            simulate_failure: true,
        }
    }

    /// Inserts a fully-formed survey, keeping its id and timestamps.
    pub async fn seed_survey(&self, survey: Survey) {
        self.state.write().await.surveys.insert(survey.id, survey);
    }

    /// Inserts a fully-formed response, keeping its id and timestamp.
    pub async fn seed_response(&self, response: SurveyResponse) {
        self.state.write().await.responses.push(response);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.simulate_failure {
            tracing::warn!("In-memory store simulating failure");
            return Err(StoreError::Backend("simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SurveyStore for InMemorySurveyStore {
    async fn create_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError> {
        self.check_available()?;
        let now = Utc::now();
        let survey = Survey {
            id: Uuid::new_v4(),
            user_id: survey.user_id,
            title: survey.title,
            description: survey.description,
            questions: survey.questions,
            settings: survey.settings,
            is_published: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .surveys
            .insert(survey.id, survey.clone());
        Ok(survey)
    }

    async fn get_survey_by_id(&self, id: Uuid) -> Result<Option<Survey>, StoreError> {
        self.check_available()?;
        Ok(self.state.read().await.surveys.get(&id).cloned())
    }

    async fn get_survey_by_token(&self, token: &str) -> Result<Option<Survey>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .surveys
            .values()
            .find(|s| s.is_published && s.share_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list_surveys_by_owner(&self, user_id: Uuid) -> Result<Vec<Survey>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut surveys: Vec<Survey> = state
            .surveys
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(surveys)
    }

    async fn update_survey(&self, id: Uuid, changes: SurveyUpdate) -> Result<Survey, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;

        if let Some(token) = changes.share_token.as_deref() {
            let taken = state
                .surveys
                .values()
                .any(|s| s.id != id && s.share_token.as_deref() == Some(token));
            if taken {
                return Err(StoreError::Conflict("share_token already in use".to_string()));
            }
        }

        let survey = state.surveys.get_mut(&id).ok_or(StoreError::NotFound)?;
        changes.apply_to(survey);
        survey.updated_at = Utc::now();
        Ok(survey.clone())
    }

    async fn delete_survey(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if state.surveys.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        state.responses.retain(|r| r.survey_id != id);
        Ok(())
    }

    async fn count_responses(&self, survey_id: Uuid) -> Result<i64, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .responses
            .iter()
            .filter(|r| r.survey_id == survey_id)
            .count() as i64)
    }

    async fn insert_response(
        &self,
        response: NewSurveyResponse,
    ) -> Result<SurveyResponse, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if !state.surveys.contains_key(&response.survey_id) {
            return Err(StoreError::NotFound);
        }

        let stored = SurveyResponse {
            id: Uuid::new_v4(),
            survey_id: response.survey_id,
            answers: response.answers,
            respondent_email: response.respondent_email,
            ip_address: response.ip_address,
            user_agent: response.user_agent,
            submitted_at: response.submitted_at,
        };
        state.responses.push(stored.clone());
        Ok(stored)
    }

    async fn list_responses(&self, survey_id: Uuid) -> Result<Vec<SurveyResponse>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut responses: Vec<SurveyResponse> = state
            .responses
            .iter()
            .filter(|r| r.survey_id == survey_id)
            .cloned()
            .collect();
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(responses)
    }

    async fn survey_activity(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<SurveyActivity>, StoreError> {
        self.check_available()?;
        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);

        let state = self.state.read().await;
        let mut surveys: Vec<&Survey> = state
            .surveys
            .values()
            .filter(|s| s.user_id == user_id)
            .collect();
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(surveys
            .into_iter()
            .map(|survey| {
                let submitted: Vec<DateTime<Utc>> = state
                    .responses
                    .iter()
                    .filter(|r| r.survey_id == survey.id)
                    .map(|r| r.submitted_at)
                    .collect();

                SurveyActivity {
                    survey_id: survey.id,
                    title: survey.title.clone(),
                    is_published: survey.is_published,
                    total_responses: submitted.len() as i64,
                    responses_last_7_days: submitted.iter().filter(|t| **t >= week_ago).count()
                        as i64,
                    responses_last_30_days: submitted.iter().filter(|t| **t >= month_ago).count()
                        as i64,
                    first_response_at: submitted.iter().min().copied(),
                    last_response_at: submitted.iter().max().copied(),
                }
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
