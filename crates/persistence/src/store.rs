//! PostgreSQL implementation of the survey storage collaborator.

use chrono::{DateTime, Utc};
use domain::models::analytics::SurveyActivity;
use domain::models::response::{NewSurveyResponse, SurveyResponse};
use domain::models::survey::{NewSurvey, Survey};
use domain::services::store::{StoreError, SurveyStore, SurveyUpdate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::metrics::record_pool_metrics;
use crate::repositories::{SurveyRepository, SurveyResponseRepository};

/// Maps a database error onto the storage error taxonomy.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Conflict(db_err.message().to_string()),
            Some("23503") => StoreError::NotFound,
            _ => StoreError::Backend(format!("Database error: {}", db_err)),
        },
        other => StoreError::Backend(format!("Database error: {}", other)),
    }
}

/// Survey store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgSurveyStore {
    pool: PgPool,
    surveys: SurveyRepository,
    responses: SurveyResponseRepository,
}

impl PgSurveyStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            surveys: SurveyRepository::new(pool.clone()),
            responses: SurveyResponseRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl SurveyStore for PgSurveyStore {
    async fn create_survey(&self, survey: NewSurvey) -> Result<Survey, StoreError> {
        self.surveys.create(survey).await.map_err(store_error)
    }

    async fn get_survey_by_id(&self, id: Uuid) -> Result<Option<Survey>, StoreError> {
        self.surveys.find_by_id(id).await.map_err(store_error)
    }

    async fn get_survey_by_token(&self, token: &str) -> Result<Option<Survey>, StoreError> {
        self.surveys
            .find_published_by_token(token)
            .await
            .map_err(store_error)
    }

    async fn list_surveys_by_owner(&self, user_id: Uuid) -> Result<Vec<Survey>, StoreError> {
        self.surveys.list_by_owner(user_id).await.map_err(store_error)
    }

    async fn update_survey(&self, id: Uuid, changes: SurveyUpdate) -> Result<Survey, StoreError> {
        self.surveys
            .update(id, changes)
            .await
            .map_err(store_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_survey(&self, id: Uuid) -> Result<(), StoreError> {
        if self.surveys.delete(id).await.map_err(store_error)? {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn count_responses(&self, survey_id: Uuid) -> Result<i64, StoreError> {
        self.responses
            .count_for_survey(survey_id)
            .await
            .map_err(store_error)
    }

    async fn insert_response(
        &self,
        response: NewSurveyResponse,
    ) -> Result<SurveyResponse, StoreError> {
        self.responses.insert(response).await.map_err(store_error)
    }

    async fn list_responses(&self, survey_id: Uuid) -> Result<Vec<SurveyResponse>, StoreError> {
        self.responses
            .list_for_survey(survey_id)
            .await
            .map_err(store_error)
    }

    async fn survey_activity(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<SurveyActivity>, StoreError> {
        self.surveys
            .activity_for_owner(user_id, now)
            .await
            .map_err(store_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        record_pool_metrics(&self.pool);
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(store_error)
    }
}
