//! Survey response entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::response::{Answers, SurveyResponse};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for survey responses.
#[derive(Debug, Clone, FromRow)]
pub struct SurveyResponseEntity {
    pub id: Uuid,
    pub survey_id: Uuid,
    pub answers: Json<Answers>,
    pub respondent_email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<SurveyResponseEntity> for SurveyResponse {
    fn from(entity: SurveyResponseEntity) -> Self {
        SurveyResponse {
            id: entity.id,
            survey_id: entity.survey_id,
            answers: entity.answers.0,
            respondent_email: entity.respondent_email,
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
            submitted_at: entity.submitted_at,
        }
    }
}
