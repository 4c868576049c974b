//! Survey entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::question::Question;
use domain::models::survey::{CollectionSettings, Survey};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for surveys.
#[derive(Debug, Clone, FromRow)]
pub struct SurveyEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub questions: Json<Vec<Question>>,
    pub allow_anonymous_responses: bool,
    pub require_email: bool,
    pub max_responses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SurveyEntity> for Survey {
    fn from(entity: SurveyEntity) -> Self {
        Survey {
            id: entity.id,
            user_id: entity.user_id,
            title: entity.title,
            description: entity.description,
            questions: entity.questions.0,
            settings: CollectionSettings {
                allow_anonymous_responses: entity.allow_anonymous_responses,
                require_email: entity.require_email,
                max_responses: entity.max_responses,
                expires_at: entity.expires_at,
            },
            is_published: entity.is_published,
            share_token: entity.share_token,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Per-survey response activity row.
#[derive(Debug, Clone, FromRow)]
pub struct SurveyActivityEntity {
    pub survey_id: Uuid,
    pub title: String,
    pub is_published: bool,
    pub total_responses: i64,
    pub responses_last_7_days: i64,
    pub responses_last_30_days: i64,
    pub first_response_at: Option<DateTime<Utc>>,
    pub last_response_at: Option<DateTime<Utc>>,
}

impl From<SurveyActivityEntity> for domain::models::analytics::SurveyActivity {
    fn from(entity: SurveyActivityEntity) -> Self {
        Self {
            survey_id: entity.survey_id,
            title: entity.title,
            is_published: entity.is_published,
            total_responses: entity.total_responses,
            responses_last_7_days: entity.responses_last_7_days,
            responses_last_30_days: entity.responses_last_30_days,
            first_response_at: entity.first_response_at,
            last_response_at: entity.last_response_at,
        }
    }
}
