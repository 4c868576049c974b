//! Survey response repository for database operations.

use domain::models::response::{NewSurveyResponse, SurveyResponse};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::survey_response::SurveyResponseEntity;
use crate::metrics::QueryTimer;

/// Repository for survey response database operations.
#[derive(Clone)]
pub struct SurveyResponseRepository {
    pool: PgPool,
}

impl SurveyResponseRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a validated response.
    pub async fn insert(
        &self,
        response: NewSurveyResponse,
    ) -> Result<SurveyResponse, sqlx::Error> {
        let timer = QueryTimer::new("insert_survey_response");
        let result = sqlx::query_as::<_, SurveyResponseEntity>(
            r#"
            INSERT INTO survey_responses (survey_id, answers, respondent_email, ip_address, user_agent, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, survey_id, answers, respondent_email, ip_address, user_agent, submitted_at
            "#,
        )
        .bind(response.survey_id)
        .bind(Json(&response.answers))
        .bind(response.respondent_email.as_deref())
        .bind(response.ip_address.as_deref())
        .bind(response.user_agent.as_deref())
        .bind(response.submitted_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        result.map(Into::into)
    }

    /// Count responses of a survey.
    pub async fn count_for_survey(&self, survey_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_survey_responses");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM survey_responses WHERE survey_id = $1",
        )
        .bind(survey_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        result
    }

    /// List responses of a survey, most recent first.
    pub async fn list_for_survey(
        &self,
        survey_id: Uuid,
    ) -> Result<Vec<SurveyResponse>, sqlx::Error> {
        let timer = QueryTimer::new("list_survey_responses");
        let result = sqlx::query_as::<_, SurveyResponseEntity>(
            r#"
            SELECT id, survey_id, answers, respondent_email, ip_address, user_agent, submitted_at
            FROM survey_responses
            WHERE survey_id = $1
            ORDER BY submitted_at DESC, id
            "#,
        )
        .bind(survey_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }
}
