//! Survey repository for database operations.

use chrono::{DateTime, Duration, Utc};
use domain::models::analytics::SurveyActivity;
use domain::models::survey::{NewSurvey, Survey};
use domain::services::store::SurveyUpdate;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::survey::{SurveyActivityEntity, SurveyEntity};
use crate::metrics::QueryTimer;

/// Repository for survey database operations.
#[derive(Clone)]
pub struct SurveyRepository {
    pool: PgPool,
}

impl SurveyRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new draft survey.
    pub async fn create(&self, survey: NewSurvey) -> Result<Survey, sqlx::Error> {
        let timer = QueryTimer::new("create_survey");
        let result = sqlx::query_as::<_, SurveyEntity>(
            r#"
            INSERT INTO surveys (user_id, title, description, questions, allow_anonymous_responses, require_email, max_responses, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, description, questions, allow_anonymous_responses, require_email, max_responses, expires_at, is_published, share_token, created_at, updated_at
            "#,
        )
        .bind(survey.user_id)
        .bind(&survey.title)
        .bind(survey.description.as_deref())
        .bind(Json(&survey.questions))
        .bind(survey.settings.allow_anonymous_responses)
        .bind(survey.settings.require_email)
        .bind(survey.settings.max_responses)
        .bind(survey.settings.expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        result.map(Into::into)
    }

    /// Find survey by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Survey>, sqlx::Error> {
        let timer = QueryTimer::new("find_survey_by_id");
        let result = sqlx::query_as::<_, SurveyEntity>(
            r#"
            SELECT id, user_id, title, description, questions, allow_anonymous_responses, require_email, max_responses, expires_at, is_published, share_token, created_at, updated_at
            FROM surveys
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Into::into))
    }

    /// Find a published survey by its share token.
    pub async fn find_published_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let timer = QueryTimer::new("find_survey_by_share_token");
        let result = sqlx::query_as::<_, SurveyEntity>(
            r#"
            SELECT id, user_id, title, description, questions, allow_anonymous_responses, require_email, max_responses, expires_at, is_published, share_token, created_at, updated_at
            FROM surveys
            WHERE share_token = $1 AND is_published = true
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Into::into))
    }

    /// List surveys of an owner, newest first.
    pub async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Survey>, sqlx::Error> {
        let timer = QueryTimer::new("list_surveys_by_owner");
        let result = sqlx::query_as::<_, SurveyEntity>(
            r#"
            SELECT id, user_id, title, description, questions, allow_anonymous_responses, require_email, max_responses, expires_at, is_published, share_token, created_at, updated_at
            FROM surveys
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update. Returns None if the survey does not exist.
    ///
    /// Nullable columns use a flag parameter so they can be cleared, which
    /// COALESCE alone cannot express.
    pub async fn update(
        &self,
        id: Uuid,
        changes: SurveyUpdate,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let timer = QueryTimer::new("update_survey");

        let set_description = changes.description.is_some();
        let description = changes.description.flatten();
        let set_settings = changes.settings.is_some();
        let settings = changes.settings.unwrap_or_default();

        let result = sqlx::query_as::<_, SurveyEntity>(
            r#"
            UPDATE surveys
            SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                questions = COALESCE($5, questions),
                allow_anonymous_responses = CASE WHEN $6 THEN $7 ELSE allow_anonymous_responses END,
                require_email = CASE WHEN $6 THEN $8 ELSE require_email END,
                max_responses = CASE WHEN $6 THEN $9 ELSE max_responses END,
                expires_at = CASE WHEN $6 THEN $10 ELSE expires_at END,
                is_published = COALESCE($11, is_published),
                share_token = COALESCE($12, share_token),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, questions, allow_anonymous_responses, require_email, max_responses, expires_at, is_published, share_token, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(set_description)
        .bind(description.as_deref())
        .bind(changes.questions.as_ref().map(Json))
        .bind(set_settings)
        .bind(settings.allow_anonymous_responses)
        .bind(settings.require_email)
        .bind(settings.max_responses)
        .bind(settings.expires_at)
        .bind(changes.is_published)
        .bind(changes.share_token.as_deref())
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?.map(Into::into))
    }

    /// Delete a survey. Responses are removed by the foreign key cascade.
    /// Returns whether a row was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_survey");
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();

        Ok(result?.rows_affected() > 0)
    }

    /// Response activity of every survey owned by `user_id`.
    pub async fn activity_for_owner(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<SurveyActivity>, sqlx::Error> {
        let timer = QueryTimer::new("survey_activity_for_owner");
        let result = sqlx::query_as::<_, SurveyActivityEntity>(
            r#"
            SELECT
                s.id AS survey_id,
                s.title,
                s.is_published,
                COUNT(r.id) AS total_responses,
                COUNT(r.id) FILTER (WHERE r.submitted_at >= $2) AS responses_last_7_days,
                COUNT(r.id) FILTER (WHERE r.submitted_at >= $3) AS responses_last_30_days,
                MIN(r.submitted_at) AS first_response_at,
                MAX(r.submitted_at) AS last_response_at
            FROM surveys s
            LEFT JOIN survey_responses r ON r.survey_id = s.id
            WHERE s.user_id = $1
            GROUP BY s.id
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(now - Duration::days(7))
        .bind(now - Duration::days(30))
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(result?.into_iter().map(Into::into).collect())
    }
}
