//! Survey service: owner authoring, the public submission path and analytics.
//!
//! The service owns no storage of its own; it is built around an injected
//! [`SurveyStore`] and takes the current time as an argument everywhere so
//! behaviour is reproducible in tests.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::analytics::{AnalyticsReport, OwnerDashboard};
use crate::models::question::{QuestionInput, SchemaError};
use crate::models::response::{Answers, NewSurveyResponse, SurveyResponse};
use crate::models::survey::{
    validate_definition, CreateSurveyRequest, NewSurvey, SchemaLimits, Survey,
    UpdateSurveyRequest,
};
use crate::services::analytics::aggregate;
use crate::services::export::{export_file_name, responses_to_csv};
use crate::services::response_validation::{validate_response_within, Rejection};
use crate::services::share_token::{resolve_share_token, ResolveError, ShareLink};
use crate::services::store::{StoreError, SurveyStore, SurveyUpdate};

/// Publishing gives up after this many share-token collisions.
pub const MAX_TOKEN_ATTEMPTS: usize = 5;

/// Source of fresh share tokens.
pub type TokenGenerator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Error)]
pub enum SurveyServiceError {
    #[error("Survey not found")]
    NotFound,

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    InvalidDefinition(#[from] SchemaError),

    #[error("Could not generate a unique share token after {attempts} attempts")]
    TokenGenerationFailed { attempts: usize },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for SurveyServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => SurveyServiceError::NotFound,
            other => SurveyServiceError::Store(other),
        }
    }
}

impl From<ResolveError> for SurveyServiceError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => SurveyServiceError::NotFound,
            ResolveError::Store(e) => e.into(),
        }
    }
}

/// A public submission after wire coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSubmission {
    pub survey_id: Uuid,
    pub answers: Answers,
    pub respondent_email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Rendered CSV export with its download name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

#[derive(Clone)]
pub struct SurveyService {
    store: Arc<dyn SurveyStore>,
    limits: SchemaLimits,
    token_generator: TokenGenerator,
}

impl std::fmt::Debug for SurveyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyService")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl SurveyService {
    /// Creates a service that mints share tokens from the OS random source.
    pub fn new(store: Arc<dyn SurveyStore>, limits: SchemaLimits) -> Self {
        Self {
            store,
            limits,
            token_generator: Arc::new(shared::crypto::generate_share_token),
        }
    }

    /// Replaces the share-token source.
    pub fn with_token_generator(mut self, generator: TokenGenerator) -> Self {
        self.token_generator = generator;
        self
    }

    pub fn store(&self) -> &Arc<dyn SurveyStore> {
        &self.store
    }

    pub fn limits(&self) -> &SchemaLimits {
        &self.limits
    }

    // ------------------------------------------------------------------
    // Owner authoring
    // ------------------------------------------------------------------

    pub async fn create_survey(
        &self,
        owner: Uuid,
        request: CreateSurveyRequest,
    ) -> Result<Survey, SurveyServiceError> {
        let questions: Vec<_> = request
            .questions
            .into_iter()
            .map(QuestionInput::into_question)
            .collect();
        validate_definition(&request.title, &questions, &request.settings, &self.limits)?;

        let survey = self
            .store
            .create_survey(NewSurvey {
                user_id: owner,
                title: request.title.trim().to_string(),
                description: request.description,
                questions,
                settings: request.settings,
            })
            .await?;

        tracing::info!(
            survey_id = %survey.id,
            user_id = %owner,
            questions = survey.questions.len(),
            "Survey created"
        );

        Ok(survey)
    }

    /// Fetches a survey, hiding surveys owned by someone else.
    pub async fn get_owned_survey(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Survey, SurveyServiceError> {
        match self.store.get_survey_by_id(id).await? {
            Some(survey) if survey.user_id == owner => Ok(survey),
            _ => Err(SurveyServiceError::NotFound),
        }
    }

    pub async fn list_surveys(&self, owner: Uuid) -> Result<Vec<Survey>, SurveyServiceError> {
        Ok(self.store.list_surveys_by_owner(owner).await?)
    }

    pub async fn update_survey(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateSurveyRequest,
    ) -> Result<Survey, SurveyServiceError> {
        let current = self.get_owned_survey(owner, id).await?;

        let title = request.title.as_ref().map(|t| t.trim().to_string());
        let questions = request.questions.clone().map(|inputs| {
            inputs
                .into_iter()
                .map(QuestionInput::into_question)
                .collect::<Vec<_>>()
        });
        let settings = request
            .touches_settings()
            .then(|| request.merge_settings(&current.settings));

        validate_definition(
            title.as_deref().unwrap_or(&current.title),
            questions.as_deref().unwrap_or(&current.questions),
            settings.as_ref().unwrap_or(&current.settings),
            &self.limits,
        )?;

        let update = SurveyUpdate {
            title,
            description: request.description,
            questions,
            settings,
            ..SurveyUpdate::default()
        };
        if update.is_empty() {
            return Ok(current);
        }

        let survey = self.store.update_survey(id, update).await?;
        tracing::info!(survey_id = %id, "Survey updated");
        Ok(survey)
    }

    /// Publishes a survey, minting a share token the first time.
    ///
    /// Publishing an already published survey changes nothing.
    pub async fn publish(&self, owner: Uuid, id: Uuid) -> Result<Survey, SurveyServiceError> {
        let survey = self.get_owned_survey(owner, id).await?;

        if survey.share_token.is_some() {
            if survey.is_published {
                return Ok(survey);
            }
            let survey = self
                .store
                .update_survey(
                    id,
                    SurveyUpdate {
                        is_published: Some(true),
                        ..SurveyUpdate::default()
                    },
                )
                .await?;
            tracing::info!(survey_id = %id, "Survey republished");
            return Ok(survey);
        }

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let mut candidate = survey.clone();
            candidate.publish_with_token((self.token_generator)());

            let update = SurveyUpdate {
                is_published: Some(true),
                share_token: candidate.share_token,
                ..SurveyUpdate::default()
            };

            match self.store.update_survey(id, update).await {
                Ok(published) => {
                    tracing::info!(survey_id = %id, attempt, "Survey published");
                    return Ok(published);
                }
                Err(StoreError::Conflict(detail)) => {
                    tracing::warn!(
                        survey_id = %id,
                        attempt,
                        detail = %detail,
                        "Share token collision, regenerating"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            survey_id = %id,
            attempts = MAX_TOKEN_ATTEMPTS,
            "Share token generation failed"
        );
        Err(SurveyServiceError::TokenGenerationFailed {
            attempts: MAX_TOKEN_ATTEMPTS,
        })
    }

    /// Returns a survey to draft. Its share token is kept.
    pub async fn unpublish(&self, owner: Uuid, id: Uuid) -> Result<Survey, SurveyServiceError> {
        let mut survey = self.get_owned_survey(owner, id).await?;
        if !survey.is_published {
            return Ok(survey);
        }
        survey.unpublish();

        let survey = self
            .store
            .update_survey(
                id,
                SurveyUpdate {
                    is_published: Some(survey.is_published),
                    ..SurveyUpdate::default()
                },
            )
            .await?;
        tracing::info!(survey_id = %id, "Survey unpublished");
        Ok(survey)
    }

    /// Deletes a survey and all of its responses.
    pub async fn delete_survey(&self, owner: Uuid, id: Uuid) -> Result<(), SurveyServiceError> {
        self.get_owned_survey(owner, id).await?;
        self.store.delete_survey(id).await?;
        tracing::info!(survey_id = %id, user_id = %owner, "Survey deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Public path
    // ------------------------------------------------------------------

    pub async fn resolve_share_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ShareLink, SurveyServiceError> {
        Ok(resolve_share_token(self.store.as_ref(), token, now).await?)
    }

    /// Validates and stores a public submission.
    ///
    /// Every content rule runs inside the response validator, so the outcome
    /// matches a client-side check with the same answer length limit. The
    /// capacity check and the insert are not atomic, so concurrent
    /// submissions may overshoot `max_responses` slightly.
    pub async fn submit_response(
        &self,
        submission: ResponseSubmission,
        now: DateTime<Utc>,
    ) -> Result<SurveyResponse, SurveyServiceError> {
        let survey = self
            .store
            .get_survey_by_id(submission.survey_id)
            .await?
            .ok_or(SurveyServiceError::NotFound)?;
        let count = self.store.count_responses(survey.id).await?;

        let accepted = match validate_response_within(
            &survey,
            now,
            &submission.answers,
            submission.respondent_email.as_deref(),
            count,
            self.limits.max_answer_length,
        ) {
            Ok(accepted) => accepted,
            Err(rejection) => {
                tracing::info!(
                    survey_id = %survey.id,
                    reason = rejection.code(),
                    "Response rejected"
                );
                return Err(rejection.into());
            }
        };

        let response = self
            .store
            .insert_response(NewSurveyResponse {
                survey_id: survey.id,
                answers: accepted.answers,
                respondent_email: accepted.respondent_email,
                ip_address: submission.ip_address,
                user_agent: submission.user_agent,
                submitted_at: now,
            })
            .await?;

        tracing::info!(
            survey_id = %survey.id,
            response_id = %response.id,
            "Response accepted"
        );

        Ok(response)
    }

    // ------------------------------------------------------------------
    // Owner analytics
    // ------------------------------------------------------------------

    /// Responses of an owned survey, most recent first.
    pub async fn list_responses(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Vec<SurveyResponse>, SurveyServiceError> {
        let survey = self.get_owned_survey(owner, id).await?;
        Ok(self.store.list_responses(survey.id).await?)
    }

    pub async fn analytics(
        &self,
        owner: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport, SurveyServiceError> {
        let survey = self.get_owned_survey(owner, id).await?;
        let responses = self.store.list_responses(survey.id).await?;
        Ok(aggregate(&survey, &responses, now))
    }

    pub async fn export_csv(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<CsvExport, SurveyServiceError> {
        let survey = self.get_owned_survey(owner, id).await?;
        let responses = self.store.list_responses(survey.id).await?;

        tracing::info!(survey_id = %id, rows = responses.len(), "Exporting responses");

        Ok(CsvExport {
            file_name: export_file_name(&survey.title),
            content: responses_to_csv(&survey, &responses),
        })
    }

    pub async fn dashboard(
        &self,
        owner: Uuid,
        now: DateTime<Utc>,
    ) -> Result<OwnerDashboard, SurveyServiceError> {
        let activity = self.store.survey_activity(owner, now).await?;
        Ok(OwnerDashboard::from_activity(activity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{QuestionKind, SchemaError};
    use crate::models::survey::tests::{fixed_now, make_question, make_survey};
    use crate::models::survey::CollectionSettings;
    use crate::services::store::InMemorySurveyStore;
    use crate::services::share_token::ClosedReason;
    use chrono::Duration;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TAKEN_TOKEN: &str = "dGFrZW4tdG9rZW4tdmFsdWUtMDAwMDAw";

    fn service_with(store: Arc<InMemorySurveyStore>) -> SurveyService {
        SurveyService::new(store, SchemaLimits::default())
    }

    fn sequence_generator(tokens: Vec<&'static str>) -> TokenGenerator {
        let calls = Arc::new(AtomicUsize::new(0));
        Arc::new(move || {
            let index = calls.fetch_add(1, Ordering::SeqCst);
            tokens[index.min(tokens.len() - 1)].to_string()
        })
    }

    fn create_request(title: &str) -> CreateSurveyRequest {
        CreateSurveyRequest {
            title: title.to_string(),
            description: None,
            questions: vec![QuestionInput {
                id: None,
                prompt: "How likely are you to recommend us?".to_string(),
                required: true,
                kind: QuestionKind::Rating,
            }],
            settings: CollectionSettings::default(),
        }
    }

    fn submission(survey: &Survey, pairs: &[(&str, &str)]) -> ResponseSubmission {
        ResponseSubmission {
            survey_id: survey.id,
            answers: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            respondent_email: None,
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("test-agent".to_string()),
        }
    }

    async fn seeded(survey: Survey) -> (Arc<InMemorySurveyStore>, SurveyService) {
        let store = Arc::new(InMemorySurveyStore::new());
        store.seed_survey(survey).await;
        let service = service_with(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_create_survey_assigns_question_ids() {
        let service = service_with(Arc::new(InMemorySurveyStore::new()));
        let owner = Uuid::new_v4();

        let survey = service
            .create_survey(owner, create_request("  NPS  "))
            .await
            .unwrap();

        assert_eq!(survey.title, "NPS");
        assert_eq!(survey.user_id, owner);
        assert!(!survey.is_published);
        assert!(Uuid::parse_str(&survey.questions[0].id).is_ok());
    }

    #[tokio::test]
    async fn test_create_survey_rejects_invalid_definition() {
        let service = service_with(Arc::new(InMemorySurveyStore::new()));
        let mut request = create_request("Colors");
        request.questions[0].kind = QuestionKind::MultipleChoice { options: vec![] };

        let result = service.create_survey(Uuid::new_v4(), request).await;
        assert!(matches!(
            result,
            Err(SurveyServiceError::InvalidDefinition(SchemaError::MissingOptions { .. }))
        ));
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let survey = make_survey(vec![]);
        let id = survey.id;
        let (_, service) = seeded(survey).await;

        let stranger = Uuid::new_v4();
        assert!(matches!(
            service.get_owned_survey(stranger, id).await,
            Err(SurveyServiceError::NotFound)
        ));
        assert!(matches!(
            service.delete_survey(stranger, id).await,
            Err(SurveyServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_preserves_question_ids_and_clears_fields() {
        let mut survey = make_survey(vec![make_question("keep-me", QuestionKind::Text, false)]);
        survey.description = Some("old".to_string());
        survey.settings.max_responses = Some(10);
        let (id, owner) = (survey.id, survey.user_id);
        let (_, service) = seeded(survey).await;

        let request: UpdateSurveyRequest = serde_json::from_str(
            r#"{
                "description": null,
                "max_responses": null,
                "questions": [
                    {"id": "keep-me", "type": "text", "prompt": "Renamed"},
                    {"type": "yes-no", "prompt": "New one", "required": true}
                ]
            }"#,
        )
        .unwrap();

        let updated = service.update_survey(owner, id, request).await.unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.settings.max_responses, None);
        assert_eq!(updated.questions[0].id, "keep-me");
        assert_eq!(updated.questions[0].prompt, "Renamed");
        assert_ne!(updated.questions[1].id, "");
        assert_eq!(updated.title, "Customer feedback");
    }

    #[tokio::test]
    async fn test_update_rejects_non_positive_capacity() {
        let survey = make_survey(vec![]);
        let (id, owner) = (survey.id, survey.user_id);
        let (_, service) = seeded(survey).await;

        let request: UpdateSurveyRequest =
            serde_json::from_str(r#"{"max_responses": -3}"#).unwrap();
        assert!(matches!(
            service.update_survey(owner, id, request).await,
            Err(SurveyServiceError::InvalidDefinition(SchemaError::InvalidMaxResponses))
        ));
    }

    #[tokio::test]
    async fn test_publish_mints_token_once() {
        let mut survey = make_survey(vec![]);
        survey.is_published = false;
        survey.share_token = None;
        let (id, owner) = (survey.id, survey.user_id);
        let (_, service) = seeded(survey).await;

        let published = service.publish(owner, id).await.unwrap();
        let token = published.share_token.clone().unwrap();
        assert!(published.is_published);
        assert_eq!(token.len(), 32);

        let again = service.publish(owner, id).await.unwrap();
        assert_eq!(again.share_token.as_deref(), Some(token.as_str()));

        let draft = service.unpublish(owner, id).await.unwrap();
        assert!(!draft.is_published);
        assert_eq!(draft.share_token.as_deref(), Some(token.as_str()));

        let republished = service.publish(owner, id).await.unwrap();
        assert!(republished.is_published);
        assert_eq!(republished.share_token.as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_publish_retries_on_token_collision() {
        let mut holder = make_survey(vec![]);
        holder.share_token = Some(TAKEN_TOKEN.to_string());
        let mut survey = make_survey(vec![]);
        survey.is_published = false;
        survey.share_token = None;
        let (id, owner) = (survey.id, survey.user_id);

        let store = Arc::new(InMemorySurveyStore::new());
        store.seed_survey(holder).await;
        store.seed_survey(survey).await;
        let service = service_with(store).with_token_generator(sequence_generator(vec![
            TAKEN_TOKEN,
            TAKEN_TOKEN,
            "ZnJlc2gtdG9rZW4tdmFsdWUtMTExMTEx",
        ]));

        let published = service.publish(owner, id).await.unwrap();
        assert_eq!(
            published.share_token.as_deref(),
            Some("ZnJlc2gtdG9rZW4tdmFsdWUtMTExMTEx")
        );
    }

    #[tokio::test]
    async fn test_publish_gives_up_after_bounded_attempts() {
        let mut holder = make_survey(vec![]);
        holder.share_token = Some(TAKEN_TOKEN.to_string());
        let mut survey = make_survey(vec![]);
        survey.is_published = false;
        survey.share_token = None;
        let (id, owner) = (survey.id, survey.user_id);

        let store = Arc::new(InMemorySurveyStore::new());
        store.seed_survey(holder).await;
        store.seed_survey(survey).await;
        let service =
            service_with(store.clone()).with_token_generator(sequence_generator(vec![TAKEN_TOKEN]));

        let result = service.publish(owner, id).await;
        assert!(matches!(
            result,
            Err(SurveyServiceError::TokenGenerationFailed { attempts: 5 })
        ));

        let unchanged = store.get_survey_by_id(id).await.unwrap().unwrap();
        assert!(!unchanged.is_published);
        assert!(unchanged.share_token.is_none());
    }

    #[tokio::test]
    async fn test_submit_response_stores_normalized_answers() {
        let survey = make_survey(vec![make_question("score", QuestionKind::Rating, true)]);
        let (store, service) = seeded(survey.clone()).await;

        let stored = service
            .submit_response(submission(&survey, &[("score", " 4 ")]), fixed_now())
            .await
            .unwrap();

        assert_eq!(stored.answers.get("score").map(String::as_str), Some("4"));
        assert_eq!(stored.submitted_at, fixed_now());
        assert_eq!(stored.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(store.count_responses(survey.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_third_submission_hits_capacity() {
        let mut survey = make_survey(vec![make_question("score", QuestionKind::Rating, true)]);
        survey.settings.max_responses = Some(2);
        let (store, service) = seeded(survey.clone()).await;

        for _ in 0..2 {
            service
                .submit_response(submission(&survey, &[("score", "5")]), fixed_now())
                .await
                .unwrap();
        }

        let result = service
            .submit_response(submission(&survey, &[("score", "5")]), fixed_now())
            .await;
        assert!(matches!(
            result,
            Err(SurveyServiceError::Rejected(Rejection::CapacityReached))
        ));
        assert_eq!(store.count_responses(survey.id).await.unwrap(), 2);

        let link = service
            .resolve_share_token(survey.share_token.as_deref().unwrap(), fixed_now())
            .await
            .unwrap();
        assert!(matches!(
            link,
            ShareLink::Closed {
                reason: ClosedReason::CapacityReached,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_submit_keeps_respondent_email() {
        let mut survey = make_survey(vec![make_question("again", QuestionKind::YesNo, true)]);
        survey.settings.require_email = true;
        let (_, service) = seeded(survey.clone()).await;
        let email: String = SafeEmail().fake();

        let mut missing_email = submission(&survey, &[("again", "no")]);
        assert!(matches!(
            service.submit_response(missing_email.clone(), fixed_now()).await,
            Err(SurveyServiceError::Rejected(Rejection::EmailRequired))
        ));

        missing_email.respondent_email = Some(email.clone());
        let stored = service
            .submit_response(missing_email, fixed_now())
            .await
            .unwrap();
        assert_eq!(stored.respondent_email, Some(email));
    }

    #[tokio::test]
    async fn test_submit_to_unknown_survey() {
        let service = service_with(Arc::new(InMemorySurveyStore::new()));
        let survey = make_survey(vec![]);
        let result = service
            .submit_response(submission(&survey, &[]), fixed_now())
            .await;
        assert!(matches!(result, Err(SurveyServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_submit_agrees_with_pure_validator() {
        let max = SchemaLimits::default().max_answer_length;
        let long = "x".repeat(max + 1);
        let published = make_survey(vec![make_question("notes", QuestionKind::Text, false)]);
        let mut draft = make_survey(vec![make_question("notes", QuestionKind::Text, false)]);
        draft.is_published = false;

        let cases = [
            (published.clone(), vec![("notes", long.as_str())], None),
            (draft.clone(), vec![("notes", long.as_str())], None),
            (draft, vec![("stray", long.as_str())], Some("not-an-email")),
            (published.clone(), vec![("stray", long.as_str())], None),
            (published, vec![("notes", "fine")], Some("not-an-email")),
        ];

        for (survey, pairs, email) in cases {
            let (_, service) = seeded(survey.clone()).await;
            let mut candidate = submission(&survey, &pairs);
            candidate.respondent_email = email.map(str::to_string);

            let pure = validate_response_within(
                &survey,
                fixed_now(),
                &candidate.answers,
                email,
                0,
                max,
            );
            let served = service.submit_response(candidate, fixed_now()).await;

            match (pure, served) {
                (Ok(_), Ok(_)) => {}
                (Err(expected), Err(SurveyServiceError::Rejected(actual))) => {
                    assert_eq!(expected, actual)
                }
                (pure, served) => panic!("outcomes differ: {:?} vs {:?}", pure, served),
            }
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_store_error() {
        let service = service_with(Arc::new(InMemorySurveyStore::failing()));
        let survey = make_survey(vec![]);
        let result = service
            .submit_response(submission(&survey, &[]), fixed_now())
            .await;
        assert!(matches!(
            result,
            Err(SurveyServiceError::Store(StoreError::Backend(_)))
        ));
    }

    #[tokio::test]
    async fn test_analytics_and_export() {
        let survey = make_survey(vec![make_question("score", QuestionKind::Rating, true)]);
        let (id, owner) = (survey.id, survey.user_id);
        let (_, service) = seeded(survey.clone()).await;

        for (rating, days) in [("5", 0), ("3", 2)] {
            service
                .submit_response(
                    submission(&survey, &[("score", rating)]),
                    fixed_now() - Duration::days(days),
                )
                .await
                .unwrap();
        }

        let report = service.analytics(owner, id, fixed_now()).await.unwrap();
        assert_eq!(report.summary.total_responses, 2);
        assert_eq!(report.questions.len(), 1);

        let export = service.export_csv(owner, id).await.unwrap();
        assert_eq!(export.file_name, "Customer_feedback_responses.csv");
        assert_eq!(export.content.lines().count(), 3);

        let responses = service.list_responses(owner, id).await.unwrap();
        assert_eq!(responses[0].submitted_at, fixed_now());

        let dashboard = service.dashboard(owner, fixed_now()).await.unwrap();
        assert_eq!(dashboard.total_surveys, 1);
        assert_eq!(dashboard.total_responses, 2);
        assert_eq!(dashboard.average_responses_per_survey, 2);
    }
}
