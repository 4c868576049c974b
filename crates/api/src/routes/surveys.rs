//! Survey authoring and owner analytics endpoint handlers.
//!
//! Every handler here requires an owner access token. Surveys that belong to
//! another owner are reported as not found.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::OwnerAuth;
use crate::middleware::metrics::record_survey_published;
use domain::models::analytics::AnalyticsReport;
use domain::models::response::SurveyResponse;
use domain::models::survey::{CreateSurveyRequest, Survey, SurveyView, UpdateSurveyRequest};

/// Response for survey listing.
#[derive(Debug, Serialize)]
pub struct ListSurveysResponse {
    pub surveys: Vec<SurveyView>,
}

/// Response for response listing.
#[derive(Debug, Serialize)]
pub struct ListResponsesResponse {
    pub survey_id: Uuid,
    pub total: usize,
    pub responses: Vec<SurveyResponse>,
}

fn to_view(state: &AppState, survey: Survey) -> SurveyView {
    let share_url = survey
        .share_token
        .as_deref()
        .map(|token| state.config.share_url(token));
    SurveyView { survey, share_url }
}

/// Create a draft survey.
///
/// POST /api/v1/surveys
pub async fn create_survey(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Json(request): Json<CreateSurveyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let survey = state.service.create_survey(owner.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(to_view(&state, survey))))
}

/// List the caller's surveys, newest first.
///
/// GET /api/v1/surveys
pub async fn list_surveys(
    State(state): State<AppState>,
    owner: OwnerAuth,
) -> Result<Json<ListSurveysResponse>, ApiError> {
    let surveys = state.service.list_surveys(owner.user_id).await?;
    Ok(Json(ListSurveysResponse {
        surveys: surveys.into_iter().map(|s| to_view(&state, s)).collect(),
    }))
}

/// GET /api/v1/surveys/:survey_id
pub async fn get_survey(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<SurveyView>, ApiError> {
    let survey = state
        .service
        .get_owned_survey(owner.user_id, survey_id)
        .await?;
    Ok(Json(to_view(&state, survey)))
}

/// Partially update a survey's title, description, questions or settings.
///
/// PATCH /api/v1/surveys/:survey_id
pub async fn update_survey(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
    Json(request): Json<UpdateSurveyRequest>,
) -> Result<Json<SurveyView>, ApiError> {
    request.validate()?;

    let survey = state
        .service
        .update_survey(owner.user_id, survey_id, request)
        .await?;
    Ok(Json(to_view(&state, survey)))
}

/// Delete a survey together with its responses.
///
/// DELETE /api/v1/surveys/:survey_id
pub async fn delete_survey(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_survey(owner.user_id, survey_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Publish a survey, minting its share token on first publication.
///
/// POST /api/v1/surveys/:survey_id/publish
pub async fn publish_survey(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<SurveyView>, ApiError> {
    let survey = state.service.publish(owner.user_id, survey_id).await?;
    record_survey_published();
    Ok(Json(to_view(&state, survey)))
}

/// POST /api/v1/surveys/:survey_id/unpublish
pub async fn unpublish_survey(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<SurveyView>, ApiError> {
    let survey = state.service.unpublish(owner.user_id, survey_id).await?;
    Ok(Json(to_view(&state, survey)))
}

/// Aggregated analytics for a survey.
///
/// GET /api/v1/surveys/:survey_id/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let report = state
        .service
        .analytics(owner.user_id, survey_id, Utc::now())
        .await?;
    Ok(Json(report))
}

/// Raw responses, most recent first.
///
/// GET /api/v1/surveys/:survey_id/responses
pub async fn list_responses(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<ListResponsesResponse>, ApiError> {
    let responses = state
        .service
        .list_responses(owner.user_id, survey_id)
        .await?;
    Ok(Json(ListResponsesResponse {
        survey_id,
        total: responses.len(),
        responses,
    }))
}

/// Download all responses as CSV.
///
/// GET /api/v1/surveys/:survey_id/responses/export
pub async fn export_responses(
    State(state): State<AppState>,
    owner: OwnerAuth,
    Path(survey_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let export = state
        .service
        .export_csv(owner.user_id, survey_id)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.content,
    ))
}
