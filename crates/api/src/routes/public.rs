//! Public respondent endpoint handlers.
//!
//! These routes take no credentials; a survey is reachable only through its
//! share token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ClientInfo;
use crate::middleware::metrics::{record_response_accepted, record_response_rejected};
use domain::models::response::{SubmitResponseRequest, SubmitResponseResponse};
use domain::models::survey::PublicSurveyView;
use domain::services::{ResponseSubmission, ShareLink, SurveyServiceError};

/// Survey behind an open share link.
#[derive(Debug, Serialize)]
pub struct SharedSurveyResponse {
    pub status: &'static str,
    pub survey: PublicSurveyView,
}

/// Resolve a share token to the survey a respondent should fill in.
///
/// GET /api/v1/s/:token
pub async fn get_shared_survey(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedSurveyResponse>, ApiError> {
    match state.service.resolve_share_token(&token, Utc::now()).await {
        Ok(ShareLink::Open(survey)) => Ok(Json(SharedSurveyResponse {
            status: "open",
            survey: survey.into(),
        })),
        Ok(ShareLink::Closed { survey, reason }) => {
            tracing::debug!(survey_id = %survey.id, reason = reason.as_str(), "Share link closed");
            Err(ApiError::SurveyClosed(reason))
        }
        Err(SurveyServiceError::NotFound) => {
            Err(ApiError::NotFound("This survey does not exist".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Submit a response to a published survey.
///
/// POST /api/v1/responses
pub async fn submit_response(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(request): Json<SubmitResponseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = request.normalize();

    let submission = ResponseSubmission {
        survey_id: request.survey_id,
        answers: request.text_answers(),
        respondent_email: request.respondent_email.clone(),
        ip_address: client.ip_address,
        user_agent: request.user_agent.clone().or(client.user_agent),
    };

    match state.service.submit_response(submission, Utc::now()).await {
        Ok(response) => {
            record_response_accepted();
            Ok((
                StatusCode::CREATED,
                Json(SubmitResponseResponse::from(&response)),
            ))
        }
        Err(SurveyServiceError::Rejected(rejection)) => {
            record_response_rejected(rejection.code());
            Err(rejection.into())
        }
        Err(e) => Err(e.into()),
    }
}
