use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::share_token::ClosedReason;
use domain::services::{Rejection, SurveyServiceError};
use serde::Serialize;
use serde_json::{json, Value};
use shared::jwt::JwtError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<Vec<ValidationDetail>>,
    },

    /// A well-formed submission the survey refused to accept.
    #[error("Rejected ({code}): {message}")]
    Rejected {
        code: &'static str,
        message: String,
        details: Option<Value>,
    },

    /// The share link points at a survey that no longer takes responses.
    #[error("Survey closed: {0:?}")]
    SurveyClosed(ClosedReason),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details.map(|d| json!(d)),
            ),
            ApiError::Rejected {
                code,
                message,
                details,
            } => (StatusCode::UNPROCESSABLE_ENTITY, code, message, details),
            ApiError::SurveyClosed(reason) => (
                StatusCode::GONE,
                "survey_closed",
                reason.message().to_string(),
                Some(json!({ "reason": reason.as_str() })),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "The service is temporarily unavailable. Please retry shortly.".into(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        let details = match &rejection {
            Rejection::MissingRequiredAnswers { question_ids } => {
                Some(json!({ "question_ids": question_ids }))
            }
            Rejection::InvalidAnswerValue { invalid } => Some(json!({ "invalid": invalid })),
            _ => None,
        };

        ApiError::Rejected {
            code: rejection.code(),
            message: rejection.to_string(),
            details,
        }
    }
}

impl From<SurveyServiceError> for ApiError {
    fn from(err: SurveyServiceError) -> Self {
        match err {
            SurveyServiceError::NotFound => ApiError::NotFound("Survey not found".into()),
            SurveyServiceError::Rejected(rejection) => rejection.into(),
            SurveyServiceError::InvalidDefinition(e) => ApiError::validation(e.to_string()),
            e @ SurveyServiceError::TokenGenerationFailed { .. } => {
                ApiError::ServiceUnavailable(e.to_string())
            }
            SurveyServiceError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        tracing::debug!(error = %err, "Rejected owner token");
        ApiError::Unauthorized("Invalid or expired access token".into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation {
            message,
            details: Some(details),
        }
    }
}
