//! Response validation.
//!
//! [`validate_response`] is the single gate every submission passes before it
//! is stored. It performs no I/O: the caller supplies the clock and the current
//! response count, so the same check can run ahead of time on a client and
//! authoritatively on the server with identical outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use validator::ValidateEmail;

use crate::models::question::{AnswerError, DEFAULT_MAX_ANSWER_LENGTH};
use crate::models::response::Answers;
use crate::models::survey::{Availability, Survey};

/// A single answer that failed its question's rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidAnswer {
    pub question_id: String,
    pub error: AnswerError,
}

/// Why a submission was refused. Variants are listed in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("This survey is not accepting responses")]
    NotPublished,

    #[error("This survey has expired")]
    Expired,

    #[error("This survey has reached its maximum number of responses")]
    CapacityReached,

    #[error("Please answer all required questions")]
    MissingRequiredAnswers { question_ids: Vec<String> },

    #[error("An email address is required for this survey")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("One or more answers are not valid")]
    InvalidAnswerValue { invalid: Vec<InvalidAnswer> },
}

impl Rejection {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NotPublished => "not_published",
            Rejection::Expired => "expired",
            Rejection::CapacityReached => "capacity_reached",
            Rejection::MissingRequiredAnswers { .. } => "missing_required_answers",
            Rejection::EmailRequired => "email_required",
            Rejection::InvalidEmail => "invalid_email",
            Rejection::InvalidAnswerValue { .. } => "invalid_answer_value",
        }
    }
}

/// A submission that passed validation, normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedResponse {
    pub answers: Answers,
    pub respondent_email: Option<String>,
}

/// Checks a submission against the survey's state and question schema,
/// bounding answers at [`DEFAULT_MAX_ANSWER_LENGTH`] characters.
pub fn validate_response(
    survey: &Survey,
    now: DateTime<Utc>,
    answers: &Answers,
    respondent_email: Option<&str>,
    current_response_count: i64,
) -> Result<AcceptedResponse, Rejection> {
    validate_response_within(
        survey,
        now,
        answers,
        respondent_email,
        current_response_count,
        DEFAULT_MAX_ANSWER_LENGTH,
    )
}

/// Checks a submission against the survey's state and question schema.
///
/// Answers keyed by ids that are not part of the survey are dropped, as are
/// blank answers to optional questions. Only answers that are kept count
/// against `max_answer_length`.
pub fn validate_response_within(
    survey: &Survey,
    now: DateTime<Utc>,
    answers: &Answers,
    respondent_email: Option<&str>,
    current_response_count: i64,
    max_answer_length: usize,
) -> Result<AcceptedResponse, Rejection> {
    match survey.availability(now, current_response_count) {
        Availability::Open => {}
        Availability::NotPublished => return Err(Rejection::NotPublished),
        Availability::Expired => return Err(Rejection::Expired),
        Availability::CapacityReached => return Err(Rejection::CapacityReached),
    }

    let missing = survey.missing_required_questions(answers);
    if !missing.is_empty() {
        return Err(Rejection::MissingRequiredAnswers {
            question_ids: missing.into_iter().map(|q| q.id.clone()).collect(),
        });
    }

    let respondent_email = respondent_email
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string);
    match &respondent_email {
        None if survey.settings.require_email => return Err(Rejection::EmailRequired),
        Some(email) if !email.validate_email() => return Err(Rejection::InvalidEmail),
        _ => {}
    }

    let mut normalized = Answers::new();
    let mut invalid = Vec::new();
    for question in &survey.questions {
        let answer = answers.get(&question.id).map(String::as_str);
        match question.check_answer_within(answer, max_answer_length) {
            Ok(Some(value)) => {
                normalized.insert(question.id.clone(), value);
            }
            Ok(None) => {}
            Err(error) => invalid.push(InvalidAnswer {
                question_id: question.id.clone(),
                error,
            }),
        }
    }

    if !invalid.is_empty() {
        return Err(Rejection::InvalidAnswerValue { invalid });
    }

    Ok(AcceptedResponse {
        answers: normalized,
        respondent_email,
    })
}
