//! Survey response domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::question::{NO, YES};

/// Longer client-reported user agents are cut to this many characters.
pub const MAX_USER_AGENT_LENGTH: usize = 512;

/// Answers keyed by question id, in their normalized string form.
pub type Answers = BTreeMap<String, String>;

/// Stored survey response. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SurveyResponse {
    pub id: Uuid,
    pub survey_id: Uuid,
    pub answers: Answers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A validated response ready to be appended to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurveyResponse {
    pub survey_id: Uuid,
    pub answers: Answers,
    pub respondent_email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A single answer value as it arrives on the wire.
///
/// Ratings may come in as numbers and yes/no answers as booleans; everything is
/// coerced to text before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Flag(bool),
    Empty,
}

impl AnswerInput {
    /// Text form of the value, or None for null.
    pub fn into_text(self) -> Option<String> {
        match self {
            AnswerInput::Text(value) => Some(value),
            AnswerInput::Integer(value) => Some(value.to_string()),
            AnswerInput::Decimal(value) => Some(value.to_string()),
            AnswerInput::Flag(true) => Some(YES.to_string()),
            AnswerInput::Flag(false) => Some(NO.to_string()),
            AnswerInput::Empty => None,
        }
    }
}

/// Public submission payload.
///
/// Content rules (email format, answer length) belong to the response
/// validator so they are applied after the survey's availability gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmitResponseRequest {
    pub survey_id: Uuid,
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl SubmitResponseRequest {
    /// Blank emails are treated as absent so they fail `require_email`
    /// rather than the email format check.
    pub fn normalize(mut self) -> Self {
        self.respondent_email = self
            .respondent_email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        self.user_agent = self
            .user_agent
            .filter(|ua| !ua.trim().is_empty())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect());
        self
    }

    /// Answers coerced to text; null values are dropped.
    pub fn text_answers(&self) -> Answers {
        self.answers
            .iter()
            .filter_map(|(id, value)| value.clone().into_text().map(|text| (id.clone(), text)))
            .collect()
    }
}

/// Acknowledgement returned to a respondent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmitResponseResponse {
    pub id: Uuid,
    pub survey_id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

impl From<&SurveyResponse> for SubmitResponseResponse {
    fn from(response: &SurveyResponse) -> Self {
        Self {
            id: response.id,
            survey_id: response.survey_id,
            submitted_at: response.submitted_at,
        }
    }
}
