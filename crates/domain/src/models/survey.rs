//! Survey aggregate: content, publication state and collection policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use super::question::{
    is_answered, Question, QuestionInput, SchemaError, DEFAULT_MAX_ANSWER_LENGTH,
};
use super::response::Answers;

/// Configurable bounds applied when a survey definition is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaLimits {
    pub max_questions: usize,
    pub max_options: usize,
    pub max_title_length: usize,
    pub max_answer_length: usize,
}

impl Default for SchemaLimits {
    fn default() -> Self {
        Self {
            max_questions: 100,
            max_options: 50,
            max_title_length: 200,
            max_answer_length: DEFAULT_MAX_ANSWER_LENGTH,
        }
    }
}

/// Rules deciding who may respond and for how long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CollectionSettings {
    #[serde(default = "default_true")]
    pub allow_anonymous_responses: bool,
    #[serde(default)]
    pub require_email: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_responses: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            allow_anonymous_responses: true,
            require_email: false,
            max_responses: None,
            expires_at: None,
        }
    }
}

/// Whether a survey is currently taking responses, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Open,
    NotPublished,
    Expired,
    CapacityReached,
}

/// Survey domain model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Survey {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<Question>,
    #[serde(flatten)]
    pub settings: CollectionSettings,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Survey {
    /// Evaluates the publish, expiry and capacity gates in that order.
    pub fn availability(&self, now: DateTime<Utc>, response_count: i64) -> Availability {
        if !self.is_published {
            Availability::NotPublished
        } else if self.is_expired(now) {
            Availability::Expired
        } else if self.is_at_capacity(response_count) {
            Availability::CapacityReached
        } else {
            Availability::Open
        }
    }

    pub fn can_accept_responses(&self, now: DateTime<Utc>, response_count: i64) -> bool {
        self.availability(now, response_count) == Availability::Open
    }

    /// A survey expires at the instant `expires_at` is reached.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.settings.expires_at.is_some_and(|exp| now >= exp)
    }

    pub fn is_at_capacity(&self, response_count: i64) -> bool {
        self.settings
            .max_responses
            .is_some_and(|max| response_count >= i64::from(max))
    }

    /// Remaining response slots (None if unlimited).
    pub fn remaining_capacity(&self, response_count: i64) -> Option<i64> {
        self.settings
            .max_responses
            .map(|max| (i64::from(max) - response_count).max(0))
    }

    /// Required questions with no non-blank answer, in survey order.
    pub fn missing_required_questions(&self, answers: &Answers) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.required && !is_answered(answers.get(&q.id).map(String::as_str)))
            .collect()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Marks the survey published. `candidate` becomes the share token only
    /// when the survey has none yet; returns true if it was used.
    pub fn publish_with_token(&mut self, candidate: String) -> bool {
        self.is_published = true;
        if self.share_token.is_some() {
            return false;
        }
        self.share_token = Some(candidate);
        true
    }

    /// Back to draft. The share token is kept so republishing reuses it.
    pub fn unpublish(&mut self) {
        self.is_published = false;
    }

    /// Public path of the survey (`/s/{token}`), once a token exists.
    pub fn share_path(&self) -> Option<String> {
        self.share_token.as_ref().map(|token| format!("/s/{}", token))
    }

    /// Checks the title, questions and collection policy against `limits`.
    pub fn validate_definition(&self, limits: &SchemaLimits) -> Result<(), SchemaError> {
        validate_definition(&self.title, &self.questions, &self.settings, limits)
    }
}

/// Validates a survey definition before it is stored.
pub fn validate_definition(
    title: &str,
    questions: &[Question],
    settings: &CollectionSettings,
    limits: &SchemaLimits,
) -> Result<(), SchemaError> {
    if title.trim().is_empty() {
        return Err(SchemaError::EmptyTitle);
    }
    if title.chars().count() > limits.max_title_length {
        return Err(SchemaError::TitleTooLong {
            max: limits.max_title_length,
        });
    }
    if questions.len() > limits.max_questions {
        return Err(SchemaError::TooManyQuestions {
            max: limits.max_questions,
        });
    }

    let mut seen = HashSet::new();
    for (index, question) in questions.iter().enumerate() {
        question.validate_definition(index + 1, limits.max_options)?;
        if !seen.insert(question.id.as_str()) {
            return Err(SchemaError::DuplicateQuestionId {
                id: question.id.clone(),
            });
        }
    }

    if settings.max_responses.is_some_and(|max| max <= 0) {
        return Err(SchemaError::InvalidMaxResponses);
    }

    Ok(())
}

/// Data needed to insert a new draft survey.
#[derive(Debug, Clone)]
pub struct NewSurvey {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub settings: CollectionSettings,
}

/// Request to create a new survey.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateSurveyRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
    #[serde(flatten)]
    pub settings: CollectionSettings,
}

/// Partial update of a survey. Absent fields are left untouched; nullable
/// fields may be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateSurveyRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_anonymous_responses: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_email: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_responses: Option<Option<i32>>,
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateSurveyRequest {
    /// Applies the policy fields of this request on top of `current`.
    pub fn merge_settings(&self, current: &CollectionSettings) -> CollectionSettings {
        CollectionSettings {
            allow_anonymous_responses: self
                .allow_anonymous_responses
                .unwrap_or(current.allow_anonymous_responses),
            require_email: self.require_email.unwrap_or(current.require_email),
            max_responses: self.max_responses.unwrap_or(current.max_responses),
            expires_at: self.expires_at.unwrap_or(current.expires_at),
        }
    }

    pub fn touches_settings(&self) -> bool {
        self.allow_anonymous_responses.is_some()
            || self.require_email.is_some()
            || self.max_responses.is_some()
            || self.expires_at.is_some()
    }
}

/// Distinguishes a missing field (`None`) from an explicit null (`Some(None)`).
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Owner-facing view of a survey with its share URL and live counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SurveyView {
    #[serde(flatten)]
    pub survey: Survey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
}

/// What a respondent sees when opening a share link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicSurveyView {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<Question>,
    pub allow_anonymous_responses: bool,
    pub require_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Survey> for PublicSurveyView {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id,
            title: survey.title,
            description: survey.description,
            questions: survey.questions,
            allow_anonymous_responses: survey.settings.allow_anonymous_responses,
            require_email: survey.settings.require_email,
            expires_at: survey.settings.expires_at,
        }
    }
}
