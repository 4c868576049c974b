//! Question schema: the four supported question variants and their answer rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lowest accepted rating.
pub const RATING_MIN: i64 = 1;

/// Highest accepted rating.
pub const RATING_MAX: i64 = 5;

/// Every rating value, in display order.
pub const RATING_VALUES: [i64; 5] = [1, 2, 3, 4, 5];

/// Answer length bound used when none is configured.
pub const DEFAULT_MAX_ANSWER_LENGTH: usize = 5000;

pub const YES: &str = "yes";
pub const NO: &str = "no";

/// Question variant. Each variant carries only the fields valid for it, so a
/// rating question with options cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String> },
    Text,
    Rating,
    YesNo,
}

impl QuestionKind {
    /// Wire name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple-choice",
            QuestionKind::Text => "text",
            QuestionKind::Rating => "rating",
            QuestionKind::YesNo => "yes-no",
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable id, unique within its survey.
    pub id: String,
    #[serde(alias = "question")]
    pub prompt: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Question as submitted by an owner. The id is optional for new questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "question")]
    pub prompt: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl QuestionInput {
    /// Converts into a question, minting an id when none was supplied.
    pub fn into_question(self) -> Question {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };

        Question {
            id,
            prompt: self.prompt,
            required: self.required,
            kind: self.kind,
        }
    }
}

/// Why a single answer was not acceptable for its question.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum AnswerError {
    #[error("An answer is required")]
    Missing,

    #[error("'{value}' is not one of the available options")]
    UnknownOption { value: String },

    #[error("Rating must be a whole number between 1 and 5")]
    RatingOutOfRange,

    #[error("Answer must be 'yes' or 'no'")]
    NotYesNo,

    #[error("Answer must be at most {max} characters")]
    TooLong { max: usize },
}

/// Problems found in a survey or question definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Survey title must not be empty")]
    EmptyTitle,

    #[error("Survey title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("A survey can have at most {max} questions")]
    TooManyQuestions { max: usize },

    #[error("Question {position} has an empty id")]
    EmptyQuestionId { position: usize },

    #[error("Question {position} has an empty prompt")]
    EmptyPrompt { position: usize },

    #[error("Question id '{id}' is used more than once")]
    DuplicateQuestionId { id: String },

    #[error("Multiple-choice question '{id}' needs at least one option")]
    MissingOptions { id: String },

    #[error("Multiple-choice question '{id}' has an empty option")]
    EmptyOption { id: String },

    #[error("Multiple-choice question '{id}' has more than {max} options")]
    TooManyOptions { id: String, max: usize },

    #[error("max_responses must be a positive integer")]
    InvalidMaxResponses,
}

/// Returns true when an answer carries something other than whitespace.
pub fn is_answered(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl Question {
    /// Checks a candidate answer and returns its normalized storage form.
    ///
    /// `Ok(None)` means the question was left unanswered, which only optional
    /// questions allow. Multiple-choice answers must equal an option exactly,
    /// surrounding whitespace included. Text, rating and yes/no answers are
    /// trimmed before they are checked.
    pub fn check_answer(&self, value: Option<&str>) -> Result<Option<String>, AnswerError> {
        let raw = match value {
            Some(v) if is_answered(Some(v)) => v,
            _ if self.required => return Err(AnswerError::Missing),
            _ => return Ok(None),
        };
        let trimmed = raw.trim();

        match &self.kind {
            QuestionKind::MultipleChoice { options } => options
                .iter()
                .find(|option| option.as_str() == raw)
                .map(|option| Some(option.clone()))
                .ok_or_else(|| AnswerError::UnknownOption {
                    value: raw.to_string(),
                }),
            QuestionKind::Text => Ok(Some(trimmed.to_string())),
            QuestionKind::Rating => match trimmed.parse::<i64>() {
                Ok(rating) if (RATING_MIN..=RATING_MAX).contains(&rating) => {
                    Ok(Some(rating.to_string()))
                }
                _ => Err(AnswerError::RatingOutOfRange),
            },
            QuestionKind::YesNo => {
                let lowered = trimmed.to_lowercase();
                if lowered == YES || lowered == NO {
                    Ok(Some(lowered))
                } else {
                    Err(AnswerError::NotYesNo)
                }
            }
        }
    }

    /// Like [`Question::check_answer`], also rejecting normalized answers
    /// longer than `max_length` characters.
    pub fn check_answer_within(
        &self,
        value: Option<&str>,
        max_length: usize,
    ) -> Result<Option<String>, AnswerError> {
        match self.check_answer(value)? {
            Some(answer) if answer.chars().count() > max_length => {
                Err(AnswerError::TooLong { max: max_length })
            }
            other => Ok(other),
        }
    }

    /// Pure acceptability check, see [`Question::check_answer`].
    pub fn accepts(&self, value: Option<&str>) -> bool {
        self.check_answer(value).is_ok()
    }

    /// Validates the question definition. `position` is 1-based.
    pub fn validate_definition(
        &self,
        position: usize,
        max_options: usize,
    ) -> Result<(), SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::EmptyQuestionId { position });
        }
        if self.prompt.trim().is_empty() {
            return Err(SchemaError::EmptyPrompt { position });
        }

        if let QuestionKind::MultipleChoice { options } = &self.kind {
            if options.is_empty() {
                return Err(SchemaError::MissingOptions {
                    id: self.id.clone(),
                });
            }
            if options.iter().any(|o| o.trim().is_empty()) {
                return Err(SchemaError::EmptyOption {
                    id: self.id.clone(),
                });
            }
            if options.len() > max_options {
                return Err(SchemaError::TooManyOptions {
                    id: self.id.clone(),
                    max: max_options,
                });
            }
        }

        Ok(())
    }
}
