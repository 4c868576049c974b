//! Analytics domain models.
//!
//! Per-question breakdowns, the 30-day response timeline and the owner
//! dashboard rollup.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Survey analytics
// ============================================================================

/// Aggregated view over every response of one survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyticsReport {
    pub survey_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: ResponseSummary,
    pub questions: Vec<QuestionAnalytics>,
    pub timeline: Vec<DailyResponseCount>,
}

/// Raw response totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResponseSummary {
    pub total_responses: i64,
    pub last_7_days: i64,
    pub last_30_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_response_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_response_at: Option<DateTime<Utc>>,
}

/// Statistics for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QuestionAnalytics {
    pub question_id: String,
    /// 1-based position, rendered as `Q1`, `Q2`, ...
    pub number: usize,
    pub prompt: String,
    /// Responses with a non-blank answer to this question.
    pub answered: i64,
    #[serde(flatten)]
    pub breakdown: QuestionBreakdown,
}

impl QuestionAnalytics {
    pub fn label(&self) -> String {
        format!("Q{}", self.number)
    }
}

/// Distribution of answers, shaped by the question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionBreakdown {
    MultipleChoice {
        options: Vec<OptionCount>,
    },
    Rating {
        average: f64,
        distribution: Vec<RatingCount>,
    },
    YesNo {
        yes: AnswerShare,
        no: AnswerShare,
    },
}

/// Count and rounded percentage of one answer category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerShare {
    pub count: i64,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCount {
    pub option: String,
    pub count: i64,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingCount {
    pub rating: i64,
    pub count: i64,
    pub percentage: i64,
}

/// Responses submitted on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyResponseCount {
    pub date: NaiveDate,
    pub responses: i64,
}

// ============================================================================
// Owner dashboard
// ============================================================================

/// Response activity of one survey, as read from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SurveyActivity {
    pub survey_id: Uuid,
    pub title: String,
    pub is_published: bool,
    pub total_responses: i64,
    pub responses_last_7_days: i64,
    pub responses_last_30_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_response_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_response_at: Option<DateTime<Utc>>,
}

/// Rollup across every survey of an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OwnerDashboard {
    pub total_surveys: i64,
    pub published_surveys: i64,
    pub draft_surveys: i64,
    pub total_responses: i64,
    pub responses_last_7_days: i64,
    pub average_responses_per_survey: i64,
    pub surveys: Vec<SurveyActivity>,
}

impl OwnerDashboard {
    /// Builds the rollup from per-survey activity rows.
    pub fn from_activity(surveys: Vec<SurveyActivity>) -> Self {
        let total_surveys = surveys.len() as i64;
        let published_surveys = surveys.iter().filter(|s| s.is_published).count() as i64;
        let total_responses: i64 = surveys.iter().map(|s| s.total_responses).sum();
        let responses_last_7_days = surveys.iter().map(|s| s.responses_last_7_days).sum();

        // Round half up; both operands are non-negative.
        let average_responses_per_survey = if total_surveys == 0 {
            0
        } else {
            (2 * total_responses + total_surveys) / (2 * total_surveys)
        };

        Self {
            total_surveys,
            published_surveys,
            draft_surveys: total_surveys - published_surveys,
            total_responses,
            responses_last_7_days,
            average_responses_per_survey,
            surveys,
        }
    }
}
