//! Analytics aggregation over stored responses.
//!
//! [`aggregate`] is a pure reduction: the same survey, responses and clock
//! always produce the same report. Day buckets use UTC calendar days.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::analytics::{
    AnalyticsReport, AnswerShare, DailyResponseCount, OptionCount, QuestionAnalytics,
    QuestionBreakdown, RatingCount, ResponseSummary,
};
use crate::models::question::{Question, QuestionKind, NO, RATING_VALUES, YES};
use crate::models::response::SurveyResponse;
use crate::models::survey::Survey;

/// Number of daily buckets in the response timeline.
pub const TIMELINE_DAYS: i64 = 30;

/// Reduces a survey's responses into its analytics report.
pub fn aggregate(
    survey: &Survey,
    responses: &[SurveyResponse],
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let questions = survey
        .questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| question_analytics(index + 1, question, responses))
        .collect();

    AnalyticsReport {
        survey_id: survey.id,
        generated_at: now,
        summary: summarize(responses, now),
        questions,
        timeline: timeline(responses, now),
    }
}

/// Percentage rounded to the nearest integer, ties rounding up.
pub fn percentage(count: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (count * 200 + total) / (2 * total)
}

/// Raw totals and the 7/30 day windows ending at `now`.
pub fn summarize(responses: &[SurveyResponse], now: DateTime<Utc>) -> ResponseSummary {
    let week_ago = now - Duration::days(7);
    let month_ago = now - Duration::days(30);

    ResponseSummary {
        total_responses: responses.len() as i64,
        last_7_days: responses.iter().filter(|r| r.submitted_at >= week_ago).count() as i64,
        last_30_days: responses.iter().filter(|r| r.submitted_at >= month_ago).count() as i64,
        first_response_at: responses.iter().map(|r| r.submitted_at).min(),
        last_response_at: responses.iter().map(|r| r.submitted_at).max(),
    }
}

/// Exactly [`TIMELINE_DAYS`] buckets, oldest first, ending with today.
pub fn timeline(responses: &[SurveyResponse], now: DateTime<Utc>) -> Vec<DailyResponseCount> {
    let today = now.date_naive();
    let start = today - Duration::days(TIMELINE_DAYS - 1);

    let mut buckets: Vec<DailyResponseCount> = (0..TIMELINE_DAYS)
        .map(|offset| DailyResponseCount {
            date: start + Duration::days(offset),
            responses: 0,
        })
        .collect();

    for response in responses {
        let day: NaiveDate = response.submitted_at.date_naive();
        if day < start || day > today {
            continue;
        }
        let index = (day - start).num_days() as usize;
        buckets[index].responses += 1;
    }

    buckets
}

fn answered_values<'a>(
    question: &'a Question,
    responses: &'a [SurveyResponse],
) -> impl Iterator<Item = &'a str> + 'a {
    responses
        .iter()
        .filter_map(move |r| r.answers.get(&question.id))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn question_analytics(
    number: usize,
    question: &Question,
    responses: &[SurveyResponse],
) -> Option<QuestionAnalytics> {
    // Only values that fit the question's kind count as answered.
    let values: Vec<&str> = answered_values(question, responses)
        .filter(|value| match &question.kind {
            QuestionKind::Rating => parse_rating(value).is_some(),
            QuestionKind::YesNo => value.eq_ignore_ascii_case(YES) || value.eq_ignore_ascii_case(NO),
            _ => true,
        })
        .collect();
    if values.is_empty() {
        return None;
    }

    let breakdown = match &question.kind {
        QuestionKind::MultipleChoice { .. } => multiple_choice_breakdown(&values),
        QuestionKind::Rating => rating_breakdown(&values)?,
        QuestionKind::YesNo => yes_no_breakdown(&values),
        QuestionKind::Text => return None,
    };

    Some(QuestionAnalytics {
        question_id: question.id.clone(),
        number,
        prompt: question.prompt.clone(),
        answered: values.len() as i64,
        breakdown,
    })
}

fn multiple_choice_breakdown(values: &[&str]) -> QuestionBreakdown {
    let mut counts: Vec<(String, i64)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(option, _)| option == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }

    let total = values.len() as i64;
    QuestionBreakdown::MultipleChoice {
        options: counts
            .into_iter()
            .map(|(option, count)| OptionCount {
                option,
                count,
                percentage: percentage(count, total),
            })
            .collect(),
    }
}

fn parse_rating(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .filter(|rating| RATING_VALUES.contains(rating))
}

fn rating_breakdown(values: &[&str]) -> Option<QuestionBreakdown> {
    let ratings: Vec<i64> = values.iter().filter_map(|value| parse_rating(value)).collect();
    if ratings.is_empty() {
        return None;
    }

    let total = ratings.len() as i64;
    let sum: i64 = ratings.iter().sum();
    // Mean in tenths, rounded half up.
    let tenths = (sum * 20 + total) / (2 * total);

    let distribution = RATING_VALUES
        .iter()
        .map(|&rating| {
            let count = ratings.iter().filter(|&&r| r == rating).count() as i64;
            RatingCount {
                rating,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();

    Some(QuestionBreakdown::Rating {
        average: tenths as f64 / 10.0,
        distribution,
    })
}

fn yes_no_breakdown(values: &[&str]) -> QuestionBreakdown {
    let total = values.len() as i64;
    let count_of = |expected: &str| {
        values
            .iter()
            .filter(|value| value.eq_ignore_ascii_case(expected))
            .count() as i64
    };
    let yes = count_of(YES);
    let no = count_of(NO);

    QuestionBreakdown::YesNo {
        yes: AnswerShare {
            count: yes,
            percentage: percentage(yes, total),
        },
        no: AnswerShare {
            count: no,
            percentage: percentage(no, total),
        },
    }
}
