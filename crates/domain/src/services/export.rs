//! CSV export of survey responses.

use chrono::SecondsFormat;

use crate::models::response::SurveyResponse;
use crate::models::survey::Survey;

/// Placeholder written when a response carries no email.
pub const ANONYMOUS: &str = "Anonymous";

/// Renders responses as CSV: one header row, then one row per response in the
/// order given. Every cell is double-quote wrapped.
pub fn responses_to_csv(survey: &Survey, responses: &[SurveyResponse]) -> String {
    let mut csv = String::new();

    let mut header = vec![
        "Response ID".to_string(),
        "Submitted At".to_string(),
        "Email".to_string(),
    ];
    header.extend(survey.questions.iter().map(|q| q.prompt.clone()));
    push_row(&mut csv, &header);

    for response in responses {
        let mut row = vec![
            response.id.to_string(),
            response
                .submitted_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            response
                .respondent_email
                .clone()
                .unwrap_or_else(|| ANONYMOUS.to_string()),
        ];
        row.extend(
            survey
                .questions
                .iter()
                .map(|q| response.answers.get(&q.id).cloned().unwrap_or_default()),
        );
        push_row(&mut csv, &row);
    }

    csv
}

/// Download name for an export: the title with every character other than an
/// ASCII letter or digit replaced by `_`.
pub fn export_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_responses.csv", stem)
}

fn push_row(csv: &mut String, cells: &[String]) {
    let line = cells
        .iter()
        .map(|cell| quote_csv(cell))
        .collect::<Vec<_>>()
        .join(",");
    csv.push_str(&line);
    csv.push('\n');
}

/// Quote a value for CSV output.
fn quote_csv(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
