//! Repository implementations for database operations.

pub mod survey;
pub mod survey_response;

pub use survey::SurveyRepository;
pub use survey_response::SurveyResponseRepository;
