//! Database entity definitions.
//!
//! Entities map directly to database rows and are converted to domain models.

pub mod survey;
pub mod survey_response;

pub use survey::{SurveyActivityEntity, SurveyEntity};
pub use survey_response::SurveyResponseEntity;
