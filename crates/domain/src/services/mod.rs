//! Domain services for the survey platform.
//!
//! Services contain business logic that operates on domain models.

pub mod analytics;
pub mod export;
pub mod response_validation;
pub mod share_token;
pub mod store;
pub mod survey_service;

pub use analytics::aggregate;
pub use export::{export_file_name, responses_to_csv};
pub use response_validation::{
    validate_response, validate_response_within, AcceptedResponse, InvalidAnswer, Rejection,
};
pub use share_token::{
    classify_share_lookup, resolve_share_token, ClosedReason, ResolveError, ShareLink,
};
pub use store::{InMemorySurveyStore, StoreError, SurveyStore, SurveyUpdate};
pub use survey_service::{
    CsvExport, ResponseSubmission, SurveyService, SurveyServiceError, TokenGenerator,
    MAX_TOKEN_ATTEMPTS,
};
