//! Domain models for the survey platform.

pub mod analytics;
pub mod question;
pub mod response;
pub mod survey;

pub use analytics::{AnalyticsReport, OwnerDashboard, SurveyActivity};
pub use question::{Question, QuestionKind};
pub use response::{Answers, SurveyResponse};
pub use survey::{CollectionSettings, Survey};
