//! Domain layer for the survey platform.
//!
//! This crate contains:
//! - Domain models (Question, Survey, SurveyResponse, analytics)
//! - Business logic services (response validation, analytics, share tokens)
//! - The storage collaborator trait and an in-memory implementation

pub mod models;
pub mod services;
