//! HTTP surface of the survey platform.
//!
//! Exposes the owner authoring and analytics API, the public respondent
//! endpoints reached through share tokens, and the operational endpoints.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
