//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod client_info;
pub mod owner_auth;

pub use client_info::ClientInfo;
pub use owner_auth::OwnerAuth;
