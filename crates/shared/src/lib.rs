//! Shared utilities and common types for the survey backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Share token generation
//! - Owner access token verification (JWT)
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod validation;
