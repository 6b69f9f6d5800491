//! Core types and trait definitions for the gamble-free recovery companion.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends, the coach, and the API all depend on it.

pub mod check_in;
pub mod error;
pub mod event;
pub mod goal;
pub mod learn;
pub mod plan;
pub mod quick_help;
pub mod store;
pub mod streak;

pub use error::{Error, Result};

/// User id recorded when the caller is not signed in.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Serde default for optional `user_id` fields.
pub fn anonymous_user() -> String { ANONYMOUS_USER.to_owned() }
