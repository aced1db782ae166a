//! CLI command implementations.

pub mod auth;
pub mod backends;
pub mod generate;
pub mod status;
