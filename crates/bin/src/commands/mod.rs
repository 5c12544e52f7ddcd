//! Subcommand implementations.

pub mod account;
pub mod api_key;
pub mod cache;
pub mod document;
pub mod health;
pub mod serve;
