//! Subcommand implementations.

pub mod cameras;
pub mod fetch;
pub mod get;
pub mod login;
