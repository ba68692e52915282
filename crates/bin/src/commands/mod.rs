//! Subcommand implementations.

pub mod account;
pub mod default;
pub mod instance;
