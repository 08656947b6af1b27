//! CLI subcommand implementations.

pub mod audit;
pub mod detect;
pub mod summary;
pub mod validate;
