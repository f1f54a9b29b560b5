//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function that writes its
//! report to the given output.

pub mod compile;
pub mod config;
pub mod discover;
pub mod validate;
