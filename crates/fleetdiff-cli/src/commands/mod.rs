//! Subcommand implementations.

pub mod canonicalize;
pub mod compare;
pub mod update;
