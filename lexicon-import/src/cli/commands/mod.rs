//! Subcommands

pub mod import;
pub mod sheets;
