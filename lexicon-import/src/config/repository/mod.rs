//! Repository layer for database operations

pub mod lexicon;
pub mod migrations;
pub mod runs;
