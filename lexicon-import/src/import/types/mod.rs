//! Core types of the import pipeline

pub mod layout;
pub mod options;
pub mod report;
pub mod row;

pub use layout::{HeaderError, SheetLayout};
pub use options::{ImportOptions, WordPolicy};
pub use report::{ImportReport, RowOutcome};
pub use row::{LexiconRow, ProjectedBatch, RawBatch, SkippedRow};
