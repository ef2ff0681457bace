//! Remote spreadsheet access
//!
//! The importer only reads from the Google Sheets v4 REST API. Everything the
//! pipeline needs goes through the [`SheetSource`] trait so tests can swap the
//! HTTP client for an in-memory fake.

pub mod sheets;

pub use sheets::{SheetSource, SheetsClient};
