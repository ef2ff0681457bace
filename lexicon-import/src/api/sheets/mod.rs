//! Google Sheets source

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod models;

use anyhow::Result;
use async_trait::async_trait;

pub use client::SheetsClient;

/// Read access to spreadsheets, as needed by the importer
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Titles of every tab in a spreadsheet, in document order
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>>;

    /// Cell values of an A1 range as rows of strings
    ///
    /// Rows may be shorter than the range when trailing cells are empty. An
    /// empty range yields no rows.
    async fn values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;
}

/// A1 range covering columns A to Z of a tab
///
/// Titles that are not plain identifiers are quoted, with embedded quotes
/// doubled.
pub fn tab_range(title: &str) -> String {
    let plain = !title.is_empty() && title.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        format!("{}!A:Z", title)
    } else {
        format!("'{}'!A:Z", title.replace('\'', "''"))
    }
}
