//! In-memory [`SheetSource`] for tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{SheetSource, tab_range};

#[derive(Debug, Default)]
pub struct FakeSheets {
    titles: HashMap<String, Vec<String>>,
    values: HashMap<(String, String), Vec<Vec<String>>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rows of an arbitrary range (used for the index)
    pub fn with_range(mut self, spreadsheet_id: &str, range: &str, rows: &[&[&str]]) -> Self {
        self.values
            .insert((spreadsheet_id.to_string(), range.to_string()), to_rows(rows));
        self
    }

    /// Add a tab with its rows to a spreadsheet
    pub fn with_tab(mut self, spreadsheet_id: &str, title: &str, rows: &[&[&str]]) -> Self {
        self.titles
            .entry(spreadsheet_id.to_string())
            .or_default()
            .push(title.to_string());
        self.with_range(spreadsheet_id, &tab_range(title), rows)
    }

    /// Make every request against this spreadsheet fail
    pub fn failing(mut self, spreadsheet_id: &str) -> Self {
        self.failing.insert(spreadsheet_id.to_string());
        self
    }

    /// Requests made so far, as `id` or `id:range`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn log(&self, entry: String) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(entry);
        }
    }
}

#[async_trait]
impl SheetSource for FakeSheets {
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        self.log(spreadsheet_id.to_string());
        if self.failing.contains(spreadsheet_id) {
            bail!("Requested entity was not found: {}", spreadsheet_id);
        }
        Ok(self.titles.get(spreadsheet_id).cloned().unwrap_or_default())
    }

    async fn values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        self.log(format!("{}:{}", spreadsheet_id, range));
        if self.failing.contains(spreadsheet_id) {
            bail!("Requested entity was not found: {}", spreadsheet_id);
        }
        Ok(self
            .values
            .get(&(spreadsheet_id.to_string(), range.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

fn to_rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
