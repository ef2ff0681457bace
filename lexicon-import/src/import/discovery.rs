//! Sheet discovery from the index spreadsheet

use std::collections::BTreeMap;

use log::{debug, info};

use super::error::ImportError;
use crate::api::SheetSource;

/// Mapping from spreadsheet name to spreadsheet id, iterated by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetIndex {
    sheets: BTreeMap<String, String>,
}

impl SheetIndex {
    /// Build the index from `[name, spreadsheet_id]` rows
    ///
    /// Blank rows are ignored. A row with a name but no id, or a name listed
    /// twice with different ids, is an error: the mapping must be complete
    /// and unambiguous before any sheet is read.
    pub fn from_rows(rows: &[Vec<String>]) -> Result<Self, ImportError> {
        let mut sheets = BTreeMap::new();

        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let name = row.first().map(|c| c.trim()).unwrap_or("");
            let id = row.get(1).map(|c| c.trim()).unwrap_or("");

            match (name.is_empty(), id.is_empty()) {
                (true, true) => continue,
                (true, false) => {
                    return Err(ImportError::MalformedIndexRow {
                        row: line,
                        detail: format!("spreadsheet id '{}' has no name", id),
                    });
                }
                (false, true) => {
                    return Err(ImportError::MalformedIndexRow {
                        row: line,
                        detail: format!("sheet '{}' has no spreadsheet id", name),
                    });
                }
                (false, false) => {}
            }

            if let Some(existing) = sheets.get(name) {
                if existing != id {
                    return Err(ImportError::MalformedIndexRow {
                        row: line,
                        detail: format!(
                            "sheet '{}' is listed with ids '{}' and '{}'",
                            name, existing, id
                        ),
                    });
                }
                continue;
            }

            sheets.insert(name.to_string(), id.to_string());
        }

        Ok(SheetIndex { sheets })
    }

    /// Spreadsheet id for a name; a missing entry is a hard failure
    pub fn require(&self, name: &str) -> Result<&str, ImportError> {
        self.sheets
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ImportError::MissingSheet {
                name: name.to_string(),
            })
    }

    /// Restrict the index to the given names, all of which must be present
    pub fn select(&self, names: &[String]) -> Result<SheetIndex, ImportError> {
        if names.is_empty() {
            return Ok(self.clone());
        }

        let mut sheets = BTreeMap::new();
        for name in names {
            let id = self.require(name)?;
            sheets.insert(name.clone(), id.to_string());
        }
        Ok(SheetIndex { sheets })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sheets.iter().map(|(n, id)| (n.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Read the index spreadsheet and resolve every listed sheet
pub async fn discover_sheets(
    source: &dyn SheetSource,
    index_id: &str,
    index_range: &str,
) -> Result<SheetIndex, ImportError> {
    debug!("Reading index {} range {}", index_id, index_range);

    let rows = source
        .values(index_id, index_range)
        .await
        .map_err(|e| ImportError::fetch(format!("index spreadsheet {}", index_id), &e))?;

    let index = SheetIndex::from_rows(&rows)?;
    info!("Index lists {} spreadsheets", index.len());
    Ok(index)
}
