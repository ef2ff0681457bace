//! Row and batch types flowing through the pipeline

use crate::import::error::RowError;

/// One sub-sheet as fetched: the header row followed by data rows, ragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    /// Name of the spreadsheet in the index
    pub sheet: String,
    /// Title of the tab within the spreadsheet
    pub tab: String,
    pub rows: Vec<Vec<String>>,
}

impl RawBatch {
    pub fn new(sheet: impl Into<String>, tab: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        RawBatch {
            sheet: sheet.into(),
            tab: tab.into(),
            rows,
        }
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Data rows with their 1-based sheet line numbers
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx + 1, row.as_slice()))
    }
}

/// A data row projected onto the fixed normalizer columns
///
/// Values are still raw: trimming and splitting happen in normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexiconRow {
    /// 1-based line in the source tab
    pub line: usize,
    pub headword: String,
    pub english: String,
    pub grammar: String,
    pub speakers: String,
    pub info: String,
    pub semantic_domain: String,
}

impl LexiconRow {
    /// Cells in normalizer column order
    #[cfg(test)]
    pub fn cells(&self) -> [&str; 6] {
        [
            self.headword.as_str(),
            self.english.as_str(),
            self.grammar.as_str(),
            self.speakers.as_str(),
            self.info.as_str(),
            self.semantic_domain.as_str(),
        ]
    }
}

/// A filtered, projected sub-sheet ready for the upsert engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedBatch {
    pub sheet: String,
    pub tab: String,
    pub rows: Vec<LexiconRow>,
    /// Rows dropped by the filter, in sheet order
    pub skipped: Vec<SkippedRow>,
}

/// A row that was not imported, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub sheet: String,
    pub tab: String,
    pub line: usize,
    pub reason: RowError,
}
