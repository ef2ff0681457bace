//! Counters collected over an import run

use super::row::SkippedRow;

/// What a single imported row did to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOutcome {
    pub word_id: i64,
    /// False when an existing Word was reused under the upsert policy
    pub word_created: bool,
    pub grammar_created: bool,
    pub domain_created: bool,
    pub speakers_created: usize,
    pub associations_created: usize,
}

/// Summary of an import run
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Non-empty sub-sheets processed
    pub batches: usize,
    /// Data rows seen, header rows excluded
    pub rows_seen: usize,
    pub words_created: usize,
    pub words_updated: usize,
    pub grammar_created: usize,
    pub domains_created: usize,
    pub speakers_created: usize,
    pub associations_created: usize,
    pub skipped: Vec<SkippedRow>,
    /// Spreadsheets skipped after a fetch failure
    pub failed_sheets: Vec<String>,
}

impl ImportReport {
    pub fn rows_skipped(&self) -> usize {
        self.skipped.len()
    }

    pub fn record(&mut self, outcome: &RowOutcome) {
        if outcome.word_created {
            self.words_created += 1;
        } else {
            self.words_updated += 1;
        }
        self.grammar_created += usize::from(outcome.grammar_created);
        self.domains_created += usize::from(outcome.domain_created);
        self.speakers_created += outcome.speakers_created;
        self.associations_created += outcome.associations_created;
    }

    pub fn skip(&mut self, row: SkippedRow) {
        self.skipped.push(row);
    }
}
