//! Positional column layouts of lexicon sub-sheets
//!
//! Sheets carry no field names in their data rows, so every layout is a fixed
//! column order. The header row is checked once per batch against that order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::row::LexiconRow;

/// A logical column of a lexicon sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Headword,
    English,
    Grammar,
    Variant,
    Context,
    Speakers,
    Info,
    SemanticDomain,
}

impl Column {
    /// Canonical column name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Column::Headword => "headword",
            Column::English => "english",
            Column::Grammar => "grammar",
            Column::Variant => "variant",
            Column::Context => "context",
            Column::Speakers => "speakers",
            Column::Info => "info",
            Column::SemanticDomain => "semantic_domain",
        }
    }

    /// Header spellings accepted for this column (compared after normalizing)
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Headword => &["headword", "word", "entry"],
            Column::English => &["english", "translation", "gloss"],
            Column::Grammar => &["grammar", "part of speech", "pos"],
            Column::Variant => &["variant", "variants"],
            Column::Context => &["context"],
            Column::Speakers => &["speakers", "speaker"],
            Column::Info => &["info", "other info", "notes", "note"],
            Column::SemanticDomain => &[
                "semantic domain",
                "domain",
                "classification",
                "category",
            ],
        }
    }

    /// Whether a header cell names this column
    ///
    /// Case, surrounding whitespace and `_`/`-` separators are ignored, so
    /// `Semantic_Domain` and `semantic domain` both match.
    pub fn matches_header(&self, header: &str) -> bool {
        let normalized = normalize_header(header);
        self.aliases().iter().any(|alias| *alias == normalized)
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

const STANDARD_COLUMNS: &[Column] = &[
    Column::Headword,
    Column::English,
    Column::Grammar,
    Column::Speakers,
    Column::Info,
    Column::SemanticDomain,
];

const VARIANT_COLUMNS: &[Column] = &[
    Column::Headword,
    Column::English,
    Column::Grammar,
    Column::Variant,
    Column::Context,
    Column::Speakers,
    Column::Info,
    Column::SemanticDomain,
];

/// Column order of the sub-sheets being imported
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SheetLayout {
    /// `headword, english, grammar, speakers, info, semantic_domain`
    #[default]
    Standard,
    /// Standard columns with `variant, context` between grammar and speakers.
    /// The two extra columns are projected out before normalization.
    Variants,
}

impl SheetLayout {
    pub fn columns(&self) -> &'static [Column] {
        match self {
            SheetLayout::Standard => STANDARD_COLUMNS,
            SheetLayout::Variants => VARIANT_COLUMNS,
        }
    }

    /// Position of a column, `None` if the layout does not carry it
    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SheetLayout::Standard => "standard",
            SheetLayout::Variants => "variants",
        }
    }

    /// Check a header row against this layout
    ///
    /// Every populated header cell must name the column expected at its
    /// position. Blank and missing trailing cells are accepted: the layout's
    /// fixed order still applies to the data rows.
    pub fn validate_header(&self, header: &[String]) -> Result<(), HeaderError> {
        let columns = self.columns();

        for (position, cell) in header.iter().enumerate() {
            if cell.trim().is_empty() {
                continue;
            }

            let Some(expected) = columns.get(position) else {
                return Err(HeaderError::UnexpectedColumn {
                    position,
                    found: cell.trim().to_string(),
                    layout: self.label(),
                });
            };

            if !expected.matches_header(cell) {
                return Err(HeaderError::Mismatch {
                    position,
                    expected: expected.name(),
                    found: cell.trim().to_string(),
                    layout: self.label(),
                });
            }
        }

        Ok(())
    }

    /// Project a raw row onto the six normalizer columns
    ///
    /// Cells missing from a ragged row read as empty strings. Columns the
    /// normalizer does not model (variant, context) are dropped here.
    pub fn project(&self, line: usize, row: &[String]) -> LexiconRow {
        let cell = |column: Column| -> String {
            self.position(column)
                .and_then(|idx| row.get(idx))
                .cloned()
                .unwrap_or_default()
        };

        LexiconRow {
            line,
            headword: cell(Column::Headword),
            english: cell(Column::English),
            grammar: cell(Column::Grammar),
            speakers: cell(Column::Speakers),
            info: cell(Column::Info),
            semantic_domain: cell(Column::SemanticDomain),
        }
    }
}

/// Header row does not fit the configured layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error(
        "column {position} should be '{expected}' for the {layout} layout, found '{found}'"
    )]
    Mismatch {
        position: usize,
        expected: &'static str,
        found: String,
        layout: &'static str,
    },

    #[error("column {position} ('{found}') is beyond the {layout} layout")]
    UnexpectedColumn {
        position: usize,
        found: String,
        layout: &'static str,
    },
}
