//! Field normalization of projected rows
//!
//! Turns a [`LexiconRow`] of raw cell text into a [`NormalizedEntry`]: trimmed
//! values, empty lookup labels mapped to `None`, and the speakers cell split
//! into individual names.

use super::error::RowError;
use super::types::LexiconRow;

/// Literal separator between names in the speakers cell
pub const SPEAKER_SEPARATOR: &str = ", ";

/// A validated row, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    pub headword: String,
    pub translation: String,
    /// Grammar label, `None` when the cell is blank
    pub grammar: Option<String>,
    /// Distinct speaker names in sheet order
    pub speakers: Vec<String>,
    pub info: String,
    /// Semantic domain label, `None` when the cell is blank
    pub semantic_domain: Option<String>,
}

pub fn normalize_row(row: &LexiconRow) -> Result<NormalizedEntry, RowError> {
    let headword = row.headword.trim();
    if headword.is_empty() {
        return Err(RowError::EmptyHeadword);
    }

    Ok(NormalizedEntry {
        headword: headword.to_string(),
        translation: row.english.trim().to_string(),
        grammar: non_empty(&row.grammar),
        speakers: split_speakers(&row.speakers)?,
        info: row.info.trim().to_string(),
        semantic_domain: non_empty(&row.semantic_domain),
    })
}

/// Split a speakers cell on [`SPEAKER_SEPARATOR`] and trim each name
///
/// A blank cell yields no speakers. A cell that produces an empty name
/// (`"Alice, , Bob"`, a trailing separator) is rejected. Repeated names are
/// kept once.
pub fn split_speakers(field: &str) -> Result<Vec<String>, RowError> {
    if field.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = Vec::new();
    for part in field.split(SPEAKER_SEPARATOR) {
        let name = part.trim();
        if name.is_empty() {
            return Err(RowError::MalformedSpeakers {
                field: field.to_string(),
            });
        }
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

/// Split a speaker's full name into first and last name
///
/// The first whitespace-separated word is the first name, the rest is the
/// last name (empty for single-word names).
pub fn split_full_name(name: &str) -> (String, String) {
    match name.trim().split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.trim().to_string(), String::new()),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
