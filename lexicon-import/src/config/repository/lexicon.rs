//! Lexicon repository: words and their lookup entities
//!
//! Write functions take a `&mut SqliteConnection` so callers can run a whole
//! row inside one transaction.

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};

use crate::import::normalize::split_full_name;

/// Lookup tables keyed by a unique text label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Grammar,
    SemanticDomain,
}

impl LookupTable {
    fn table(&self) -> &'static str {
        match self {
            LookupTable::Grammar => "grammar",
            LookupTable::SemanticDomain => "semantic_domains",
        }
    }
}

/// Id of a looked-up entity and whether this call created it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupId {
    pub id: i64,
    pub created: bool,
}

/// Word values to insert or refresh
#[derive(Debug, Clone, Default)]
pub struct NewWord<'a> {
    pub headword: &'a str,
    pub translation: &'a str,
    pub info: &'a str,
    pub grammar_id: Option<i64>,
    pub semantic_domain_id: Option<i64>,
    pub source_sheet: &'a str,
    pub source_tab: &'a str,
}

/// Get the id of the row labelled `label`, creating it if absent
///
/// The insert relies on the table's unique constraint, so two writers racing
/// on the same new label still end up with a single row.
pub async fn get_or_create_label(
    conn: &mut SqliteConnection,
    table: LookupTable,
    label: &str,
) -> Result<LookupId> {
    let insert = format!(
        "INSERT INTO {} (label) VALUES (?) ON CONFLICT(label) DO NOTHING",
        table.table()
    );
    let result = sqlx::query(&insert)
        .bind(label)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to insert {} '{}'", table.table(), label))?;

    let select = format!("SELECT id FROM {} WHERE label = ?", table.table());
    let (id,): (i64,) = sqlx::query_as(&select)
        .bind(label)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("Failed to look up {} '{}'", table.table(), label))?;

    Ok(LookupId {
        id,
        created: result.rows_affected() > 0,
    })
}

pub async fn get_or_create_grammar(conn: &mut SqliteConnection, label: &str) -> Result<LookupId> {
    get_or_create_label(conn, LookupTable::Grammar, label).await
}

pub async fn get_or_create_semantic_domain(
    conn: &mut SqliteConnection,
    label: &str,
) -> Result<LookupId> {
    get_or_create_label(conn, LookupTable::SemanticDomain, label).await
}

/// Get or create a speaker keyed by full name
pub async fn get_or_create_speaker(conn: &mut SqliteConnection, name: &str) -> Result<LookupId> {
    let (first_name, last_name) = split_full_name(name);

    let result = sqlx::query(
        "INSERT INTO speakers (name, first_name, last_name)
         VALUES (?, ?, ?)
         ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .bind(&first_name)
    .bind(&last_name)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("Failed to insert speaker '{}'", name))?;

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM speakers WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("Failed to look up speaker '{}'", name))?;

    Ok(LookupId {
        id,
        created: result.rows_affected() > 0,
    })
}

/// Insert a new word and return its id
pub async fn insert_word(conn: &mut SqliteConnection, word: &NewWord<'_>) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO words (
             headword, translation, info, grammar_id, semantic_domain_id,
             source_sheet, source_tab
         )
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(word.headword)
    .bind(word.translation)
    .bind(word.info)
    .bind(word.grammar_id)
    .bind(word.semantic_domain_id)
    .bind(word.source_sheet)
    .bind(word.source_tab)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("Failed to insert word '{}'", word.headword))?;

    Ok(result.last_insert_rowid())
}

/// Find the oldest word with this headword and translation
pub async fn find_word(
    conn: &mut SqliteConnection,
    headword: &str,
    translation: &str,
) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM words WHERE headword = ? AND translation = ? ORDER BY id LIMIT 1",
    )
    .bind(headword)
    .bind(translation)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Failed to look up word '{}'", headword))?;

    Ok(row.map(|(id,)| id))
}

/// Refresh the descriptive fields of an existing word
pub async fn update_word(conn: &mut SqliteConnection, id: i64, word: &NewWord<'_>) -> Result<()> {
    sqlx::query(
        "UPDATE words
         SET info = ?, grammar_id = ?, semantic_domain_id = ?,
             source_sheet = ?, source_tab = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(word.info)
    .bind(word.grammar_id)
    .bind(word.semantic_domain_id)
    .bind(word.source_sheet)
    .bind(word.source_tab)
    .bind(id)
    .execute(&mut *conn)
    .await
    .with_context(|| format!("Failed to update word {}", id))?;

    Ok(())
}

/// Link a word to a speaker; returns false if the link already existed
pub async fn link_word_speaker(
    conn: &mut SqliteConnection,
    word_id: i64,
    speaker_id: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO word_speakers (word_id, speaker_id)
         VALUES (?, ?)
         ON CONFLICT(word_id, speaker_id) DO NOTHING",
    )
    .bind(word_id)
    .bind(speaker_id)
    .execute(&mut *conn)
    .await
    .context("Failed to link word to speaker")?;

    Ok(result.rows_affected() > 0)
}

/// Row counts of the lexicon tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexiconCounts {
    pub words: i64,
    pub grammar: i64,
    pub semantic_domains: i64,
    pub speakers: i64,
    pub word_speakers: i64,
}

pub async fn lexicon_counts(pool: &SqlitePool) -> Result<LexiconCounts> {
    let (words, grammar, semantic_domains, speakers, word_speakers): (i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM words),
                (SELECT COUNT(*) FROM grammar),
                (SELECT COUNT(*) FROM semantic_domains),
                (SELECT COUNT(*) FROM speakers),
                (SELECT COUNT(*) FROM word_speakers)
            "#,
        )
        .fetch_one(pool)
        .await
        .context("Failed to count lexicon rows")?;

    Ok(LexiconCounts {
        words,
        grammar,
        semantic_domains,
        speakers,
        word_speakers,
    })
}

/// A word joined with its lookup labels and speakers
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordView {
    pub id: i64,
    pub headword: String,
    pub translation: String,
    pub info: String,
    pub grammar: Option<String>,
    pub semantic_domain: Option<String>,
    pub speakers: Vec<String>,
}

/// All words with their labels, ordered by id
#[cfg(test)]
pub async fn list_words(pool: &SqlitePool) -> Result<Vec<WordView>> {
    let rows: Vec<(i64, String, String, String, Option<String>, Option<String>)> =
        sqlx::query_as(
            r#"
            SELECT w.id, w.headword, w.translation, w.info, g.label, d.label
            FROM words w
            LEFT JOIN grammar g ON g.id = w.grammar_id
            LEFT JOIN semantic_domains d ON d.id = w.semantic_domain_id
            ORDER BY w.id
            "#,
        )
        .fetch_all(pool)
        .await
        .context("Failed to list words")?;

    let links: Vec<(i64, String)> = sqlx::query_as(
        r#"
        SELECT ws.word_id, s.name
        FROM word_speakers ws
        JOIN speakers s ON s.id = ws.speaker_id
        ORDER BY ws.word_id, s.id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list word speakers")?;

    Ok(rows
        .into_iter()
        .map(|(id, headword, translation, info, grammar, semantic_domain)| WordView {
            id,
            headword,
            translation,
            info,
            grammar,
            semantic_domain,
            speakers: links
                .iter()
                .filter(|(word_id, _)| *word_id == id)
                .map(|(_, name)| name.clone())
                .collect(),
        })
        .collect())
}
