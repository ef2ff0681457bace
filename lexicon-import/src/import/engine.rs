//! Entity dedup and upsert engine
//!
//! Each projected row becomes one Word plus its lookup entities and speaker
//! links. Lookups are content-addressed: a grammar label, semantic domain
//! label or speaker name maps to exactly one row no matter how many rows or
//! runs reference it. All writes for a row share one transaction, so a failed
//! row leaves nothing behind.

use anyhow::{Context, Result};
use log::{debug, warn};
use sqlx::SqlitePool;

use super::error::ImportError;
use super::normalize::{NormalizedEntry, normalize_row};
use super::types::{ImportReport, ProjectedBatch, RowOutcome, SkippedRow, WordPolicy};
use crate::config::repository::lexicon::{self, NewWord};

/// Where a row came from, recorded on the Word
#[derive(Debug, Clone, Copy)]
pub struct RowSource<'a> {
    pub sheet: &'a str,
    pub tab: &'a str,
}

/// Writes normalized rows to the lexicon store
pub struct UpsertEngine<'a> {
    pool: &'a SqlitePool,
    policy: WordPolicy,
}

impl<'a> UpsertEngine<'a> {
    pub fn new(pool: &'a SqlitePool, policy: WordPolicy) -> Self {
        Self { pool, policy }
    }

    /// Import every row of a projected batch, in order
    ///
    /// Rows that fail validation are skipped and added to the report. A
    /// database failure stops the batch with [`ImportError::Persistence`].
    pub async fn import_batch(
        &self,
        batch: &ProjectedBatch,
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        let source = RowSource {
            sheet: &batch.sheet,
            tab: &batch.tab,
        };

        for row in &batch.rows {
            let entry = match normalize_row(row) {
                Ok(entry) => entry,
                Err(reason) => {
                    warn!(
                        "Skipping line {} of '{}' / '{}': {}",
                        row.line, batch.sheet, batch.tab, reason
                    );
                    report.skip(SkippedRow {
                        sheet: batch.sheet.clone(),
                        tab: batch.tab.clone(),
                        line: row.line,
                        reason,
                    });
                    continue;
                }
            };

            let outcome = self.import_entry(&entry, source).await.map_err(|err| {
                ImportError::Persistence {
                    sheet: batch.sheet.clone(),
                    tab: batch.tab.clone(),
                    line: row.line,
                    detail: format!("{:#}", err),
                }
            })?;

            debug!(
                "Line {} of '{}' / '{}' -> word {}",
                row.line, batch.sheet, batch.tab, outcome.word_id
            );
            report.record(&outcome);
        }

        Ok(())
    }

    /// Write one normalized entry inside a single transaction
    ///
    /// Order: grammar, speakers, semantic domain, word, speaker links.
    pub async fn import_entry(
        &self,
        entry: &NormalizedEntry,
        source: RowSource<'_>,
    ) -> Result<RowOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin row transaction")?;
        let mut outcome = RowOutcome::default();

        let grammar = match &entry.grammar {
            Some(label) => Some(lexicon::get_or_create_grammar(&mut *tx, label).await?),
            None => None,
        };

        let mut speaker_ids = Vec::with_capacity(entry.speakers.len());
        for name in &entry.speakers {
            let speaker = lexicon::get_or_create_speaker(&mut *tx, name).await?;
            outcome.speakers_created += usize::from(speaker.created);
            speaker_ids.push(speaker.id);
        }

        let domain = match &entry.semantic_domain {
            Some(label) => Some(lexicon::get_or_create_semantic_domain(&mut *tx, label).await?),
            None => None,
        };

        outcome.grammar_created = grammar.is_some_and(|g| g.created);
        outcome.domain_created = domain.is_some_and(|d| d.created);

        let word = NewWord {
            headword: &entry.headword,
            translation: &entry.translation,
            info: &entry.info,
            grammar_id: grammar.map(|g| g.id),
            semantic_domain_id: domain.map(|d| d.id),
            source_sheet: source.sheet,
            source_tab: source.tab,
        };

        let existing = match self.policy {
            WordPolicy::Append => None,
            WordPolicy::Upsert => {
                lexicon::find_word(&mut *tx, &entry.headword, &entry.translation).await?
            }
        };

        outcome.word_id = match existing {
            Some(id) => {
                lexicon::update_word(&mut *tx, id, &word).await?;
                id
            }
            None => {
                outcome.word_created = true;
                lexicon::insert_word(&mut *tx, &word).await?
            }
        };

        for speaker_id in speaker_ids {
            if lexicon::link_word_speaker(&mut *tx, outcome.word_id, speaker_id).await? {
                outcome.associations_created += 1;
            }
        }

        tx.commit().await.context("Failed to commit row transaction")?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::lexicon::{lexicon_counts, list_words};
    use crate::config::repository::migrations::test_pool;
    use crate::import::error::RowError;
    use crate::import::types::LexiconRow;

    fn lexicon_row(line: usize, cells: [&str; 6]) -> LexiconRow {
        let [headword, english, grammar, speakers, info, semantic_domain] = cells;
        LexiconRow {
            line,
            headword: headword.to_string(),
            english: english.to_string(),
            grammar: grammar.to_string(),
            speakers: speakers.to_string(),
            info: info.to_string(),
            semantic_domain: semantic_domain.to_string(),
        }
    }

    fn batch(rows: Vec<LexiconRow>) -> ProjectedBatch {
        ProjectedBatch {
            sheet: "Lexicon".to_string(),
            tab: "Words".to_string(),
            rows,
            skipped: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_shared_grammar_resolves_to_one_entity() {
        let pool = test_pool().await;
        let engine = UpsertEngine::new(&pool, WordPolicy::Append);
        let mut report = ImportReport::default();

        engine
            .import_batch(
                &batch(vec![
                    lexicon_row(2, ["aki", "water", "noun", "", "", "nature"]),
                    lexicon_row(3, ["moko", "fire", " noun ", "", "", "nature"]),
                    lexicon_row(4, ["iku", "go", "verb", "", "", "motion"]),
                ]),
                &mut report,
            )
            .await
            .unwrap();

        let grammar_ids: Vec<(i64, String)> =
            sqlx::query_as("SELECT grammar_id, headword FROM words ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(grammar_ids[0].0, grammar_ids[1].0);
        assert_ne!(grammar_ids[0].0, grammar_ids[2].0);

        let (nouns,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM grammar WHERE label = 'noun'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(nouns, 1);
        assert_eq!(report.grammar_created, 2);
        assert_eq!(report.domains_created, 2);
        assert_eq!(report.words_created, 3);
    }

    #[tokio::test]
    async fn test_speakers_split_and_linked() {
        let pool = test_pool().await;
        let engine = UpsertEngine::new(&pool, WordPolicy::Append);
        let mut report = ImportReport::default();

        engine
            .import_batch(
                &batch(vec![lexicon_row(
                    2,
                    ["aki", "water", "noun", "Alice, Bob,  Carol", "", "nature"],
                )]),
                &mut report,
            )
            .await
            .unwrap();

        let words = list_words(&pool).await.unwrap();
        assert_eq!(words[0].speakers, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(report.speakers_created, 3);
        assert_eq!(report.associations_created, 3);
    }

    #[tokio::test]
    async fn test_empty_speakers_no_links() {
        let pool = test_pool().await;
        let engine = UpsertEngine::new(&pool, WordPolicy::Append);
        let mut report = ImportReport::default();

        engine
            .import_batch(
                &batch(vec![lexicon_row(2, ["aki", "water", "noun", "", "", ""])]),
                &mut report,
            )
            .await
            .unwrap();

        let counts = lexicon_counts(&pool).await.unwrap();
        assert_eq!(counts.words, 1);
        assert_eq!(counts.speakers, 0);
        assert_eq!(counts.word_speakers, 0);
        assert_eq!(counts.semantic_domains, 0);
        assert_eq!(report.rows_skipped(), 0);
    }

    #[tokio::test]
    async fn test_invalid_rows_skipped_and_reported() {
        let pool = test_pool().await;
        let engine = UpsertEngine::new(&pool, WordPolicy::Append);
        let mut report = ImportReport::default();

        engine
            .import_batch(
                &batch(vec![
                    lexicon_row(2, ["   ", "water", "noun", "", "", ""]),
                    lexicon_row(3, ["aki", "water", "noun", "Alice, , Bob", "", ""]),
                    lexicon_row(4, ["moko", "fire", "noun", "Alice", "", ""]),
                ]),
                &mut report,
            )
            .await
            .unwrap();

        let words = list_words(&pool).await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].headword, "moko");

        let reasons: Vec<_> = report.skipped.iter().map(|s| (s.line, s.reason.clone())).collect();
        assert_eq!(reasons[0], (2, RowError::EmptyHeadword));
        assert!(matches!(reasons[1], (3, RowError::MalformedSpeakers { .. })));
    }

    #[tokio::test]
    async fn test_append_policy_duplicates_words_on_rerun() {
        let pool = test_pool().await;
        let engine = UpsertEngine::new(&pool, WordPolicy::Append);
        let rows = batch(vec![lexicon_row(
            2,
            ["aki", "water", "noun", "Alice", "", "nature"],
        )]);

        let mut report = ImportReport::default();
        engine.import_batch(&rows, &mut report).await.unwrap();
        engine.import_batch(&rows, &mut report).await.unwrap();

        let counts = lexicon_counts(&pool).await.unwrap();
        assert_eq!(counts.words, 2);
        assert_eq!(counts.grammar, 1);
        assert_eq!(counts.semantic_domains, 1);
        assert_eq!(counts.speakers, 1);
        assert_eq!(counts.word_speakers, 2);
    }

    #[tokio::test]
    async fn test_upsert_policy_reuses_words_on_rerun() {
        let pool = test_pool().await;
        let engine = UpsertEngine::new(&pool, WordPolicy::Upsert);

        let mut report = ImportReport::default();
        engine
            .import_batch(
                &batch(vec![lexicon_row(2, ["aki", "water", "noun", "Alice", "old", ""])]),
                &mut report,
            )
            .await
            .unwrap();
        engine
            .import_batch(
                &batch(vec![lexicon_row(
                    2,
                    ["aki", "water", "noun", "Alice, Bob", "new", ""],
                )]),
                &mut report,
            )
            .await
            .unwrap();

        let words = list_words(&pool).await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].info, "new");
        assert_eq!(words[0].speakers, vec!["Alice", "Bob"]);
        assert_eq!(report.words_created, 1);
        assert_eq!(report.words_updated, 1);
        assert_eq!(report.associations_created, 2);
    }

    #[tokio::test]
    async fn test_failed_row_rolls_back() {
        let pool = test_pool().await;
        sqlx::query("DROP TABLE word_speakers")
            .execute(&pool)
            .await
            .unwrap();

        let engine = UpsertEngine::new(&pool, WordPolicy::Append);
        let mut report = ImportReport::default();
        let err = engine
            .import_batch(
                &batch(vec![lexicon_row(
                    2,
                    ["aki", "water", "noun", "Alice", "", "nature"],
                )]),
                &mut report,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Persistence { line: 2, .. }));

        let (words, grammar, speakers): (i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM words), (SELECT COUNT(*) FROM grammar),
                    (SELECT COUNT(*) FROM speakers)",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!((words, grammar, speakers), (0, 0, 0));
    }
}
