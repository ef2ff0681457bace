//! Lexicon import pipeline
//!
//! index sheet -> name/id map -> raw tab rows -> filtered, projected rows ->
//! deduplicated entities and links in the store. Stages run in that order;
//! only the tab fetches overlap.

pub mod discovery;
pub mod engine;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod project;
pub mod types;

use log::info;
use sqlx::SqlitePool;

use crate::api::SheetSource;
pub use discovery::discover_sheets;
pub use engine::UpsertEngine;
pub use error::ImportError;
pub use extract::extract_batches;
pub use project::project_batch;
pub use types::{ImportOptions, ImportReport};

/// Run a full import
///
/// With `pool` set to `None` nothing is written: rows are fetched, filtered
/// and validated, and the report counts what would have been imported.
pub async fn run_import(
    source: &dyn SheetSource,
    pool: Option<&SqlitePool>,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let index = discover_sheets(source, &options.index_id, &options.index_range)
        .await?
        .select(&options.only)?;

    let extraction = extract_batches(source, &index, &options.fetch).await?;

    let mut report = ImportReport {
        failed_sheets: extraction.failed_sheets,
        ..Default::default()
    };

    // Every header is checked before the first write
    let projected = extraction
        .batches
        .iter()
        .map(|batch| project_batch(batch, options.layout))
        .collect::<Result<Vec<_>, _>>()?;

    let engine = pool.map(|pool| UpsertEngine::new(pool, options.word_policy));

    for (raw, batch) in extraction.batches.iter().zip(&projected) {
        report.batches += 1;
        report.rows_seen += raw.rows.len().saturating_sub(1);
        report.skipped.extend(batch.skipped.iter().cloned());

        match &engine {
            Some(engine) => engine.import_batch(batch, &mut report).await?,
            None => dry_run_batch(batch, &mut report),
        }

        info!(
            "Imported '{}' / '{}': {} rows",
            batch.sheet,
            batch.tab,
            batch.rows.len()
        );
    }

    Ok(report)
}

/// Validate rows without writing, counting each valid row as a new word
fn dry_run_batch(batch: &types::ProjectedBatch, report: &mut ImportReport) {
    for row in &batch.rows {
        match normalize::normalize_row(row) {
            Ok(_) => report.words_created += 1,
            Err(reason) => report.skip(types::SkippedRow {
                sheet: batch.sheet.clone(),
                tab: batch.tab.clone(),
                line: row.line,
                reason,
            }),
        }
    }
}
