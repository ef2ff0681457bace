//! Row extraction: every tab of every indexed spreadsheet

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use super::discovery::SheetIndex;
use super::error::ImportError;
use super::types::RawBatch;
use crate::api::SheetSource;
use crate::api::sheets::tab_range;
use crate::config::FetchConfig;

/// Fetched sub-sheets, ordered by spreadsheet name then tab
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub batches: Vec<RawBatch>,
    /// Spreadsheets dropped because a fetch failed (skip mode only)
    pub failed_sheets: Vec<String>,
}

/// Fetch the rows of every tab of every spreadsheet in `index`
///
/// Requests run with at most `max_concurrent_fetches` in flight, but batches
/// come back ordered by spreadsheet name (the [`SheetIndex`] order) and
/// then by tab position. Tabs with no rows are
/// dropped. A failed fetch aborts the run unless `skip_failed_sheets` is set,
/// in which case the whole spreadsheet is left out.
pub async fn extract_batches(
    source: &dyn SheetSource,
    index: &SheetIndex,
    config: &FetchConfig,
) -> Result<Extraction, ImportError> {
    let limit = config.max_concurrent_fetches.max(1);
    let mut failed_sheets: Vec<String> = Vec::new();

    let listings: Vec<_> = stream::iter(index.iter())
        .map(|(name, id)| async move {
            debug!("Listing tabs of '{}' ({})", name, id);
            (name, id, source.sheet_titles(id).await)
        })
        .buffered(limit)
        .collect()
        .await;

    let mut jobs = Vec::new();
    for (name, id, titles) in listings {
        match titles {
            Ok(titles) => jobs.extend(titles.into_iter().map(|title| (name, id, title))),
            Err(err) => sheet_failed(config, &mut failed_sheets, name, id, &err)?,
        }
    }

    let fetched: Vec<_> = stream::iter(jobs)
        .map(|(name, id, title)| async move {
            let range = tab_range(&title);
            debug!("Fetching '{}' range {}", name, range);
            let rows = source.values(id, &range).await;
            (name, id, title, rows)
        })
        .buffered(limit)
        .collect()
        .await;

    let mut batches = Vec::new();
    for (name, id, title, rows) in fetched {
        match rows {
            Ok(rows) if rows.is_empty() => {
                debug!("Tab '{}' of '{}' is empty, skipping", title, name);
            }
            Ok(rows) => batches.push(RawBatch::new(name, title, rows)),
            Err(err) => sheet_failed(config, &mut failed_sheets, name, id, &err)?,
        }
    }

    batches.retain(|batch| !failed_sheets.contains(&batch.sheet));

    info!(
        "Fetched {} non-empty tabs from {} spreadsheets",
        batches.len(),
        index.len() - failed_sheets.len()
    );

    Ok(Extraction {
        batches,
        failed_sheets,
    })
}

fn sheet_failed(
    config: &FetchConfig,
    failed_sheets: &mut Vec<String>,
    name: &str,
    id: &str,
    err: &anyhow::Error,
) -> Result<(), ImportError> {
    if !config.skip_failed_sheets {
        return Err(ImportError::fetch(format!("sheet '{}' ({})", name, id), err));
    }

    warn!("Skipping sheet '{}' ({}): {:#}", name, id, err);
    if !failed_sheets.iter().any(|failed| failed == name) {
        failed_sheets.push(name.to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sheets::fake::FakeSheets;

    const HEADER: &[&str] = &["headword", "english", "grammar", "speakers", "info", "domain"];

    fn index(entries: &[(&str, &str)]) -> SheetIndex {
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|(name, id)| vec![name.to_string(), id.to_string()])
            .collect();
        SheetIndex::from_rows(&rows).unwrap()
    }

    #[tokio::test]
    async fn test_batches_in_index_and_tab_order() {
        let source = FakeSheets::new()
            .with_tab("A", "Nouns", &[HEADER, &["aki", "water"]])
            .with_tab("A", "Verbs", &[HEADER, &["iku", "go"]])
            .with_tab("B", "Body parts", &[HEADER, &["te", "hand"]]);

        let extraction = extract_batches(
            &source,
            &index(&[("Alpha", "A"), ("Beta", "B")]),
            &FetchConfig::default(),
        )
        .await
        .unwrap();

        let tabs: Vec<_> = extraction
            .batches
            .iter()
            .map(|b| (b.sheet.as_str(), b.tab.as_str()))
            .collect();
        assert_eq!(
            tabs,
            vec![("Alpha", "Nouns"), ("Alpha", "Verbs"), ("Beta", "Body parts")]
        );
        assert!(source.requests().contains(&"B:'Body parts'!A:Z".to_string()));
    }

    #[tokio::test]
    async fn test_batches_ordered_by_sheet_name() {
        let source = FakeSheets::new()
            .with_tab("Z", "Words", &[HEADER, &["moko", "fire"]])
            .with_tab("A", "Words", &[HEADER, &["aki", "water"]]);

        let extraction = extract_batches(
            &source,
            &index(&[("Zeta", "Z"), ("Alpha", "A")]),
            &FetchConfig::default(),
        )
        .await
        .unwrap();

        let sheets: Vec<_> = extraction.batches.iter().map(|b| b.sheet.as_str()).collect();
        assert_eq!(sheets, vec!["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn test_empty_tab_dropped() {
        let source = FakeSheets::new()
            .with_tab("A", "Words", &[HEADER, &["aki", "water"]])
            .with_tab("A", "Blank", &[]);

        let extraction =
            extract_batches(&source, &index(&[("Alpha", "A")]), &FetchConfig::default())
                .await
                .unwrap();

        assert_eq!(extraction.batches.len(), 1);
        assert_eq!(extraction.batches[0].tab, "Words");
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_by_default() {
        let source = FakeSheets::new()
            .with_tab("A", "Words", &[HEADER])
            .failing("B");

        let err = extract_batches(
            &source,
            &index(&[("Alpha", "A"), ("Beta", "B")]),
            &FetchConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ImportError::Fetch { ref target, .. } if target.contains("Beta")));
    }

    #[tokio::test]
    async fn test_fetch_failure_skipped_when_configured() {
        let source = FakeSheets::new()
            .with_tab("A", "Words", &[HEADER, &["aki", "water"]])
            .failing("B");
        let config = FetchConfig {
            skip_failed_sheets: true,
            max_concurrent_fetches: 1,
            ..FetchConfig::default()
        };

        let extraction =
            extract_batches(&source, &index(&[("Alpha", "A"), ("Beta", "B")]), &config)
                .await
                .unwrap();

        assert_eq!(extraction.batches.len(), 1);
        assert_eq!(extraction.failed_sheets, vec!["Beta"]);
    }
}
