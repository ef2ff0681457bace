//! Import run log

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::import::types::{ImportReport, WordPolicy};

/// Record the start of a run and return its id
pub async fn start_run(pool: &SqlitePool, policy: WordPolicy) -> Result<i64> {
    let result = sqlx::query("INSERT INTO import_runs (word_policy) VALUES (?)")
        .bind(policy.label())
        .execute(pool)
        .await
        .context("Failed to record import run")?;

    Ok(result.last_insert_rowid())
}

/// Store the final counts of a run
pub async fn finish_run(pool: &SqlitePool, run_id: i64, report: &ImportReport) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE import_runs
        SET finished_at = CURRENT_TIMESTAMP,
            batches = ?, rows_seen = ?, rows_skipped = ?,
            words_created = ?, words_updated = ?
        WHERE id = ?
        "#,
    )
    .bind(report.batches as i64)
    .bind(report.rows_seen as i64)
    .bind(report.rows_skipped() as i64)
    .bind(report.words_created as i64)
    .bind(report.words_updated as i64)
    .bind(run_id)
    .execute(pool)
    .await
    .context("Failed to finish import run")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::migrations::test_pool;

    #[tokio::test]
    async fn test_run_recorded() {
        let pool = test_pool().await;

        let run_id = start_run(&pool, WordPolicy::Upsert).await.unwrap();
        let report = ImportReport {
            batches: 2,
            rows_seen: 10,
            words_created: 7,
            words_updated: 1,
            ..Default::default()
        };
        finish_run(&pool, run_id, &report).await.unwrap();

        let (policy, rows_seen, words_created, finished): (String, i64, i64, i64) =
            sqlx::query_as(
                "SELECT word_policy, rows_seen, words_created, finished_at IS NOT NULL
                 FROM import_runs WHERE id = ?",
            )
            .bind(run_id)
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(policy, "upsert");
        assert_eq!(rows_seen, 10);
        assert_eq!(words_created, 7);
        assert_eq!(finished, 1);
    }
}
