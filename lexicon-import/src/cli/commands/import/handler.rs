//! Import command handler

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use colored::*;
use log::info;
use sqlx::SqlitePool;

use super::ImportCommands;
use crate::api::SheetsClient;
use crate::config::Config;
use crate::config::repository::lexicon::{LexiconCounts, lexicon_counts};
use crate::config::repository::{migrations, runs};
use crate::import::{ImportError, ImportOptions, ImportReport, run_import};

/// Handle `lexicon-import import`
pub async fn handle_import_command(
    args: ImportCommands,
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(&args.overrides(config_path, env_file))?;

    // Both credentials are checked before anything is fetched
    let api_key = config.require_api_key()?;
    let pool = if args.dry_run {
        None
    } else {
        Some(open_store(&config).await?)
    };

    let client = SheetsClient::new(api_key, &config.fetch)?;
    let options = ImportOptions::from_config(&config, args.only.clone());

    info!(
        "Importing index {} ({} layout, {} words)",
        options.index_id,
        options.layout.label(),
        options.word_policy.label()
    );

    let start = Instant::now();
    let (report, totals) = match &pool {
        Some(pool) => {
            let run_id = runs::start_run(pool, options.word_policy).await?;
            let report = run_import(&client, Some(pool), &options).await?;
            runs::finish_run(pool, run_id, &report).await?;
            (report, Some(lexicon_counts(pool).await?))
        }
        None => (run_import(&client, None, &options).await?, None),
    };

    print_summary(&report, args.dry_run, start.elapsed().as_secs_f64());
    if let Some(totals) = totals {
        print_totals(&totals);
    }
    Ok(())
}

async fn open_store(config: &Config) -> Result<SqlitePool> {
    let url = config.require_database_url()?;
    let pool = migrations::connect(url)
        .await
        .map_err(|e| ImportError::Config(format!("{:#}", e)))?;

    if config.migrate {
        migrations::run_migrations(&pool)
            .await
            .map_err(|e| ImportError::Config(format!("{:#}", e)))?;
    } else {
        migrations::verify_schema(&pool)
            .await
            .map_err(|e| ImportError::Config(format!("{:#}", e)))?;
    }

    Ok(pool)
}

fn print_summary(report: &ImportReport, dry_run: bool, seconds: f64) {
    let title = if dry_run {
        "Dry run complete".bright_yellow().bold()
    } else {
        "Import complete".bright_green().bold()
    };
    println!("{} in {:.2}s", title, seconds);
    println!("  Tabs processed:      {}", report.batches);
    println!("  Rows seen:           {}", report.rows_seen);

    if dry_run {
        println!("  Rows valid:          {}", report.words_created);
    } else {
        println!("  Words created:       {}", report.words_created);
        if report.words_updated > 0 {
            println!("  Words updated:       {}", report.words_updated);
        }
        println!("  Grammar labels new:  {}", report.grammar_created);
        println!("  Domains new:         {}", report.domains_created);
        println!("  Speakers new:        {}", report.speakers_created);
        println!("  Speaker links:       {}", report.associations_created);
    }

    if report.rows_skipped() > 0 {
        println!(
            "  Rows skipped:        {}",
            report.rows_skipped().to_string().yellow()
        );
        for skipped in &report.skipped {
            println!(
                "    {} / {} line {}: {}",
                skipped.sheet,
                skipped.tab,
                skipped.line,
                skipped.reason.to_string().dimmed()
            );
        }
    }

    if !report.failed_sheets.is_empty() {
        println!(
            "  Sheets not fetched:  {}",
            report.failed_sheets.join(", ").red()
        );
    }
}

fn print_totals(totals: &LexiconCounts) {
    println!(
        "  Store now holds {} words, {} speakers, {} grammar labels, {} domains",
        totals.words.to_string().bold(),
        totals.speakers,
        totals.grammar,
        totals.semantic_domains
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::error::exit_code;

    fn config_for(path: &std::path::Path, migrate: bool) -> Config {
        Config {
            database_url: Some(path.display().to_string()),
            migrate,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_failed_migration_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.db");

        // Same version as the embedded migration, different checksum
        let pool = migrations::connect(&path.display().to_string()).await.unwrap();
        sqlx::query(
            r#"
            CREATE TABLE _sqlx_migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                success BOOLEAN NOT NULL,
                checksum BLOB NOT NULL,
                execution_time BIGINT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO _sqlx_migrations (version, description, success, checksum, execution_time)
             VALUES (20250601000000, 'lexicon schema', 1, X'00', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;

        let err = open_store(&config_for(&path, true)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::Config(_))
        ));
        assert_eq!(exit_code(&err), 2);
    }

    #[tokio::test]
    async fn test_missing_schema_without_migrations_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");

        let err = open_store(&config_for(&path, false)).await.unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }

    #[tokio::test]
    async fn test_open_store_applies_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.db");

        let pool = open_store(&config_for(&path, true)).await.unwrap();
        migrations::verify_schema(&pool).await.unwrap();
    }
}
