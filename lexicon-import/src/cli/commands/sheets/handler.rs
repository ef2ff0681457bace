//! Sheets command handler

use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use super::SheetsCommands;
use crate::api::{SheetSource, SheetsClient};
use crate::config::{Config, ConfigOverrides};
use crate::import::{ImportError, discover_sheets};

/// Handle `lexicon-import sheets`
pub async fn handle_sheets_command(
    args: SheetsCommands,
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(&ConfigOverrides {
        config_path,
        env_file,
        index_id: args.index_id.clone(),
        ..Default::default()
    })?;

    let client = SheetsClient::new(config.require_api_key()?, &config.fetch)?;
    let index = discover_sheets(&client, &config.index_id, &config.index_range).await?;

    if index.is_empty() {
        println!("{}", "The index lists no spreadsheets".yellow());
        return Ok(());
    }

    for (name, id) in index.iter() {
        println!("{}  {}", name.bright_green().bold(), id.dimmed());

        if args.tabs {
            let titles = client
                .sheet_titles(id)
                .await
                .map_err(|e| ImportError::fetch(format!("sheet '{}' ({})", name, id), &e))?;
            for title in titles {
                println!("    {}", title);
            }
        }
    }

    Ok(())
}
