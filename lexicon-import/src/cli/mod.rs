//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::import::ImportCommands;
use commands::sheets::SheetsCommands;

#[derive(Debug, Parser)]
#[command(
    name = "lexicon-import",
    version,
    about = "Import dictionary spreadsheets into a lexicon database"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Env file holding GOOGLE_API_KEY (default: google_api_key.env, then .env)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import every sheet listed in the index into the database
    Import(ImportCommands),
    /// Show the spreadsheets listed in the index
    Sheets(SheetsCommands),
}

impl Cli {
    /// Default log filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import(args) => {
            commands::import::handler::handle_import_command(args, cli.config, cli.env_file).await
        }
        Commands::Sheets(args) => {
            commands::sheets::handler::handle_sheets_command(args, cli.config, cli.env_file).await
        }
    }
}
