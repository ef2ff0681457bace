//! `import` command arguments

pub mod handler;

use clap::Args;

use crate::config::ConfigOverrides;
use crate::import::types::{SheetLayout, WordPolicy};

#[derive(Debug, Clone, Args)]
pub struct ImportCommands {
    /// Spreadsheet id of the index document
    #[arg(long)]
    pub index_id: Option<String>,

    /// SQLite database URL or file path (overrides DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Column layout of the lexicon tabs
    #[arg(long, value_enum)]
    pub layout: Option<SheetLayout>,

    /// What to do with words that were imported before
    #[arg(long, value_enum)]
    pub word_policy: Option<WordPolicy>,

    /// Import only this index entry (repeatable)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    /// Expect an existing schema instead of applying migrations
    #[arg(long)]
    pub no_migrate: bool,

    /// Skip a spreadsheet whose fetch fails instead of aborting
    #[arg(long)]
    pub skip_failed_sheets: bool,

    /// Maximum concurrent sheet requests
    #[arg(long, value_name = "N")]
    pub max_concurrent_fetches: Option<usize>,

    /// Fetch and validate without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportCommands {
    pub fn overrides(
        &self,
        config_path: Option<std::path::PathBuf>,
        env_file: Option<std::path::PathBuf>,
    ) -> ConfigOverrides {
        ConfigOverrides {
            config_path,
            env_file,
            index_id: self.index_id.clone(),
            database_url: self.database_url.clone(),
            layout: self.layout,
            word_policy: self.word_policy,
            no_migrate: self.no_migrate,
            max_concurrent_fetches: self.max_concurrent_fetches,
            skip_failed_sheets: self.skip_failed_sheets,
        }
    }
}
