//! `sheets` command arguments

pub mod handler;

use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct SheetsCommands {
    /// Spreadsheet id of the index document
    #[arg(long)]
    pub index_id: Option<String>,

    /// Also list the tabs of every spreadsheet
    #[arg(long)]
    pub tabs: bool,
}
