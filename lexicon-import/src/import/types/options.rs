//! Options controlling a single import run

use serde::{Deserialize, Serialize};

use super::layout::SheetLayout;
use crate::config::{Config, FetchConfig};

/// How Word records are written when the same entry is imported again
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum WordPolicy {
    /// Every valid row creates a new Word (re-imports append duplicates)
    #[default]
    Append,
    /// Reuse the Word with the same headword and translation, refreshing
    /// its grammar, domain and notes
    Upsert,
}

impl WordPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            WordPolicy::Append => "append",
            WordPolicy::Upsert => "upsert",
        }
    }
}

/// Everything the pipeline needs to know about one run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Spreadsheet id of the index document
    pub index_id: String,
    /// Range of the index listing `[name, spreadsheet_id]` rows
    pub index_range: String,
    pub layout: SheetLayout,
    pub word_policy: WordPolicy,
    /// Restrict the run to these index entries; empty means all
    pub only: Vec<String>,
    pub fetch: FetchConfig,
}

impl ImportOptions {
    pub fn from_config(config: &Config, only: Vec<String>) -> Self {
        ImportOptions {
            index_id: config.index_id.clone(),
            index_range: config.index_range.clone(),
            layout: config.layout,
            word_policy: config.word_policy,
            only,
            fetch: config.fetch.clone(),
        }
    }
}
