//! Layered configuration
//!
//! Values are resolved in increasing precedence: built-in defaults, the TOML
//! config file, the secrets env file, the process environment, then CLI
//! overrides. The API key is never read from the TOML file.

pub mod repository;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::import::error::ImportError;
use crate::import::types::{SheetLayout, WordPolicy};

/// Index spreadsheet listing every lexicon spreadsheet
pub const DEFAULT_INDEX_ID: &str = "1isc2rari_iO6Djpds51hxcU8CHUIGCRV1rUAp5XE_wk";
pub const DEFAULT_INDEX_RANGE: &str = "sheet1!A:Z";
/// Secrets file holding `GOOGLE_API_KEY`, looked up in the working directory
pub const DEFAULT_ENV_FILE: &str = "google_api_key.env";

pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_INDEX_ID: &str = "LEXICON_INDEX_ID";

/// Resolved configuration for a run
#[derive(Debug, Clone)]
pub struct Config {
    pub index_id: String,
    pub index_range: String,
    pub database_url: Option<String>,
    pub api_key: Option<String>,
    pub layout: SheetLayout,
    pub word_policy: WordPolicy,
    /// Apply embedded migrations on startup
    pub migrate: bool,
    pub fetch: FetchConfig,
}

/// Spreadsheet fetch settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    /// Sub-sheet requests in flight at once
    pub max_concurrent_fetches: usize,
    pub timeout_secs: u64,
    /// Skip a spreadsheet whose fetch fails instead of aborting the run
    pub skip_failed_sheets: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com/v4".to_string(),
            max_concurrent_fetches: 4,
            timeout_secs: 30,
            skip_failed_sheets: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_id: DEFAULT_INDEX_ID.to_string(),
            index_range: DEFAULT_INDEX_RANGE.to_string(),
            database_url: None,
            api_key: None,
            layout: SheetLayout::default(),
            word_policy: WordPolicy::default(),
            migrate: true,
            fetch: FetchConfig::default(),
        }
    }
}

/// On-disk TOML shape, every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub index_id: Option<String>,
    pub index_range: Option<String>,
    pub database_url: Option<String>,
    pub layout: Option<SheetLayout>,
    pub word_policy: Option<WordPolicy>,
    pub migrate: Option<bool>,
    pub fetch: FileFetchConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileFetchConfig {
    pub base_url: Option<String>,
    pub max_concurrent_fetches: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub skip_failed_sheets: Option<bool>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub index_id: Option<String>,
    pub database_url: Option<String>,
    pub layout: Option<SheetLayout>,
    pub word_policy: Option<WordPolicy>,
    pub no_migrate: bool,
    pub max_concurrent_fetches: Option<usize>,
    pub skip_failed_sheets: bool,
}

impl Config {
    /// Resolve configuration from all sources
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        load_env_file(overrides.env_file.as_deref())?;

        let mut config = Config::default();

        if let Some(path) = config_file_path(overrides.config_path.as_deref()) {
            debug!("Loading config file {}", path.display());
            let content = std::fs::read_to_string(&path).map_err(|e| {
                ImportError::Config(format!("cannot read config file {}: {}", path.display(), e))
            })?;
            let file = Self::parse_file(&content)
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
            config.apply_file(file);
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn parse_file(content: &str) -> Result<FileConfig> {
        toml::from_str(content).map_err(|e| ImportError::Config(e.to_string()).into())
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(index_id) = file.index_id {
            self.index_id = index_id;
        }
        if let Some(index_range) = file.index_range {
            self.index_range = index_range;
        }
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if let Some(layout) = file.layout {
            self.layout = layout;
        }
        if let Some(word_policy) = file.word_policy {
            self.word_policy = word_policy;
        }
        if let Some(migrate) = file.migrate {
            self.migrate = migrate;
        }
        if let Some(base_url) = file.fetch.base_url {
            self.fetch.base_url = base_url;
        }
        if let Some(max) = file.fetch.max_concurrent_fetches {
            self.fetch.max_concurrent_fetches = max;
        }
        if let Some(timeout) = file.fetch.timeout_secs {
            self.fetch.timeout_secs = timeout;
        }
        if let Some(skip) = file.fetch.skip_failed_sheets {
            self.fetch.skip_failed_sheets = skip;
        }
    }

    /// Apply environment variables through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(api_key);
        }
        if let Some(url) = non_empty(ENV_DATABASE_URL) {
            self.database_url = Some(url);
        }
        if let Some(index_id) = non_empty(ENV_INDEX_ID) {
            self.index_id = index_id;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(index_id) = &overrides.index_id {
            self.index_id = index_id.clone();
        }
        if let Some(url) = &overrides.database_url {
            self.database_url = Some(url.clone());
        }
        if let Some(layout) = overrides.layout {
            self.layout = layout;
        }
        if let Some(word_policy) = overrides.word_policy {
            self.word_policy = word_policy;
        }
        if overrides.no_migrate {
            self.migrate = false;
        }
        if let Some(max) = overrides.max_concurrent_fetches {
            self.fetch.max_concurrent_fetches = max;
        }
        if overrides.skip_failed_sheets {
            self.fetch.skip_failed_sheets = true;
        }
    }

    fn validate(&self) -> Result<(), ImportError> {
        if self.index_id.trim().is_empty() {
            return Err(ImportError::Config("index id is empty".to_string()));
        }
        if self.fetch.max_concurrent_fetches == 0 {
            return Err(ImportError::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str, ImportError> {
        self.api_key.as_deref().ok_or_else(|| {
            ImportError::Config(format!(
                "{} is not set (expected in {} or the environment)",
                ENV_API_KEY, DEFAULT_ENV_FILE
            ))
        })
    }

    pub fn require_database_url(&self) -> Result<&str, ImportError> {
        self.database_url.as_deref().ok_or_else(|| {
            ImportError::Config(format!(
                "no database configured; set {} or pass --database-url",
                ENV_DATABASE_URL
            ))
        })
    }
}

/// Load the secrets env file into the process environment
///
/// An explicitly given file must exist. Otherwise `google_api_key.env` and
/// then `.env` are tried, and absence is fine. Variables already set in the
/// environment win.
fn load_env_file(explicit: Option<&Path>) -> Result<()> {
    if let Some(path) = explicit {
        dotenvy::from_path(path).map_err(|e| {
            ImportError::Config(format!("cannot load env file {}: {}", path.display(), e))
        })?;
        return Ok(());
    }

    match dotenvy::from_path(DEFAULT_ENV_FILE) {
        Ok(()) => debug!("Loaded {}", DEFAULT_ENV_FILE),
        Err(_) => {
            if let Ok(path) = dotenvy::dotenv() {
                debug!("Loaded {}", path.display());
            }
        }
    }
    Ok(())
}

fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    dirs::config_dir()
        .map(|dir| dir.join("lexicon-import").join("config.toml"))
        .filter(|path| path.exists())
}
