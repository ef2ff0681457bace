//! Error taxonomy for an import run
//!
//! Row-level problems ([`RowError`]) never abort a run: the row is skipped and
//! reported. Everything in [`ImportError`] is fatal and maps to a process exit
//! code.

use thiserror::Error;

use super::types::HeaderError;

/// Fatal failures of an import run
#[derive(Debug, Error)]
pub enum ImportError {
    /// Missing credential, connection string or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A spreadsheet or sub-sheet could not be fetched
    #[error("Failed to fetch {target}: {detail}")]
    Fetch { target: String, detail: String },

    /// A sheet name was referenced but is not listed in the index
    #[error("Sheet '{name}' is not listed in the index spreadsheet")]
    MissingSheet { name: String },

    /// The index spreadsheet contains a row that is not a `[name, id]` pair
    #[error("Index row {row} is malformed: {detail}")]
    MalformedIndexRow { row: usize, detail: String },

    /// A sub-sheet header does not match the configured column layout
    #[error("Sheet '{sheet}' tab '{tab}' has an unexpected header")]
    Header {
        sheet: String,
        tab: String,
        #[source]
        source: HeaderError,
    },

    /// A database write failed while importing a row
    #[error("Failed to persist row {line} of '{sheet}' / '{tab}': {detail}")]
    Persistence {
        sheet: String,
        tab: String,
        line: usize,
        detail: String,
    },
}

impl ImportError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::Config(_) => 2,
            ImportError::Fetch { .. }
            | ImportError::MissingSheet { .. }
            | ImportError::MalformedIndexRow { .. }
            | ImportError::Header { .. } => 3,
            ImportError::Persistence { .. } => 4,
        }
    }

    pub fn fetch(target: impl Into<String>, err: &anyhow::Error) -> Self {
        ImportError::Fetch {
            target: target.into(),
            detail: format!("{:#}", err),
        }
    }
}

/// Reasons a single row is skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("headword is empty")]
    EmptyHeadword,

    #[error("speakers field '{field}' contains an empty name")]
    MalformedSpeakers { field: String },
}

/// Map an error chain to a process exit code
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ImportError>())
        .map(ImportError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(ImportError::Config("missing key".into()).exit_code(), 2);
        assert_eq!(
            ImportError::MissingSheet {
                name: "Lexicon".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            ImportError::Persistence {
                sheet: "Lexicon".into(),
                tab: "Words".into(),
                line: 2,
                detail: "disk full".into(),
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn test_exit_code_found_through_context() {
        let err: anyhow::Result<()> = Err(ImportError::Config("no database".into()).into());
        let err = err.context("Import failed").unwrap_err();
        assert_eq!(exit_code(&err), 2);

        let other = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&other), 1);
    }
}
