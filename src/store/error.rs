//! Error types for datasets and dataset stores.
use crate::vocab::VocabError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid dataset `{name}`: {reason}")]
    InvalidDataset { name: String, reason: String },
    #[error("Validity window starts {valid_from} after it ends {valid_to}")]
    InvalidWindow { valid_from: NaiveDate, valid_to: NaiveDate },
    #[error("Invalid table: {0}")]
    InvalidTable(String),
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
    #[error(transparent)]
    Vocab(#[from] VocabError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt record at line {line} of {path}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize dataset `{name}`: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        StoreError::InvalidDataset { name: name.to_string(), reason: reason.into() }
    }
}
