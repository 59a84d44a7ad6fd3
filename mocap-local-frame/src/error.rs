/// Error types for configuration loading, record decoding and stream conversion.
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the marker index configuration.
/// All of these are fatal and stop the run before any record is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid marker index file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid marker index file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    #[error("Invalid marker index format: missing section [{section}]")]
    MissingSection { section: &'static str },

    #[error("Invalid marker index format: missing key {section}.{key}")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error("Invalid marker index format: {key} = {value:?} is not a marker index")]
    InvalidIndex { key: &'static str, value: String },

    #[error("Invalid marker index format: {key} = {index} exceeds marker count {marker_count}")]
    IndexOutOfRange {
        key: &'static str,
        index: usize,
        marker_count: usize,
    },
}

/// Per-record decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("record has {found} fields, expected at least {expected}")]
    ShortRecord { expected: usize, found: usize },
}

/// Top-level failure of a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("line {line}: {source}")]
    ShortRecord {
        line: u64,
        #[source]
        source: DecodeError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write run summary: {0}")]
    Summary(#[from] serde_json::Error),
}

impl ConvertError {
    /// Process exit status reported for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::Config(_) => 1,
            _ => 2,
        }
    }
}
