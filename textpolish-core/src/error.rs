use std::path::PathBuf;
use thiserror::Error;

/// Failures at the configuration store boundary (import, export, persistence).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration file {path} is malformed: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures at the processing pipeline boundary.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Warning-class: nothing to process, caller shows a notice and keeps its state.
    #[error("请先输入要处理的文本！")]
    EmptyInput,
}

impl ProcessError {
    /// Warning-class errors are notices, not failures.
    pub fn is_warning(&self) -> bool {
        matches!(self, ProcessError::EmptyInput)
    }
}

/// A style length such as `16.0000pt` could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LengthParseError {
    #[error("length is empty")]
    Empty,

    #[error("length '{0}' has no numeric part")]
    MissingNumber(String),

    #[error("length '{0}' has an invalid number")]
    InvalidNumber(String),

    #[error("length '{0}' has an invalid unit (expected letters or '%')")]
    InvalidUnit(String),
}

/// A rule pattern that cannot take part in matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern '{pattern}' does not compile: {message}")]
    Invalid { pattern: String, message: String },
}

/// A persisted record exists but could not be loaded.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The record could not be read at all (permissions, locks, I/O).
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record was read but its contents do not parse.
    #[error("failed to deserialize {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}
