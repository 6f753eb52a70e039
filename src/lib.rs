//! csfd-harvest: a resumable two-stage film catalog harvester
//!
//! This crate discovers valid film pages in a sparse numeric ID space by random
//! probing, checkpoints the discovered URLs, and then extracts a fixed schema of
//! fields from every discovered page, resuming from the last written record.

pub mod config;
pub mod crawler;
pub mod fields;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Input list {path} does not exist")]
    MissingInput { path: String },

    #[error("Input list {path} is empty")]
    EmptyInput { path: String },

    #[error("Record file already holds {done} records but the input list has only {input_len} entries")]
    ResumeMismatch { done: u64, input_len: u64 },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by the checkpoint and record files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to replace checkpoint: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Corrupt file {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// Re-export commonly used types
pub use config::Config;
pub use fields::{extract_fields, StructuredRecord, SENTINEL};
pub use state::ProbeOutcome;
pub use url::CatalogUrls;
