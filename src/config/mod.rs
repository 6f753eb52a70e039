//! Configuration module for csfd-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; omitted keys fall back to the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use csfd_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Discovery target: {}", config.discovery.target_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, DiscoveryConfig, ExtractionConfig, HttpConfig, LoggingConfig,
    VocabularyConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
