use crate::config::types::{
    CatalogConfig, Config, DiscoveryConfig, ExtractionConfig, HttpConfig, VocabularyConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_catalog_config(&config.catalog)?;
    validate_discovery_config(&config.discovery)?;
    validate_extraction_config(&config.extraction)?;
    validate_vocabulary_config(&config.vocabulary)?;
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 120, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    let prefix = config.path_prefix.trim_matches('/');
    if prefix.is_empty() {
        return Err(ConfigError::Validation(
            "path_prefix cannot be empty".to_string(),
        ));
    }

    if config.not_found_markers.iter().any(|m| m.is_empty()) {
        return Err(ConfigError::Validation(
            "not_found_markers cannot contain empty strings".to_string(),
        ));
    }

    Ok(())
}

fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.target_count < 1 {
        return Err(ConfigError::Validation(format!(
            "target_count must be >= 1, got {}",
            config.target_count
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.id_space < 1 {
        return Err(ConfigError::Validation(format!(
            "id_space must be >= 1, got {}",
            config.id_space
        )));
    }

    if config.checkpoint_every < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_every must be >= 1, got {}",
            config.checkpoint_every
        )));
    }

    if config.output_path.is_empty() {
        return Err(ConfigError::Validation(
            "discovery output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.input_path.is_empty() {
        return Err(ConfigError::Validation(
            "extraction input_path cannot be empty".to_string(),
        ));
    }

    if config.output_path.is_empty() {
        return Err(ConfigError::Validation(
            "extraction output_path cannot be empty".to_string(),
        ));
    }

    if config.input_path == config.output_path {
        return Err(ConfigError::Validation(format!(
            "extraction input_path and output_path must differ, both are '{}'",
            config.input_path
        )));
    }

    Ok(())
}

fn validate_vocabulary_config(config: &VocabularyConfig) -> Result<(), ConfigError> {
    if config.countries.is_empty() {
        return Err(ConfigError::Validation(
            "vocabulary countries cannot be empty".to_string(),
        ));
    }

    if config.countries.iter().any(|c| c.contains(',')) {
        return Err(ConfigError::Validation(
            "country names cannot contain commas".to_string(),
        ));
    }

    Ok(())
}
