use crate::ConfigError;
use regex::Regex;

/// Compiled shape of a detail-page URL
///
/// A URL matches when it starts with the catalog prefix, continues with at
/// least one digit, and is followed by anything at all (slug, query, fragment).
#[derive(Debug, Clone)]
pub struct PageShape {
    pattern: Regex,
}

impl PageShape {
    /// Compiles the shape for a prefix such as `https://www.csfd.cz/film/`
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&format!(r"^{}\d+", regex::escape(prefix)))
            .map_err(|e| ConfigError::Validation(format!("Invalid page shape: {}", e)))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}
