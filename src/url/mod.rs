//! URL handling module for csfd-harvest
//!
//! Builds candidate page URLs from numeric identifiers and decides whether a
//! resolved URL has the shape of a catalog detail page.

mod matcher;

use crate::config::CatalogConfig;
use crate::ConfigError;

pub use matcher::PageShape;

/// Candidate-URL builder and shape check for one catalog
///
/// # Examples
///
/// ```
/// use csfd_harvest::config::CatalogConfig;
/// use csfd_harvest::url::CatalogUrls;
///
/// let urls = CatalogUrls::from_config(&CatalogConfig::default()).unwrap();
/// assert_eq!(urls.candidate(42), "https://www.csfd.cz/film/42/");
/// assert!(urls.is_detail_page("https://www.csfd.cz/film/42-pelisky/"));
/// assert!(!urls.is_detail_page("https://www.csfd.cz/hledat/?q=42"));
/// ```
#[derive(Debug, Clone)]
pub struct CatalogUrls {
    base: String,
    shape: PageShape,
}

impl CatalogUrls {
    /// Builds the URL policy from the `[catalog]` section
    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        let base = format!(
            "{}/{}/",
            config.base_url.trim_end_matches('/'),
            config.path_prefix.trim_matches('/')
        );
        let shape = PageShape::new(&base)?;
        Ok(Self { base, shape })
    }

    /// The URL probed for identifier `id`
    pub fn candidate(&self, id: u64) -> String {
        format!("{}{}/", self.base, id)
    }

    /// Returns true if `url` is a detail page: the catalog prefix, a numeric
    /// segment, then anything
    pub fn is_detail_page(&self, url: &str) -> bool {
        self.shape.matches(url)
    }

    /// The fixed scheme+host+path prefix shared by all detail pages
    pub fn prefix(&self) -> &str {
        &self.base
    }
}
