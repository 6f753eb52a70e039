use crate::fields::vocabulary::{DEFAULT_COUNTRIES, DEFAULT_GENRES};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for csfd-harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Client identity and request policy shared by both stages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpConfig {
    /// Value of the User-Agent header
    pub user_agent: String,

    /// Value of the Accept-Language header
    pub accept_language: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            accept_language: "cs-CZ,cs;q=0.9,en-US,en;q=0.8".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Where the catalog lives and how its pages look
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CatalogConfig {
    /// Scheme and host of the catalog, without a trailing slash
    pub base_url: String,

    /// Path segment preceding the numeric identifier
    pub path_prefix: String,

    /// Body substrings that mark a 200 response as a missing page
    pub not_found_markers: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.csfd.cz".to_string(),
            path_prefix: "film".to_string(),
            not_found_markers: vec![
                "Nepodařilo se".to_string(),
                "nenalezeno".to_string(),
                "Stránka neexistuje".to_string(),
            ],
        }
    }
}

/// Random-probe discovery settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DiscoveryConfig {
    /// Stop once this many valid URLs are known
    pub target_count: usize,

    /// Hard ceiling on probe attempts per run
    pub max_attempts: u64,

    /// Identifiers are drawn from `1..=id_space`
    pub id_space: u64,

    /// Persist the checkpoint after this many attempts
    pub checkpoint_every: u64,

    /// Checkpoint file (single `url` column)
    pub output_path: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            target_count: 1500,
            max_attempts: 100_000,
            id_space: 1_000_000,
            checkpoint_every: 10,
            output_path: "csfd_random_links.csv".to_string(),
        }
    }
}

/// Detail extraction settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractionConfig {
    /// Ordered URL list produced by discovery
    pub input_path: String,

    /// Append-only record file
    pub output_path: String,

    /// Politeness delay between consecutive fetches (milliseconds)
    pub delay_ms: u64,
}

impl ExtractionConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            input_path: "csfd_random_links.csv".to_string(),
            output_path: "csfd_films_data.csv".to_string(),
            delay_ms: 1000,
        }
    }
}

/// Known countries and genres used by the field extractors
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub countries: Vec<String>,
    pub genres: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            genres: DEFAULT_GENRES.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Optional file log sink
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also append log lines to this file
    pub file: Option<String>,
}
