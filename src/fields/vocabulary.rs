//! Known country and genre names
//!
//! Country names gate acceptance of the origin country; genre names are only a
//! soft check and unknown genres are still emitted.

use crate::config::VocabularyConfig;

pub const DEFAULT_COUNTRIES: &[&str] = &[
    "Česko",
    "Slovensko",
    "USA",
    "Velká Británie",
    "Polsko",
    "Francie",
    "Německo",
    "Rakousko",
    "Kanada",
    "Maďarsko",
    "Japonsko",
    "Itálie",
    "Španělsko",
];

pub const DEFAULT_GENRES: &[&str] = &[
    "Komedie",
    "Drama",
    "Akční",
    "Dobrodružný",
    "Sci-Fi",
    "Krimi",
    "Horor",
    "Thriller",
    "Muzikál",
    "Fantasy",
    "Romantický",
    "Animovaný",
    "Rodinný",
    "Válečný",
    "Historický",
];

/// Country and genre vocabularies used by the field extractors
#[derive(Debug, Clone)]
pub struct Vocabulary {
    countries: Vec<String>,
    genres: Vec<String>,
}

impl Vocabulary {
    pub fn new(countries: Vec<String>, genres: Vec<String>) -> Self {
        Self { countries, genres }
    }

    pub fn from_config(config: &VocabularyConfig) -> Self {
        Self::new(config.countries.clone(), config.genres.clone())
    }

    /// Returns the canonical spelling of `name` if it is a known country
    ///
    /// Matching is exact apart from letter case.
    pub fn country(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.countries
            .iter()
            .find(|c| c.to_lowercase() == wanted)
            .map(String::as_str)
    }

    pub fn is_known_genre(&self, name: &str) -> bool {
        self.genres.iter().any(|g| g == name)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_config(&VocabularyConfig::default())
    }
}
