//! Field extraction pipeline
//!
//! Turns a film detail page into a fixed six-field [`StructuredRecord`]. The
//! page is first reduced to a few located text fragments ([`PageText`]); then a
//! fixed, ordered list of pure extractors derives one field each. An extractor
//! that finds nothing leaves its field at [`SENTINEL`] and never affects the
//! others.

pub mod extractors;
pub mod vocabulary;

use crate::fields::extractors::{
    parse_genres, parse_rating_count, parse_rating_percent, parse_runtime, split_origin, Origin,
};
use crate::fields::vocabulary::Vocabulary;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub use vocabulary::{DEFAULT_COUNTRIES, DEFAULT_GENRES};

/// Marker for a field that could not be determined
pub const SENTINEL: &str = "NaN";

/// Column names of the record file, in field order
pub const RECORD_HEADER: [&str; 6] = [
    "delka",
    "zanry",
    "zeme",
    "rok",
    "hodnoceni_procenta",
    "hodnoceni_pocet",
];

/// One extracted film record
///
/// Every field is either a parsed value or [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRecord {
    /// Runtime in minutes
    #[serde(rename = "delka")]
    pub runtime_minutes: String,

    /// Comma-joined genre names
    #[serde(rename = "zanry")]
    pub genres: String,

    #[serde(rename = "zeme")]
    pub country: String,

    #[serde(rename = "rok")]
    pub year: String,

    /// Average rating as an integer percentage
    #[serde(rename = "hodnoceni_procenta")]
    pub rating_percent: String,

    /// Number of user ratings
    #[serde(rename = "hodnoceni_pocet")]
    pub rating_count: String,
}

impl StructuredRecord {
    /// A record with every field unknown
    pub fn unknown() -> Self {
        Self {
            runtime_minutes: SENTINEL.to_string(),
            genres: SENTINEL.to_string(),
            country: SENTINEL.to_string(),
            year: SENTINEL.to_string(),
            rating_percent: SENTINEL.to_string(),
            rating_count: SENTINEL.to_string(),
        }
    }

    /// Returns true if no field was determined
    pub fn is_unknown(&self) -> bool {
        self.values().iter().all(|v| *v == SENTINEL)
    }

    /// Field values in column order
    pub fn values(&self) -> [&str; 6] {
        [
            &self.runtime_minutes,
            &self.genres,
            &self.country,
            &self.year,
            &self.rating_percent,
            &self.rating_count,
        ]
    }

    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Runtime => &mut self.runtime_minutes,
            Field::Genres => &mut self.genres,
            Field::Country => &mut self.country,
            Field::Year => &mut self.year,
            Field::RatingPercent => &mut self.rating_percent,
            Field::RatingCount => &mut self.rating_count,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Runtime,
    Genres,
    Country,
    Year,
    RatingPercent,
    RatingCount,
}

/// Text fragments located in a detail page
///
/// Container text is the concatenation of the container's trimmed text nodes;
/// `full_text` joins every trimmed text node of the page with newlines.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub genres: Option<String>,
    pub origin: Option<String>,
    pub rating_average: Option<String>,
    pub full_text: String,
}

static GENRES_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("div.genres").ok());
static ORIGIN_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("div.origin").ok());
static RATING_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("div.film-rating-average").ok());

impl PageText {
    /// Locates the containers the extractors read from
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let full_text = document
            .root_element()
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            genres: container_text(&document, &GENRES_SELECTOR),
            origin: container_text(&document, &ORIGIN_SELECTOR),
            rating_average: container_text(&document, &RATING_SELECTOR),
            full_text,
        }
    }
}

fn container_text(document: &Html, selector: &Option<Selector>) -> Option<String> {
    let element = document.select(selector.as_ref()?).next()?;
    Some(stripped_text(element))
}

fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Everything an extractor may look at
struct Page<'a> {
    text: &'a PageText,
    origin: Origin,
    vocabulary: &'a Vocabulary,
}

type Extractor = fn(&Page) -> Option<String>;

/// The pipeline: one pure extractor per field, run in this order
const PIPELINE: [(Field, Extractor); 6] = [
    (Field::Genres, |page| {
        parse_genres(page.text.genres.as_deref()?, page.vocabulary)
    }),
    (Field::Country, |page| page.origin.country.clone()),
    (Field::Year, |page| page.origin.year.clone()),
    (Field::Runtime, |page| {
        parse_runtime(page.origin.remainder.as_deref()?).map(|m| m.to_string())
    }),
    (Field::RatingPercent, |page| {
        parse_rating_percent(page.text.rating_average.as_deref()?)
    }),
    (Field::RatingCount, |page| {
        parse_rating_count(&page.text.full_text)
    }),
];

/// Derives structured records from page HTML
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    vocabulary: Vocabulary,
}

impl FieldExtractor {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Runs the whole pipeline over an HTML document
    pub fn extract(&self, html: &str) -> StructuredRecord {
        self.extract_text(&PageText::from_html(html))
    }

    /// Runs the pipeline over already-located text fragments
    pub fn extract_text(&self, text: &PageText) -> StructuredRecord {
        let origin = match text.origin.as_deref() {
            Some(origin) => split_origin(origin, &self.vocabulary),
            None => split_origin("", &self.vocabulary),
        };
        let page = Page {
            text,
            origin,
            vocabulary: &self.vocabulary,
        };

        let mut record = StructuredRecord::unknown();
        for (field, extractor) in PIPELINE {
            if let Some(value) = extractor(&page) {
                record.set(field, value);
            }
        }
        record
    }
}

/// Extracts a record using the built-in vocabularies
///
/// # Example
///
/// ```
/// use csfd_harvest::fields::extract_fields;
///
/// let html = r#"<div class="genres">Drama / Krimi</div>
///               <div class="origin">USA, 1994, 142 min</div>"#;
/// let record = extract_fields(html);
/// assert_eq!(record.genres, "Drama,Krimi");
/// assert_eq!(record.runtime_minutes, "142");
/// assert_eq!(record.rating_count, "NaN");
/// ```
pub fn extract_fields(html: &str) -> StructuredRecord {
    FieldExtractor::default().extract(html)
}
