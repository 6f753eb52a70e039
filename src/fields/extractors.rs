//! Text-level field extractors
//!
//! Each function takes already-located text and returns `None` when the field
//! cannot be determined. None of them can fail.

use crate::fields::vocabulary::Vocabulary;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_RATING_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s?%").expect("rating percent pattern"));

static RE_RATING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Hodnocení\s*\(([\d\s]+)\)").expect("rating count pattern"));

/// A runtime pattern and how its captures convert to minutes
type RuntimeRule = (LazyLock<Regex>, fn(&Captures) -> Option<u32>);

/// Runtime patterns, most specific first; the first match wins
static RUNTIME_RULES: [RuntimeRule; 3] = [
    (
        LazyLock::new(|| Regex::new(r"(\d+)\s*h\s*(\d+)\s*min").expect("h+min pattern")),
        |caps| number(caps, 1)?.checked_mul(60)?.checked_add(number(caps, 2)?),
    ),
    (
        LazyLock::new(|| Regex::new(r"(\d+)\s*h").expect("h pattern")),
        |caps| number(caps, 1)?.checked_mul(60),
    ),
    (
        LazyLock::new(|| Regex::new(r"(\d+)\s*min").expect("min pattern")),
        |caps| number(caps, 1),
    ),
];

fn number(caps: &Captures, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// The three parts of an origin line such as `"USA, 1994, 142 min"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Canonical country name, if part 0 is a known country
    pub country: Option<String>,

    /// Part 1 verbatim (trimmed)
    pub year: Option<String>,

    /// Parts 2.. rejoined with commas
    pub remainder: Option<String>,
}

impl Origin {
    fn unknown() -> Self {
        Self {
            country: None,
            year: None,
            remainder: None,
        }
    }
}

/// Splits an origin line into country, year and runtime remainder
///
/// Fewer than three comma-separated parts leaves every component unknown.
/// An unrecognized country is discarded, not kept raw.
pub fn split_origin(text: &str, vocabulary: &Vocabulary) -> Origin {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() < 3 {
        return Origin::unknown();
    }

    let country = vocabulary.country(parts[0].trim()).map(str::to_string);
    let year = non_empty(parts[1].trim());
    let remainder = non_empty(parts[2..].join(",").trim());

    Origin {
        country,
        year,
        remainder,
    }
}

/// Converts runtime text to a minute count
///
/// ```
/// use csfd_harvest::fields::extractors::parse_runtime;
///
/// assert_eq!(parse_runtime("1 h 10 min"), Some(70));
/// assert_eq!(parse_runtime("2 h"), Some(120));
/// assert_eq!(parse_runtime("142 min"), Some(142));
/// assert_eq!(parse_runtime("bez informace"), None);
/// ```
pub fn parse_runtime(text: &str) -> Option<u32> {
    RUNTIME_RULES
        .iter()
        .find_map(|(pattern, to_minutes)| pattern.captures(text).map(|caps| to_minutes(&caps)))
        .flatten()
}

/// Splits genre text on `/` and joins the trimmed segments with `,`
///
/// Every segment is kept verbatim, including empty ones and names outside the
/// vocabulary. Blank text has no genres.
pub fn parse_genres(text: &str, vocabulary: &Vocabulary) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let genres: Vec<&str> = text.split('/').map(str::trim).collect();
    for genre in genres.iter().filter(|g| !vocabulary.is_known_genre(g)) {
        tracing::trace!("Keeping unknown genre '{}'", genre);
    }
    Some(genres.join(","))
}

/// Leading integer before a `%` sign, e.g. `"91%"` -> `"91"`
pub fn parse_rating_percent(text: &str) -> Option<String> {
    RE_RATING_PERCENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Number of ratings from `"Hodnocení (116 107)"`, with digit-group spaces removed
pub fn parse_rating_count(text: &str) -> Option<String> {
    let caps = RE_RATING_COUNT.captures(text)?;
    let digits: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    non_empty(&digits)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
