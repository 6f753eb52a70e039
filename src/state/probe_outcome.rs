/// Probe outcome definitions for the discovery stage
///
/// Every identifier drawn during discovery ends in exactly one of these outcomes.
use std::fmt;

/// Classification of a single discovery probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The identifier was already probed earlier in this run
    Duplicate,

    /// Network failure, timeout or DNS error; the probe is abandoned
    FetchError { error: String },

    /// The server answered with a status other than 200
    BadStatus { status_code: u16 },

    /// A 200 page whose body says the film does not exist
    NotFound,

    /// A 200 page that resolved (usually via redirect) to a non-detail URL
    ShapeMismatch { final_url: String },

    /// A real detail page; carries the final resolved URL
    Valid { final_url: String },
}

impl ProbeOutcome {
    /// Returns true if a request actually went out for this probe
    pub fn was_fetched(&self) -> bool {
        !matches!(self, Self::Duplicate)
    }

    /// Short stable label used in log lines and run tallies
    pub fn label(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::FetchError { .. } => "fetch_error",
            Self::BadStatus { .. } => "bad_status",
            Self::NotFound => "not_found",
            Self::ShapeMismatch { .. } => "shape_mismatch",
            Self::Valid { .. } => "valid",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => write!(f, "already tried"),
            Self::FetchError { error } => write!(f, "fetch error: {}", error),
            Self::BadStatus { status_code } => write!(f, "status_code={}", status_code),
            Self::NotFound => write!(f, "page reports not found"),
            Self::ShapeMismatch { final_url } => {
                write!(f, "{} is not a detail page", final_url)
            }
            Self::Valid { final_url } => write!(f, "OK {}", final_url),
        }
    }
}
