//! HTTP fetcher implementation
//!
//! This module performs every request the harvester makes:
//! - Building the HTTP client with the configured identity headers and timeout
//! - Single GET requests, following redirects with the client's default policy
//! - Reporting the final resolved URL so callers can spot unwanted redirects
//! - Turning network failures into values instead of errors

use crate::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered (with any status)
    Response {
        /// HTTP status code
        status_code: u16,
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// Network error (connection refused, timeout, DNS, broken body)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the body of a 200 response
    pub fn ok_body(&self) -> Option<&str> {
        match self {
            Self::Response {
                status_code: 200,
                body,
                ..
            } => Some(body.as_str()),
            _ => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use csfd_harvest::config::HttpConfig;
/// use csfd_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    if let Ok(language) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, language);
    } else {
        tracing::warn!(
            "Ignoring invalid accept-language value '{}'",
            config.accept_language
        );
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// There are no retries: a failed request is reported as
/// [`FetchResult::NetworkError`] and the caller decides what that means.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: classify_error(&e),
            }
        }
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().to_string();

    match response.text().await {
        Ok(body) => FetchResult::Response {
            status_code,
            final_url,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
        },
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else {
        e.to_string()
    }
}
