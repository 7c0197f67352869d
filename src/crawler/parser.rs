//! HTML link extraction
//!
//! This module turns a fetched page into the absolute URLs it links to.
//! Parsing is permissive: html5ever recovers from malformed markup, and any
//! failure yields an empty link set for that page instead of an error.

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Elements whose `href` is a hyperlink
const LINK_SELECTOR: &str = "a[href], area[href]";

/// Errors that prevent link extraction for a page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBase {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid link selector: {0}")]
    Selector(String),
}

/// Extracts absolute hyperlink URLs from an HTML body
///
/// Every `<a href>` (and `<area href>`) is resolved against `base_url`
/// using standard URL resolution, so relative (`page`, `/page`),
/// protocol-relative (`//host/page`) and absolute references all come out
/// absolute. Empty or unresolvable references are dropped.
///
/// Results that are not `http`/`https` (`mailto:`, `ftp:`, `javascript:`)
/// are dropped deliberately, even though they resolve. The request engine
/// only speaks HTTP, so such URLs could only ever fail as transport errors.
///
/// Results are in document order and may contain duplicates.
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `base_url` - The URL the content was fetched from
///
/// # Returns
///
/// A vector of absolute URLs, empty if the page could not be processed
///
/// # Example
///
/// ```
/// use mock_traffic::crawler::extract_links;
///
/// let html = r#"<a href="/a">A</a><a href="//cdn.example.org/b">B</a>"#;
/// let links = extract_links(html, "https://example.com/index.html");
/// assert_eq!(links, vec!["https://example.com/a", "https://cdn.example.org/b"]);
/// ```
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(source) => {
            let err = ParseError::InvalidBase {
                url: base_url.to_string(),
                source,
            };
            tracing::debug!("Failed to extract URLs: {}", err);
            return Vec::new();
        }
    };

    parse_html(html, &base).unwrap_or_else(|e| {
        tracing::debug!("Failed to extract URLs from {}: {}", base_url, e);
        Vec::new()
    })
}

/// Parses HTML content and returns the resolved hyperlinks
///
/// This is the fallible form of [`extract_links`] for callers that already
/// hold a parsed base URL.
pub fn parse_html(html: &str, base_url: &Url) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(LINK_SELECTOR).map_err(|e| ParseError::Selector(e.to_string()))?;

    let links = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect();

    Ok(links)
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the href is empty, cannot be joined onto the base, or
/// resolves to a scheme other than HTTP(S).
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
