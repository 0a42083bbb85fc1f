//! Published tag count of the cluster image on the registry.

use std::time::Duration;

use nanoctl_common::constants::REGISTRY_PAGE_SIZE;
use nanoctl_common::error::{NanoError, Result};

/// Number of published tags and result pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSummary {
    /// Total number of tags.
    pub count: u64,
    /// Number of full result pages.
    pub pages: u64,
}

impl TagSummary {
    /// Derives the page count from a tag count.
    #[must_use]
    pub const fn from_count(count: u64) -> Self {
        Self {
            count,
            pages: count / REGISTRY_PAGE_SIZE,
        }
    }
}

/// Parses a registry tag listing. A listing without `count` reports zero.
///
/// # Errors
///
/// Returns an error if the body is not JSON.
pub fn parse_tag_summary(body: &str) -> Result<TagSummary> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let count = value
        .get("count")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or_default();
    Ok(TagSummary::from_count(count))
}

/// Fetches the tag listing from the registry.
///
/// # Errors
///
/// Returns [`NanoError::Http`] if the registry is unreachable, or a
/// parse error.
pub fn fetch_tag_summary(url: &str, timeout: Duration) -> Result<TagSummary> {
    let http_error = |e: reqwest::Error| NanoError::Http {
        url: url.to_string(),
        message: e.to_string(),
    };
    tracing::debug!(url, "fetching registry tags");
    let body = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_error)?
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::text)
        .map_err(http_error)?;
    parse_tag_summary(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_and_pages_are_parsed() {
        let summary =
            parse_tag_summary(r#"{"count": 137, "next": "https://x", "results": []}"#).expect("parse");
        assert_eq!(summary, TagSummary { count: 137, pages: 13 });
    }

    #[test]
    fn missing_count_is_zero() {
        assert_eq!(
            parse_tag_summary("{}").expect("parse"),
            TagSummary { count: 0, pages: 0 }
        );
    }

    #[test]
    fn non_json_body_is_an_error() {
        assert!(parse_tag_summary("<html>").is_err());
    }
}
