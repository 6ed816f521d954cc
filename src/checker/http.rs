// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Follows redirects and reports where the link finally landed
// - Detects the different failure modes (404, timeout, DNS, TLS, ...)
// - Runs checks concurrently with a fixed-width worker pool
//
// What counts as broken?
//   status 0 (no response at all) or status >= 400
// That rule lives in one place (LinkCheckResult::from_status) so it can never
// drift between the "got a response" and "request failed" paths.
// =============================================================================

use crate::config::CheckOptions;
use crate::error::{Result, TransportErrorKind};
use crate::fetch::{build_client, classify_transport_error, error_cause_text};
use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// The outcome of probing one URL.
///
/// `is_broken` is true exactly when `status_code` is 0 (no response) or
/// at least 400.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCheckResult {
    /// The URL that was checked
    pub url: String,
    /// HTTP status of the final response, 0 if no response was received
    pub status_code: u16,
    pub is_broken: bool,
    /// True when the request ended up somewhere other than `url`
    pub is_redirect: bool,
    /// Where the redirects ended, only set when `is_redirect` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// Why the request failed, only set for transport failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LinkCheckResult {
    /// Builds the result for a request that received a response.
    pub fn from_status(url: String, status_code: u16, final_url: Option<String>) -> Self {
        let is_redirect = final_url.is_some();
        LinkCheckResult {
            url,
            status_code,
            is_broken: status_code == 0 || status_code >= 400,
            is_redirect,
            final_url,
            error: None,
        }
    }

    /// Builds the result for a request that never got a response.
    ///
    /// `error` is the failure class, or `cause` itself when the failure fits
    /// none of the known classes.
    pub fn from_transport(url: String, kind: TransportErrorKind, cause: String) -> Self {
        let error = match kind {
            TransportErrorKind::Other => cause,
            _ => kind.to_string(),
        };
        LinkCheckResult {
            error: Some(error),
            ..Self::from_status(url, 0, None)
        }
    }

    /// Helper method to check if the link is OK
    pub fn is_ok(&self) -> bool {
        !self.is_broken
    }
}

// Checks multiple links concurrently with our default options
//
// This is the CheckLinks entry point used by the CLI and by
// check_page_links(). It does NOT deduplicate or truncate: callers hand in
// the exact set they want probed.
pub async fn check_links(urls: Vec<String>, options: &CheckOptions) -> Result<Vec<LinkCheckResult>> {
    check_all(urls, options.max_concurrency, options.per_request_timeout).await
}

// Probes every URL with at most `max_concurrency` requests in flight
//
// Returns exactly one result per input URL. Results come back in completion
// order, not input order.
//
// The "worker pool" is a buffer_unordered stream: it keeps up to N probes
// running, starts the next one as soon as any finishes, and is gone as soon
// as the last result has been collected.
pub async fn check_all(
    urls: Vec<String>,
    max_concurrency: usize,
    per_request_timeout: Duration,
) -> Result<Vec<LinkCheckResult>> {
    // One client for every probe (connection pooling)
    let client = build_client(per_request_timeout)?;
    let width = max_concurrency.max(1);

    info!(links = urls.len(), width, "checking links");

    let futures = urls.into_iter().map(|url| {
        let client = client.clone(); // Clone the client for each task
        async move { check_single_link(client, url).await }
    });

    let results: Vec<LinkCheckResult> = stream::iter(futures)
        .buffer_unordered(width)
        .collect()
        .await;

    let broken = results.iter().filter(|r| r.is_broken).count();
    info!(checked = results.len(), broken, "link check complete");

    Ok(results)
}

// Checks a single link with a HEAD request
//
// Never fails: every outcome, including network errors, becomes a
// LinkCheckResult.
async fn check_single_link(client: Client, url: String) -> LinkCheckResult {
    match client.head(&url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let final_url = redirect_target(&url, response.url());
            debug!(%url, status, "probe finished");
            LinkCheckResult::from_status(url, status, final_url)
        }
        Err(e) => {
            let kind = classify_transport_error(&e);
            debug!(%url, error = %e, "probe failed");
            LinkCheckResult::from_transport(url, kind, error_cause_text(&e))
        }
    }
}

// Returns the final URL if it differs from the one we asked for
//
// The requested URL is parsed first so that "https://example.com" and
// "https://example.com/" are not mistaken for a redirect.
fn redirect_target(requested: &str, final_url: &Url) -> Option<String> {
    let same = match Url::parse(requested) {
        Ok(requested) => requested == *final_url,
        Err(_) => requested == final_url.as_str(),
    };

    if same {
        None
    } else {
        Some(final_url.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is buffer_unordered?
//    - stream::iter turns our iterator of futures into a Stream
//    - buffer_unordered(N) polls up to N of them at once and yields each
//      result as soon as it is ready (hence "unordered")
//    - When the stream is exhausted, the "pool" is simply gone: there are
//      no threads or tasks to shut down
//
// 2. Why do results come back out of order?
//    - A slow link must not hold up the fast ones behind it
//    - Callers that need a particular order sort or look results up by url
//
// 3. Why HEAD instead of GET?
//    - HEAD asks for the headers only, so we never download page bodies
//    - reqwest keeps the HEAD method when it follows 301/302 redirects
// -----------------------------------------------------------------------------
