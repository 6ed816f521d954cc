// src/error.rs
// =============================================================================
// Error types for the crawling engine.
//
// Most failures in this crate are NOT returned as errors: a broken link becomes
// a LinkCheckResult with is_broken = true, and a sitemap that fails to load
// becomes one line in ResolutionResult::errors. The types here describe what
// went wrong so those records can be written, and cover the few cases that do
// abort an operation (e.g. the page we were asked to check cannot be fetched).
// =============================================================================

use std::fmt;
use thiserror::Error;

/// Why a request never produced an HTTP response.
///
/// The Display text is what ends up in `LinkCheckResult::error`, except for
/// `Other`, which stores the underlying message instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Dns,
    Connect,
    Tls,
    TooManyRedirects,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TransportErrorKind::Timeout => "Timeout",
            TransportErrorKind::Dns => "DNS failure",
            TransportErrorKind::Connect => "Connection refused",
            TransportErrorKind::Tls => "TLS failure",
            TransportErrorKind::TooManyRedirects => "Too many redirects",
            TransportErrorKind::Other => "Request failed",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum GuardianError {
    /// DNS / connect / TLS / timeout: no response was received
    #[error("{url}: {kind} ({cause})")]
    Transport {
        url: String,
        kind: TransportErrorKind,
        cause: String,
    },

    /// A response arrived but its status says the resource is unusable
    #[error("{url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Malformed XML, or an XML document that is not a sitemap
    #[error("{url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// None of the sitemap candidates produced anything
    #[error("No sitemap could be resolved for {url}: {cause}")]
    NoSitemap { url: String, cause: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GuardianError {
    /// The short cause text, without the URL prefix.
    ///
    /// The sitemap resolver formats its error lines as "<url>: <cause>", so it
    /// needs the cause on its own.
    pub fn cause(&self) -> String {
        match self {
            GuardianError::Transport { kind, cause, .. } => format!("{} ({})", kind, cause),
            GuardianError::HttpStatus { status, .. } => format!("HTTP {}", status),
            GuardianError::Parse { reason, .. } => reason.clone(),
            GuardianError::InvalidUrl(url) => format!("invalid URL {}", url),
            GuardianError::NoSitemap { cause, .. } => cause.clone(),
            GuardianError::Http(e) => e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardianError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_omits_url() {
        let err = GuardianError::HttpStatus {
            url: "https://example.com/sitemap.xml".to_string(),
            status: 404,
        };
        assert_eq!(err.cause(), "HTTP 404");
        assert_eq!(err.to_string(), "https://example.com/sitemap.xml: HTTP 404");
    }

    #[test]
    fn test_transport_kind_display() {
        assert_eq!(TransportErrorKind::Timeout.to_string(), "Timeout");
        assert_eq!(TransportErrorKind::Dns.to_string(), "DNS failure");
    }
}
