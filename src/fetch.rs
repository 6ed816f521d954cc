// src/fetch.rs
// =============================================================================
// Shared HTTP plumbing: building clients and fetching documents.
//
// Both halves of the crate talk to the network the same way:
// - every client sends a browser-like User-Agent (some sites block bots)
// - every client has a per-request timeout and follows redirects
// - a failed request is turned into a GuardianError that says WHY it failed
//   (timeout, DNS, TLS, ...), which is what ends up in reports
//
// fetch_document() is also the "HTML document fetcher" the link checker uses
// to download the page whose links it checks.
// =============================================================================

use crate::config::{MAX_REDIRECTS, USER_AGENT};
use crate::error::{GuardianError, Result, TransportErrorKind};
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

// Creates an HTTP client with our standard settings
//
// Client is cheap to clone (it's an Arc inside), so callers build one per
// operation and clone it into each task.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    Ok(client)
}

// Downloads a document and returns its raw bytes
//
// Fails with:
//   Transport  - no response at all (timeout, DNS, refused, TLS)
//   HttpStatus - the server answered with a non-2xx status
pub async fn fetch_document(client: &Client, url: &str) -> Result<Vec<u8>> {
    debug!(url, "fetching document");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GuardianError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, &e))?;

    debug!(url, bytes = body.len(), "document fetched");
    Ok(body.to_vec())
}

// Same as fetch_document, but decodes the body as text (lossy UTF-8)
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let bytes = fetch_document(client, url).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// Turns a reqwest error into our Transport error
pub fn transport_error(url: &str, error: &reqwest::Error) -> GuardianError {
    GuardianError::Transport {
        url: url.to_string(),
        kind: classify_transport_error(error),
        cause: error_cause_text(error),
    }
}

// Figures out which class of network failure a reqwest error is
//
// reqwest only exposes is_timeout / is_connect / is_redirect, so DNS and TLS
// failures are recognised from the text of the underlying error chain. Only
// the sources are inspected: reqwest's own message embeds the request URL.
pub fn classify_transport_error(error: &reqwest::Error) -> TransportErrorKind {
    if error.is_timeout() {
        return TransportErrorKind::Timeout;
    }
    if error.is_redirect() {
        return TransportErrorKind::TooManyRedirects;
    }

    classify_source_text(&source_chain_text(error), error.is_connect())
}

// Matches the joined source-chain text against the known failure classes
fn classify_source_text(text: &str, is_connect: bool) -> TransportErrorKind {
    let text = text.to_lowercase();
    if text.contains("dns") || text.contains("failed to lookup") || text.contains("name or service not known") {
        TransportErrorKind::Dns
    } else if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
        TransportErrorKind::Tls
    } else if is_connect {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    }
}

// The underlying reason for a failed request, without the request URL
//
// Falls back to reqwest's own message when the error has no source.
pub fn error_cause_text(error: &reqwest::Error) -> String {
    let text = source_chain_text(error);
    if text.is_empty() {
        error.to_string()
    } else {
        text
    }
}

// Joins every source of an error (not the error itself) into one line
fn source_chain_text(error: &reqwest::Error) -> String {
    let mut text = String::new();
    let mut source = error.source();
    while let Some(inner) = source {
        let inner_text = inner.to_string();
        if !text.contains(&inner_text) {
            if !text.is_empty() {
                text.push_str(": ");
            }
            text.push_str(&inner_text);
        }
        source = inner.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_fetch_document_sends_browser_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let body = fetch_text(&client, &format!("{}/page", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_fetch_document_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let err = fetch_document(&client, &format!("{}/missing", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, GuardianError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_document_timeout_is_classified() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_millis(200)).unwrap();
        let err = fetch_document(&client, &format!("{}/slow", mock_server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GuardianError::Transport { kind: TransportErrorKind::Timeout, .. }
        ));
    }

    #[test]
    fn test_source_text_classification() {
        assert_eq!(
            classify_source_text("dns error: failed to lookup address information", true),
            TransportErrorKind::Dns
        );
        assert_eq!(
            classify_source_text("invalid peer certificate: UnknownIssuer", true),
            TransportErrorKind::Tls
        );
        assert_eq!(
            classify_source_text("tcp connect error: Connection refused (os error 111)", true),
            TransportErrorKind::Connect
        );
        assert_eq!(
            classify_source_text("connection closed before message completed", false),
            TransportErrorKind::Other
        );
    }

    #[tokio::test]
    async fn test_url_words_do_not_change_the_failure_class() {
        // Nothing listens on port 1; the path words must not be read as the cause
        let client = build_client(Duration::from_secs(5)).unwrap();

        for route in ["guide", "dns-guide", "tls-setup", "ssl-certificate"] {
            let url = format!("http://127.0.0.1:1/{}", route);
            let err = fetch_document(&client, &url).await.unwrap_err();

            match err {
                GuardianError::Transport { kind, cause, .. } => {
                    assert_eq!(kind, TransportErrorKind::Connect, "{}", url);
                    assert!(!cause.contains(route), "cause {:?} repeats the url", cause);
                }
                other => panic!("unexpected error for {}: {:?}", url, other),
            }
        }
    }
}
