// src/sitemap/fetch.rs
// =============================================================================
// Fetches one sitemap document and works out what it is.
//
// A sitemap is one of two shapes:
//   <sitemapindex><sitemap><loc>..</loc></sitemap>...</sitemapindex>
//       -> Index: pointers to more sitemaps
//   <urlset><url><loc>..</loc><lastmod>..</lastmod>...</url>...</urlset>
//       -> UrlSet: the actual pages
//
// Parsing strategy (see xml.rs for the details):
//   1. strict, namespace-aware parse
//   2. if that fails (or finds neither shape while the document declares
//      namespaces), strip the xmlns declarations and parse again tolerantly
//   3. otherwise give up with a Parse error
// =============================================================================

use super::xml::{self, XmlElement};
use crate::error::{GuardianError, Result};
use crate::fetch::{build_client, fetch_document};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One page listed in a leaf sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub url: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

/// A child sitemap listed in a sitemap index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapPointer {
    pub url: String,
    pub lastmod: Option<String>,
}

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    Index(Vec<SitemapPointer>),
    UrlSet(Vec<SitemapEntry>),
}

impl SitemapDocument {
    pub fn kind(&self) -> SitemapKind {
        match self {
            SitemapDocument::Index(_) => SitemapKind::Index,
            SitemapDocument::UrlSet(_) => SitemapKind::UrlSet,
        }
    }

    /// Number of pointers (Index) or entries (UrlSet).
    pub fn child_count(&self) -> usize {
        match self {
            SitemapDocument::Index(pointers) => pointers.len(),
            SitemapDocument::UrlSet(entries) => entries.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SitemapKind {
    Index,
    UrlSet,
}

/// Diagnostic record of one fetched sitemap document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapNode {
    pub url: String,
    pub kind: SitemapKind,
    pub child_count: usize,
}

/// Downloads and parses sitemap documents.
///
/// Holds one HTTP client so every fetch in a resolution walk shares its
/// connection pool.
#[derive(Debug, Clone)]
pub struct SitemapFetcher {
    client: Client,
}

impl SitemapFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // Fetches a sitemap and parses it
    //
    // Transport failures, non-2xx responses and unparseable documents all come
    // back as errors; the resolver turns them into "<url>: <cause>" lines.
    pub async fn fetch_and_parse(&self, url: &str) -> Result<SitemapDocument> {
        let raw = fetch_document(&self.client, url).await?;
        parse_sitemap(url, &raw)
    }
}

// Parses raw sitemap bytes (the URL is only used for error messages)
pub fn parse_sitemap(url: &str, raw: &[u8]) -> Result<SitemapDocument> {
    let stripped = xml::strip_namespace_declarations(raw);
    let has_declarations = stripped.len() != raw.len();

    match xml::parse_strict(raw) {
        Ok(root) => {
            if let Some(document) = classify_document(&root) {
                return Ok(document);
            }
            if !has_declarations {
                return Err(unknown_format(url));
            }
            debug!(url, "no sitemap elements found, retrying without namespaces");
        }
        Err(reason) => {
            debug!(url, %reason, "strict parse failed, retrying without namespaces");
        }
    }

    let root = xml::parse_tolerant(&stripped).map_err(|reason| GuardianError::Parse {
        url: url.to_string(),
        reason,
    })?;

    classify_document(&root).ok_or_else(|| unknown_format(url))
}

fn unknown_format(url: &str) -> GuardianError {
    GuardianError::Parse {
        url: url.to_string(),
        reason: "unknown format".to_string(),
    }
}

// Decides Index vs UrlSet by looking at the root's children
//
// A root with no <sitemap> or <url> children is still accepted when the root
// itself is a <sitemapindex> or <urlset>: it is simply an empty sitemap.
fn classify_document(root: &XmlElement) -> Option<SitemapDocument> {
    let sitemaps = root.children_named("sitemap");
    if !sitemaps.is_empty() {
        return Some(SitemapDocument::Index(
            sitemaps.into_iter().filter_map(parse_pointer).collect(),
        ));
    }

    let urls = root.children_named("url");
    if !urls.is_empty() {
        return Some(SitemapDocument::UrlSet(
            urls.into_iter().filter_map(parse_entry).collect(),
        ));
    }

    // A root in some other namespace may still have children we could not see
    if !matches!(root.namespace.as_deref(), None | Some(xml::SITEMAP_NS)) {
        return None;
    }
    match root.name.as_str() {
        "sitemapindex" => Some(SitemapDocument::Index(Vec::new())),
        "urlset" => Some(SitemapDocument::UrlSet(Vec::new())),
        _ => None,
    }
}

// <loc> is mandatory; children without one are dropped
fn parse_pointer(element: &XmlElement) -> Option<SitemapPointer> {
    Some(SitemapPointer {
        url: element.child_text("loc")?,
        lastmod: element.child_text("lastmod"),
    })
}

fn parse_entry(element: &XmlElement) -> Option<SitemapEntry> {
    Some(SitemapEntry {
        url: element.child_text("loc")?,
        lastmod: element.child_text("lastmod"),
        changefreq: element.child_text("changefreq"),
        priority: element.child_text("priority"),
    })
}
