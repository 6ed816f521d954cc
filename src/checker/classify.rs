// src/checker/classify.rs
// =============================================================================
// Resolves hrefs found on a page and decides whether they are internal.
//
// Rules:
// - Relative ("../docs"), root-relative ("/docs"), protocol-relative
//   ("//cdn.example.com/x.js") and absolute hrefs are all resolved against the
//   page URL, exactly like a browser would.
// - A link is INTERNAL when its host equals the page's host, or when the
//   resolved URL has no host at all.
// - Empty or whitespace-only hrefs are not links; they are rejected.
// - Nothing here ever fails: if the URL cannot be resolved we keep the raw
//   href and call it external. The problem will show up when it is probed.
// =============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

/// A resolved href plus its internal/external classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassifiedLink {
    pub absolute_url: String,
    pub is_internal: bool,
}

// Classifies one href relative to the page it was found on
//
// Returns None only for empty / whitespace hrefs.
//
// Examples (base = "https://example.com/blog/post"):
//   "/about"                 -> https://example.com/about, internal
//   "next"                   -> https://example.com/blog/next, internal
//   "//cdn.other.com/a.js"   -> https://cdn.other.com/a.js, external
//   "https://rust-lang.org"  -> https://rust-lang.org/, external
pub fn classify(base_url: &str, raw_href: &str) -> Option<ClassifiedLink> {
    let href = raw_href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = Url::parse(base_url)
        .ok()
        .and_then(|base| base.join(href).ok().map(|url| (base, url)));

    let link = match resolved {
        Some((base, url)) => ClassifiedLink {
            is_internal: is_same_host(&base, &url),
            absolute_url: url.to_string(),
        },
        None => ClassifiedLink {
            absolute_url: href.to_string(),
            is_internal: false,
        },
    };

    Some(link)
}

// Checks whether an already-absolute URL belongs to the same site as base_url
//
// Used after probing to split results into internal and external buckets.
// Unparseable URLs are never internal.
pub fn is_internal(base_url: &str, url: &str) -> bool {
    match (Url::parse(base_url), Url::parse(url)) {
        (Ok(base), Ok(url)) => is_same_host(&base, &url),
        _ => false,
    }
}

fn is_same_host(base: &Url, url: &Url) -> bool {
    match url.host_str() {
        // "mailto:", "data:" and similar have no host component
        None => true,
        Some(host) => base.host_str() == Some(host),
    }
}
