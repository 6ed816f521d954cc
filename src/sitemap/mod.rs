// src/sitemap/mod.rs
// =============================================================================
// Everything to do with XML sitemaps.
//
// Submodules, leaves first:
// - xml: two-pass, namespace-tolerant XML parsing into a small element tree
// - fetch: downloads one sitemap and classifies it as Index or UrlSet
// - resolve: walks index -> child sitemaps recursively, with cycle/depth guards
// - discover: robots.txt + well-known paths -> candidate sitemap URLs
// - analyze: picks a candidate, resolves it, and flags common problems
// =============================================================================

mod analyze;
mod discover;
mod fetch;
mod resolve;
mod xml;

pub use analyze::{analyze_sitemap, derive_issues, SitemapReport, MAX_RECOMMENDED_URLS};
pub use discover::{discover, parse_robots_sitemaps, WELL_KNOWN_SITEMAP_PATHS};
pub use fetch::{
    parse_sitemap, SitemapDocument, SitemapEntry, SitemapFetcher, SitemapKind, SitemapNode,
    SitemapPointer,
};
pub use resolve::{resolve, resolve_sitemap, ResolutionResult, VisitedSet};
pub use xml::SITEMAP_NS;
