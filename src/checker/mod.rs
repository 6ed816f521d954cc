// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - classify: Resolves hrefs and tags them internal/external
// - html: Extracts links from HTML pages
// - http: Probes links concurrently and records their health
// - page: Ties it together for "check every link on this page"
//
// The health checker (http) knows nothing about hosts; splitting results into
// internal and external is done afterwards with classify::is_internal.
// =============================================================================

mod classify;
mod html;
mod http;
mod page;

// Re-export public items from submodules
pub use classify::{classify, is_internal, ClassifiedLink};
pub use html::extract_page_links;
pub use http::{check_all, check_links, LinkCheckResult};
pub use page::{check_page_links, PageLinkReport};
