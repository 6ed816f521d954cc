// src/checker/page.rs
// =============================================================================
// Checks every link on one page.
//
// Steps:
// 1. Fetch the page (the only step whose failure aborts the whole check)
// 2. Extract and classify its links
// 3. Deduplicate, and cap the number of links we are willing to probe
// 4. Probe them all (http.rs)
// 5. Split the results into broken/working and internal/external
// =============================================================================

use super::classify::is_internal;
use super::html::extract_page_links;
use super::http::{check_links, LinkCheckResult};
use crate::config::{CheckOptions, PAGE_FETCH_TIMEOUT};
use crate::error::Result;
use crate::fetch::{build_client, fetch_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Everything we learned about the links on one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLinkReport {
    pub url: String,
    pub total_links_checked: usize,
    pub broken_links_count: usize,
    pub working_links_count: usize,
    /// Broken links pointing at the page's own host
    pub internal_broken: Vec<LinkCheckResult>,
    /// Broken links pointing anywhere else
    pub external_broken: Vec<LinkCheckResult>,
    pub broken_links: Vec<LinkCheckResult>,
    pub working_links: Vec<LinkCheckResult>,
    pub checked_at: DateTime<Utc>,
}

// Fetches a page and checks all of its links
pub async fn check_page_links(page_url: &str, options: &CheckOptions) -> Result<PageLinkReport> {
    info!(page_url, "checking links on page");

    let client = build_client(PAGE_FETCH_TIMEOUT)?;
    let html = fetch_text(&client, page_url).await?;

    let links = extract_page_links(&html, page_url);
    let candidates = unique_capped(links.into_iter().map(|l| l.absolute_url), options.max_links);

    info!(page_url, links = candidates.len(), "probing links");
    let results = check_links(candidates, options).await?;

    Ok(build_report(page_url, results))
}

// Removes duplicates (keeping first-seen order) and truncates to `cap`
fn unique_capped(urls: impl Iterator<Item = String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.filter(|url| seen.insert(url.clone()))
        .take(cap)
        .collect()
}

// Partitions probe results the way the report presents them
fn build_report(page_url: &str, results: Vec<LinkCheckResult>) -> PageLinkReport {
    let total_links_checked = results.len();
    let (broken_links, working_links): (Vec<_>, Vec<_>) =
        results.into_iter().partition(|r| r.is_broken);

    let (internal_broken, external_broken): (Vec<_>, Vec<_>) = broken_links
        .iter()
        .cloned()
        .partition(|r| is_internal(page_url, &r.url));

    PageLinkReport {
        url: page_url.to_string(),
        total_links_checked,
        broken_links_count: broken_links.len(),
        working_links_count: working_links.len(),
        internal_broken,
        external_broken,
        broken_links,
        working_links,
        checked_at: Utc::now(),
    }
}
