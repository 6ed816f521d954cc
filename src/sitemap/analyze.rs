// src/sitemap/analyze.rs
// =============================================================================
// "Analyze the sitemap of this site": discovery + resolution + a few checks.
//
// How the sitemap is chosen:
// - If the caller names a sitemap URL, that is the only candidate.
// - Otherwise discover() supplies robots.txt entries and well-known paths.
// - Each candidate gets a cheap existence probe. The first one that exists
//   AND resolves to at least one sitemap document wins.
// - If nothing wins, the first candidate is resolved anyway so its errors
//   can be shown to the user. Only if that also yields nothing do we fail.
// =============================================================================

use super::discover::discover;
use super::fetch::{SitemapEntry, SitemapFetcher, SitemapNode};
use super::resolve::{resolve_sitemap, ResolutionResult};
use crate::config::SitemapOptions;
use crate::error::{GuardianError, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Search engines stop reading a sitemap after this many URLs.
pub const MAX_RECOMMENDED_URLS: usize = 50_000;

/// Above this share of entries without <lastmod>, we raise an issue.
pub const MAX_MISSING_LASTMOD_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapReport {
    pub base_url: String,
    /// The candidate the report was built from
    pub sitemap_url: String,
    pub sitemaps_found: usize,
    pub sitemaps: Vec<SitemapNode>,
    /// Number of entries, duplicates across sitemaps included
    pub total_urls: usize,
    pub entries: Vec<SitemapEntry>,
    pub issues: Vec<String>,
    pub errors: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

// Finds, resolves and checks a site's sitemap
pub async fn analyze_sitemap(
    base_url: &str,
    explicit_sitemap_url: Option<&str>,
    options: &SitemapOptions,
) -> Result<SitemapReport> {
    let candidates = match explicit_sitemap_url {
        Some(url) => vec![url.to_string()],
        None => discover(base_url, options).await,
    };

    let fetcher = SitemapFetcher::new(options.fetch_timeout)?;
    let (sitemap_url, resolution) = pick_sitemap(&fetcher, base_url, &candidates, options).await?;

    info!(
        %sitemap_url,
        sitemaps = resolution.nodes.len(),
        urls = resolution.entries.len(),
        errors = resolution.errors.len(),
        "sitemap analysis complete"
    );

    Ok(SitemapReport {
        base_url: base_url.to_string(),
        sitemap_url,
        sitemaps_found: resolution.nodes.len(),
        total_urls: resolution.entries.len(),
        issues: derive_issues(&resolution.entries),
        sitemaps: resolution.nodes,
        entries: resolution.entries,
        errors: resolution.errors,
        analyzed_at: Utc::now(),
    })
}

async fn pick_sitemap(
    fetcher: &SitemapFetcher,
    base_url: &str,
    candidates: &[String],
    options: &SitemapOptions,
) -> Result<(String, ResolutionResult)> {
    // Kept when the first candidate exists but resolves to nothing, so the
    // fallback below does not fetch its subtree a second time
    let mut first_resolution: Option<ResolutionResult> = None;

    for (position, candidate) in candidates.iter().enumerate() {
        if !probe_exists(fetcher.client(), candidate).await {
            debug!(%candidate, "sitemap candidate does not exist");
            continue;
        }

        let resolution = resolve_sitemap(fetcher, candidate, options.max_depth).await;
        if !resolution.is_empty() {
            return Ok((candidate.clone(), resolution));
        }
        debug!(%candidate, "sitemap candidate resolved to nothing");
        if position == 0 {
            first_resolution = Some(resolution);
        }
    }

    // Nothing worked: report the first candidate's errors
    let first = candidates.first().ok_or_else(|| GuardianError::NoSitemap {
        url: base_url.to_string(),
        cause: "no sitemap candidates".to_string(),
    })?;

    let resolution = match first_resolution {
        Some(resolution) => resolution,
        None => resolve_sitemap(fetcher, first, options.max_depth).await,
    };
    if resolution.is_empty() {
        let cause = resolution
            .errors
            .first()
            .cloned()
            .unwrap_or_else(|| format!("{}: no sitemap found", first));
        return Err(GuardianError::NoSitemap {
            url: base_url.to_string(),
            cause,
        });
    }

    Ok((first.clone(), resolution))
}

// Cheap "does this URL exist" check
//
// HEAD first; some servers refuse HEAD outright, so 405/501 falls back to GET.
async fn probe_exists(client: &Client, url: &str) -> bool {
    let status = match client.head(url).send().await {
        Ok(response) => response.status(),
        Err(e) => {
            debug!(url, error = %e, "existence probe failed");
            return false;
        }
    };

    if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
        return match client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        };
    }

    status.is_success()
}

// Advisory problems with the flattened sitemap
pub fn derive_issues(entries: &[SitemapEntry]) -> Vec<String> {
    let mut issues = Vec::new();
    let total = entries.len();

    if total > MAX_RECOMMENDED_URLS {
        issues.push(format!(
            "Sitemap has {} URLs (search engines recommend max 50,000)",
            total
        ));
    }

    let missing_lastmod = entries.iter().filter(|e| e.lastmod.is_none()).count();
    if missing_lastmod as f64 > total as f64 * MAX_MISSING_LASTMOD_RATIO {
        issues.push(format!("{} URLs missing lastmod date", missing_lastmod));
    }

    issues
}
