// src/sitemap/discover.rs
// =============================================================================
// Works out where a site's sitemaps might live.
//
// Candidates, in order:
//   1. every "Sitemap: <url>" line in /robots.txt, in file order
//   2. a fixed list of well-known locations, always appended
//
// Discovery never fails. If robots.txt is missing or unreachable we just
// log it and return the well-known paths.
// =============================================================================

use crate::config::SitemapOptions;
use crate::fetch::{build_client, fetch_text};
use tracing::{debug, info, warn};
use url::Url;

/// Places sites commonly put their sitemap, tried after robots.txt.
pub const WELL_KNOWN_SITEMAP_PATHS: [&str; 4] = [
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemaps.xml",
];

// Returns candidate sitemap URLs for a site, most specific first
pub async fn discover(base_url: &str, options: &SitemapOptions) -> Vec<String> {
    let mut candidates = fetch_robots_sitemaps(base_url, options).await;
    let declared = candidates.len();

    candidates.extend(
        WELL_KNOWN_SITEMAP_PATHS
            .iter()
            .map(|path| join_path(base_url, path)),
    );

    info!(base_url, declared, total = candidates.len(), "sitemap candidates discovered");
    candidates
}

// Fetches robots.txt and pulls out its Sitemap: lines, swallowing any failure
async fn fetch_robots_sitemaps(base_url: &str, options: &SitemapOptions) -> Vec<String> {
    let robots_url = join_path(base_url, "/robots.txt");

    let client = match build_client(options.robots_timeout) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "could not build HTTP client for robots.txt");
            return Vec::new();
        }
    };

    match fetch_text(&client, &robots_url).await {
        Ok(text) => parse_robots_sitemaps(&text),
        Err(e) => {
            debug!(%robots_url, error = %e, "robots.txt unavailable");
            Vec::new()
        }
    }
}

// Extracts the URLs of all "Sitemap:" directives (case-insensitive)
pub fn parse_robots_sitemaps(robots_txt: &str) -> Vec<String> {
    robots_txt
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (directive, value) = line.split_once(':')?;
            if !directive.trim().eq_ignore_ascii_case("sitemap") {
                return None;
            }
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect()
}

// Resolves an absolute path against the site's base URL
//
// Falls back to string concatenation when the base URL does not parse, so
// discovery still hands back something the fetcher can report on.
fn join_path(base_url: &str, path: &str) -> String {
    Url::parse(base_url)
        .and_then(|base| base.join(path))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("{}{}", base_url.trim_end_matches('/'), path))
}
