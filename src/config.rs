// src/config.rs
// =============================================================================
// Tunable options for link checking and sitemap analysis.
//
// There is no config file: the CLI (src/cli.rs) fills these structs from
// command-line flags, and library users build them in code. Every field has
// a default matching what the tool does when no flag is given.
// =============================================================================

use std::time::Duration;

/// Browser-like User-Agent sent with every request.
///
/// Several sites reject requests from default HTTP client identifiers.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// How many redirects a single request may follow.
pub const MAX_REDIRECTS: usize = 10;

/// Timeout for fetching a page whose links we are about to check.
pub const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for `checker::check_all` and `checker::check_page_links`.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Width of the probe worker pool
    pub max_concurrency: usize,
    /// Timeout applied to each HEAD probe
    pub per_request_timeout: Duration,
    /// Links beyond this count are dropped before probing
    pub max_links: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            per_request_timeout: Duration::from_secs(10),
            max_links: 100,
        }
    }
}

impl CheckOptions {
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        // A pool of width 0 would never make progress
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_request_timeout = timeout;
        self
    }

    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }
}

/// Options for sitemap discovery, fetching and resolution.
#[derive(Debug, Clone)]
pub struct SitemapOptions {
    /// Timeout for each sitemap document fetch
    pub fetch_timeout: Duration,
    /// Timeout for the robots.txt fetch during discovery
    pub robots_timeout: Duration,
    /// How many levels of sitemap indexes to follow (0 = fetch nothing)
    pub max_depth: usize,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            robots_timeout: Duration::from_secs(10),
            max_depth: 3,
        }
    }
}

impl SitemapOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}
