// src/sitemap/resolve.rs
// =============================================================================
// Walks a sitemap tree and flattens it into one list of pages.
//
// For each sitemap URL:
//   1. already visited, or out of depth?  -> nothing (this is not an error)
//   2. mark it visited
//   3. fetch + parse; on failure record "<url>: <cause>" and stop here
//   4. record a SitemapNode for the document
//   5. Index  -> resolve every child with depth - 1, in listed order
//      UrlSet -> append its entries
//
// The walk is depth-first and sequential: one fetch in flight at a time.
// That keeps the visited set a plain &mut HashSet with no locking, and makes
// the output order follow the order sitemaps list their children.
//
// Entries are NOT deduplicated. A page listed in two leaf sitemaps appears
// twice, so `entries.len()` is the raw count across all sitemaps.
// =============================================================================

use super::fetch::{SitemapDocument, SitemapEntry, SitemapFetcher, SitemapNode};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Sitemap URLs already fetched during one top-level resolution.
pub type VisitedSet = HashSet<String>;

/// Everything collected while walking a sitemap tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// One node per successfully parsed document, in walk order
    pub nodes: Vec<SitemapNode>,
    /// Page entries from every leaf sitemap, duplicates included
    pub entries: Vec<SitemapEntry>,
    /// "<url>: <cause>" for every sitemap that could not be loaded
    pub errors: Vec<String>,
}

impl ResolutionResult {
    /// True when not a single sitemap document was parsed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn append(&mut self, mut other: ResolutionResult) {
        self.nodes.append(&mut other.nodes);
        self.entries.append(&mut other.entries);
        self.errors.append(&mut other.errors);
    }
}

// Resolves a sitemap tree starting from a fresh visited set
pub async fn resolve_sitemap(
    fetcher: &SitemapFetcher,
    root_url: &str,
    max_depth: usize,
) -> ResolutionResult {
    let mut visited = VisitedSet::new();
    resolve(fetcher, root_url, max_depth, &mut visited).await
}

// Resolves one sitemap and (for indexes) everything below it
//
// `visited` is shared by the whole walk; pass the same set to every call that
// belongs to one resolution, and a new one for an unrelated resolution.
//
// Returns a boxed future because the function calls itself.
pub fn resolve<'a>(
    fetcher: &'a SitemapFetcher,
    root_url: &'a str,
    max_depth: usize,
    visited: &'a mut VisitedSet,
) -> BoxFuture<'a, ResolutionResult> {
    async move {
        let mut result = ResolutionResult::default();

        if max_depth == 0 || visited.contains(root_url) {
            debug!(root_url, max_depth, "skipping sitemap (visited or out of depth)");
            return result;
        }
        visited.insert(root_url.to_string());

        let document = match fetcher.fetch_and_parse(root_url).await {
            Ok(document) => document,
            Err(e) => {
                warn!(root_url, error = %e, "sitemap could not be loaded");
                result.errors.push(format!("{}: {}", root_url, e.cause()));
                return result;
            }
        };

        debug!(
            root_url,
            kind = ?document.kind(),
            children = document.child_count(),
            "sitemap parsed"
        );
        result.nodes.push(SitemapNode {
            url: root_url.to_string(),
            kind: document.kind(),
            child_count: document.child_count(),
        });

        match document {
            SitemapDocument::Index(pointers) => {
                for pointer in &pointers {
                    let child = resolve(fetcher, &pointer.url, max_depth - 1, &mut *visited).await;
                    result.append(child);
                }
            }
            SitemapDocument::UrlSet(entries) => result.entries.extend(entries),
        }

        result
    }
    .boxed()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BoxFuture?
//    - An async fn that calls itself would have an infinitely large future
//      type (the future contains itself)
//    - Boxing the future gives it a fixed size: a pointer to the heap
//    - .boxed() from FutureExt does the Box::pin for us
//
// 2. Why &mut VisitedSet instead of a global?
//    - Each top-level resolution gets its own set, so two resolutions running
//      at the same time can never see each other's URLs
//    - &mut *visited "reborrows" the set for the recursive call, and we get
//      it back as soon as that call finishes
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::SitemapKind;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn index_xml(children: &[String]) -> String {
        let mut xml = String::from(r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        for child in children {
            xml.push_str(&format!("<sitemap><loc>{}</loc></sitemap>", child));
        }
        xml.push_str("</sitemapindex>");
        xml
    }

    fn urlset_xml(pages: &[&str]) -> String {
        let mut xml = String::from(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        for page in pages {
            xml.push_str(&format!("<url><loc>{}</loc><lastmod>2024-01-01</lastmod></url>", page));
        }
        xml.push_str("</urlset>");
        xml
    }

    // Serves `body` at `route` and asserts it is fetched exactly `times` times
    async fn serve(server: &MockServer, route: &str, body: String, times: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(times)
            .mount(server)
            .await;
    }

    fn fetcher() -> SitemapFetcher {
        SitemapFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_zero_depth_fetches_nothing() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/sitemap.xml", urlset_xml(&["https://example.com/"]), 0).await;

        let result = resolve_sitemap(&fetcher(), &format!("{}/sitemap.xml", mock_server.uri()), 0).await;

        assert_eq!(result, ResolutionResult::default());
    }

    #[tokio::test]
    async fn test_visited_url_is_skipped() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/sitemap.xml", urlset_xml(&["https://example.com/"]), 0).await;

        let url = format!("{}/sitemap.xml", mock_server.uri());
        let mut visited = VisitedSet::new();
        visited.insert(url.clone());

        let result = resolve(&fetcher(), &url, 3, &mut visited).await;
        assert!(result.is_empty());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_shared_child_is_fetched_once() {
        // A -> {B, C}, B -> {D}, C -> {D}
        let mock_server = MockServer::start().await;
        let base = mock_server.uri();
        let d = format!("{}/d.xml", base);

        serve(
            &mock_server,
            "/a.xml",
            index_xml(&[format!("{}/b.xml", base), format!("{}/c.xml", base)]),
            1,
        )
        .await;
        serve(&mock_server, "/b.xml", index_xml(&[d.clone()]), 1).await;
        serve(&mock_server, "/c.xml", index_xml(&[d.clone()]), 1).await;
        serve(&mock_server, "/d.xml", urlset_xml(&["https://example.com/page"]), 1).await;

        let result = resolve_sitemap(&fetcher(), &format!("{}/a.xml", base), 5).await;

        let urls: Vec<&str> = result.nodes.iter().map(|n| n.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                format!("{}/a.xml", base),
                format!("{}/b.xml", base),
                d.clone(),
                format!("{}/c.xml", base),
            ]
        );
        assert_eq!(result.entries.len(), 1);
        assert!(result.errors.is_empty());
        // MockServer verifies the .expect(1) counts when it is dropped
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let mock_server = MockServer::start().await;
        let base = mock_server.uri();

        serve(&mock_server, "/a.xml", index_xml(&[format!("{}/b.xml", base)]), 1).await;
        serve(&mock_server, "/b.xml", index_xml(&[format!("{}/a.xml", base)]), 1).await;

        let result = resolve_sitemap(&fetcher(), &format!("{}/a.xml", base), 10).await;

        assert_eq!(result.nodes.len(), 2);
        assert!(result.entries.is_empty());
    }

    #[tokio::test]
    async fn test_depth_limit_stops_descent() {
        let mock_server = MockServer::start().await;
        let base = mock_server.uri();

        serve(&mock_server, "/a.xml", index_xml(&[format!("{}/b.xml", base)]), 1).await;
        serve(&mock_server, "/b.xml", index_xml(&[format!("{}/c.xml", base)]), 1).await;
        serve(&mock_server, "/c.xml", urlset_xml(&["https://example.com/deep"]), 0).await;

        let result = resolve_sitemap(&fetcher(), &format!("{}/a.xml", base), 2).await;

        assert_eq!(result.nodes.len(), 2);
        assert!(result.entries.is_empty());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failed_child_does_not_stop_siblings() {
        let mock_server = MockServer::start().await;
        let base = mock_server.uri();
        let broken = format!("{}/broken.xml", base);

        serve(
            &mock_server,
            "/index.xml",
            index_xml(&[broken.clone(), format!("{}/ok.xml", base)]),
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/broken.xml"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        serve(&mock_server, "/ok.xml", urlset_xml(&["https://example.com/1", "https://example.com/2"]), 1).await;

        let result = resolve_sitemap(&fetcher(), &format!("{}/index.xml", base), 3).await;

        assert_eq!(result.errors, vec![format!("{}: HTTP 500", broken)]);
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.nodes[1].kind, SitemapKind::UrlSet);
        assert_eq!(result.nodes[1].child_count, 2);
        assert_eq!(result.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_entries_across_leaves_are_kept() {
        let mock_server = MockServer::start().await;
        let base = mock_server.uri();

        serve(
            &mock_server,
            "/index.xml",
            index_xml(&[format!("{}/one.xml", base), format!("{}/two.xml", base)]),
            1,
        )
        .await;
        serve(&mock_server, "/one.xml", urlset_xml(&["https://example.com/shared"]), 1).await;
        serve(&mock_server, "/two.xml", urlset_xml(&["https://example.com/shared"]), 1).await;

        let result = resolve_sitemap(&fetcher(), &format!("{}/index.xml", base), 3).await;

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].url, result.entries[1].url);
    }
}
