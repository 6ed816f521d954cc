// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Every href is passed through the link classifier (classify.rs), so each
// link comes out absolute and tagged internal/external.
//
// Both <a href> and <link href> are collected: a dead stylesheet, favicon or
// canonical URL is as much a broken link as a dead anchor.
// =============================================================================

use super::classify::{classify, ClassifiedLink};
use scraper::{Html, Selector};

// Extracts all checkable links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the page (for resolving relative links)
//
// Returns: links in document order (duplicates included; the caller dedups)
pub fn extract_page_links(html: &str, base_url: &str) -> Vec<ClassifiedLink> {
    let document = Html::parse_document(html);

    // Constant selector, known to be valid
    let selector = Selector::parse("a[href], link[href]").unwrap();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !is_skipped_href(href))
        .filter_map(|href| classify(base_url, href))
        .filter(|link| is_checkable_link(&link.absolute_url))
        .collect()
}

// Hrefs that point somewhere we cannot probe with HTTP
fn is_skipped_href(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
}

// Only HTTP/HTTPS links are probed
fn is_checkable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(links: &[ClassifiedLink]) -> Vec<&str> {
        links.iter().map(|l| l.absolute_url.as_str()).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_page_links(html, "https://example.com");
        assert_eq!(urls(&links), vec!["https://www.rust-lang.org/"]);
        assert!(!links[0].is_internal);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_page_links(html, "https://example.com/page");
        assert_eq!(urls(&links), vec!["https://example.com/docs"]);
        assert!(links[0].is_internal);
    }

    #[test]
    fn test_link_tags_are_included() {
        let html = r#"
            <head><link rel="stylesheet" href="/style.css"></head>
            <body><a href="/home">Home</a></body>
        "#;
        let links = extract_page_links(html, "https://example.com/");
        assert_eq!(
            urls(&links),
            vec!["https://example.com/style.css", "https://example.com/home"]
        );
    }

    #[test]
    fn test_skip_non_http_and_empty() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+123">Call</a>
            <a href="javascript:void(0)">JS</a>
            <a href="#top">Top</a>
            <a href="   ">Blank</a>
            <a href="">Empty</a>
        "##;
        let links = extract_page_links(html, "https://example.com");
        assert!(links.is_empty());
    }
}
