// src/sitemap/xml.rs
// =============================================================================
// A tiny element tree for sitemap documents, built with quick-xml.
//
// Real-world sitemaps are messy. Some declare the standard namespace, some
// declare none, some use a "sitemap:" prefix they never declare, and some use
// a different namespace URI entirely. We deal with that in two layers:
//
// 1. Two parsing passes
//    - parse_strict(): namespace-aware. An element with an undeclared prefix
//      is an error, like any other malformed XML.
//    - strip_namespace_declarations() + parse_tolerant(): remove the
//      xmlns="..." and xmlns:sitemap="..." declarations from the raw bytes and
//      parse again, this time ignoring prefixes and namespaces altogether.
//
// 2. Tolerant lookups
//    children_named("url") first looks for <url> in the standard sitemap
//    namespace, and only if there are none falls back to un-namespaced <url>.
// =============================================================================

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// The namespace every sitemap is supposed to declare.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Resolved namespace URI; always None for tolerant parses
    pub namespace: Option<String>,
    /// Local name, without any prefix
    pub name: String,
    /// Concatenated text and CDATA directly inside this element
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Direct children called `name`, namespaced matches preferred.
    pub fn children_named(&self, name: &str) -> Vec<&XmlElement> {
        let namespaced: Vec<&XmlElement> = self
            .children
            .iter()
            .filter(|c| c.name == name && c.namespace.as_deref() == Some(SITEMAP_NS))
            .collect();
        if !namespaced.is_empty() {
            return namespaced;
        }

        self.children
            .iter()
            .filter(|c| c.name == name && c.namespace.is_none())
            .collect()
    }

    /// Trimmed text of the first child called `name`, None when missing or blank.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.children_named(name)
            .first()
            .map(|c| c.text.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Namespace-aware parse. Undeclared prefixes are errors.
pub fn parse_strict(raw: &[u8]) -> Result<XmlElement, String> {
    build_tree(raw, true)
}

/// Parse that ignores namespaces and prefixes entirely.
///
/// Meant to run on the output of `strip_namespace_declarations`.
pub fn parse_tolerant(raw: &[u8]) -> Result<XmlElement, String> {
    build_tree(raw, false)
}

/// Removes `xmlns="..."` and `xmlns:sitemap="..."` attributes from raw XML.
///
/// Other prefixed declarations (xmlns:xsi, xmlns:image, ...) are left alone.
pub fn strip_namespace_declarations(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        // A declaration is always preceded by whitespace inside a start tag;
        // the whitespace goes along with it
        if raw[i].is_ascii_whitespace() {
            if let Some(end) = declaration_end(raw, i + 1) {
                i = end;
                continue;
            }
        }
        out.push(raw[i]);
        i += 1;
    }

    out
}

// If a namespace declaration starts at `start`, returns the index just past
// its closing quote
fn declaration_end(raw: &[u8], start: usize) -> Option<usize> {
    let rest = raw.get(start..)?;
    let after_name = if rest.starts_with(b"xmlns:sitemap") {
        start + "xmlns:sitemap".len()
    } else if rest.starts_with(b"xmlns") {
        start + "xmlns".len()
    } else {
        return None;
    };

    let mut i = skip_whitespace(raw, after_name);
    if raw.get(i) != Some(&b'=') {
        return None;
    }
    i = skip_whitespace(raw, i + 1);

    let quote = *raw.get(i)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let close = raw[i + 1..].iter().position(|&b| b == quote)?;
    Some(i + 1 + close + 1)
}

fn skip_whitespace(raw: &[u8], mut i: usize) -> usize {
    while raw.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

fn build_tree(raw: &[u8], strict: bool) -> Result<XmlElement, String> {
    let mut reader = NsReader::from_reader(raw);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                stack.push(new_element(ns, &e, strict)?);
            }
            Ok((ns, Event::Empty(e))) => {
                let element = new_element(ns, &e, strict)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok((_, Event::End(_))) => {
                // quick-xml already checked that the end tag matches
                let element = stack.pop().ok_or("unexpected closing tag")?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok((_, Event::Text(t))) => {
                if let Some(current) = stack.last_mut() {
                    match t.unescape() {
                        Ok(text) => current.text.push_str(&text),
                        Err(e) if strict => return Err(format!("invalid text: {}", e)),
                        Err(_) => current.text.push_str(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Ok((_, Event::CData(c))) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok((_, Event::Eof)) => break,
            // Declarations, comments, processing instructions, doctypes
            Ok(_) => {}
            Err(e) => return Err(format!("XML parse error: {}", e)),
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(format!("unexpected end of document inside <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn new_element(ns: ResolveResult<'_>, start: &BytesStart, strict: bool) -> Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let namespace = match ns {
        _ if !strict => None,
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(format!(
                "undeclared namespace prefix '{}' on <{}>",
                String::from_utf8_lossy(&prefix),
                name
            ))
        }
    };

    Ok(XmlElement {
        namespace,
        name,
        ..XmlElement::default()
    })
}

// Hangs a finished element under its parent, or makes it the root
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("more than one root element (<{}>)", element.name)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/a</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://example.com/b</loc></url>
</urlset>"#;

    #[test]
    fn test_strict_parse_resolves_default_namespace() {
        let root = parse_strict(NAMESPACED.as_bytes()).unwrap();
        assert_eq!(root.name, "urlset");
        assert_eq!(root.namespace.as_deref(), Some(SITEMAP_NS));

        let urls = root.children_named("url");
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].child_text("loc").as_deref(), Some("https://example.com/a"));
        assert_eq!(urls[0].child_text("lastmod").as_deref(), Some("2024-01-01"));
        assert_eq!(urls[1].child_text("lastmod"), None);
    }

    #[test]
    fn test_lookup_falls_back_to_unnamespaced_children() {
        let xml = "<urlset><url><loc> https://example.com/x </loc></url></urlset>";
        let root = parse_strict(xml.as_bytes()).unwrap();
        let urls = root.children_named("url");
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].child_text("loc").as_deref(), Some("https://example.com/x"));
    }

    #[test]
    fn test_other_namespaces_are_not_matched() {
        let xml = r#"<urlset xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
            <url><loc>https://example.com/</loc><image:image><image:loc>https://example.com/i.png</image:loc></image:image></url>
        </urlset>"#;
        let root = parse_strict(xml.as_bytes()).unwrap();
        let url = root.children_named("url")[0];
        assert_eq!(url.child_text("loc").as_deref(), Some("https://example.com/"));
        assert!(url.children_named("image").is_empty());
    }

    #[test]
    fn test_undeclared_prefix_fails_strict_but_not_tolerant() {
        let xml = "<sitemap:urlset><sitemap:url><sitemap:loc>https://example.com/</sitemap:loc></sitemap:url></sitemap:urlset>";
        assert!(parse_strict(xml.as_bytes()).is_err());

        let root = parse_tolerant(xml.as_bytes()).unwrap();
        assert_eq!(root.name, "urlset");
        assert_eq!(root.children_named("url").len(), 1);
    }

    #[test]
    fn test_strip_namespace_declarations() {
        let xml = br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:sitemap='http://www.sitemaps.org/schemas/sitemap/0.9' xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><sitemap/></sitemapindex>"#;
        let stripped = String::from_utf8(strip_namespace_declarations(xml)).unwrap();
        assert_eq!(
            stripped,
            r#"<sitemapindex xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><sitemap/></sitemapindex>"#
        );
    }

    #[test]
    fn test_strip_is_a_no_op_without_declarations() {
        let xml = b"<urlset><url><loc>https://example.com/</loc></url></urlset>";
        assert_eq!(strip_namespace_declarations(xml), xml.to_vec());
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(parse_strict(b"<urlset><url></urlset>").is_err());
        assert!(parse_strict(b"<urlset><url>").is_err());
        assert!(parse_strict(b"just some text").is_err());
        assert!(parse_strict(b"").is_err());
    }

    #[test]
    fn test_cdata_text_is_kept() {
        let xml = "<urlset><url><loc><![CDATA[https://example.com/?a=1&b=2]]></loc></url></urlset>";
        let root = parse_strict(xml.as_bytes()).unwrap();
        assert_eq!(
            root.children_named("url")[0].child_text("loc").as_deref(),
            Some("https://example.com/?a=1&b=2")
        );
    }
}
