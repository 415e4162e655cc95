//! Link extraction
//!
//! Collects `<a href>` elements from a [`Page`], resolving relative targets
//! against the page's final URL.

use crate::extraction::page::{collapse_whitespace, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// Type of link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Same host as the page
    Internal,
    /// Different host
    External,
    /// Fragment on the same page
    Anchor,
    /// mailto: link
    Email,
    /// tel: link
    Phone,
    /// javascript: link
    JavaScript,
    /// Anything unparseable
    Other,
}

/// An extracted link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    /// Resolved target
    pub url: String,
    /// Link text
    pub text: String,
    /// Title attribute
    pub title: Option<String>,
    /// Classification
    pub link_type: LinkType,
    /// Rel attribute
    pub rel: Option<String>,
    /// Opens in a new tab
    pub new_tab: bool,
    /// Order in the document
    pub position: usize,
}

/// Resolve `href` against `base` and classify it
pub fn classify(href: &str, base: Option<&Url>) -> (String, LinkType) {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();

    if href.starts_with('#') {
        return (href.to_string(), LinkType::Anchor);
    }
    if lower.starts_with("mailto:") {
        return (href.to_string(), LinkType::Email);
    }
    if lower.starts_with("tel:") {
        return (href.to_string(), LinkType::Phone);
    }
    if lower.starts_with("javascript:") {
        return (href.to_string(), LinkType::JavaScript);
    }

    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    match resolved {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let same_host = base.is_some_and(|b| b.host_str() == url.host_str());
            let kind = if same_host {
                LinkType::Internal
            } else {
                LinkType::External
            };
            (url.to_string(), kind)
        }
        Ok(url) => (url.to_string(), LinkType::Other),
        Err(_) => (href.to_string(), LinkType::Other),
    }
}

/// Link extraction functionality
pub struct LinkExtractor;

impl LinkExtractor {
    /// Extract all links from the page
    #[instrument(skip(page))]
    pub fn extract_all(page: &Page) -> Vec<ExtractedLink> {
        let base = page.final_url();
        let links: Vec<ExtractedLink> = page
            .elements()
            .filter(|el| el.value().name() == "a")
            .filter_map(|el| {
                let href = el.value().attr("href")?;
                Some((el, href))
            })
            .enumerate()
            .map(|(position, (el, href))| {
                let (url, link_type) = classify(href, base);
                ExtractedLink {
                    url,
                    text: collapse_whitespace(&el.text().collect::<String>()),
                    title: el.value().attr("title").map(String::from),
                    link_type,
                    rel: el.value().attr("rel").map(String::from),
                    new_tab: el.value().attr("target") == Some("_blank"),
                    position,
                }
            })
            .collect();

        debug!("Extracted {} links", links.len());
        links
    }

    /// Extract only links to other hosts
    pub fn extract_external(page: &Page) -> Vec<ExtractedLink> {
        Self::extract_of_type(page, LinkType::External)
    }

    /// Extract only links to the page's own host
    pub fn extract_internal(page: &Page) -> Vec<ExtractedLink> {
        Self::extract_of_type(page, LinkType::Internal)
    }

    fn extract_of_type(page: &Page, link_type: LinkType) -> Vec<ExtractedLink> {
        Self::extract_all(page)
            .into_iter()
            .filter(|l| l.link_type == link_type)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/index.html").unwrap()
    }

    #[test]
    fn test_classify_relative_is_internal() {
        let (url, kind) = classify("guide.html", Some(&base()));
        assert_eq!(url, "https://example.com/docs/guide.html");
        assert_eq!(kind, LinkType::Internal);
    }

    #[test]
    fn test_classify_other_host_is_external() {
        let (url, kind) = classify("https://rust-lang.org/", Some(&base()));
        assert_eq!(url, "https://rust-lang.org/");
        assert_eq!(kind, LinkType::External);
    }

    #[test]
    fn test_classify_special_schemes() {
        assert_eq!(classify("#top", Some(&base())).1, LinkType::Anchor);
        assert_eq!(classify("mailto:a@b.c", None).1, LinkType::Email);
        assert_eq!(classify("TEL:+123", None).1, LinkType::Phone);
        assert_eq!(classify("javascript:void(0)", None).1, LinkType::JavaScript);
        assert_eq!(classify("ftp://files.example.com/x", None).1, LinkType::Other);
        assert_eq!(classify("relative/without/base", None).1, LinkType::Other);
    }

    #[test]
    fn test_extract_all() {
        let html = r#"
            <a href="/a" title="First">A  link</a>
            <a name="no-href">skip me</a>
            <a href="https://other.org/" target="_blank" rel="nofollow">B</a>
        "#;
        let page = Page::parse(html.as_bytes().to_vec(), Some(base()));
        let links = LinkExtractor::extract_all(&page);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://example.com/a");
        assert_eq!(links[0].text, "A link");
        assert_eq!(links[0].title.as_deref(), Some("First"));
        assert_eq!(links[0].position, 0);
        assert_eq!(links[1].link_type, LinkType::External);
        assert!(links[1].new_tab);
        assert_eq!(links[1].rel.as_deref(), Some("nofollow"));
        assert_eq!(links[1].position, 1);

        assert_eq!(LinkExtractor::extract_internal(&page).len(), 1);
        assert_eq!(LinkExtractor::extract_external(&page).len(), 1);
    }

    #[test]
    fn test_link_type_serialization() {
        assert_eq!(serde_json::to_string(&LinkType::External).unwrap(), "\"external\"");
        assert_eq!(serde_json::to_string(&LinkType::JavaScript).unwrap(), "\"javascript\"");
    }
}
