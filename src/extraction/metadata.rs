//! Page metadata extraction
//!
//! Title, description, canonical URL, language and Open Graph data, read
//! from the parsed `<head>` of a [`Page`].

use crate::extraction::page::Page;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Extracted page metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page title
    pub title: Option<String>,
    /// Meta description
    pub description: Option<String>,
    /// Canonical URL
    pub canonical: Option<String>,
    /// Document language
    pub language: Option<String>,
    /// Author
    pub author: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// Open Graph metadata
    pub open_graph: OpenGraphData,
    /// Every named meta tag, keyed by name or property
    pub meta_tags: BTreeMap<String, String>,
}

/// Open Graph metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraphData {
    /// og:title
    pub title: Option<String>,
    /// og:description
    pub description: Option<String>,
    /// og:image
    pub image: Option<String>,
    /// og:url
    pub url: Option<String>,
    /// og:type
    pub og_type: Option<String>,
    /// og:site_name
    pub site_name: Option<String>,
}

/// Metadata extraction functionality
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract metadata from the page
    #[instrument(skip(page))]
    pub fn extract(page: &Page) -> PageMetadata {
        let mut meta_tags = BTreeMap::new();
        let mut canonical = None;
        let mut language = None;

        for el in page.elements() {
            let value = el.value();
            match value.name() {
                "html" => language = value.attr("lang").map(String::from),
                "meta" => {
                    let key = value.attr("name").or_else(|| value.attr("property"));
                    if let (Some(key), Some(content)) = (key, value.attr("content")) {
                        meta_tags
                            .entry(key.to_ascii_lowercase())
                            .or_insert_with(|| content.trim().to_string());
                    }
                }
                "link" if canonical.is_none() => {
                    let is_canonical = value.attr("rel").is_some_and(|rel| {
                        rel.split_whitespace()
                            .any(|r| r.eq_ignore_ascii_case("canonical"))
                    });
                    if is_canonical {
                        canonical = value.attr("href").map(String::from);
                    }
                }
                _ => {}
            }
        }

        let get = |key: &str| meta_tags.get(key).cloned();
        let open_graph = OpenGraphData {
            title: get("og:title"),
            description: get("og:description"),
            image: get("og:image"),
            url: get("og:url"),
            og_type: get("og:type"),
            site_name: get("og:site_name"),
        };
        let keywords = get("keywords")
            .map(|k| {
                k.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        PageMetadata {
            title: page.title().or_else(|| open_graph.title.clone()),
            description: get("description").or_else(|| open_graph.description.clone()),
            canonical,
            language,
            author: get("author"),
            keywords,
            open_graph,
            meta_tags,
        }
    }
}
