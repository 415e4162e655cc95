//! Page model
//!
//! A [`Page`] is what the pipeline hands back: the raw bytes a backend
//! captured, the URL they resolved to, and the tree parsed from them.
//! Queries never touch the backend again.

use crate::browser::Snapshot;
use crate::error::{ExtractionError, Result};
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use url::Url;

/// Tags whose text is never part of the readable content
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Tags that end a line of readable text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "section", "article", "header", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote",
];

/// A matched node, detached from the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,
    /// Text content, whitespace collapsed
    pub text: String,
    /// Inner markup
    pub inner_html: String,
    /// Attributes by name
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub(crate) fn from_ref(el: ElementRef<'_>) -> Self {
        let attributes = el
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self {
            tag: el.value().name().to_string(),
            text: collapse_whitespace(&el.text().collect::<String>()),
            inner_html: el.inner_html(),
            attributes,
        }
    }

    /// Value of attribute `name`
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Captured document with a queryable tree
#[derive(Debug, Clone)]
pub struct Page {
    raw: Vec<u8>,
    final_url: Option<Url>,
    document: Html,
}

impl Page {
    /// Parse `raw` into a page
    pub fn parse(raw: Vec<u8>, final_url: Option<Url>) -> Self {
        let document = Html::parse_document(&String::from_utf8_lossy(&raw));
        Self {
            raw,
            final_url,
            document,
        }
    }

    /// Raw captured bytes
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Markup as text, with invalid UTF-8 replaced
    pub fn html(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    /// URL the document resolved to
    pub fn final_url(&self) -> Option<&Url> {
        self.final_url.as_ref()
    }

    /// The parsed tree
    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Every element in document order
    pub(crate) fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    /// Elements matching an arbitrary CSS selector
    pub fn select(&self, css: &str) -> Result<Vec<Element>> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).map(Element::from_ref).collect())
    }

    /// First element matching a CSS selector
    pub fn select_first(&self, css: &str) -> Result<Option<Element>> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).next().map(Element::from_ref))
    }

    /// Element whose `id` attribute is exactly `id`
    pub fn by_id(&self, id: &str) -> Option<Element> {
        self.elements()
            .find(|el| el.value().id() == Some(id))
            .map(Element::from_ref)
    }

    /// Elements carrying class `class`
    pub fn by_class(&self, class: &str) -> Vec<Element> {
        self.elements()
            .filter(|el| el.value().classes().any(|c| c == class))
            .map(Element::from_ref)
            .collect()
    }

    /// Elements whose `name` attribute is exactly `name`
    pub fn by_name(&self, name: &str) -> Vec<Element> {
        self.elements()
            .filter(|el| el.value().attr("name") == Some(name))
            .map(Element::from_ref)
            .collect()
    }

    /// Text of the `<title>` element
    pub fn title(&self) -> Option<String> {
        self.elements()
            .find(|el| el.value().name() == "title")
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|title| !title.is_empty())
    }
}

impl From<Snapshot> for Page {
    fn from(snapshot: Snapshot) -> Self {
        Page::parse(snapshot.content, snapshot.url)
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ExtractionError::InvalidSelector(format!("{}: {}", css, e)).into())
}

/// Collapse runs of whitespace into single spaces and trim
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Readable text under `el`: hidden tags skipped, one line per block
pub(crate) fn readable_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_readable(el, &mut raw);
    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_readable(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                if HIDDEN_TAGS.contains(&element.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_readable(child_el, out);
                }
                if BLOCK_TAGS.contains(&element.name()) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
