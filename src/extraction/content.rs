//! Main content extraction
//!
//! Pulls readable text out of a captured [`Page`], preferring an article or
//! main region over the whole body.

use crate::error::{ExtractionError, Result};
use crate::extraction::page::{parse_selector, readable_text, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Regions tried in order before falling back to `<body>`
const MAIN_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "#content",
    "#main-content",
    ".entry-content",
    ".post-content",
    ".content",
];

/// A region only counts as main content past this many characters
const MIN_MAIN_CHARS: usize = 200;

/// Extracted content from a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Readable text, one line per block
    pub text: String,
    /// Markup of the chosen region
    pub html: String,
    /// Word count
    pub word_count: usize,
    /// Character count
    pub char_count: usize,
    /// Whether the text came from an article/main region
    pub from_main: bool,
}

impl ExtractedContent {
    fn new(text: String, html: String, from_main: bool) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
            text,
            html,
            from_main,
        }
    }
}

/// Content extraction functionality
pub struct ContentExtractor;

impl ContentExtractor {
    /// Extract the main readable content
    #[instrument(skip(page))]
    pub fn extract_main_content(page: &Page) -> Result<ExtractedContent> {
        for css in MAIN_SELECTORS {
            let selector = parse_selector(css)?;
            if let Some(el) = page.document().select(&selector).next() {
                let text = readable_text(el);
                if text.chars().count() >= MIN_MAIN_CHARS {
                    debug!("Main content found under {}", css);
                    return Ok(ExtractedContent::new(text, el.inner_html(), true));
                }
            }
        }

        let body = parse_selector("body")?;
        let content = match page.document().select(&body).next() {
            Some(el) => ExtractedContent::new(readable_text(el), el.inner_html(), false),
            None => ExtractedContent::new(String::new(), String::new(), false),
        };
        debug!("Falling back to body: {} words", content.word_count);
        Ok(content)
    }

    /// Extract content under the first element matching `css`
    #[instrument(skip(page))]
    pub fn extract_from_selector(page: &Page, css: &str) -> Result<ExtractedContent> {
        let selector = parse_selector(css)?;
        let el = page
            .document()
            .select(&selector)
            .next()
            .ok_or_else(|| ExtractionError::ElementNotFound(css.to_string()))?;
        Ok(ExtractedContent::new(readable_text(el), el.inner_html(), false))
    }

    /// Readable text of the whole document
    pub fn extract_all_text(page: &Page) -> String {
        readable_text(page.document().root_element())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Page {
        Page::parse(html.as_bytes().to_vec(), None)
    }

    #[test]
    fn test_prefers_long_article() {
        let body = "Rust ownership keeps memory safe. ".repeat(10);
        let html = format!(
            "<body><nav>Menu</nav><article><p>{}</p></article><footer>Foot</footer></body>",
            body
        );
        let content = ContentExtractor::extract_main_content(&page(&html)).unwrap();
        assert!(content.from_main);
        assert!(!content.text.contains("Menu"));
        assert_eq!(content.word_count, 50);
    }

    #[test]
    fn test_short_article_falls_back_to_body() {
        let html = "<body><article>Tiny</article><p>Other text</p></body>";
        let content = ContentExtractor::extract_main_content(&page(html)).unwrap();
        assert!(!content.from_main);
        assert!(content.text.contains("Tiny"));
        assert!(content.text.contains("Other text"));
    }

    #[test]
    fn test_extract_from_selector() {
        let html = "<div id='a'><p>One</p><p>Two</p></div>";
        let content = ContentExtractor::extract_from_selector(&page(html), "#a").unwrap();
        assert_eq!(content.text, "One\nTwo");
        assert_eq!(content.char_count, 7);
    }

    #[test]
    fn test_extract_from_missing_selector() {
        let err = ContentExtractor::extract_from_selector(&page("<p>x</p>"), "#nope").unwrap_err();
        assert!(err.to_string().contains("Element not found"));
    }

    #[test]
    fn test_extract_all_text_skips_script() {
        let html = "<p>Visible</p><script>secret()</script><style>.x{}</style>";
        assert_eq!(ContentExtractor::extract_all_text(&page(html)), "Visible");
    }
}
