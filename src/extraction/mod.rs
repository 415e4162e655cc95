//! Content extraction module
//!
//! The page model the pipeline returns, plus content, link and metadata
//! extraction over its parsed tree.

pub mod content;
pub mod links;
pub mod metadata;
pub mod page;

pub use content::{ContentExtractor, ExtractedContent};
pub use links::{ExtractedLink, LinkExtractor, LinkType};
pub use metadata::{MetadataExtractor, OpenGraphData, PageMetadata};
pub use page::{Element, Page};
