//! Pagedrive - Uniform Async Control Layer for Headless Pages
//!
//! This crate drives a web page through one asynchronous action pipeline
//! (navigate, run script, wait for a condition, extract content) while the
//! rendering itself is delegated to an interchangeable backend.
//!
//! # Features
//!
//! - **Backend contract**: four operations every backend implements the same way
//! - **Renderer backend**: headless Chromium via ChromiumOxide (CDP)
//! - **HTTP backend**: reqwest fetcher for hosts without a browser
//! - **Wait primitives**: page load, script predicate, selector, quiet period
//! - **Extraction**: parsed page model with selector queries, content, links, metadata
//!
//! # Architecture
//!
//! ```text
//! Caller ──▶ ActionPipeline ──▶ dyn Backend ──┬──▶ RendererBackend (CDP)
//!               │                  │          └──▶ HttpBackend (reqwest)
//!               │                  ▼
//!               │            Waiter + Completion
//!               ▼
//!             Page ──▶ Content / Links / Metadata
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagedrive::browser::{BackendConfig, BackendKind, PostAction};
//! use pagedrive::ActionPipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BackendConfig::builder().timeout_secs(10.0).build()?;
//!     let mut pipeline = ActionPipeline::launch(config, BackendKind::Auto).await?;
//!
//!     let url = "https://example.com".parse()?;
//!     let page = pipeline.open(&url, PostAction::wait(1.0)).await?;
//!     println!("{:?}", page.title());
//!
//!     pipeline.close().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod error;
pub mod extraction;
pub mod pipeline;

// Re-exports for convenience
pub use browser::{Backend, BackendConfig, BackendKind, PostAction};
pub use error::{ActionError, ActionResult, Error, Result};
pub use extraction::{ContentExtractor, LinkExtractor, MetadataExtractor, Page};
pub use pipeline::{Action, ActionPipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
