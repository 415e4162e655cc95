//! Rendering backends
//!
//! This module defines the capability contract every backend satisfies, the
//! continuation bridge and wait state machine the backends are built from,
//! and the two concrete backends: a Chromium renderer and an HTTP fetcher.

pub mod backend;
pub mod bridge;
pub mod config;
pub mod fetcher;
pub mod renderer;
pub mod select;
pub mod stealth;
pub mod wait;

pub use backend::{Backend, BackendKind, EngineState, PostAction, Snapshot, NAVIGATION_GRACE};
pub use bridge::{Completion, CompletionToken};
pub use config::{BackendConfig, BackendConfigBuilder};
pub use fetcher::HttpBackend;
pub use renderer::RendererBackend;
pub use select::select_backend;
pub use wait::{LoadState, Probe, Waiter, POLL_INTERVAL};
