//! Backend selection
//!
//! The only place that names concrete backends. Everything downstream holds a
//! `Box<dyn Backend>`.

use crate::browser::backend::{Backend, BackendKind};
use crate::browser::config::BackendConfig;
use crate::browser::fetcher::HttpBackend;
use crate::browser::renderer::RendererBackend;
use crate::error::Result;
use tracing::{info, instrument, warn};

/// Construct the backend `kind` asks for.
///
/// [`BackendKind::Auto`] tries to launch the renderer and falls back to the
/// HTTP fetcher when no browser can be started on this host.
#[instrument(skip(config))]
pub async fn select_backend(config: BackendConfig, kind: BackendKind) -> Result<Box<dyn Backend>> {
    config.validate()?;

    match kind {
        BackendKind::Renderer => Ok(Box::new(RendererBackend::launch(config).await?)),
        BackendKind::HttpOnly => Ok(Box::new(HttpBackend::new(config)?)),
        BackendKind::Auto => match RendererBackend::launch(config.clone()).await {
            Ok(renderer) => {
                info!("Selected renderer backend");
                Ok(Box::new(renderer))
            }
            Err(e) => {
                warn!("Renderer unavailable ({}), falling back to HTTP fetcher", e);
                Ok(Box::new(HttpBackend::new(config)?))
            }
        },
    }
}
