//! Pagedrive CLI
//!
//! Opens one URL through the action pipeline and prints a JSON report.

use anyhow::Context;
use clap::Parser;
use pagedrive::browser::{BackendConfig, BackendKind, PostAction};
use pagedrive::extraction::{ContentExtractor, Element, MetadataExtractor, PageMetadata};
use pagedrive::ActionPipeline;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Drive a headless page and report what it rendered
#[derive(Parser, Debug)]
#[command(name = "pagedrive")]
#[command(version)]
#[command(about = "Drive a headless page through a uniform action pipeline")]
struct Args {
    /// URL to open
    url: Url,

    /// Backend to use: renderer, http or auto
    #[arg(short, long, env = "PAGEDRIVE_BACKEND", default_value = "auto")]
    backend: BackendKind,

    /// Seconds to wait after the page settles
    #[arg(short, long, conflicts_with = "validate")]
    wait: Option<f64>,

    /// Script that must evaluate to true before capture
    #[arg(long)]
    validate: Option<String>,

    /// Navigating script to run after the page opens
    #[arg(short, long)]
    script: Option<String>,

    /// CSS selector whose matches are included in the report
    #[arg(long)]
    select: Option<String>,

    /// Timeout budget per operation, in seconds
    #[arg(short, long, env = "PAGEDRIVE_TIMEOUT", default_value = "30")]
    timeout: f64,

    /// User agent sent to remote servers
    #[arg(long, env = "PAGEDRIVE_USER_AGENT")]
    user_agent: Option<String>,

    /// Path to Chrome/Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Disable the Chromium sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// Inject anti-detection scripts
    #[arg(long)]
    stealth: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    backend: BackendKind,
    final_url: Option<String>,
    bytes: usize,
    words: usize,
    metadata: PageMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected: Option<Vec<Element>>,
}

impl Args {
    fn post_action(&self) -> PostAction {
        match (&self.validate, self.wait) {
            (Some(script), _) => PostAction::validate(script.clone()),
            (None, Some(secs)) => PostAction::wait(secs),
            (None, None) => PostAction::None,
        }
    }

    fn config(&self) -> pagedrive::Result<BackendConfig> {
        let mut builder = BackendConfig::builder()
            .timeout_secs(self.timeout)
            .headless(!self.headed)
            .sandbox(!self.no_sandbox)
            .stealth(self.stealth);
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_path(path.clone());
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.config().context("invalid configuration")?;
    let mut pipeline = ActionPipeline::launch(config, args.backend)
        .await
        .context("failed to start backend")?;

    let outcome = async {
        // The post-action belongs to the last step that loads a document.
        let page = match &args.script {
            Some(script) => {
                pipeline.open(&args.url, PostAction::None).await?;
                pipeline.execute_and_load(script, args.post_action()).await?
            }
            None => pipeline.open(&args.url, args.post_action()).await?,
        };
        Ok::<_, pagedrive::ActionError>(page)
    }
    .await;

    let backend = pipeline.kind();
    pipeline.close().await.context("failed to close backend")?;
    let page = outcome.with_context(|| format!("failed to load {}", args.url))?;

    let selected = match &args.select {
        Some(css) => Some(page.select(css).context("selector query failed")?),
        None => None,
    };
    let report = Report {
        backend,
        final_url: page.final_url().map(Url::to_string),
        bytes: page.raw().len(),
        words: ContentExtractor::extract_main_content(&page)?.word_count,
        metadata: MetadataExtractor::extract(&page),
        selected,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
