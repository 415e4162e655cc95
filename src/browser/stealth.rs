//! Anti-detection scripts for renderer pages
//!
//! Applied once per page, before the first navigation, when
//! [`BackendConfig::stealth`](crate::browser::BackendConfig) is set. The
//! scripts run on every new document the page loads.

use crate::error::{BrowserError, Result};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use tracing::{debug, instrument};

/// Named evasion snippets, in injection order
const EVASIONS: &[(&str, &str)] = &[
    (
        "webdriver",
        "Object.defineProperty(navigator, 'webdriver', { get: () => undefined, configurable: true });",
    ),
    (
        "chrome.runtime",
        "window.chrome = window.chrome || {}; \
         window.chrome.runtime = window.chrome.runtime || { connect() {}, sendMessage() {} };",
    ),
    (
        "languages",
        "Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'], configurable: true });",
    ),
    (
        "plugins",
        "Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3], configurable: true });",
    ),
];

/// Names of the evasions [`stealth_script`] bundles
pub fn evasion_names() -> impl Iterator<Item = &'static str> {
    EVASIONS.iter().map(|(name, _)| *name)
}

/// Build the combined script, each evasion isolated in its own try block
pub fn stealth_script(user_agent: &str) -> String {
    let mut script = String::new();
    for (name, body) in EVASIONS {
        script.push_str(&format!("/* {} */ try {{ {} }} catch (_) {{}}\n", name, body));
    }
    // Headless Chrome advertises itself in navigator.userAgent even when the
    // request header is overridden.
    let literal = serde_json::to_string(user_agent).unwrap_or_else(|_| "\"\"".to_string());
    script.push_str(&format!(
        "/* userAgent */ try {{ Object.defineProperty(navigator, 'userAgent', {{ get: () => {}, configurable: true }}); }} catch (_) {{}}\n",
        literal
    ));
    script
}

/// Install the evasions on `page`
#[instrument(skip(page))]
pub async fn apply(page: &Page, user_agent: &str) -> Result<()> {
    let params = AddScriptToEvaluateOnNewDocumentParams::builder()
        .source(stealth_script(user_agent))
        .build()
        .map_err(|e| BrowserError::PageCreationFailed(format!("stealth script params: {}", e)))?;

    page.execute(params)
        .await
        .map_err(|e| BrowserError::PageCreationFailed(format!("stealth injection: {}", e)))?;

    debug!("stealth evasions installed");
    Ok(())
}
