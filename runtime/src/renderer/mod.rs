//! Page-fetching seam between the scraper and a browser.
//!
//! Login and orchestration only see [`RenderContext`]; the Chromium
//! implementation lives in [`chromium`], and tests drive the same code
//! with an in-memory context.

pub mod chromium;
#[cfg(test)]
pub(crate) mod testing;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of a navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationResult {
    /// URL after redirects.
    pub final_url: String,
    /// Wall-clock time until the load event.
    pub load_time_ms: u64,
}

/// A single browser tab with its cookies and session state.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to `url` and wait for the page to load.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult>;

    /// Rendered HTML of the current page.
    async fn html(&self) -> Result<String>;

    /// Evaluate a JavaScript expression in the page.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;

    /// Type `text` into the first element matching `selector`.
    async fn type_into(&self, selector: &str, text: &str) -> Result<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Whether any element currently matches `selector`.
    async fn exists(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        Ok(self.execute_js(&script).await?.as_bool().unwrap_or(false))
    }

    /// PNG screenshot of the full page.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// URL of the current page.
    async fn get_url(&self) -> Result<String>;

    /// Navigate to `url` and return its rendered HTML.
    async fn fetch_html(&mut self, url: &str) -> Result<String> {
        let nav = self.navigate(url).await?;
        debug!(url, final_url = %nav.final_url, load_ms = nav.load_time_ms, "page loaded");
        self.html().await
    }

    /// Release the tab.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Poll until `selector` matches, or fail after `timeout`.
///
/// Evaluation errors while polling are treated as "not yet": the page is
/// usually mid-navigation.
pub async fn wait_for_selector(
    context: &dyn RenderContext,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<()> {
    let start = Instant::now();
    loop {
        match context.exists(selector).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => debug!(selector, "selector poll failed: {e}"),
        }
        if start.elapsed() >= timeout {
            bail!(
                "timed out after {}ms waiting for `{selector}`",
                timeout.as_millis()
            );
        }
        tokio::time::sleep(poll).await;
    }
}
