//! Headless Chromium backend via `chromiumoxide`.

use super::{NavigationResult, RenderContext};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Browser launch options.
#[derive(Debug, Clone, Default)]
pub struct BrowserOptions {
    /// Show the browser window instead of running headless.
    pub headful: bool,
    /// Chrome/Chromium binary; auto-detected when `None`.
    pub executable: Option<PathBuf>,
}

/// A launched browser process and the task pumping its CDP events.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch a browser.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if options.headful {
            builder = builder.with_head();
        }
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("invalid browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {e}");
                    break;
                }
            }
        });

        info!(headful = options.headful, "browser launched");
        Ok(Self { browser, handler })
    }

    /// Open a new blank tab.
    pub async fn new_context(&self) -> Result<ChromiumContext> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to open browser tab")?;
        Ok(ChromiumContext { page })
    }

    /// Close the browser and stop the event task.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await.context("failed to close browser")?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        debug!("browser closed");
        Ok(())
    }
}

/// One Chromium tab.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult> {
        let start = Instant::now();
        self.page
            .goto(url)
            .await
            .with_context(|| format!("failed to navigate to {url}"))?;
        let final_url = self.page.url().await?.unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn html(&self) -> Result<String> {
        self.page.content().await.context("failed to read page html")
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self.page.evaluate(script).await?;
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("no element matches `{selector}`"))?
            .click()
            .await?
            .type_str(text)
            .await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("no element matches `{selector}`"))?
            .click()
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page
            .screenshot(params)
            .await
            .context("failed to capture screenshot")
    }

    async fn get_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}
