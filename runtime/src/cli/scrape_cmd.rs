//! `mf-scrape scrape`: sign in and print a live snapshot.

use crate::audit::Diagnostics;
use crate::cli::output;
use crate::config::{Credentials, PortalConfig, DEFAULT_BASE_URL, ENV_BASE_URL};
use crate::extract::CurrencyMode;
use crate::renderer::chromium::{BrowserOptions, ChromiumRenderer};
use crate::renderer::RenderContext;
use crate::snapshot::collect_snapshot;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Everything the scrape command needs, already parsed from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub id: Option<String>,
    pub password: Option<String>,
    pub base_url: Option<String>,
    pub browser: BrowserOptions,
    pub mode: CurrencyMode,
    /// `None` disables failure captures.
    pub diagnostics_dir: Option<PathBuf>,
    pub compact: bool,
    pub quiet: bool,
}

/// Run the scrape command.
pub async fn run(opts: ScrapeOptions) -> Result<()> {
    // Validate configuration before a browser is started.
    let credentials = Credentials::from_env_or(opts.id.clone(), opts.password.clone())?;
    let base_url = opts
        .base_url
        .clone()
        .or_else(|| std::env::var(ENV_BASE_URL).ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let portal = PortalConfig::with_base_url(&base_url)?;

    info!(base_url = %portal.base_url, "starting scrape");

    let renderer = ChromiumRenderer::launch(&opts.browser).await?;
    let mut context = match renderer.new_context().await {
        Ok(ctx) => ctx,
        Err(e) => {
            let _ = renderer.close().await;
            return Err(e);
        }
    };

    let result = collect_snapshot(&mut context, &portal, &credentials, opts.mode).await;

    if let Err(e) = &result {
        error!("scrape failed: {e:#}");
        if let Some(dir) = &opts.diagnostics_dir {
            match Diagnostics::open(dir) {
                Ok(diagnostics) => {
                    diagnostics.capture(&context, e).await;
                }
                Err(open_err) => warn!("diagnostics unavailable: {open_err:#}"),
            }
        }
    }

    if let Err(e) = Box::new(context).close().await {
        warn!("failed to close tab: {e:#}");
    }
    if let Err(e) = renderer.close().await {
        warn!("failed to close browser: {e:#}");
    }

    let snapshot = result.context("no snapshot produced")?;
    output::print_snapshot(&snapshot, opts.compact)?;
    if !opts.quiet {
        output::print_summary(&snapshot);
    }
    Ok(())
}
