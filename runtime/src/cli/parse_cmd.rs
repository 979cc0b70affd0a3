//! `mf-scrape parse`: build a snapshot from saved page HTML.
//!
//! Useful for checking the extractors against pages captured by a failed
//! run, without signing in again.

use crate::cli::output;
use crate::extract::CurrencyMode;
use crate::snapshot::{snapshot_from_pages, PageSet};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Saved pages plus output options.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub dashboard: PathBuf,
    pub portfolio: PathBuf,
    pub liabilities: PathBuf,
    pub mode: CurrencyMode,
    pub compact: bool,
    pub quiet: bool,
}

/// Read the three files into a page set.
pub fn load_pages(dashboard: &Path, portfolio: &Path, liabilities: &Path) -> Result<PageSet> {
    let read = |path: &Path| {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    };

    Ok(PageSet {
        dashboard: read(dashboard)?,
        portfolio: read(portfolio)?,
        liabilities: read(liabilities)?,
    })
}

/// Run the parse command.
pub fn run(opts: ParseOptions) -> Result<()> {
    let pages = load_pages(&opts.dashboard, &opts.portfolio, &opts.liabilities)?;
    let snapshot = snapshot_from_pages(&pages, opts.mode);

    output::print_snapshot(&snapshot, opts.compact)?;
    if !opts.quiet {
        output::print_summary(&snapshot);
    }
    Ok(())
}
