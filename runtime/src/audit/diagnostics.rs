//! Failure diagnostics: dump the current page when a run aborts.
//!
//! Each capture writes `<timestamp>.html` and `<timestamp>.png` into the
//! diagnostics directory, plus a `<timestamp>.json` note with the URL and
//! error chain.

use crate::renderer::RenderContext;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Files written by one capture. Absent entries failed to capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub html: Option<PathBuf>,
    pub screenshot: Option<PathBuf>,
    pub note: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CaptureNote<'a> {
    timestamp: String,
    url: Option<&'a str>,
    error: &'a str,
}

/// Writes failure captures into one directory.
pub struct Diagnostics {
    dir: PathBuf,
}

impl Diagnostics {
    /// Use (and create if needed) `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create diagnostics dir: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Default directory, `~/.mf-scrape/diagnostics`.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".mf-scrape")
            .join("diagnostics")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save whatever the context can still give us about the failed page.
    ///
    /// Individual capture failures are logged and skipped; the run's
    /// error is what matters to the caller.
    pub async fn capture(&self, context: &dyn RenderContext, error: &anyhow::Error) -> Capture {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string();
        let mut capture = Capture::default();

        let url = context.get_url().await.ok();

        match context.html().await {
            Ok(html) => capture.html = self.write(&format!("{stamp}.html"), html.as_bytes()),
            Err(e) => warn!("could not read page html for diagnostics: {e}"),
        }

        match context.screenshot().await {
            Ok(png) => capture.screenshot = self.write(&format!("{stamp}.png"), &png),
            Err(e) => warn!("could not take screenshot for diagnostics: {e}"),
        }

        let error_text = format!("{error:#}");
        let note = CaptureNote {
            timestamp: stamp.clone(),
            url: url.as_deref(),
            error: &error_text,
        };
        match serde_json::to_vec_pretty(&note) {
            Ok(json) => capture.note = self.write(&format!("{stamp}.json"), &json),
            Err(e) => warn!("could not encode diagnostics note: {e}"),
        }

        info!(dir = %self.dir.display(), "saved failure diagnostics");
        capture
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Option<PathBuf> {
        let path = self.dir.join(name);
        match std::fs::write(&path, bytes) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("failed to write {}: {e}", path.display());
                None
            }
        }
    }
}
