//! In-memory render context for tests.

use super::{NavigationResult, RenderContext};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Serves canned HTML per URL and records every interaction.
#[derive(Default)]
pub struct FakeContext {
    pub pages: HashMap<String, String>,
    /// Selectors that `exists` reports as present.
    pub present: HashSet<String>,
    pub current: Option<String>,
    pub visited: Vec<String>,
    pub typed: Mutex<Vec<(String, String)>>,
    pub clicked: Mutex<Vec<String>>,
    /// When set, script evaluation and `exists` fail with this message.
    pub script_error: Option<String>,
}

impl FakeContext {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.present.insert(selector.to_string());
        self
    }
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult> {
        if !self.pages.contains_key(url) {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"));
        }
        self.visited.push(url.to_string());
        self.current = Some(url.to_string());
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn html(&self) -> Result<String> {
        self.current
            .as_ref()
            .and_then(|u| self.pages.get(u))
            .cloned()
            .ok_or_else(|| anyhow!("no page loaded"))
    }

    async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
        match &self.script_error {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(serde_json::Value::Null),
        }
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        self.typed
            .lock()
            .unwrap()
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.clicked.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        if let Some(msg) = &self.script_error {
            return Err(anyhow!("{msg}"));
        }
        Ok(self.present.contains(selector))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn get_url(&self) -> Result<String> {
        Ok(self.current.clone().unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
