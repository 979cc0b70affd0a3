//! Runtime configuration: credentials and portal endpoints.
//!
//! Credentials come from `MONEYFORWARD_ID` / `MONEYFORWARD_PASSWORD`
//! (a `.env` file in the working directory is loaded first by the CLI);
//! values passed on the command line win.

use crate::error::ConfigError;
use std::fmt;
use url::Url;

pub const ENV_ID: &str = "MONEYFORWARD_ID";
pub const ENV_PASSWORD: &str = "MONEYFORWARD_PASSWORD";
pub const ENV_BASE_URL: &str = "MONEYFORWARD_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://moneyforward.com";

/// Account identifier and secret for the portal.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from explicit values, falling back to `lookup`.
    ///
    /// Blank values count as missing.
    pub fn resolve<F>(
        id: Option<String>,
        password: Option<String>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, var: &'static str| {
            explicit
                .or_else(|| lookup(var))
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential(var))
        };

        Ok(Self {
            id: pick(id, ENV_ID)?,
            password: pick(password, ENV_PASSWORD)?,
        })
    }

    /// Resolve credentials against the process environment.
    pub fn from_env_or(id: Option<String>, password: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve(id, password, |k| std::env::var(k).ok())
    }
}

/// Login form selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSelectors {
    pub email: String,
    pub password: String,
    pub submit: String,
    /// Link that only appears once signed in; clicked after it shows up.
    pub signed_in_marker: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            email: "#sign_in_session_service_email".to_string(),
            password: "#sign_in_session_service_password".to_string(),
            submit: "#login-btn-sumit".to_string(),
            signed_in_marker:
                "#header-container > header > div.global-menu > ul > li:nth-child(2) > a"
                    .to_string(),
        }
    }
}

/// Where the portal's pages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub base_url: Url,
    pub sign_in_path: String,
    pub dashboard_path: String,
    pub portfolio_path: String,
    pub liabilities_path: String,
    pub login: LoginSelectors,
    /// How long to wait for the signed-in marker after submitting.
    pub login_wait_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            sign_in_path: "/users/sign_in".to_string(),
            dashboard_path: "/".to_string(),
            portfolio_path: "/bs/portfolio".to_string(),
            liabilities_path: "/bs/liability".to_string(),
            login: LoginSelectors::default(),
            login_wait_ms: 30_000,
        }
    }
}

impl PortalConfig {
    /// Default endpoints rooted at `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ConfigError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    pub fn sign_in_url(&self) -> String {
        self.join(&self.sign_in_path)
    }

    pub fn dashboard_url(&self) -> String {
        self.join(&self.dashboard_path)
    }

    pub fn portfolio_url(&self) -> String {
        self.join(&self.portfolio_path)
    }

    pub fn liabilities_url(&self) -> String {
        self.join(&self.liabilities_path)
    }

    fn join(&self, path: &str) -> String {
        self.base_url
            .join(path)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path))
    }
}
