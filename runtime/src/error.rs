//! Typed errors for the extraction core and configuration layer.
//!
//! Orchestration and CLI code wrap these in `anyhow` with context; the
//! extraction layer never panics on malformed markup.

use thiserror::Error;

/// Errors raised while turning page markup into records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// A matched row lacks a cell or element its schema requires.
    #[error("row {row} of table `{table}` is malformed: {detail}")]
    MalformedRow {
        /// Schema name of the table the row belongs to.
        table: &'static str,
        /// Zero-based index of the row among the rows matched in the table.
        row: usize,
        /// What was missing, e.g. `expected 10 cells, found 3`.
        detail: String,
    },

    /// A monetary or numeric cell had no numeric content.
    #[error("no numeric content in {text:?}")]
    Parse {
        /// The raw cell text.
        text: String,
    },

    /// Strict currency mode could not find an explicit currency marker.
    #[error("cannot determine currency of {text:?}")]
    AmbiguousCurrency {
        /// The raw cell text.
        text: String,
    },

    /// A schema selector failed to compile.
    #[error("invalid selector `{0}`")]
    Selector(String),
}

/// Errors raised while resolving runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required credential was neither passed on the command line nor set
    /// in the environment.
    #[error("{0} is missing (pass it as an argument or set the environment variable)")]
    MissingCredential(&'static str),

    /// The portal base URL could not be parsed.
    #[error("invalid base url `{0}`")]
    InvalidBaseUrl(String),
}
