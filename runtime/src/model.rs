//! Record types produced by the page parsers.
//!
//! Everything here is a plain value: built once from a parse pass,
//! serialized into the snapshot, then dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency tag attached to every monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Yen,
    Dollar,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Yen => f.write_str("yen"),
            Currency::Dollar => f.write_str("dollar"),
        }
    }
}

/// A finite numeric value paired with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub value: f64,
    pub currency: Currency,
}

impl MonetaryAmount {
    pub fn yen(value: f64) -> Self {
        Self {
            value,
            currency: Currency::Yen,
        }
    }

    pub fn dollar(value: f64) -> Self {
        Self {
            value,
            currency: Currency::Dollar,
        }
    }
}

/// One equity or fund position from the portfolio page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub name: String,
    /// Units held. Fractional for some foreign equities; `None` when the
    /// cell had no numeric content.
    pub quantity: Option<f64>,
    /// Average acquisition price; `None` when the cell had no numeric content.
    pub acquisition_price: Option<MonetaryAmount>,
    pub current_price: Option<MonetaryAmount>,
    pub assessed_value: Option<MonetaryAmount>,
    /// Institution the position is held at.
    pub broker: String,
}

/// A named balance on the dashboard's registered-accounts list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashAccount {
    pub name: String,
    /// `None` when the account shows no balance (e.g. it needs re-authentication).
    pub amount: Option<MonetaryAmount>,
}

/// A named balance on the liabilities page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityEntry {
    pub name: String,
    pub amount: Option<MonetaryAmount>,
}

/// Which portal page a record or warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Dashboard,
    Portfolio,
    Liabilities,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageKind::Dashboard => f.write_str("dashboard"),
            PageKind::Portfolio => f.write_str("portfolio"),
            PageKind::Liabilities => f.write_str("liabilities"),
        }
    }
}

/// A non-fatal problem found while extracting a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractWarning {
    pub page: PageKind,
    /// Schema name of the table, e.g. `"equities"`.
    pub table: String,
    /// Row index within the table, when the problem is row-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Field name, when the problem is field-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

/// The single output artifact of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub version: String,
    pub cash: Vec<CashAccount>,
    pub properties: Vec<Holding>,
    pub liabilities: Vec<LiabilityEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ExtractWarning>,
}
