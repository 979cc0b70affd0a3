//! Sign into MoneyForward and extract cash balances, holdings and
//! liabilities as one JSON snapshot.
//!
//! The extraction core ([`extract`], [`pages`]) is synchronous and takes
//! HTML text, so it can be driven from saved pages as easily as from the
//! live browser flow in [`snapshot`].

pub mod acquisition;
pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod pages;
pub mod renderer;
pub mod snapshot;

pub use error::{ConfigError, ExtractError};
pub use extract::CurrencyMode;
pub use model::{CashAccount, Currency, Holding, LiabilityEntry, MonetaryAmount, PortfolioSnapshot};
pub use pages::{parse_dashboard, parse_liabilities, parse_portfolio, PageExtraction};
