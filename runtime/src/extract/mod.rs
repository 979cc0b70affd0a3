//! HTML-to-record extraction core.
//!
//! Pure and synchronous: markup in, rows out. Schemas describe the portal
//! tables, `rows` walks them, `currency` turns cell text into amounts.

pub mod currency;
pub mod rows;
pub mod schema;

pub use currency::{detect_currency, normalize_amount, to_monetary_amount, CurrencyMode};
pub use rows::{extract_rows, find_container, ExtractedRow};
pub use schema::{Field, TableSchema};
