//! Page parsers: one per portal page, each a list of table schemas.
//!
//! A parser never fails because a table is missing. The page may simply
//! have no such section, or the layout may have changed; either way the
//! table contributes nothing, the selector is listed in
//! [`PageExtraction::missing_containers`], and a warning is attached so the
//! snapshot tells a missing table apart from an empty one.

use crate::error::ExtractError;
use crate::extract::rows::{extract_rows, find_container, ExtractedRow};
use crate::extract::schema::{
    Field, TableSchema, DASHBOARD_ACCOUNTS, LIABILITIES, PORTFOLIO_EQUITIES, PORTFOLIO_FUNDS,
};
use crate::extract::CurrencyMode;
use crate::model::{CashAccount, ExtractWarning, Holding, LiabilityEntry, PageKind};
use scraper::Html;
use tracing::{debug, warn};

/// Tables read from each page, in output order.
const DASHBOARD_TABLES: &[TableSchema] = &[DASHBOARD_ACCOUNTS];
const PORTFOLIO_TABLES: &[TableSchema] = &[PORTFOLIO_EQUITIES, PORTFOLIO_FUNDS];
const LIABILITY_TABLES: &[TableSchema] = &[LIABILITIES];

/// Records built from one page plus what went wrong along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction<T> {
    pub records: Vec<T>,
    pub warnings: Vec<ExtractWarning>,
    /// Container selectors that matched nothing on the page.
    pub missing_containers: Vec<&'static str>,
}

impl<T> Default for PageExtraction<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
            missing_containers: Vec::new(),
        }
    }
}

/// A record type that can be built from an extracted row.
pub trait FromRow: Sized {
    fn from_row(row: &ExtractedRow) -> Self;
}

impl FromRow for Holding {
    fn from_row(row: &ExtractedRow) -> Self {
        Holding {
            name: row.text_or_empty(Field::Name),
            quantity: row.number(Field::Quantity),
            acquisition_price: row.money(Field::AcquisitionPrice),
            current_price: row.money(Field::CurrentPrice),
            assessed_value: row.money(Field::AssessedValue),
            broker: row.text_or_empty(Field::Broker),
        }
    }
}

impl FromRow for CashAccount {
    fn from_row(row: &ExtractedRow) -> Self {
        CashAccount {
            name: row.text_or_empty(Field::Name),
            amount: row.money(Field::Amount),
        }
    }
}

impl FromRow for LiabilityEntry {
    fn from_row(row: &ExtractedRow) -> Self {
        LiabilityEntry {
            name: row.text_or_empty(Field::Name),
            amount: row.money(Field::Amount),
        }
    }
}

/// Cash balances from the dashboard.
pub fn parse_dashboard(
    html: &str,
    mode: CurrencyMode,
) -> Result<PageExtraction<CashAccount>, ExtractError> {
    parse_page(PageKind::Dashboard, html, DASHBOARD_TABLES, mode)
}

/// Holdings from the portfolio page: equities first, then funds.
pub fn parse_portfolio(
    html: &str,
    mode: CurrencyMode,
) -> Result<PageExtraction<Holding>, ExtractError> {
    parse_page(PageKind::Portfolio, html, PORTFOLIO_TABLES, mode)
}

/// Liability balances from the liabilities page.
pub fn parse_liabilities(
    html: &str,
    mode: CurrencyMode,
) -> Result<PageExtraction<LiabilityEntry>, ExtractError> {
    parse_page(PageKind::Liabilities, html, LIABILITY_TABLES, mode)
}

fn parse_page<T: FromRow>(
    page: PageKind,
    html: &str,
    tables: &[TableSchema],
    mode: CurrencyMode,
) -> Result<PageExtraction<T>, ExtractError> {
    let document = Html::parse_document(html);
    let mut out = PageExtraction::default();

    for schema in tables {
        let Some(container) = find_container(&document, schema)? else {
            warn!(
                %page,
                table = schema.name,
                selector = schema.container,
                "container not found; page layout may have changed"
            );
            out.missing_containers.push(schema.container);
            out.warnings.push(ExtractWarning {
                page,
                table: schema.name.to_string(),
                row: None,
                field: None,
                message: format!("container `{}` not found", schema.container),
            });
            continue;
        };

        let rows = extract_rows(container, schema, mode)?;
        debug!(%page, table = schema.name, rows = rows.len(), "extracted table");

        for row in &rows {
            for problem in &row.problems {
                warn!(
                    %page,
                    table = schema.name,
                    row = row.index,
                    field = problem.field.as_str(),
                    "{}",
                    problem.error
                );
                out.warnings.push(ExtractWarning {
                    page,
                    table: schema.name.to_string(),
                    row: Some(row.index),
                    field: Some(problem.field.as_str().to_string()),
                    message: problem.error.to_string(),
                });
            }
            out.records.push(T::from_row(row));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonetaryAmount;

    const DASHBOARD: &str = r#"
        <html><body>
          <section id="registered-accounts">
            <ul>
              <li class="account">
                <a href="/accounts/show/1">Bank A</a>
                <a href="/aggregation_queue">update</a>
                <span class="status">requires login</span>
              </li>
            </ul>
          </section>
        </body></html>
    "#;

    const PORTFOLIO: &str = r#"
        <html><body>
          <section id="portfolio_det_eq">
            <table>
              <tbody>
                <tr><th>銘柄</th><th>コード</th><th>保有数</th></tr>
                <tr>
                  <td>Acme Corp</td><td>1234</td><td>100</td><td>1,000</td><td>1,200</td>
                  <td>120,000</td><td>+200</td><td>+20,000</td><td>+20.0%</td><td>BrokerX</td>
                </tr>
              </tbody>
            </table>
          </section>
          <section id="portfolio_det_mf">
            <table><tbody>
              <tr>
                <td>Global Index Fund</td><td>10,000</td><td>15.32</td><td>16.01</td>
                <td>160.1</td><td>+6.9</td><td>+4.5%</td><td>-</td><td>BrokerY</td>
              </tr>
            </tbody></table>
          </section>
        </body></html>
    "#;

    const LIABILITIES_PAGE: &str = r#"
        <html><body>
          <div id="liability_det">
            <section><section>
              <table><tbody>
                <tr>
                  <td>カード</td><td></td><td></td><td>Card X</td>
                  <td class="number">52,300円</td><td>Issuer</td>
                </tr>
              </tbody></table>
            </section></section>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_dashboard_missing_number_is_null() {
        let page = parse_dashboard(DASHBOARD, CurrencyMode::Heuristic).unwrap();
        assert_eq!(
            page.records,
            vec![CashAccount {
                name: "Bank A".to_string(),
                amount: None,
            }]
        );
        assert!(page.warnings.is_empty());
        assert!(page.missing_containers.is_empty());
    }

    #[test]
    fn test_parse_dashboard_with_balance() {
        let html = r#"<div id="registered-accounts"><ul>
            <li class="account"><a href="/a">Bank B</a><span class="number">1,234,567円</span></li>
        </ul></div>"#;
        let page = parse_dashboard(html, CurrencyMode::Heuristic).unwrap();
        assert_eq!(page.records[0].amount, Some(MonetaryAmount::yen(1_234_567.0)));
    }

    #[test]
    fn test_parse_portfolio_equities_then_funds() {
        let page = parse_portfolio(PORTFOLIO, CurrencyMode::Heuristic).unwrap();
        assert_eq!(page.records.len(), 2);

        assert_eq!(
            page.records[0],
            Holding {
                name: "Acme Corp".to_string(),
                quantity: Some(100.0),
                acquisition_price: Some(MonetaryAmount::yen(1000.0)),
                current_price: Some(MonetaryAmount::yen(1200.0)),
                assessed_value: Some(MonetaryAmount::yen(120_000.0)),
                broker: "BrokerX".to_string(),
            }
        );

        let fund = &page.records[1];
        assert_eq!(fund.name, "Global Index Fund");
        assert_eq!(fund.quantity, Some(10_000.0));
        assert_eq!(fund.current_price, Some(MonetaryAmount::dollar(16.01)));
        assert_eq!(fund.broker, "BrokerY");
    }

    #[test]
    fn test_parse_portfolio_is_idempotent() {
        let first = parse_portfolio(PORTFOLIO, CurrencyMode::Heuristic).unwrap();
        let second = parse_portfolio(PORTFOLIO, CurrencyMode::Heuristic).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_portfolio_missing_containers_is_empty() {
        let page = parse_portfolio("<html><body></body></html>", CurrencyMode::Heuristic).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(
            page.missing_containers,
            vec!["#portfolio_det_eq", "#portfolio_det_mf"]
        );
        let tables: Vec<_> = page.warnings.iter().map(|w| w.table.as_str()).collect();
        assert_eq!(tables, vec!["equities", "funds"]);
        assert_eq!(page.warnings[0].row, None);
        assert_eq!(
            page.warnings[0].message,
            "container `#portfolio_det_eq` not found"
        );
    }

    #[test]
    fn test_empty_table_has_no_warnings() {
        let html = r#"<section id="portfolio_det_eq"><table><tbody></tbody></table></section>
            <section id="portfolio_det_mf"><table><tbody></tbody></table></section>"#;
        let page = parse_portfolio(html, CurrencyMode::Heuristic).unwrap();
        assert!(page.records.is_empty());
        assert!(page.warnings.is_empty());
        assert!(page.missing_containers.is_empty());
    }

    #[test]
    fn test_parse_liabilities() {
        let page = parse_liabilities(LIABILITIES_PAGE, CurrencyMode::Heuristic).unwrap();
        assert_eq!(
            page.records,
            vec![LiabilityEntry {
                name: "Card X".to_string(),
                amount: Some(MonetaryAmount::yen(52_300.0)),
            }]
        );
    }

    #[test]
    fn test_parse_error_attaches_warning() {
        let html = r#"<div id="registered-accounts"><ul>
            <li class="account"><a href="/a">Broker Z</a><span class="number">---</span></li>
        </ul></div>"#;
        let page = parse_dashboard(html, CurrencyMode::Heuristic).unwrap();
        assert_eq!(page.records[0].amount, None);
        assert_eq!(page.warnings.len(), 1);
        assert_eq!(page.warnings[0].page, PageKind::Dashboard);
        assert_eq!(page.warnings[0].field.as_deref(), Some("amount"));
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let html = r#"<div id="liability_det"><section><section><table><tbody>
            <tr><td>only</td><td>two</td></tr>
        </tbody></table></section></section></div>"#;
        let err = parse_liabilities(html, CurrencyMode::Heuristic).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedRow { table: "liabilities", .. }));
    }

    #[test]
    fn test_account_without_link_is_malformed() {
        let html = r#"<div id="registered-accounts"><ul>
            <li class="account"><a href="/a">Bank A</a></li>
            <li class="account"><span class="number">1,000円</span></li>
        </ul></div>"#;
        let err = parse_dashboard(html, CurrencyMode::Heuristic).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MalformedRow {
                table: "accounts",
                row: 1,
                detail: "no element matches `a:nth-child(1)` for name".to_string(),
            }
        );
    }
}
