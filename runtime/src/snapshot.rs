//! One run end to end: sign in, fetch the three pages, build the snapshot.
//!
//! Fetching is strictly sequential over a single render context.
//! Extraction failures are contained per page; fetch and login failures
//! abort the run.

use crate::acquisition::login;
use crate::config::{Credentials, PortalConfig};
use crate::error::ExtractError;
use crate::extract::CurrencyMode;
use crate::model::{
    CashAccount, ExtractWarning, Holding, LiabilityEntry, PageKind, PortfolioSnapshot,
};
use crate::pages::{parse_dashboard, parse_liabilities, parse_portfolio, PageExtraction};
use crate::renderer::RenderContext;
use anyhow::{Context, Result};
use tracing::{error, info};

/// Version tag stamped on every snapshot.
pub const SNAPSHOT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rendered HTML of the three pages a snapshot is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet {
    pub dashboard: String,
    pub portfolio: String,
    pub liabilities: String,
}

/// Fetch dashboard, portfolio and liabilities, in that order.
pub async fn fetch_pages(context: &mut dyn RenderContext, portal: &PortalConfig) -> Result<PageSet> {
    let dashboard = fetch(context, PageKind::Dashboard, &portal.dashboard_url()).await?;
    let portfolio = fetch(context, PageKind::Portfolio, &portal.portfolio_url()).await?;
    let liabilities = fetch(context, PageKind::Liabilities, &portal.liabilities_url()).await?;

    Ok(PageSet {
        dashboard,
        portfolio,
        liabilities,
    })
}

async fn fetch(context: &mut dyn RenderContext, page: PageKind, url: &str) -> Result<String> {
    let html = context
        .fetch_html(url)
        .await
        .with_context(|| format!("failed to fetch {page} page ({url})"))?;
    info!(%page, bytes = html.len(), "fetched page");
    Ok(html)
}

/// Sign in, fetch the pages and extract them.
pub async fn collect_snapshot(
    context: &mut dyn RenderContext,
    portal: &PortalConfig,
    credentials: &Credentials,
    mode: CurrencyMode,
) -> Result<PortfolioSnapshot> {
    login(context, portal, credentials).await?;
    let pages = fetch_pages(context, portal).await?;
    Ok(snapshot_from_pages(&pages, mode))
}

/// Extract all three pages and assemble the snapshot.
///
/// A page whose extraction fails contributes no records and one warning.
pub fn snapshot_from_pages(pages: &PageSet, mode: CurrencyMode) -> PortfolioSnapshot {
    let dashboard = contain(PageKind::Dashboard, parse_dashboard(&pages.dashboard, mode));
    let portfolio = contain(PageKind::Portfolio, parse_portfolio(&pages.portfolio, mode));
    let liabilities = contain(
        PageKind::Liabilities,
        parse_liabilities(&pages.liabilities, mode),
    );
    assemble(dashboard, portfolio, liabilities)
}

/// Combine per-page extractions into the output snapshot.
pub fn assemble(
    dashboard: PageExtraction<CashAccount>,
    portfolio: PageExtraction<Holding>,
    liabilities: PageExtraction<LiabilityEntry>,
) -> PortfolioSnapshot {
    let mut warnings = dashboard.warnings;
    warnings.extend(portfolio.warnings);
    warnings.extend(liabilities.warnings);

    let snapshot = PortfolioSnapshot {
        version: SNAPSHOT_VERSION.to_string(),
        cash: dashboard.records,
        properties: portfolio.records,
        liabilities: liabilities.records,
        warnings,
    };

    info!(
        cash = snapshot.cash.len(),
        properties = snapshot.properties.len(),
        liabilities = snapshot.liabilities.len(),
        warnings = snapshot.warnings.len(),
        "snapshot assembled"
    );
    snapshot
}

fn contain<T>(page: PageKind, result: Result<PageExtraction<T>, ExtractError>) -> PageExtraction<T> {
    match result {
        Ok(extraction) => extraction,
        Err(e) => {
            error!(%page, "page extraction failed: {e}");
            let (table, row) = match &e {
                ExtractError::MalformedRow { table, row, .. } => (table.to_string(), Some(*row)),
                _ => (String::new(), None),
            };
            PageExtraction {
                warnings: vec![ExtractWarning {
                    page,
                    table,
                    row,
                    field: None,
                    message: e.to_string(),
                }],
                ..PageExtraction::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonetaryAmount;
    use crate::renderer::testing::FakeContext;

    const DASHBOARD: &str = r#"<div id="registered-accounts"><ul>
        <li class="account"><a href="/a/1">Bank A</a><span class="number">250,000円</span></li>
        <li class="account"><a href="/a/2">Wallet B</a></li>
    </ul></div>"#;

    const PORTFOLIO: &str = r#"
        <div id="portfolio_det_eq"><table><tbody><tr>
          <td>Acme Corp</td><td>1234</td><td>100</td><td>1,000</td><td>1,200</td>
          <td>120,000</td><td>+200</td><td>+20,000</td><td>+20.0%</td><td>BrokerX</td>
        </tr></tbody></table></div>
        <div id="portfolio_det_mf"><table><tbody></tbody></table></div>"#;

    const LIABILITIES: &str = r#"<div id="liability_det"><section><section><table><tbody>
        <tr><td>card</td><td></td><td></td><td>Card X</td><td class="number">12,000円</td></tr>
    </tbody></table></section></section></div>"#;

    fn portal_ctx(portal: &PortalConfig) -> FakeContext {
        FakeContext::default()
            .with_page(&portal.sign_in_url(), "<form></form>")
            .with_page(&portal.dashboard_url(), DASHBOARD)
            .with_page(&portal.portfolio_url(), PORTFOLIO)
            .with_page(&portal.liabilities_url(), LIABILITIES)
            .with_selector(&portal.login.email)
            .with_selector(&portal.login.signed_in_marker)
    }

    #[tokio::test]
    async fn test_collect_snapshot_visits_pages_in_order() {
        let portal = PortalConfig::default();
        let mut ctx = portal_ctx(&portal);
        let creds = Credentials {
            id: "me".to_string(),
            password: "pw".to_string(),
        };

        let snapshot = collect_snapshot(&mut ctx, &portal, &creds, CurrencyMode::Heuristic)
            .await
            .unwrap();

        assert_eq!(
            ctx.visited,
            vec![
                portal.sign_in_url(),
                portal.dashboard_url(),
                portal.portfolio_url(),
                portal.liabilities_url(),
            ]
        );
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.cash.len(), 2);
        assert_eq!(snapshot.cash[0].amount, Some(MonetaryAmount::yen(250_000.0)));
        assert_eq!(snapshot.cash[1].amount, None);
        assert_eq!(snapshot.properties.len(), 1);
        assert_eq!(snapshot.properties[0].broker, "BrokerX");
        assert_eq!(snapshot.liabilities[0].name, "Card X");
        assert!(snapshot.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let portal = PortalConfig::default();
        let mut ctx = FakeContext::default()
            .with_page(&portal.dashboard_url(), DASHBOARD)
            .with_page(&portal.liabilities_url(), LIABILITIES);

        let err = fetch_pages(&mut ctx, &portal).await.unwrap_err();
        assert!(err.to_string().contains("portfolio"));
        assert_eq!(ctx.visited, vec![portal.dashboard_url()]);
    }

    #[test]
    fn test_missing_tables_differ_from_empty_tables() {
        let empty = PageSet {
            dashboard: r#"<div id="registered-accounts"><ul></ul></div>"#.to_string(),
            portfolio: r#"<div id="portfolio_det_eq"><table><tbody></tbody></table></div>
                <div id="portfolio_det_mf"><table><tbody></tbody></table></div>"#
                .to_string(),
            liabilities: r#"<div id="liability_det"></div>"#.to_string(),
        };
        let missing = PageSet {
            dashboard: "<html></html>".to_string(),
            portfolio: "<html></html>".to_string(),
            liabilities: "<html></html>".to_string(),
        };

        let empty = snapshot_from_pages(&empty, CurrencyMode::Heuristic);
        let missing = snapshot_from_pages(&missing, CurrencyMode::Heuristic);

        assert!(empty.warnings.is_empty());
        assert_ne!(empty, missing);
        let tables: Vec<_> = missing
            .warnings
            .iter()
            .map(|w| (w.page, w.table.as_str()))
            .collect();
        assert_eq!(
            tables,
            vec![
                (PageKind::Dashboard, "accounts"),
                (PageKind::Portfolio, "equities"),
                (PageKind::Portfolio, "funds"),
                (PageKind::Liabilities, "liabilities"),
            ]
        );
    }

    #[test]
    fn test_malformed_page_is_contained() {
        let pages = PageSet {
            dashboard: DASHBOARD.to_string(),
            portfolio: r#"<div id="portfolio_det_eq"><table><tbody>
                <tr><td>short</td><td>row</td></tr>
            </tbody></table></div>"#
                .to_string(),
            liabilities: LIABILITIES.to_string(),
        };

        let snapshot = snapshot_from_pages(&pages, CurrencyMode::Heuristic);
        assert!(snapshot.properties.is_empty());
        assert_eq!(snapshot.cash.len(), 2);
        assert_eq!(snapshot.liabilities.len(), 1);
        assert_eq!(snapshot.warnings.len(), 1);
        assert_eq!(snapshot.warnings[0].page, PageKind::Portfolio);
        assert_eq!(snapshot.warnings[0].table, "equities");
    }
}
