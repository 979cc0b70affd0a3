//! Shared CLI output: the JSON snapshot on stdout, a short human summary
//! on stderr.

use crate::model::PortfolioSnapshot;
use anyhow::Result;
use std::io::{IsTerminal, Write};

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

/// Serialize the snapshot as pretty (or single-line) JSON.
pub fn snapshot_json(snapshot: &PortfolioSnapshot, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(snapshot)?
    } else {
        serde_json::to_string_pretty(snapshot)?
    };
    Ok(json)
}

/// Write the snapshot JSON to stdout.
pub fn print_snapshot(snapshot: &PortfolioSnapshot, compact: bool) -> Result<()> {
    let json = snapshot_json(snapshot, compact)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}

/// Summary lines for stderr, one per section plus one per warning.
pub fn summary_lines(s: &Styled, snapshot: &PortfolioSnapshot) -> Vec<String> {
    let mut lines = vec![
        format!("{} cash accounts   {}", s.ok_sym(), snapshot.cash.len()),
        format!("{} holdings        {}", s.ok_sym(), snapshot.properties.len()),
        format!("{} liabilities     {}", s.ok_sym(), snapshot.liabilities.len()),
    ];

    for w in &snapshot.warnings {
        let location = match (w.row, &w.field) {
            (Some(row), Some(field)) => format!("{}/{} row {row} {field}", w.page, w.table),
            (Some(row), None) => format!("{}/{} row {row}", w.page, w.table),
            _ if !w.table.is_empty() => format!("{}/{}", w.page, w.table),
            _ => w.page.to_string(),
        };
        lines.push(format!(
            "{} {} {}",
            s.warn_sym(),
            s.yellow(&location),
            s.dim(&w.message)
        ));
    }

    lines
}

/// Print the summary to stderr.
pub fn print_summary(snapshot: &PortfolioSnapshot) {
    let s = Styled::new();
    for line in summary_lines(&s, snapshot) {
        eprintln!("  {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CashAccount, ExtractWarning, PageKind};

    fn snapshot() -> PortfolioSnapshot {
        PortfolioSnapshot {
            version: "1.2.3".to_string(),
            cash: vec![CashAccount {
                name: "Bank A".to_string(),
                amount: None,
            }],
            properties: Vec::new(),
            liabilities: Vec::new(),
            warnings: vec![ExtractWarning {
                page: PageKind::Portfolio,
                table: "funds".to_string(),
                row: Some(2),
                field: Some("current_price".to_string()),
                message: "no numeric content in \"-\"".to_string(),
            }],
        }
    }

    #[test]
    fn test_snapshot_json_compact_is_single_line() {
        let json = snapshot_json(&snapshot(), true).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with(r#"{"version":"1.2.3""#));
    }

    #[test]
    fn test_summary_lines_plain() {
        let lines = summary_lines(&Styled::plain(), &snapshot());
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "OK cash accounts   1");
        assert!(lines[3].starts_with("?? portfolio/funds row 2 current_price"));
    }

    #[test]
    fn test_summary_lines_missing_table() {
        let mut snap = snapshot();
        snap.warnings = vec![ExtractWarning {
            page: PageKind::Liabilities,
            table: "liabilities".to_string(),
            row: None,
            field: None,
            message: "container `#liability_det` not found".to_string(),
        }];
        let lines = summary_lines(&Styled::plain(), &snap);
        assert_eq!(
            lines[3],
            "?? liabilities/liabilities container `#liability_det` not found"
        );
    }
}
