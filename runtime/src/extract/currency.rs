//! Localized amount strings to numbers and currency tags.
//!
//! The portal renders yen amounts as integers with thousands separators
//! and kanji unit suffixes (`1,234円`, `12.5万`) and dollar amounts with
//! a decimal point. The default mode infers the currency from that
//! decimal point alone, which misreads whole-dollar amounts as yen.
//! [`CurrencyMode::Strict`] refuses to guess.

use crate::error::ExtractError;
use crate::model::{Currency, MonetaryAmount};
use regex::Regex;
use std::sync::OnceLock;

/// How the currency of a cell is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurrencyMode {
    /// Dollar iff the text contains a `.`, otherwise yen.
    #[default]
    Heuristic,
    /// Only explicit markers (`円`, `¥`, `JPY`, `$`, `USD`, `ドル`) count.
    Strict,
}

const YEN_MARKERS: &[&str] = &["円", "¥", "￥", "JPY"];
const DOLLAR_MARKERS: &[&str] = &["$", "＄", "USD", "ドル"];

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x{4E00}-\x{9FFF},]").expect("strip regex is valid"))
}

/// Guess the currency of `raw` from the presence of a decimal point.
pub fn detect_currency(raw: &str) -> Currency {
    if raw.contains('.') {
        Currency::Dollar
    } else {
        Currency::Yen
    }
}

/// Determine the currency of `raw` from explicit markers only.
pub fn detect_currency_strict(raw: &str) -> Result<Currency, ExtractError> {
    let is_yen = YEN_MARKERS.iter().any(|m| raw.contains(m));
    let is_dollar = DOLLAR_MARKERS.iter().any(|m| raw.contains(m));

    match (is_yen, is_dollar) {
        (true, false) => Ok(Currency::Yen),
        (false, true) => Ok(Currency::Dollar),
        _ => Err(ExtractError::AmbiguousCurrency {
            text: raw.to_string(),
        }),
    }
}

/// Parse `raw` as a number after removing thousands separators and kanji.
///
/// `"1,234,567"` is `1234567.0` and `"12.5万"` is `12.5`; the unit suffix
/// is dropped, not applied.
pub fn normalize_amount(raw: &str) -> Result<f64, ExtractError> {
    let stripped = strip_re().replace_all(raw, "");
    let cleaned = stripped.trim();

    let parse_error = || ExtractError::Parse {
        text: raw.to_string(),
    };

    if cleaned.is_empty() {
        return Err(parse_error());
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(parse_error()),
    }
}

/// Convert an optional cell text into an amount.
///
/// Absent or blank text is `Ok(None)`; it is not handed to the normalizer.
pub fn to_monetary_amount(
    raw: Option<&str>,
    mode: CurrencyMode,
) -> Result<Option<MonetaryAmount>, ExtractError> {
    let raw = match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(None),
    };

    let currency = match mode {
        CurrencyMode::Heuristic => detect_currency(raw),
        CurrencyMode::Strict => detect_currency_strict(raw)?,
    };

    // Strict markers like `$` and `¥` are not stripped by the normalizer.
    let numeric: String = match mode {
        CurrencyMode::Heuristic => raw.to_string(),
        CurrencyMode::Strict => strip_markers(raw),
    };

    let value = normalize_amount(&numeric).map_err(|_| ExtractError::Parse {
        text: raw.to_string(),
    })?;

    Ok(Some(MonetaryAmount { value, currency }))
}

fn strip_markers(raw: &str) -> String {
    YEN_MARKERS
        .iter()
        .chain(DOLLAR_MARKERS)
        .fold(raw.to_string(), |acc, m| acc.replace(m, ""))
}
