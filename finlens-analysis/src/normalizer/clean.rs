//! Cell value cleaning.
//!
//! Turns a raw cell such as `"$(1,234.5)"`, `"12.5%"` or `"—"` into a number.
//! An empty or placeholder cell becomes `None`, which ratios treat as
//! "unknown" rather than zero.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strings that mean "no value".
const NULL_TOKENS: &[&str] = &["nan", "none", "null", "n/a", "na", "n.a.", "n.m.", "nm"];

/// Dash placeholders that stand for zero.
const ZERO_DASHES: &[&str] = &["-", "--", "—", "–", "−", "‒"];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₽', '₩', '₺'];

static BRACKET_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*\w{1,3}\s*\]").unwrap());

static TRAILING_PAREN_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d{1,2}\)$").unwrap());

static CURRENCY_CODES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:usd|eur|gbp|jpy|chf|cny|rmb)\b").unwrap()
});

/// Clean a raw cell and convert it to a number.
pub fn clean_value(raw: &str) -> Option<f64> {
    let mut text = raw.trim().to_string();
    if text.is_empty() || NULL_TOKENS.contains(&text.to_lowercase().as_str()) {
        return None;
    }

    text = BRACKET_FOOTNOTE.replace_all(&text, "").into_owned();
    text = text.trim_end_matches('*').trim().to_string();

    // "(1)" alone is a negative one; "1,234 (1)" carries a footnote.
    if let Some(m) = TRAILING_PAREN_FOOTNOTE.find(&text) {
        if text[..m.start()].chars().any(|c| c.is_ascii_digit()) {
            text.truncate(m.start());
        }
    }

    text = CURRENCY_CODES.replace_all(&text, "").into_owned();
    text.retain(|c| !CURRENCY_SYMBOLS.contains(&c) && c != '%' && !c.is_whitespace());

    if text.is_empty() {
        return None;
    }
    if ZERO_DASHES.contains(&text.as_str()) {
        return Some(0.0);
    }

    let mut negative = false;
    if text.starts_with('(') && text.ends_with(')') && text.len() >= 2 {
        negative = true;
        text = text[1..text.len() - 1].to_string();
    }
    if let Some(rest) = text.strip_prefix(|c: char| matches!(c, '-' | '−' | '–')) {
        negative = !negative;
        text = rest.to_string();
    }

    let number = strip_separators(&text);
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    tracing::trace!(raw, value, "Cleaned cell");
    Some(if negative { -value } else { value })
}

/// Resolve thousands and decimal separators into a plain `1234.5` string.
fn strip_separators(text: &str) -> String {
    let last_comma = text.rfind(',');
    let last_dot = text.rfind('.');

    match (last_comma, last_dot) {
        // "1.234,5" (European) vs "1,234.5"
        (Some(c), Some(d)) if c > d => text.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => text.replace(',', ""),
        (Some(_), None) => {
            let groups: Vec<&str> = text.split(',').collect();
            let thousands = groups[1..].iter().all(|g| g.len() == 3);
            if thousands {
                text.replace(',', "")
            } else if groups.len() == 2 {
                text.replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        (None, Some(_)) if text.matches('.').count() > 1 => text.replace('.', ""),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(clean_value("1234"), Some(1234.0));
        assert_eq!(clean_value(" 12.5 "), Some(12.5));
        assert_eq!(clean_value("-7"), Some(-7.0));
    }

    #[test]
    fn test_currency_and_thousands() {
        assert_eq!(clean_value("$1,234,567"), Some(1_234_567.0));
        assert_eq!(clean_value("€ 2.500,75"), Some(2500.75));
        assert_eq!(clean_value("USD 1 000"), Some(1000.0));
    }

    #[test]
    fn test_parenthesized_negative() {
        assert_eq!(clean_value("(1,234)"), Some(-1234.0));
        assert_eq!(clean_value("$(50.5)"), Some(-50.5));
        assert_eq!(clean_value("(1)"), Some(-1.0));
    }

    #[test]
    fn test_unicode_minus() {
        assert_eq!(clean_value("−250"), Some(-250.0));
    }

    #[test]
    fn test_dash_is_zero() {
        assert_eq!(clean_value("—"), Some(0.0));
        assert_eq!(clean_value("-"), Some(0.0));
        assert_eq!(clean_value("–"), Some(0.0));
    }

    #[test]
    fn test_footnotes_are_stripped() {
        assert_eq!(clean_value("1,200 (1)"), Some(1200.0));
        assert_eq!(clean_value("(300) (2)"), Some(-300.0));
        assert_eq!(clean_value("450[3]"), Some(450.0));
        assert_eq!(clean_value("99*"), Some(99.0));
    }

    #[test]
    fn test_percent() {
        assert_eq!(clean_value("12.5%"), Some(12.5));
    }

    #[test]
    fn test_empty_is_null_not_zero() {
        assert_eq!(clean_value(""), None);
        assert_eq!(clean_value("   "), None);
        assert_eq!(clean_value("N/A"), None);
        assert_eq!(clean_value("nan"), None);
        assert_eq!(clean_value("$"), None);
    }

    #[test]
    fn test_garbage_is_null() {
        assert_eq!(clean_value("see note"), None);
        assert_eq!(clean_value("inf"), None);
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(clean_value("3,5"), Some(3.5));
    }
}
