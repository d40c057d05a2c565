/// Amount normalization for cost and hour fields.
///
/// Values arrive as whatever the user typed or the server stored
/// (`"$250"`, `"250.00"`, `""`, `null`, a JSON number). Everything is reduced
/// to an `f64`; unparseable input becomes `0.0`.
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.\-]").unwrap());

/// Normalize free-form text to a number. Never fails.
///
/// Every character other than digits, `.` and `-` is dropped, then the
/// longest leading decimal prefix is parsed (`"1.2.3"` → `1.2`,
/// `"12-3"` → `12`). Only a leading minus counts as a sign.
#[must_use]
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned = NON_NUMERIC.replace_all(raw, "");
    leading_decimal(&cleaned).unwrap_or(0.0)
}

/// [`parse_amount`] for an optional field.
#[must_use]
pub fn parse_amount_opt(raw: Option<&str>) -> f64 {
    raw.map(parse_amount).unwrap_or(0.0)
}

/// [`parse_amount`] for a raw JSON value (string, number, or null).
#[must_use]
pub fn parse_amount_value(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_amount(s),
        _ => 0.0,
    }
}

/// `$X.YY`
#[must_use]
pub fn format_money(value: f64) -> String {
    format!("${value:.2}")
}

/// `X.YY`
#[must_use]
pub fn format_hours(value: f64) -> String {
    format!("{value:.2}")
}

fn leading_decimal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_currency() {
        assert_eq!(parse_amount("250.00"), 250.0);
        assert_eq!(parse_amount("$250.00"), 250.0);
        assert_eq!(parse_amount("$1,250.50"), 1250.5);
        assert_eq!(parse_amount(" 42 hrs"), 42.0);
    }

    #[test]
    fn test_parse_degrades_to_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("-"), 0.0);
        assert_eq!(parse_amount("."), 0.0);
        assert_eq!(parse_amount("--5"), 0.0);
        assert_eq!(parse_amount_opt(None), 0.0);
        assert_eq!(parse_amount_value(&Value::Null), 0.0);
    }

    #[test]
    fn test_parse_takes_leading_prefix() {
        assert_eq!(parse_amount("1.2.3"), 1.2);
        assert_eq!(parse_amount("12-3"), 12.0);
        assert_eq!(parse_amount("-$40"), -40.0);
        assert_eq!(parse_amount(".5"), 0.5);
        assert_eq!(parse_amount("7."), 7.0);
    }

    #[test]
    fn test_parse_exponent_letters_are_stripped() {
        // 'e' is not kept, so "1e3" reads as 13
        assert_eq!(parse_amount("1e3"), 13.0);
    }

    #[test]
    fn test_parse_overflow_is_zero() {
        let huge = "9".repeat(400);
        assert_eq!(parse_amount(&huge), 0.0);
    }

    #[test]
    fn test_parse_value_variants() {
        assert_eq!(parse_amount_value(&serde_json::json!(99.5)), 99.5);
        assert_eq!(parse_amount_value(&serde_json::json!("$10")), 10.0);
        assert_eq!(parse_amount_value(&serde_json::json!(true)), 0.0);
        assert_eq!(parse_amount_value(&serde_json::json!(1e21)), 1e21);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let inputs = [
            "$250.00", "", "abc", "1.2.3", "-17.25", "0.0000001", "1e3", "12-3", "  $ 8 ",
            "123456789012345678901234",
        ];
        for input in inputs {
            let once = parse_amount(input);
            let twice = parse_amount(&once.to_string());
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(format_money(250.0), "$250.00");
        assert_eq!(format_money(parse_amount("abc")), "$0.00");
        assert_eq!(format_hours(7.456), "7.46");
        assert_eq!(format_hours(0.0), "0.00");
    }
}
