//! Numeric leaf parsing.

use rust_decimal::Decimal;

/// Parse a document number such as `"7,662.0"` or `".287000"`.
///
/// Thousands separators are stripped and surrounding whitespace ignored.
/// A string that is empty after stripping parses as `0`, so a blank field
/// becomes a numeric zero rather than staying textual. Infinite and NaN
/// results are rejected.
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned = s.replace(',', "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Some(0.0);
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format an amount with thousands separators (25,399.25).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let Some((integer_part, decimal_part)) = digits.split_once('.') else {
        return s;
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::with_capacity(chars.len() + chars.len() / 3);

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{sign}{formatted}.{decimal_part}")
}
