//! Recursive value sanitizing.
//!
//! Walks a record's value tree and classifies every text leaf as a number,
//! a date or plain text. Containers keep their shape; numbers and dates pass
//! through untouched, so sanitizing twice gives the same result as once.

pub mod dates;
pub mod numbers;

pub use dates::parse_date;
pub use numbers::{format_amount, parse_number};

use crate::models::record::{DateValue, FinalRecord, RawRecord, Value, ValueMap};

/// Sanitize any value.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::Date(_) => value.clone(),
        Value::Text(s) => sanitize_text(s),
        Value::List(items) => Value::List(items.iter().map(sanitize).collect()),
        Value::Map(map) => Value::Map(sanitize_map(map)),
    }
}

/// Sanitize every entry of a map, key by key.
pub fn sanitize_map(map: &ValueMap) -> ValueMap {
    map.iter().map(|(k, v)| (k.clone(), sanitize(v))).collect()
}

/// Classify a single text leaf.
///
/// Tries a number first, then a `month/day/year` date, and otherwise keeps
/// the original string.
pub fn sanitize_text(s: &str) -> Value {
    if let Some(n) = parse_number(s) {
        return Value::Number(n);
    }

    if let Some(date) = parse_date(s) {
        return Value::Date(DateValue::from_date(date));
    }

    Value::Text(s.to_string())
}

/// Sanitize an accumulated page record.
pub fn sanitize_record(raw: &RawRecord) -> FinalRecord {
    FinalRecord::from_map(sanitize_map(&raw.to_map()))
}

/// Sanitize an already sanitized record again.
pub fn resanitize(record: &FinalRecord) -> FinalRecord {
    FinalRecord::from_map(sanitize_map(record.as_map()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{RawLineItem, LINE_ITEMS_FIELD};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn raw_record() -> RawRecord {
        let mut raw = RawRecord::new();
        raw.set("invoiceNo", "1075379");
        raw.set("invoiceDate", "09/01/21");
        raw.set("soldTo", "MEEKAJAY INC");
        raw.set("totalAmount", "25,399.25");
        raw.push_item(RawLineItem {
            gas_type_name: "REGULAR".to_string(),
            product_code: 121,
            quantity: "6,577.0".to_string(),
            price: "2.302401".to_string(),
            total: "15,142.89".to_string(),
        });
        raw
    }

    #[test]
    fn test_sanitize_number() {
        assert_eq!(sanitize_text("7,662.0"), Value::Number(7662.0));
    }

    #[test]
    fn test_sanitize_empty_string_is_zero() {
        assert_eq!(sanitize_text(""), Value::Number(0.0));
    }

    #[test]
    fn test_sanitize_date() {
        let value = sanitize_text("09/01/21");
        let date = value.as_date().unwrap();

        assert_eq!(date.naive_date(), NaiveDate::from_ymd_opt(2021, 9, 1).unwrap());
        assert_eq!((date.parts.month, date.parts.date, date.parts.year), (9, 1, 2021));
    }

    #[test]
    fn test_sanitize_keeps_text() {
        assert_eq!(sanitize_text("MEEKAJAY INC"), Value::Text("MEEKAJAY INC".to_string()));
        assert_eq!(sanitize_text("A/B/C"), Value::Text("A/B/C".to_string()));
    }

    #[test]
    fn test_sanitize_record() {
        let record = sanitize_record(&raw_record());

        assert_eq!(record.number("invoiceNo"), Some(1_075_379.0));
        assert_eq!(record.number("totalAmount"), Some(25399.25));
        assert_eq!(record.text("soldTo"), Some("MEEKAJAY INC"));
        assert!(record.date("invoiceDate").is_some());

        let item = record.line_items().next().unwrap();
        assert_eq!(item.get("gasTypeName"), Some(&Value::Text("REGULAR".to_string())));
        assert_eq!(item.get("productCode"), Some(&Value::Number(121.0)));
        assert_eq!(item.get("quantity"), Some(&Value::Number(6577.0)));
        assert_eq!(item.get("price"), Some(&Value::Number(2.302401)));
        assert_eq!(item.get("total"), Some(&Value::Number(15142.89)));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_record(&raw_record());
        let twice = resanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_preserves_shape() {
        let mut inner = ValueMap::new();
        inner.insert("a", Value::from("1"));
        inner.insert("b", Value::List(vec![Value::from("x"), Value::from("2,000")]));

        let value = sanitize(&Value::Map(inner));
        let map = value.as_map().unwrap();

        assert_eq!(map.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(
            map.get("b"),
            Some(&Value::List(vec![Value::from("x"), Value::Number(2000.0)]))
        );
    }

    #[test]
    fn test_sanitize_does_not_mutate_input() {
        let raw = raw_record();
        let before = raw.clone();
        let _ = sanitize_record(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_empty_record_keeps_item_list() {
        let record = sanitize_record(&RawRecord::new());
        assert_eq!(record.get(LINE_ITEMS_FIELD), Some(&Value::List(Vec::new())));
    }
}
