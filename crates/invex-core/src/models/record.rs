//! Raw and sanitized page records.
//!
//! A page is first accumulated into a [`RawRecord`] (strings plus raw line
//! items), then converted into the tagged [`Value`] tree that the sanitizer
//! walks, and finally wrapped as a [`FinalRecord`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// Field holding the line items of a page.
pub const LINE_ITEMS_FIELD: &str = "listOfPurchases";

/// Field holding the joined page text, when attached.
pub const RAW_TEXT_FIELD: &str = "rawText";

/// Suffix of the serialized date/time half of a date expansion.
pub const DATE_TIME_SUFFIX: &str = "Time";

/// Suffix of the serialized decomposed half of a date expansion.
pub const DATE_OBJ_SUFFIX: &str = "Obj";

/// A single text line and its 1-based position on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// Position within the page, starting at 1.
    pub ordinal: usize,
    /// Line text as delivered by the page reader.
    pub text: &'a str,
}

impl<'a> RawLine<'a> {
    pub fn new(ordinal: usize, text: &'a str) -> Self {
        Self { ordinal, text }
    }
}

/// One purchased product row, amounts still in document form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLineItem {
    /// Canonical product name from the matching rule.
    pub gas_type_name: String,
    /// Numeric product code from the matching rule.
    pub product_code: u32,
    /// Quantity shipped.
    pub quantity: String,
    /// Unit price.
    pub price: String,
    /// Extension (quantity times price, as printed).
    pub total: String,
}

impl RawLineItem {
    fn to_value(&self) -> Value {
        let mut map = ValueMap::new();
        map.insert("gasTypeName", Value::Text(self.gas_type_name.clone()));
        map.insert("productCode", Value::Number(f64::from(self.product_code)));
        map.insert("quantity", Value::Text(self.quantity.clone()));
        map.insert("price", Value::Text(self.price.clone()));
        map.insert("total", Value::Text(self.total.clone()));
        Value::Map(map)
    }
}

/// Record accumulated from one page before sanitizing.
///
/// Scalar fields are last-match-wins; line items are append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
    line_items: Vec<RawLineItem>,
}

impl RawRecord {
    /// Create an empty record with an empty line-item list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a scalar field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Set a scalar field, returning the value it replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(key.into(), value.into())
    }

    /// Append a line item.
    pub fn push_item(&mut self, item: RawLineItem) {
        self.line_items.push(item);
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn line_items(&self) -> &[RawLineItem] {
        &self.line_items
    }

    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.line_items.is_empty()
    }

    /// Convert into the tagged value tree walked by the sanitizer.
    pub fn to_value(&self) -> Value {
        Value::Map(self.to_map())
    }

    /// Convert into a map of text leaves plus the line-item list.
    pub fn to_map(&self) -> ValueMap {
        let mut map: ValueMap = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::Text(v.clone())))
            .collect();

        map.insert(
            LINE_ITEMS_FIELD,
            Value::List(self.line_items.iter().map(RawLineItem::to_value).collect()),
        );

        map
    }
}

/// Decomposed calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    pub month: u32,
    pub date: u32,
    pub year: i32,
    /// Milliseconds since the Unix epoch at midnight UTC of the date.
    pub timestamp: i64,
}

/// A field recognized as a `month/day/year` date.
///
/// Inside a map it serializes as two sibling keys, `<field>Time` and
/// `<field>Obj`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateValue {
    /// The date at midnight UTC.
    pub time: DateTime<Utc>,
    #[serde(rename = "obj")]
    pub parts: DateParts,
}

impl DateValue {
    pub fn from_date(date: NaiveDate) -> Self {
        use chrono::Datelike;

        let time = date.and_time(NaiveTime::MIN).and_utc();
        Self {
            time,
            parts: DateParts {
                month: date.month(),
                date: date.day(),
                year: date.year(),
                timestamp: time.timestamp_millis(),
            },
        }
    }

    pub fn naive_date(&self) -> NaiveDate {
        self.time.date_naive()
    }
}

/// Tagged value tree of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Date(DateValue),
    Text(String),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serialize_number(*n, serializer),
            Value::Date(d) => d.serialize(serializer),
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

/// Integral numbers are written without a fractional part.
fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

/// Keyed values, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap(BTreeMap<String, Value>);

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl ValueMap {
    /// Keys written by date expansions.
    fn expanded_keys(&self) -> BTreeSet<String> {
        self.0
            .iter()
            .filter(|(_, v)| matches!(v, Value::Date(_)))
            .flat_map(|(k, _)| [format!("{k}{DATE_TIME_SUFFIX}"), format!("{k}{DATE_OBJ_SUFFIX}")])
            .collect()
    }
}

/// A date expansion owns its `<key>Time` / `<key>Obj` keys; a plain field
/// with the same name is not written.
impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let expanded = self.expanded_keys();
        let plain = self
            .0
            .iter()
            .filter(|(k, v)| !matches!(v, Value::Date(_)) && !expanded.contains(k.as_str()))
            .count();
        let mut map = serializer.serialize_map(Some(expanded.len() + plain))?;

        for (key, value) in &self.0 {
            match value {
                Value::Date(date) => {
                    map.serialize_entry(&format!("{key}{DATE_TIME_SUFFIX}"), &date.time)?;
                    map.serialize_entry(&format!("{key}{DATE_OBJ_SUFFIX}"), &date.parts)?;
                }
                _ if expanded.contains(key.as_str()) => {}
                other => map.serialize_entry(key, other)?,
            }
        }

        map.end()
    }
}

/// Sanitized record of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FinalRecord(ValueMap);

impl FinalRecord {
    pub fn from_map(map: ValueMap) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &ValueMap {
        &self.0
    }

    pub fn into_map(self) -> ValueMap {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric field.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_number)
    }

    /// Field that stayed textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    /// Field expanded into a date pair.
    pub fn date(&self, key: &str) -> Option<&DateValue> {
        self.get(key).and_then(Value::as_date)
    }

    /// Sanitized line items.
    pub fn line_items(&self) -> impl Iterator<Item = &ValueMap> {
        self.get(LINE_ITEMS_FIELD)
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_map)
    }

    /// Attach the page text the record was extracted from.
    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.0.insert(RAW_TEXT_FIELD, Value::Text(text.into()));
        self
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_raw_record_last_match_wins() {
        let mut record = RawRecord::new();
        assert_eq!(record.set("page", "1"), None);
        assert_eq!(record.set("page", "2"), Some("1".to_string()));
        assert_eq!(record.get("page"), Some("2"));
    }

    #[test]
    fn test_raw_record_to_value_has_empty_items() {
        let value = RawRecord::new().to_value();
        let map = value.as_map().unwrap();
        assert_eq!(map.get(LINE_ITEMS_FIELD), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_date_value_parts() {
        let date = DateValue::from_date(NaiveDate::from_ymd_opt(2021, 9, 1).unwrap());
        assert_eq!(date.parts.month, 9);
        assert_eq!(date.parts.date, 1);
        assert_eq!(date.parts.year, 2021);
        assert_eq!(date.parts.timestamp, 1_630_454_400_000);
    }

    #[test]
    fn test_date_serializes_as_pair() {
        let mut map = ValueMap::new();
        map.insert(
            "invoiceDate",
            Value::Date(DateValue::from_date(NaiveDate::from_ymd_opt(2021, 9, 1).unwrap())),
        );

        let json = serde_json::to_value(FinalRecord::from_map(map)).unwrap();

        assert_eq!(
            json,
            json!({
                "invoiceDateTime": "2021-09-01T00:00:00Z",
                "invoiceDateObj": {
                    "month": 9,
                    "date": 1,
                    "year": 2021,
                    "timestamp": 1_630_454_400_000i64
                }
            })
        );
    }

    #[test]
    fn test_date_expansion_shadows_plain_field() {
        let mut map = ValueMap::new();
        map.insert(
            "invoiceDate",
            Value::Date(DateValue::from_date(NaiveDate::from_ymd_opt(2021, 9, 1).unwrap())),
        );
        map.insert("invoiceDateTime", Value::from("morning"));
        map.insert("invoiceDateObj", Value::Number(3.0));
        map.insert("page", Value::Number(1.0));

        let text = serde_json::to_string(&FinalRecord::from_map(map)).unwrap();

        assert_eq!(text.matches(r#""invoiceDateTime""#).count(), 1);
        assert_eq!(text.matches(r#""invoiceDateObj""#).count(), 1);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["invoiceDateTime"], json!("2021-09-01T00:00:00Z"));
        assert_eq!(json["invoiceDateObj"]["month"], json!(9));
        assert_eq!(json["page"], json!(1));
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_integral_numbers_serialize_without_fraction() {
        assert_eq!(serde_json::to_string(&Value::Number(7662.0)).unwrap(), "7662");
        assert_eq!(serde_json::to_string(&Value::Number(2.5)).unwrap(), "2.5");
    }
}
