//! Line extractor: applies a rule table to one line.

use tracing::trace;

use crate::error::ExtractionError;
use crate::models::record::{RawLine, RawLineItem, RawRecord};

use super::rules::{normalize_key, Rule, RuleTable};

/// Field updates produced by one line.
///
/// Updates are ordered: applying them in sequence means a later rule
/// overwrites an earlier one for the same field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDelta {
    /// Scalar field updates in rule order.
    pub fields: Vec<(String, String)>,
    /// Line items to append in rule order.
    pub line_items: Vec<RawLineItem>,
}

impl LineDelta {
    /// Check if the line matched no rule.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.line_items.is_empty()
    }

    /// Merge into a record: scalars overwrite, line items append.
    pub fn apply_to(self, record: &mut RawRecord) {
        for (key, value) in self.fields {
            record.set(key, value);
        }
        for item in self.line_items {
            record.push_item(item);
        }
    }
}

/// Applies every rule of a table to single lines.
///
/// Rules are evaluated in table order: the generic key-value rule first,
/// then each custom field rule, then each product rule. Every rule is tried
/// independently, so one line can set several fields and add several line
/// items. Product anchors are substring matches; a line containing two
/// configured anchors yields two line items.
#[derive(Debug, Clone, Copy)]
pub struct LineExtractor<'a> {
    rules: &'a RuleTable,
}

impl<'a> LineExtractor<'a> {
    pub fn new(rules: &'a RuleTable) -> Self {
        Self { rules }
    }

    /// Extract the updates for one line. The record is only read.
    pub fn extract(
        &self,
        line: RawLine<'_>,
        record: &RawRecord,
    ) -> Result<LineDelta, ExtractionError> {
        let mut delta = LineDelta::default();

        for rule in self.rules.rules() {
            match rule {
                Rule::KeyValue(pattern) => {
                    if let Some(caps) = pattern.captures(line.text) {
                        let key = normalize_key(&caps[1]);
                        self.push_field(&mut delta, record, line, key, &caps[2]);
                    }
                }
                Rule::CustomField(custom) => {
                    if let Some(value) = custom.capture(line.text) {
                        let key = custom.field_name().to_string();
                        self.push_field(&mut delta, record, line, key, value);
                    }
                }
                Rule::Product(product) => {
                    if let Some(item) = product.match_line(line)? {
                        trace!(
                            "Line {}: {} ({}) x {}",
                            line.ordinal, item.gas_type_name, item.product_code, item.quantity
                        );
                        delta.line_items.push(item);
                    }
                }
            }
        }

        Ok(delta)
    }

    fn push_field(
        &self,
        delta: &mut LineDelta,
        record: &RawRecord,
        line: RawLine<'_>,
        key: String,
        value: &str,
    ) {
        if let Some(previous) = record.get(&key) {
            trace!("Line {}: {} overwrites {:?} with {:?}", line.ordinal, key, previous, value);
        } else {
            trace!("Line {}: {} = {:?}", line.ordinal, key, value);
        }
        delta.fields.push((key, value.to_string()));
    }
}
