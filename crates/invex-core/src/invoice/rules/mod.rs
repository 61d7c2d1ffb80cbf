//! Rule table for fixed-layout invoice extraction.
//!
//! A [`RuleTable`] is an immutable, ordered set of rules built once from
//! configuration and shared by every page it is applied to. Several tables
//! (one per vendor layout) can coexist.

pub mod normalize;
pub mod patterns;
pub mod products;

pub use normalize::normalize_key;
pub use products::ProductRule;

use regex::Regex;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::config::RulesConfig;

use patterns::{BILL_OF_LADING, KEY_VALUE, SOLD_TO};

/// A named rule for labels that don't fit the generic `label: value` shape.
#[derive(Debug, Clone)]
pub struct CustomFieldRule {
    pattern: Regex,
    field_name: String,
}

impl CustomFieldRule {
    /// Compile a custom field rule. The pattern must have a capture group.
    pub fn new(pattern: &str, field_name: impl Into<String>) -> Result<Self, ConfigError> {
        let field_name = field_name.into();
        if field_name.trim().is_empty() {
            return Err(ConfigError::EmptyFieldName);
        }

        let pattern = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            field: field_name.clone(),
            source,
        })?;

        Self::from_regex(pattern, field_name)
    }

    fn from_regex(pattern: Regex, field_name: String) -> Result<Self, ConfigError> {
        if pattern.captures_len() < 2 {
            return Err(ConfigError::MissingCaptureGroup(field_name));
        }
        Ok(Self { pattern, field_name })
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Captured value for this rule's field, if the line matches.
    pub fn capture<'t>(&self, line: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// One rule of a table, in evaluation order.
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    /// Generic `label: value` pair.
    KeyValue(&'a Regex),
    /// Named field with an explicit pattern.
    CustomField(&'a CustomFieldRule),
    /// Line item anchored on a product description.
    Product(&'a ProductRule),
}

/// Immutable, ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    key_value: Regex,
    custom_fields: Vec<CustomFieldRule>,
    products: Vec<ProductRule>,
}

impl RuleTable {
    /// Built-in table for the default vendor layout.
    pub fn builtin() -> Self {
        let defaults = RulesConfig::default();

        Self {
            key_value: KEY_VALUE.clone(),
            custom_fields: vec![
                CustomFieldRule {
                    pattern: SOLD_TO.clone(),
                    field_name: "soldTo".to_string(),
                },
                CustomFieldRule {
                    pattern: BILL_OF_LADING.clone(),
                    field_name: "billNo".to_string(),
                },
            ],
            products: defaults
                .products
                .iter()
                .map(|p| ProductRule::new(p.anchor_text.clone(), p.name.clone(), p.product_code))
                .collect(),
        }
    }

    /// Compile a table from configuration, validating every rule.
    pub fn from_config(config: &RulesConfig) -> Result<Self, ConfigError> {
        let custom_fields = config
            .custom_fields
            .iter()
            .map(|def| CustomFieldRule::new(&def.pattern, def.field_name.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let products = config
            .products
            .iter()
            .map(|def| {
                if def.anchor_text.is_empty() {
                    return Err(ConfigError::EmptyAnchor(def.name.clone()));
                }
                Ok(ProductRule::new(
                    def.anchor_text.clone(),
                    def.name.clone(),
                    def.product_code,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Compiled rule table with {} custom fields and {} products",
            custom_fields.len(),
            products.len()
        );

        Ok(Self {
            key_value: KEY_VALUE.clone(),
            custom_fields,
            products,
        })
    }

    pub fn custom_fields(&self) -> &[CustomFieldRule] {
        &self.custom_fields
    }

    pub fn products(&self) -> &[ProductRule] {
        &self.products
    }

    /// All rules in evaluation order: the key-value rule, then custom
    /// fields in table order, then products in table order.
    pub fn rules(&self) -> impl Iterator<Item = Rule<'_>> {
        std::iter::once(Rule::KeyValue(&self.key_value))
            .chain(self.custom_fields.iter().map(Rule::CustomField))
            .chain(self.products.iter().map(Rule::Product))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
