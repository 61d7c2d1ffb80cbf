//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::invoice::rules::patterns::{BILL_OF_LADING_SOURCE, SOLD_TO_SOURCE};

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Rule table configuration.
    pub rules: RulesConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Ordered rule definitions. Order is significant: later rules overwrite
/// earlier ones for the same field, and every matching product rule adds a
/// line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Named patterns for labels that don't fit `label: value`.
    pub custom_fields: Vec<CustomFieldDef>,

    /// Line-item anchors.
    pub products: Vec<ProductDef>,
}

/// A custom field rule: the first capture group becomes the field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldDef {
    /// Regular expression (regex crate syntax).
    pub pattern: String,
    /// Canonical field name to set.
    pub field_name: String,
}

/// A product rule anchored on a literal substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDef {
    /// Text that identifies the line item.
    pub anchor_text: String,
    /// Canonical line item name.
    pub name: String,
    /// Numeric product code.
    pub product_code: u32,
}

impl CustomFieldDef {
    pub fn new(pattern: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            field_name: field_name.into(),
        }
    }
}

impl ProductDef {
    pub fn new(anchor_text: impl Into<String>, name: impl Into<String>, product_code: u32) -> Self {
        Self {
            anchor_text: anchor_text.into(),
            name: name.into(),
            product_code,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            custom_fields: vec![
                CustomFieldDef::new(SOLD_TO_SOURCE, "soldTo"),
                CustomFieldDef::new(BILL_OF_LADING_SOURCE, "billNo"),
            ],
            products: vec![
                ProductDef::new("10% ETHANOL REGULAR", "REGULAR", 121),
                ProductDef::new("10% ETHANOL SUPER", "SUPER", 123),
                ProductDef::new("ON RD DIESEL 15 PPM", "DIESEL", 211),
                ProductDef::new("SOMETHING ETHANOL REGULAR", "REGULAR", 404),
            ],
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Attach the joined page text to every record.
    pub attach_raw_text: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            attach_raw_text: false,
            pretty: true,
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
