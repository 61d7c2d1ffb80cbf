//! Typed view of a stored invoice record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

use super::record::{FinalRecord, LINE_ITEMS_FIELD, RAW_TEXT_FIELD, Value, ValueMap};

/// A complete invoice as stored downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Invoice number.
    pub invoice_no: u64,

    /// Date the invoice was issued.
    pub invoice_date: NaiveDate,

    /// Ship date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<NaiveDate>,

    /// Profit center number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_center: Option<u64>,

    /// Customer the invoice is sold to.
    pub sold_to: String,

    /// Carrier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_via: Option<String>,

    /// First address line of the sold-to block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Invoice total.
    pub total_amount: Decimal,

    /// Customer account number.
    pub account_no: u64,

    /// Bill of lading number.
    pub bill_no: u64,

    /// Purchased products.
    pub list_of_purchases: Vec<Purchase>,

    /// Page text the record was extracted from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

/// A single purchased product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Canonical product name.
    pub gas_type_name: String,

    /// Product code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<u32>,

    /// Quantity shipped.
    pub quantity: Decimal,

    /// Unit price.
    pub price: Decimal,

    /// Extension.
    pub total: Decimal,
}

type Result<T> = std::result::Result<T, ExtractionError>;

fn missing(field: &str) -> ExtractionError {
    ExtractionError::MissingField(field.to_string())
}

fn unparsed(field: &str, value: &Value) -> ExtractionError {
    ExtractionError::Parse {
        field: field.to_string(),
        value: serde_json::to_string(value).unwrap_or_default(),
    }
}

fn whole_number(map: &ValueMap, field: &str) -> Result<Option<u64>> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::Number(n)) if *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64 => {
            Ok(Some(*n as u64))
        }
        Some(other) => Err(unparsed(field, other)),
    }
}

fn amount(map: &ValueMap, field: &str) -> Result<Option<Decimal>> {
    match map.get(field) {
        None => Ok(None),
        Some(value @ Value::Number(n)) => Decimal::from_f64(*n)
            .map(Some)
            .ok_or_else(|| unparsed(field, value)),
        Some(other) => Err(unparsed(field, other)),
    }
}

fn text(map: &ValueMap, field: &str) -> Result<Option<String>> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::Text(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(unparsed(field, other)),
    }
}

fn date(map: &ValueMap, field: &str) -> Result<Option<NaiveDate>> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::Date(d)) => Ok(Some(d.naive_date())),
        Some(other) => Err(unparsed(field, other)),
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| missing(field))
}

impl Purchase {
    /// Convert a sanitized line item. Missing amounts default to zero.
    pub fn from_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            gas_type_name: required(text(map, "gasTypeName")?, "gasTypeName")?,
            product_code: whole_number(map, "productCode")?.and_then(|c| u32::try_from(c).ok()),
            quantity: amount(map, "quantity")?.unwrap_or_default(),
            price: amount(map, "price")?.unwrap_or_default(),
            total: amount(map, "total")?.unwrap_or_default(),
        })
    }
}

impl Invoice {
    /// Convert a sanitized page record into the stored invoice shape.
    pub fn from_record(record: &FinalRecord) -> Result<Self> {
        let map = record.as_map();

        let list_of_purchases = match map.get(LINE_ITEMS_FIELD) {
            None => Vec::new(),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Map(m) => Purchase::from_map(m),
                    other => Err(unparsed(LINE_ITEMS_FIELD, other)),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => return Err(unparsed(LINE_ITEMS_FIELD, other)),
        };

        Ok(Self {
            invoice_no: required(whole_number(map, "invoiceNo")?, "invoiceNo")?,
            invoice_date: required(date(map, "invoiceDate")?, "invoiceDate")?,
            ship_date: date(map, "date")?,
            profit_center: whole_number(map, "profitCenter")?,
            sold_to: required(text(map, "soldTo")?, "soldTo")?,
            ship_via: text(map, "shipVia")?,
            to: text(map, "to")?,
            total_amount: required(amount(map, "totalAmount")?, "totalAmount")?,
            account_no: required(whole_number(map, "accountNo")?, "accountNo")?,
            bill_no: required(whole_number(map, "billNo")?, "billNo")?,
            list_of_purchases,
            raw_text: text(map, RAW_TEXT_FIELD)?,
        })
    }

    /// Sum of the purchase extensions.
    pub fn purchases_total(&self) -> Decimal {
        self.list_of_purchases.iter().map(|p| p.total).sum()
    }

    /// Validate the invoice data and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.sold_to.is_empty() {
            issues.push("Missing sold-to customer".to_string());
        }

        if self.list_of_purchases.is_empty() {
            issues.push("No purchases".to_string());
        }

        if self.total_amount <= Decimal::ZERO {
            issues.push("Total amount is not positive".to_string());
        }

        let tolerance = Decimal::new(1, 2);
        for purchase in &self.list_of_purchases {
            let expected = (purchase.quantity * purchase.price).round_dp(2);
            if (expected - purchase.total).abs() > tolerance {
                issues.push(format!(
                    "{} total ({}) differs from quantity x price ({})",
                    purchase.gas_type_name, purchase.total, expected
                ));
            }
        }

        // Taxes and fees are separate lines, so purchases may sum below the
        // invoice total but never above it.
        let purchases_total = self.purchases_total();
        if purchases_total - self.total_amount > tolerance {
            issues.push(format!(
                "Purchases total ({}) exceeds invoice total ({})",
                purchases_total, self.total_amount
            ));
        }

        issues
    }
}
