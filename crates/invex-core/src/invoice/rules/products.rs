//! Product line item rules.

use crate::error::ExtractionError;
use crate::models::record::{RawLine, RawLineItem};

use super::patterns::NUMERIC_TOKEN;

/// Line item rule anchored on a literal product description.
///
/// The anchor is a substring match: any line containing it is a candidate,
/// and the three whitespace-delimited tokens after it are read positionally
/// as quantity, unit price and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRule {
    anchor: String,
    name: String,
    product_code: u32,
}

impl ProductRule {
    pub fn new(anchor: impl Into<String>, name: impl Into<String>, product_code: u32) -> Self {
        Self {
            anchor: anchor.into(),
            name: name.into(),
            product_code,
        }
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_code(&self) -> u32 {
        self.product_code
    }

    /// Match a line against this rule.
    ///
    /// Returns `Ok(None)` when the anchor is absent and
    /// [`ExtractionError::MalformedProductLine`] when the anchor is present
    /// but not followed by exactly three numeric tokens.
    pub fn match_line(&self, line: RawLine<'_>) -> Result<Option<RawLineItem>, ExtractionError> {
        let Some(start) = line.text.find(&self.anchor) else {
            return Ok(None);
        };

        let tail = &line.text[start + self.anchor.len()..];
        let tokens: Vec<&str> = tail.split_whitespace().collect();

        match tokens.as_slice() {
            [quantity, price, total] if tokens.iter().all(|t| NUMERIC_TOKEN.is_match(t)) => {
                Ok(Some(RawLineItem {
                    gas_type_name: self.name.clone(),
                    product_code: self.product_code,
                    quantity: quantity.to_string(),
                    price: price.to_string(),
                    total: total.to_string(),
                }))
            }
            _ => Err(ExtractionError::MalformedProductLine {
                line: line.ordinal,
                anchor: self.anchor.clone(),
                tail: tail.trim().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn regular() -> ProductRule {
        ProductRule::new("10% ETHANOL REGULAR", "REGULAR", 121)
    }

    #[test]
    fn test_match_product_line() {
        let line = RawLine::new(
            18,
            "10% ETHANOL REGULAR                         6,577.0     2.302401    15,142.89",
        );

        let item = regular().match_line(line).unwrap().unwrap();

        assert_eq!(
            item,
            RawLineItem {
                gas_type_name: "REGULAR".to_string(),
                product_code: 121,
                quantity: "6,577.0".to_string(),
                price: "2.302401".to_string(),
                total: "15,142.89".to_string(),
            }
        );
    }

    #[test]
    fn test_anchor_absent() {
        let line = RawLine::new(1, "     GA EXCISE GAS                          7,662.0      .287000     2,199.00");
        assert_eq!(regular().match_line(line), Ok(None));
    }

    #[test]
    fn test_anchor_inside_line() {
        let rule = ProductRule::new("ETHANOL REGULAR", "REGULAR", 121);
        let line = RawLine::new(1, "10% ETHANOL REGULAR   5,428.0  2.281000  12,381.27");

        let item = rule.match_line(line).unwrap().unwrap();
        assert_eq!(item.quantity, "5,428.0");
    }

    #[test]
    fn test_two_tokens_is_malformed() {
        let line = RawLine::new(7, "10% ETHANOL REGULAR   6,577.0  2.302401");

        assert_eq!(
            regular().match_line(line),
            Err(ExtractionError::MalformedProductLine {
                line: 7,
                anchor: "10% ETHANOL REGULAR".to_string(),
                tail: "6,577.0  2.302401".to_string(),
            })
        );
    }

    #[test]
    fn test_four_tokens_is_malformed() {
        let line = RawLine::new(2, "10% ETHANOL REGULAR   6,577.0  2.302401  15,142.89  1.00");
        assert!(matches!(
            regular().match_line(line),
            Err(ExtractionError::MalformedProductLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_non_numeric_tokens_are_malformed() {
        let line = RawLine::new(3, "10% ETHANOL REGULAR GASOLINE BLEND UNLEADED");
        assert!(regular().match_line(line).is_err());
    }
}
