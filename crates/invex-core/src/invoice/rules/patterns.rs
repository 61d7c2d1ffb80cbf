//! Common regex patterns for fixed-layout invoice extraction.
//!
//! Labels and values are runs of words separated by single whitespace
//! characters. A run of two or more spaces ends them, which keeps a
//! multi-column line from being read as one `label: value` pair. A single
//! whitespace character at the end of the line stays part of the value.

use lazy_static::lazy_static;
use regex::Regex;

/// Generic `label: value` shape. Group 1 is the label, group 2 the value.
///
/// The label is at least two characters long and may end in a single
/// whitespace character before the colon.
pub const KEY_VALUE_SOURCE: &str = r"(\S(?:(?:\s?\S)+\s?|\s)):\s*(\S(?:\s?\S)*(?:\s$)?)";

/// "Sold <name>" heading of the sold-to block.
pub const SOLD_TO_SOURCE: &str = r"Sold (\S(?:(?:\s?\S)+(?:\s$)?|\s$))";

/// "B/L Number-- <id>" bill of lading line.
pub const BILL_OF_LADING_SOURCE: &str = r"B/L Number--\s+(.*)";

lazy_static! {
    pub static ref KEY_VALUE: Regex = Regex::new(KEY_VALUE_SOURCE).unwrap();

    pub static ref SOLD_TO: Regex = Regex::new(SOLD_TO_SOURCE).unwrap();

    pub static ref BILL_OF_LADING: Regex = Regex::new(BILL_OF_LADING_SOURCE).unwrap();

    // Quantity, price and extension tokens (6,577.0 / .287000 / 15,142.89)
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"^[-+]?(?:[\d,]*\.\d+|[\d,]*\d\.?)$"
    ).unwrap();

    // month/day/year with 2- or 4-digit year
    pub static ref DATE_MDY: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_value(line: &str) -> Option<(String, String)> {
        KEY_VALUE
            .captures(line)
            .map(|c| (c[1].to_string(), c[2].to_string()))
    }

    #[test]
    fn test_key_value_skips_column_gap() {
        assert_eq!(
            key_value("     520 SIXTH AVE                               Invoice No:    1075379"),
            Some(("Invoice No".to_string(), "1075379".to_string()))
        );
    }

    #[test]
    fn test_key_value_first_pair_wins() {
        assert_eq!(
            key_value("Account No:12290185     PO No:                   Terms: EFT NET 5 DAYS"),
            Some(("Account No".to_string(), "12290185".to_string()))
        );
    }

    #[test]
    fn test_key_value_label_after_gap() {
        assert_eq!(
            key_value("                                                 Ship    Date:  09/01/21"),
            Some(("Date".to_string(), "09/01/21".to_string()))
        );
    }

    #[test]
    fn test_key_value_value_stops_at_gap() {
        assert_eq!(
            key_value(" To: 1499 LAFAYETTE PKWY                     To: 1499 LAFAYETTE PKWY"),
            Some(("To".to_string(), "1499 LAFAYETTE PKWY".to_string()))
        );
    }

    #[test]
    fn test_key_value_keeps_single_trailing_space() {
        assert_eq!(
            key_value("Foo: bar "),
            Some(("Foo".to_string(), "bar ".to_string()))
        );
        assert_eq!(
            key_value("Terms: EFT NET 5 DAYS\t"),
            Some(("Terms".to_string(), "EFT NET 5 DAYS\t".to_string()))
        );
        assert_eq!(
            key_value("Foo: bar  "),
            Some(("Foo".to_string(), "bar".to_string()))
        );
    }

    #[test]
    fn test_key_value_requires_two_char_label() {
        assert_eq!(key_value("X: 5"), None);
        assert_eq!(key_value("Sold MEEKAJAY INC                           Ship MEEKAJAY INC"), None);
    }

    #[test]
    fn test_sold_to() {
        let caps = SOLD_TO
            .captures("Sold MEEKAJAY INC                           Ship MEEKAJAY INC")
            .unwrap();
        assert_eq!(&caps[1], "MEEKAJAY INC");

        assert_eq!(&SOLD_TO.captures("Sold MEEKAJAY INC ").unwrap()[1], "MEEKAJAY INC ");
        assert_eq!(&SOLD_TO.captures("Sold X ").unwrap()[1], "X ");
        assert!(SOLD_TO.captures("Sold X  Ship").is_none());
    }

    #[test]
    fn test_bill_of_lading() {
        let caps = BILL_OF_LADING.captures("  B/L Number--  176068592").unwrap();
        assert_eq!(&caps[1], "176068592");
    }

    #[test]
    fn test_numeric_token() {
        for token in ["6,577.0", "2.302401", "15,142.89", ".287000", "990.0", "5", "-3.5"] {
            assert!(NUMERIC_TOKEN.is_match(token), "{token}");
        }
        for token in ["", ",", ".", "-", "PPM", "1993a"] {
            assert!(!NUMERIC_TOKEN.is_match(token), "{token}");
        }
    }

    #[test]
    fn test_date_mdy() {
        assert!(DATE_MDY.is_match("09/01/21"));
        assert!(DATE_MDY.is_match("12/31/2021"));
        assert!(!DATE_MDY.is_match("BOL/Ship"));
        assert!(!DATE_MDY.is_match("1/2/3/4"));
        assert!(!DATE_MDY.is_match("1/2/123"));
    }
}
