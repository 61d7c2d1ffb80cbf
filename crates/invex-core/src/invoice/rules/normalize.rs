//! Label to canonical field key normalization.

/// Normalize a document label to a canonical camel-case key.
///
/// The first character is lower-cased, the first character of every later
/// word is upper-cased, and all whitespace is removed:
///
/// - `"Invoice No"` -> `"invoiceNo"`
/// - `"Ship    Date"` -> `"shipDate"`
/// - `"B/L"` -> `"b/L"`
///
/// Letters other than word starts keep their case. Never fails; an empty
/// label normalizes to an empty key.
pub fn normalize_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    let mut prev_is_word = false;

    for (i, c) in label.chars().enumerate() {
        let is_word = is_word_char(c);

        if i == 0 {
            if is_word {
                key.push(c.to_ascii_lowercase());
            } else if !c.is_whitespace() {
                key.push(c);
            }
        } else if c.is_whitespace() {
            // dropped
        } else if is_word && !prev_is_word {
            key.push(c.to_ascii_uppercase());
        } else {
            key.push(c);
        }

        prev_is_word = is_word;
    }

    key
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_labels() {
        assert_eq!(normalize_key("Invoice No"), "invoiceNo");
        assert_eq!(normalize_key("Invoice Date"), "invoiceDate");
        assert_eq!(normalize_key("Total Amount"), "totalAmount");
        assert_eq!(normalize_key("Profit Center"), "profitCenter");
        assert_eq!(normalize_key("Ship Via"), "shipVia");
        assert_eq!(normalize_key("To"), "to");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_key("Ship    Date"), "shipDate");
        assert_eq!(normalize_key("Account No "), "accountNo");
    }

    #[test]
    fn test_normalize_keeps_inner_case() {
        assert_eq!(normalize_key("BOL/Ship.Order"), "bOL/Ship.Order");
        assert_eq!(normalize_key("B/L"), "b/L");
        assert_eq!(normalize_key("sales ID"), "salesID");
    }

    #[test]
    fn test_normalize_non_word_start() {
        assert_eq!(normalize_key("(gross) total"), "(Gross)Total");
        assert_eq!(normalize_key(" lead"), "Lead");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("   "), "");
    }
}
