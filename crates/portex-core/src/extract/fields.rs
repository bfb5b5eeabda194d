//! Field extraction - pulls typed fields out of free row text.
//!
//! First match wins per field, scanning rows top-to-bottom and tokens left to
//! right. Numeric values are token-anchored: a decimal embedded inside a
//! larger token (such as a coupon date range) never counts as a price.

use regex::Regex;

use crate::models::config::ExtractorConfig;
use crate::models::security::{Identifier, IdentifierKind, SecurityRecord};

use super::patterns::{
    self, DECIMAL_TOKEN, ISIN, MATURITY_LABELLED, PERCENT_TOKEN, VALORN_LABELLED,
};

/// Extracts typed fields from row text into a [`SecurityRecord`].
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    currencies: Vec<String>,
    currency_re: Regex,
    grouped_re: Regex,
}

impl FieldExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            currencies: config.currencies.clone(),
            currency_re: patterns::currency_regex(&config.currencies),
            grouped_re: patterns::grouped_number_regex(&config.grouping_separators),
        }
    }

    /// Consume one row (or fragment) of text belonging to `record`.
    ///
    /// Already-set fields are never overwritten; ambiguous extra numbers
    /// beyond the two price/value slots are discarded.
    pub fn apply(&self, record: &mut SecurityRecord, text: &str) {
        // Identifier: ISIN first, Valorn only behind its label.
        if record.isin().is_none() {
            if let Some(m) = ISIN.find(text) {
                record.identifiers.push(Identifier::isin(m.as_str()));
            }
        }
        if !record
            .identifiers
            .iter()
            .any(|i| i.kind == IdentifierKind::Valorn)
        {
            if let Some(caps) = VALORN_LABELLED.captures(text) {
                record.identifiers.push(Identifier::valorn(&caps[1]));
            }
        }

        // Currency: first occurrence wins.
        if record.currency.is_none() {
            if let Some(m) = self.currency_re.find(text) {
                record.currency = Some(m.as_str().to_string());
            } else if self.currencies.iter().any(|c| c == "USD")
                && text.split_whitespace().any(|t| t == "USO")
            {
                // Common OCR misread of USD.
                record.currency = Some("USD".to_string());
            }
        }

        // Maturity date only when labelled.
        if record.maturity_date.is_none() {
            if let Some(caps) = MATURITY_LABELLED.captures(text) {
                record.maturity_date = Some(caps[1].to_string());
            }
        }

        // Numeric tokens, left to right. Grouped numbers claim the
        // quantity/market-value slots; bare decimals fill unit price first,
        // then market value. Originals are kept verbatim.
        for token in text.split_whitespace() {
            if self.grouped_re.is_match(token) {
                if record.quantity.is_none() {
                    record.quantity = Some(token.to_string());
                } else if record.market_value.is_none() {
                    record.market_value = Some(token.to_string());
                }
            } else if DECIMAL_TOKEN.is_match(token) {
                if record.unit_price.is_none() {
                    record.unit_price = Some(token.to_string());
                } else if record.market_value.is_none() {
                    record.market_value = Some(token.to_string());
                }
            } else if PERCENT_TOKEN.is_match(token) && record.performance_pct.is_none() {
                record.performance_pct = Some(token.to_string());
            }
        }
    }
}

/// Strip the configured grouping separators and parse as a float. Used by the
/// validator and by round-trip checks; extraction itself never converts.
pub fn parse_grouped(value: &str, separators: &[char]) -> Option<f64> {
    let cleaned: String = value.chars().filter(|c| !separators.contains(c)).collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(&ExtractorConfig::default())
    }

    #[test]
    fn test_full_structured_note_row() {
        let mut record = SecurityRecord::open(
            "NATIXIS STRUC.NOTES 19-20.6.26 VRN ON 4,75%METLIFE",
            14,
        );
        extractor().apply(
            &mut record,
            "NATIXIS STRUC.NOTES 19-20.6.26 VRN ON 4,75%METLIFE ISIN: XS1700087403 100'000 99.555 USD",
        );

        assert_eq!(record.isin(), Some("XS1700087403"));
        assert_eq!(record.quantity.as_deref(), Some("100'000"));
        assert_eq!(record.unit_price.as_deref(), Some("99.555"));
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.market_value, None);
    }

    #[test]
    fn test_embedded_decimal_not_a_price() {
        // "20.6" inside the coupon date range must not become a unit price.
        let mut record = SecurityRecord::open("X", 1);
        extractor().apply(&mut record, "NOTES 19-20.6.26 VRN");
        assert_eq!(record.unit_price, None);
    }

    #[test]
    fn test_decimal_fallthrough_to_market_value() {
        let mut record = SecurityRecord::open("X", 1);
        extractor().apply(&mut record, "99.555 482'000.00 1.02 3.33");
        // Grouped number takes quantity; first decimal is the price; the
        // second falls through to market value; the third is discarded.
        assert_eq!(record.quantity.as_deref(), Some("482'000.00"));
        assert_eq!(record.unit_price.as_deref(), Some("99.555"));
        assert_eq!(record.market_value.as_deref(), Some("1.02"));
    }

    #[test]
    fn test_grouped_numbers_fill_quantity_then_market_value() {
        let mut record = SecurityRecord::open("X", 1);
        extractor().apply(&mut record, "100'000 USD 99'533");
        assert_eq!(record.quantity.as_deref(), Some("100'000"));
        assert_eq!(record.market_value.as_deref(), Some("99'533"));
        assert_eq!(record.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_labelled_valorn_and_maturity() {
        let mut record = SecurityRecord::open("X", 1);
        extractor().apply(&mut record, "Valorn.: 39877135 Maturity: 20.06.2026");
        assert_eq!(
            record.identifiers,
            vec![Identifier::valorn("39877135")]
        );
        assert_eq!(record.maturity_date.as_deref(), Some("20.06.2026"));

        // Unlabelled digits and dates stay out.
        let mut record = SecurityRecord::open("X", 1);
        extractor().apply(&mut record, "39877135 20.06.2026");
        assert!(record.identifiers.is_empty());
        assert_eq!(record.maturity_date, None);
    }

    #[test]
    fn test_performance_percentage() {
        let mut record = SecurityRecord::open("X", 1);
        extractor().apply(&mut record, "-1.33% 0.55%");
        assert_eq!(record.performance_pct.as_deref(), Some("-1.33%"));
    }

    #[test]
    fn test_fields_accumulate_across_rows() {
        let mut record = SecurityRecord::open("X", 1);
        let ex = extractor();
        ex.apply(&mut record, "ISIN: XS2692298537");
        ex.apply(&mut record, "200'000 CHF");
        ex.apply(&mut record, "ISIN: XS9999999999 100.10");

        // First match per field wins across rows.
        assert_eq!(record.isin(), Some("XS2692298537"));
        assert_eq!(record.quantity.as_deref(), Some("200'000"));
        assert_eq!(record.currency.as_deref(), Some("CHF"));
        assert_eq!(record.unit_price.as_deref(), Some("100.10"));
    }

    #[test]
    fn test_ocr_currency_misread() {
        let mut record = SecurityRecord::open("X", 1);
        extractor().apply(&mut record, "100'000 USO 99.555");
        assert_eq!(record.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_numeric_round_trip() {
        let separators = ['\'', ','];
        assert_eq!(parse_grouped("100'000", &separators), Some(100000.0));
        assert_eq!(parse_grouped("10,700,000", &separators), Some(10700000.0));
        assert_eq!(
            parse_grouped("1'234'567.89", &separators),
            Some(1234567.89)
        );
        assert_eq!(parse_grouped("n/a", &separators), None);
    }
}
