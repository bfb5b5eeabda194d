//! Common regex patterns for securities extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ISIN: 2 letters + 10 alphanumerics. Search form and anchored token form.
    pub static ref ISIN: Regex = Regex::new(
        r"[A-Z]{2}\d{10}"
    ).unwrap();

    pub static ref ISIN_TOKEN: Regex = Regex::new(
        r"^[A-Z]{2}\d{10}$"
    ).unwrap();

    // Valorn code, only when labelled (standalone digit runs are ambiguous).
    pub static ref VALORN_LABELLED: Regex = Regex::new(
        r"(?i)Valorn\.?\s*:?\s*(\d{6,10})"
    ).unwrap();

    // Maturity date, only when labelled.
    pub static ref MATURITY_LABELLED: Regex = Regex::new(
        r"(?i)Maturity\s*:?\s*(\d{2}\.\d{2}\.\d{4})"
    ).unwrap();

    // Decimal-formatted number as a standalone token (price-like).
    pub static ref DECIMAL_TOKEN: Regex = Regex::new(
        r"^\d+\.\d{2,6}$"
    ).unwrap();

    // Decimal-number token used for name-boundary detection. Start-anchored
    // only, so prices with extra decimals (99.555) still terminate the name.
    pub static ref PRICE_BOUNDARY_TOKEN: Regex = Regex::new(
        r"^\d+\.\d{2}"
    ).unwrap();

    // Grouped-number token form used for name-boundary detection. Covers the
    // common separator set regardless of the configured extraction set.
    pub static ref GROUPED_BOUNDARY_TOKEN: Regex = Regex::new(
        r"^\d{1,3}(?:['’,]\d{3})+(?:\.\d+)?$"
    ).unwrap();

    // Performance percentage as a standalone token.
    pub static ref PERCENT_TOKEN: Regex = Regex::new(
        r"^-?\d+\.\d+%$"
    ).unwrap();

    // Loose date fragment (detector feature, not a typed field).
    pub static ref DATE_FRAGMENT: Regex = Regex::new(
        r"\d{2,4}[-.]\d{2}[-.]\d{2,4}"
    ).unwrap();

    // Loose percentage fragment (detector feature).
    pub static ref PERCENT_FRAGMENT: Regex = Regex::new(
        r"\d+\.?\d*%"
    ).unwrap();

    // Issuer-like suffix words.
    pub static ref ISSUER_SUFFIX: Regex = Regex::new(
        r"(?i)\b(bank|capital|group|corp|ltd|inc|ag|sa)\b"
    ).unwrap();

    // Instrument-type words.
    pub static ref INSTRUMENT_WORD: Regex = Regex::new(
        r"(?i)\b(notes?|bonds?|fund|equity|structured)\b"
    ).unwrap();

    // Plain decimal accepted by the numeric-format validation check.
    pub static ref PLAIN_NUMBER: Regex = Regex::new(
        r"^\d+(?:\.\d+)?$"
    ).unwrap();
}

/// Build the grouped-number token regex for a separator set, e.g.
/// `100'000` or `1,234,567.89` for the default `'` and `,`.
pub fn grouped_number_regex(separators: &[char]) -> Regex {
    let class: String = separators.iter().map(|c| regex::escape(&c.to_string())).collect();
    Regex::new(&format!(r"^\d{{1,3}}(?:[{}]\d{{3}})+(?:\.\d+)?$", class))
        .expect("grouped-number pattern must compile")
}

/// Build the currency-code search regex from a configured code list.
pub fn currency_regex(currencies: &[String]) -> Regex {
    let alternation = currencies
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({})\b", alternation)).expect("currency pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isin_token() {
        assert!(ISIN_TOKEN.is_match("XS1700087403"));
        assert!(!ISIN_TOKEN.is_match("XS170008740"));
        assert!(!ISIN_TOKEN.is_match("ISIN:"));
    }

    #[test]
    fn test_valorn_labelled() {
        let caps = VALORN_LABELLED.captures("Valorn.: 39877135").unwrap();
        assert_eq!(&caps[1], "39877135");
        assert!(VALORN_LABELLED.captures("just 39877135").is_none());
    }

    #[test]
    fn test_grouped_number() {
        let re = grouped_number_regex(&['\'', ',']);
        assert!(re.is_match("100'000"));
        assert!(re.is_match("10,700,000"));
        assert!(re.is_match("1'234'567.89"));
        assert!(!re.is_match("99.555"));
        assert!(!re.is_match("1000"));
        assert!(!re.is_match("12'34"));
    }

    #[test]
    fn test_price_boundary_token() {
        assert!(PRICE_BOUNDARY_TOKEN.is_match("99.55"));
        assert!(PRICE_BOUNDARY_TOKEN.is_match("99.555"));
        assert!(!PRICE_BOUNDARY_TOKEN.is_match("19-20.6.26"));
        assert!(!PRICE_BOUNDARY_TOKEN.is_match("2030"));
    }

    #[test]
    fn test_decimal_token() {
        assert!(DECIMAL_TOKEN.is_match("99.555"));
        assert!(DECIMAL_TOKEN.is_match("0.25"));
        assert!(!DECIMAL_TOKEN.is_match("19-20.6.26"));
        assert!(!DECIMAL_TOKEN.is_match("99.5555555"));
    }

    #[test]
    fn test_percent_token() {
        assert!(PERCENT_TOKEN.is_match("-1.33%"));
        assert!(PERCENT_TOKEN.is_match("4.75%"));
        assert!(!PERCENT_TOKEN.is_match("4%"));
    }

    #[test]
    fn test_currency_regex() {
        let re = currency_regex(&["USD".into(), "EUR".into(), "CHF".into(), "GBP".into()]);
        assert_eq!(re.find("99.555 USD").unwrap().as_str(), "USD");
        assert!(re.find("USD100").is_none());
    }
}
