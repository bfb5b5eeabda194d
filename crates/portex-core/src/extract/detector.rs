//! Security detection - decides whether a row or fragment starts a new security.

use crate::models::config::DetectorConfig;

use super::patterns::{
    DATE_FRAGMENT, GROUPED_BOUNDARY_TOKEN, INSTRUMENT_WORD, ISIN_TOKEN, ISSUER_SUFFIX,
    PERCENT_FRAGMENT, PRICE_BOUNDARY_TOKEN,
};

/// A positive detection: the text starts a new security.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Best-guess security name substring.
    pub name: String,
    /// Detection score in [0, 1]; 1.0 for allow-list matches.
    pub score: f64,
}

/// Score-based detector for security name rows.
///
/// Works at two granularities: the concatenated text of a visual row, or a
/// single fragment's text (fallback scan for pages without table structure).
#[derive(Debug, Clone)]
pub struct SecurityDetector {
    config: DetectorConfig,
}

impl SecurityDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detect whether `text` marks the start of a new security.
    pub fn detect(&self, text: &str) -> Option<Detection> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        // Allow-list of already-known names: exact containment is accepted
        // unconditionally. Populated from config, not hardcoded.
        let upper = text.to_uppercase();
        if self
            .config
            .known_names
            .iter()
            .any(|known| upper.contains(&known.to_uppercase()))
        {
            return Some(Detection {
                name: extract_name(text),
                score: 1.0,
            });
        }

        let score = self.score(text);
        if score >= self.config.score_threshold {
            Some(Detection {
                name: extract_name(text),
                score,
            })
        } else {
            None
        }
    }

    /// Heuristic security-likeness score on a 0.0-1.0 scale.
    pub fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();

        let keyword_matches: usize = self
            .config
            .keywords
            .iter()
            .map(|k| lower.matches(k.as_str()).count())
            .sum();

        let mut score = 0.0;
        if keyword_matches > 0 {
            score += (keyword_matches as f64 * 0.3).min(0.6);
        }
        if ISSUER_SUFFIX.is_match(&lower) {
            score += 0.2;
        }
        if INSTRUMENT_WORD.is_match(&lower) {
            score += 0.3;
        }
        if DATE_FRAGMENT.is_match(text) {
            score += 0.1;
        }
        if PERCENT_FRAGMENT.is_match(text) {
            score += 0.1;
        }
        if (20..=100).contains(&text.chars().count()) {
            score += 0.1;
        }

        score.min(1.0)
    }
}

/// Extract the security name: the leading word sequence up to (but excluding)
/// the first identifier token, decimal-number token, or field label.
fn extract_name(text: &str) -> String {
    let mut words = Vec::new();

    for token in text.split_whitespace() {
        let bare = token.trim_end_matches(':');
        if ISIN_TOKEN.is_match(bare)
            || PRICE_BOUNDARY_TOKEN.is_match(bare)
            || GROUPED_BOUNDARY_TOKEN.is_match(bare)
            || is_field_label(bare)
        {
            break;
        }
        words.push(token);
    }

    if words.is_empty() {
        text.trim().to_string()
    } else {
        words.join(" ")
    }
}

fn is_field_label(token: &str) -> bool {
    let bare = token.trim_end_matches('.');
    bare.eq_ignore_ascii_case("isin")
        || bare.eq_ignore_ascii_case("valorn")
        || bare.eq_ignore_ascii_case("maturity")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detector() -> SecurityDetector {
        SecurityDetector::new(DetectorConfig::default())
    }

    #[test]
    fn test_detects_structured_note_row() {
        let text =
            "NATIXIS STRUC.NOTES 19-20.6.26 VRN ON 4,75%METLIFE ISIN: XS1700087403 100'000 99.555 USD";
        let detection = detector().detect(text).expect("should detect");
        assert_eq!(
            detection.name,
            "NATIXIS STRUC.NOTES 19-20.6.26 VRN ON 4,75%METLIFE"
        );
        assert!(detection.score >= 0.4);
    }

    #[test]
    fn test_rejects_page_footer() {
        assert_eq!(detector().detect("Page 14 of 20"), None);
    }

    #[test]
    fn test_known_name_accepted_unconditionally() {
        let config = DetectorConfig {
            known_names: vec!["Exigent Enhanced Income Fund".to_string()],
            ..DetectorConfig::default()
        };
        let detector = SecurityDetector::new(config);

        let detection = detector
            .detect("EXIGENT ENHANCED INCOME FUND LTD SHS A SERIES")
            .expect("allow-list match");
        assert_eq!(detection.score, 1.0);
    }

    #[test]
    fn test_score_components() {
        let detector = detector();

        // Keyword + instrument + issuer + length.
        let score = detector.score("NOVUS CAPITAL STRUCTURED NOTES ON CREDIT SUISSE");
        assert!(score >= 0.9, "got {}", score);

        // Plain prose without financial markers.
        assert!(detector.score("Hello") < 0.4);
    }

    #[test]
    fn test_name_stops_at_isin_token_without_label() {
        assert_eq!(
            extract_name("US TREASURY BOND 2030 US9128285412 1'000'000"),
            "US TREASURY BOND 2030"
        );
    }

    #[test]
    fn test_name_stops_at_three_decimal_price() {
        let detection = detector()
            .detect("ALPHA EQUITY FUND 99.555 USD")
            .expect("should detect");
        assert_eq!(detection.name, "ALPHA EQUITY FUND");
    }

    #[test]
    fn test_name_stops_at_grouped_number() {
        assert_eq!(
            extract_name("NOVUS CAPITAL STRUCTURED NOTES 100'000 USD"),
            "NOVUS CAPITAL STRUCTURED NOTES"
        );
    }

    #[test]
    fn test_name_falls_back_to_full_text() {
        assert_eq!(extract_name("ISIN: XS1700087403"), "ISIN: XS1700087403");
    }
}
