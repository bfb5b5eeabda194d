//! Confidence scoring based on field population.

use crate::models::security::SecurityRecord;

/// Records scoring below this are retained but flagged low-confidence.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Compute and assign the record's confidence score.
///
/// `score = 0.3 (name present) + 0.7 * filled / 6` over the six optional
/// fields {identifier, quantity, market_value, unit_price, performance_pct,
/// currency}, clamped to [0, 1]. This measures completeness, not statistical
/// probability.
pub fn score_record(record: &mut SecurityRecord) {
    let mut score = 0.0;
    if !record.name.is_empty() {
        score += 0.3;
    }
    score += 0.7 * (record.filled_field_count() as f64 / 6.0);

    record.confidence_score = score.clamp(0.0, 1.0);
    record.low_confidence = record.confidence_score < LOW_CONFIDENCE_THRESHOLD;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::security::Identifier;

    #[test]
    fn test_name_only() {
        let mut record = SecurityRecord::open("SOME FUND", 1);
        score_record(&mut record);
        assert!((record.confidence_score - 0.3).abs() < 1e-9);
        assert!(record.low_confidence);
    }

    #[test]
    fn test_all_fields() {
        let mut record = SecurityRecord::open("SOME FUND", 1);
        record.identifiers.push(Identifier::isin("XS1700087403"));
        record.quantity = Some("100'000".into());
        record.market_value = Some("99'533".into());
        record.unit_price = Some("99.555".into());
        record.performance_pct = Some("-1.33%".into());
        record.currency = Some("USD".into());
        score_record(&mut record);
        assert!((record.confidence_score - 1.0).abs() < 1e-9);
        assert!(!record.low_confidence);
    }

    #[test]
    fn test_low_confidence_boundary() {
        // Name + two fields: 0.3 + 0.7 * 2/6 ~= 0.533, above the flag line.
        let mut record = SecurityRecord::open("SOME FUND", 1);
        record.quantity = Some("100'000".into());
        record.currency = Some("USD".into());
        score_record(&mut record);
        assert!(record.confidence_score > LOW_CONFIDENCE_THRESHOLD);
        assert!(!record.low_confidence);

        // Name + one field: 0.3 + 0.7/6 ~= 0.417, flagged but retained.
        let mut record = SecurityRecord::open("SOME FUND", 1);
        record.quantity = Some("100'000".into());
        score_record(&mut record);
        assert!(record.low_confidence);
    }
}
