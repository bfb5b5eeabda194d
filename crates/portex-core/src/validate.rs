//! Result validation - independent checks over the extracted record set.
//!
//! Every check runs and is reported; a failing check never aborts the run.
//! The caller receives the report alongside the best-effort output and
//! decides whether to accept, re-run, or flag for manual review.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::patterns::{self, PLAIN_NUMBER};
use crate::models::config::{ExtractorConfig, ValidatorConfig};
use crate::models::security::{ExtractionSummary, SecurityRecord};

/// Severity of a check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

/// One validation check result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Check identifier.
    pub name: String,
    /// Severity.
    pub status: CheckStatus,
    /// Human-readable result.
    pub message: String,
}

impl CheckOutcome {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
        }
    }
}

/// Structured validation report returned with every pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// When the validation ran.
    pub timestamp: DateTime<Utc>,
    /// All check outcomes, in execution order.
    pub checks: Vec<CheckOutcome>,
}

impl ValidationReport {
    /// No error-level outcomes.
    pub fn passed(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Error)
    }

    pub fn errors(&self) -> Vec<&CheckOutcome> {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&CheckOutcome> {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Warning)
            .collect()
    }
}

/// Runs the validation checks against an extracted record set.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidatorConfig,
    separators: Vec<char>,
    grouped_re: Regex,
}

impl Validator {
    pub fn new(config: ValidatorConfig, extractor: &ExtractorConfig) -> Self {
        Self {
            config,
            separators: extractor.grouping_separators.clone(),
            grouped_re: patterns::grouped_number_regex(&extractor.grouping_separators),
        }
    }

    /// Run all checks. Each is reported independently, never short-circuited.
    pub fn validate(
        &self,
        records: &[SecurityRecord],
        summary: &ExtractionSummary,
    ) -> ValidationReport {
        let checks = vec![
            self.check_structural_completeness(records),
            self.check_numeric_format(records),
            self.check_asset_class_coverage(records),
            self.check_aggregate_consistency(records),
            self.check_average_confidence(summary),
        ];

        debug!(
            "validation finished: {} errors, {} warnings",
            checks.iter().filter(|c| c.status == CheckStatus::Error).count(),
            checks.iter().filter(|c| c.status == CheckStatus::Warning).count(),
        );

        ValidationReport {
            timestamp: Utc::now(),
            checks,
        }
    }

    fn check_structural_completeness(&self, records: &[SecurityRecord]) -> CheckOutcome {
        let incomplete: Vec<&str> = records
            .iter()
            .filter(|r| !r.is_complete())
            .map(|r| if r.name.is_empty() { "<unnamed>" } else { r.name.as_str() })
            .collect();

        if incomplete.is_empty() {
            CheckOutcome::new(
                "structural_completeness",
                CheckStatus::Pass,
                format!("all {} records complete", records.len()),
            )
        } else {
            CheckOutcome::new(
                "structural_completeness",
                CheckStatus::Error,
                format!("incomplete records: {}", incomplete.join(", ")),
            )
        }
    }

    fn check_numeric_format(&self, records: &[SecurityRecord]) -> CheckOutcome {
        let mut invalid = Vec::new();

        for record in records {
            for value in [record.quantity.as_deref(), record.market_value.as_deref()]
                .into_iter()
                .flatten()
            {
                if !self.grouped_re.is_match(value) && !PLAIN_NUMBER.is_match(value) {
                    invalid.push(format!("{}: '{}'", record.name, value));
                }
            }
        }

        if invalid.is_empty() {
            CheckOutcome::new(
                "numeric_format",
                CheckStatus::Pass,
                "all quantity/market-value strings in a recognized format",
            )
        } else {
            CheckOutcome::new(
                "numeric_format",
                CheckStatus::Warning,
                format!("unrecognized number formats: {}", invalid.join("; ")),
            )
        }
    }

    fn check_asset_class_coverage(&self, records: &[SecurityRecord]) -> CheckOutcome {
        let classes: HashSet<_> = records.iter().map(|r| r.asset_class).collect();

        if classes.len() >= self.config.min_asset_classes {
            CheckOutcome::new(
                "asset_class_coverage",
                CheckStatus::Pass,
                format!("{} distinct asset classes", classes.len()),
            )
        } else {
            CheckOutcome::new(
                "asset_class_coverage",
                CheckStatus::Warning,
                format!(
                    "only {} asset class(es) observed, expected at least {}",
                    classes.len(),
                    self.config.min_asset_classes
                ),
            )
        }
    }

    fn check_aggregate_consistency(&self, records: &[SecurityRecord]) -> CheckOutcome {
        const NAME: &str = "aggregate_consistency";

        let Some(expected) = self.config.expected_total else {
            return CheckOutcome::new(NAME, CheckStatus::Pass, "no expected total supplied; skipped");
        };

        let Some(expected) = Decimal::from_f64_retain(expected) else {
            return CheckOutcome::new(
                NAME,
                CheckStatus::Warning,
                "calculation error: expected total is not a finite number",
            );
        };

        let mut total = Decimal::ZERO;
        let mut parse_failures = Vec::new();

        for record in records {
            let Some(value) = record.market_value.as_deref() else {
                continue;
            };
            let cleaned: String = value
                .chars()
                .filter(|c| !self.separators.contains(c))
                .collect();
            match Decimal::from_str(&cleaned) {
                Ok(parsed) => total += parsed,
                Err(_) => parse_failures.push(format!("{}: '{}'", record.name, value)),
            }
        }

        // Unparsable values exclude this check from the pass/fail
        // determination instead of crashing the run.
        if !parse_failures.is_empty() {
            return CheckOutcome::new(
                NAME,
                CheckStatus::Warning,
                format!("calculation error, check skipped: {}", parse_failures.join("; ")),
            );
        }

        if expected.is_zero() {
            return CheckOutcome::new(
                NAME,
                CheckStatus::Warning,
                "calculation error: expected total is zero",
            );
        }

        let deviation = ((total - expected) / expected).abs();
        let max =
            Decimal::from_f64_retain(self.config.max_total_deviation).unwrap_or(Decimal::ZERO);

        if deviation > max {
            CheckOutcome::new(
                NAME,
                CheckStatus::Error,
                format!(
                    "total {} deviates from expected {} by {:.2}%",
                    total,
                    expected,
                    deviation * Decimal::ONE_HUNDRED
                ),
            )
        } else {
            CheckOutcome::new(
                NAME,
                CheckStatus::Pass,
                format!("total {} within {:.2}% of expected {}", total, deviation * Decimal::ONE_HUNDRED, expected),
            )
        }
    }

    fn check_average_confidence(&self, summary: &ExtractionSummary) -> CheckOutcome {
        let average = summary.overall_confidence;
        let min = self.config.min_average_confidence;

        if average >= min {
            CheckOutcome::new(
                "average_confidence",
                CheckStatus::Pass,
                format!(
                    "average confidence {:.1}% meets the {:.1}% minimum",
                    ValidatorConfig::confidence_to_percent(average),
                    ValidatorConfig::confidence_to_percent(min),
                ),
            )
        } else {
            CheckOutcome::new(
                "average_confidence",
                CheckStatus::Error,
                format!(
                    "average confidence {:.1}% below the {:.1}% minimum",
                    ValidatorConfig::confidence_to_percent(average),
                    ValidatorConfig::confidence_to_percent(min),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::security::Identifier;

    fn validator(expected_total: Option<f64>) -> Validator {
        let config = ValidatorConfig {
            expected_total,
            ..ValidatorConfig::default()
        };
        Validator::new(config, &ExtractorConfig::default())
    }

    fn record(name: &str, market_value: &str, confidence: f64) -> SecurityRecord {
        SecurityRecord {
            name: name.to_string(),
            identifiers: vec![Identifier::isin("XS1700087403")],
            market_value: Some(market_value.to_string()),
            confidence_score: confidence,
            ..SecurityRecord::default()
        }
    }

    fn outcome<'a>(report: &'a ValidationReport, name: &str) -> &'a CheckOutcome {
        report
            .checks
            .iter()
            .find(|c| c.name == name)
            .expect("check must be reported")
    }

    #[test]
    fn test_exact_total_passes_with_zero_deviation() {
        let records = vec![
            record("A", "10,000,000", 0.9),
            record("B", "700'000", 0.9),
        ];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(Some(10_700_000.0)).validate(&records, &summary);

        assert_eq!(
            outcome(&report, "aggregate_consistency").status,
            CheckStatus::Pass
        );
    }

    #[test]
    fn test_total_deviation_over_one_percent_is_error() {
        let records = vec![record("A", "10'000'000", 0.9)];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(Some(10_700_000.0)).validate(&records, &summary);

        assert_eq!(
            outcome(&report, "aggregate_consistency").status,
            CheckStatus::Error
        );
    }

    #[test]
    fn test_unparsable_value_excludes_check_without_crash() {
        let records = vec![record("A", "n/a", 0.9)];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(Some(10_700_000.0)).validate(&records, &summary);

        let check = outcome(&report, "aggregate_consistency");
        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.message.contains("calculation error"));
    }

    #[test]
    fn test_no_expected_total_skips_check() {
        let records = vec![record("A", "100'000", 0.9)];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(None).validate(&records, &summary);

        assert_eq!(
            outcome(&report, "aggregate_consistency").status,
            CheckStatus::Pass
        );
    }

    #[test]
    fn test_incomplete_record_is_structural_error() {
        let records = vec![SecurityRecord {
            name: "NAME ONLY".to_string(),
            confidence_score: 0.3,
            ..SecurityRecord::default()
        }];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(None).validate(&records, &summary);

        assert_eq!(
            outcome(&report, "structural_completeness").status,
            CheckStatus::Error
        );
        assert!(!report.passed());
    }

    #[test]
    fn test_single_asset_class_is_warning_not_error() {
        let records = vec![record("A", "100'000", 0.9), record("B", "200'000", 0.9)];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(None).validate(&records, &summary);

        let check = outcome(&report, "asset_class_coverage");
        assert_eq!(check.status, CheckStatus::Warning);
        // Warnings alone do not fail the report.
        assert!(report.passed());
    }

    #[test]
    fn test_low_average_confidence_reported() {
        let records = vec![record("A", "100'000", 0.4)];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(None).validate(&records, &summary);

        let check = outcome(&report, "average_confidence");
        assert_eq!(check.status, CheckStatus::Error);
        assert!(check.message.contains("40.0%"));
    }

    #[test]
    fn test_numeric_format_warning() {
        let mut bad = record("A", "100'000", 0.9);
        bad.quantity = Some("12'34".to_string());
        let records = vec![bad];
        let summary = ExtractionSummary::compute(&records);
        let report = validator(None).validate(&records, &summary);

        assert_eq!(
            outcome(&report, "numeric_format").status,
            CheckStatus::Warning
        );
    }
}
