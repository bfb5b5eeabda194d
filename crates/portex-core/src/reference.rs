//! Offline accuracy measurement against a known-good reference dataset.
//!
//! This sits outside the extraction path: the pipeline never consults the
//! reference data, it only gets compared against it after the fact.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::extract::fields::parse_grouped;
use crate::models::security::SecurityRecord;

/// Expected values for one security, keyed by ISIN in the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub market_value: Option<f64>,
}

/// A known-good dataset for a statement, keyed by ISIN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDataset {
    pub entries: BTreeMap<String, ReferenceEntry>,
}

/// One disagreement between an extracted record and its reference entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub isin: String,
    pub field: String,
    pub expected: String,
    pub actual: String,
}

/// Accuracy report produced by [`ReferenceDataset::compare`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceReport {
    /// Reference entries matched by an extracted record.
    pub matched: usize,
    /// Reference entries with no extracted counterpart.
    pub missing: Vec<String>,
    /// Extracted ISINs absent from the reference dataset.
    pub unexpected: Vec<String>,
    /// Field-level disagreements among matched entries.
    pub mismatches: Vec<Mismatch>,
    /// Matched entries whose compared fields all agree, as a percentage of
    /// the reference dataset.
    pub accuracy_pct: f64,
}

impl ReferenceDataset {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare extracted records against this dataset.
    ///
    /// Matching is by ISIN. Names compare case-insensitively by containment
    /// in either direction (extraction often truncates or extends the
    /// reference spelling). Numeric fields compare after separator stripping,
    /// within a 0.01 absolute tolerance.
    pub fn compare(&self, records: &[SecurityRecord], separators: &[char]) -> ReferenceReport {
        let mut matched = 0;
        let mut missing = Vec::new();
        let mut mismatches = Vec::new();
        let mut clean = 0;

        let by_isin: BTreeMap<&str, &SecurityRecord> = records
            .iter()
            .filter_map(|r| r.isin().map(|isin| (isin, r)))
            .collect();

        for (isin, expected) in &self.entries {
            let Some(record) = by_isin.get(isin.as_str()) else {
                missing.push(isin.clone());
                continue;
            };
            matched += 1;

            let mut entry_mismatches = Vec::new();
            if !names_agree(&expected.name, &record.name) {
                entry_mismatches.push(Mismatch {
                    isin: isin.clone(),
                    field: "name".to_string(),
                    expected: expected.name.clone(),
                    actual: record.name.clone(),
                });
            }
            check_numeric(
                isin,
                "quantity",
                expected.quantity,
                record.quantity.as_deref(),
                separators,
                &mut entry_mismatches,
            );
            check_numeric(
                isin,
                "market_value",
                expected.market_value,
                record.market_value.as_deref(),
                separators,
                &mut entry_mismatches,
            );

            if entry_mismatches.is_empty() {
                clean += 1;
            }
            mismatches.extend(entry_mismatches);
        }

        let unexpected: Vec<String> = by_isin
            .keys()
            .filter(|isin| !self.entries.contains_key(**isin))
            .map(|isin| isin.to_string())
            .collect();

        let accuracy_pct = if self.entries.is_empty() {
            100.0
        } else {
            clean as f64 / self.entries.len() as f64 * 100.0
        };

        debug!(
            "reference comparison: {}/{} matched, accuracy {:.1}%",
            matched,
            self.entries.len(),
            accuracy_pct
        );

        ReferenceReport {
            matched,
            missing,
            unexpected,
            mismatches,
            accuracy_pct,
        }
    }
}

fn names_agree(expected: &str, actual: &str) -> bool {
    let expected = expected.to_uppercase();
    let actual = actual.to_uppercase();
    expected.contains(&actual) || actual.contains(&expected)
}

fn check_numeric(
    isin: &str,
    field: &str,
    expected: Option<f64>,
    actual: Option<&str>,
    separators: &[char],
    out: &mut Vec<Mismatch>,
) {
    let Some(expected) = expected else {
        return;
    };
    let parsed = actual.and_then(|v| parse_grouped(v, separators));
    let agrees = parsed.map(|v| (v - expected).abs() < 0.01).unwrap_or(false);
    if !agrees {
        out.push(Mismatch {
            isin: isin.to_string(),
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.unwrap_or("<missing>").to_string(),
        });
    }
}
