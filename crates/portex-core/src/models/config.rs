//! Configuration for the extraction pipeline.
//!
//! One shared, versioned configuration object passed explicitly into each
//! component, replacing keyword sets and thresholds that would otherwise be
//! re-declared ad hoc at every call site.

use serde::{Deserialize, Serialize};

/// Main configuration for the portex pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortexConfig {
    /// Row grouping configuration.
    pub layout: LayoutConfig,

    /// Security detection configuration.
    pub detector: DetectorConfig,

    /// Field extraction configuration.
    pub extractor: ExtractorConfig,

    /// Validation configuration.
    pub validator: ValidatorConfig,
}

impl Default for PortexConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            detector: DetectorConfig::default(),
            extractor: ExtractorConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

/// Row grouping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical tolerance for assigning a fragment to an existing row.
    pub row_tolerance: f64,

    /// Minimum fragments for a row to count as a table row; smaller rows
    /// fall back to the plain keyword scan.
    pub min_row_fragments: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 20.0,
            min_row_fragments: 3,
        }
    }
}

/// Security detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Score threshold for accepting a row as a security start.
    pub score_threshold: f64,

    /// Asset-class keywords scored at +0.3 each, capped at +0.6.
    pub keywords: Vec<String>,

    /// Allow-list of already-known security names; an exact substring match
    /// accepts the row unconditionally with confidence 1.0. Empty by default:
    /// ground-truth shortcuts belong in test fixtures, not production config.
    pub known_names: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.4,
            keywords: [
                "note",
                "bond",
                "fund",
                "equity",
                "structured",
                "treasury",
                "corporate",
                "government",
                "municipal",
                "convertible",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            known_names: Vec::new(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Accepted 3-letter currency codes.
    pub currencies: Vec<String>,

    /// Thousands separators accepted in grouped numbers.
    pub grouping_separators: Vec<char>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            currencies: ["USD", "EUR", "CHF", "GBP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            grouping_separators: vec!['\'', ','],
        }
    }
}

/// Validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Externally supplied expected portfolio total for the aggregate
    /// consistency check. Skipped when absent.
    pub expected_total: Option<f64>,

    /// Allowed relative deviation from the expected total (0.01 = 1%).
    pub max_total_deviation: f64,

    /// Minimum average record confidence, on the same [0, 1] scale as the
    /// scorer. Callers thinking in percent convert via
    /// [`ValidatorConfig::confidence_from_percent`].
    pub min_average_confidence: f64,

    /// Minimum distinct asset classes expected in a diversified portfolio.
    pub min_asset_classes: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            expected_total: None,
            max_total_deviation: 0.01,
            min_average_confidence: 0.85,
            min_asset_classes: 2,
        }
    }
}

impl ValidatorConfig {
    /// Convert a 0-100 percent threshold to the internal [0, 1] scale.
    pub fn confidence_from_percent(percent: f64) -> f64 {
        percent / 100.0
    }

    /// Convert an internal [0, 1] confidence to percent for display.
    pub fn confidence_to_percent(confidence: f64) -> f64 {
        confidence * 100.0
    }
}

impl PortexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
