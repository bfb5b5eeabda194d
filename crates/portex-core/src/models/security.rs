//! Security record models - one reconstructed holding per record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of security identifier code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentifierKind {
    /// International Securities Identification Number (2 letters + 10 alphanumerics).
    Isin,
    /// North American CUSIP code.
    Cusip,
    /// UK SEDOL code.
    Sedol,
    /// Swiss Valorennummer, numeric.
    Valorn,
    /// German Wertpapierkennnummer.
    Wkn,
}

/// A security identifier code with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// Identifier scheme.
    pub kind: IdentifierKind,
    /// Code value as it appeared in the source.
    pub value: String,
}

impl Identifier {
    pub fn isin(value: impl Into<String>) -> Self {
        Self {
            kind: IdentifierKind::Isin,
            value: value.into(),
        }
    }

    pub fn valorn(value: impl Into<String>) -> Self {
        Self {
            kind: IdentifierKind::Valorn,
            value: value.into(),
        }
    }
}

/// Broad asset class inferred from instrument words in the name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Bonds, notes, bills.
    Bond,
    /// Equities, stocks, shares.
    Equity,
    /// Funds and ETFs.
    Fund,
    /// Structured products.
    StructuredProduct,
    /// Anything else.
    #[default]
    Other,
}

impl AssetClass {
    /// Stable label matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Bond => "bond",
            AssetClass::Equity => "equity",
            AssetClass::Fund => "fund",
            AssetClass::StructuredProduct => "structured_product",
            AssetClass::Other => "other",
        }
    }

    /// Classify from free text using instrument words.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("structured") || lower.contains("struc.") || lower.contains("struct.") {
            AssetClass::StructuredProduct
        } else if lower.contains("bond") || lower.contains("note") || lower.contains("bill") {
            AssetClass::Bond
        } else if lower.contains("equity") || lower.contains("stock") || lower.contains("share") {
            AssetClass::Equity
        } else if lower.contains("fund") || lower.contains("etf") {
            AssetClass::Fund
        } else {
            AssetClass::Other
        }
    }
}

/// One reconstructed securities holding.
///
/// Numeric fields are kept as strings in their original formatting: the
/// thousands-separator convention (`'` vs `,` vs `.`) varies by region and is
/// itself provenance information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityRecord {
    /// Security name as recognized on the name row.
    pub name: String,

    /// Identifier codes found for this security.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,

    /// Held quantity, original formatting preserved (e.g. `100'000`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    /// Market value, original formatting preserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_value: Option<String>,

    /// Unit price, original formatting preserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,

    /// 3-letter currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Performance percentage, e.g. `-1.33%`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_pct: Option<String>,

    /// Maturity date kept as string; regional formats coexist and must not
    /// be collapsed into a single date type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<String>,

    /// Inferred asset class.
    #[serde(default)]
    pub asset_class: AssetClass,

    /// Field-population confidence in [0, 1].
    pub confidence_score: f64,

    /// Set when `confidence_score` is below 0.5; the record is retained and
    /// the caller decides whether to discard it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub low_confidence: bool,

    /// Page the name row was found on.
    pub source_page: u32,
}

impl SecurityRecord {
    /// Open a new record from a detected name row.
    pub fn open(name: impl Into<String>, source_page: u32) -> Self {
        let name = name.into();
        let asset_class = AssetClass::classify(&name);
        Self {
            name,
            asset_class,
            source_page,
            ..Self::default()
        }
    }

    /// A record is complete only if it has a name and at least one of
    /// identifier, quantity, market value, or unit price. Incomplete records
    /// must not appear in final output.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && (!self.identifiers.is_empty()
                || self.quantity.is_some()
                || self.market_value.is_some()
                || self.unit_price.is_some())
    }

    /// Number of populated optional fields among the six scored ones.
    pub fn filled_field_count(&self) -> usize {
        let fields = [
            !self.identifiers.is_empty(),
            self.quantity.is_some(),
            self.market_value.is_some(),
            self.unit_price.is_some(),
            self.performance_pct.is_some(),
            self.currency.is_some(),
        ];
        fields.iter().filter(|f| **f).count()
    }

    /// First ISIN identifier, if any.
    pub fn isin(&self) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|i| i.kind == IdentifierKind::Isin)
            .map(|i| i.value.as_str())
    }
}

/// Summary statistics over a set of extracted records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Total records in the output.
    pub total_securities: usize,

    /// Records with confidence >= 0.5.
    pub valid_securities: usize,

    /// Records with confidence >= 0.8.
    pub high_confidence_securities: usize,

    /// Percent of records with each field populated.
    pub field_completeness: HashMap<String, f64>,

    /// Average confidence across records, in [0, 1].
    pub overall_confidence: f64,
}

impl ExtractionSummary {
    /// Compute summary statistics for a record set.
    pub fn compute(records: &[SecurityRecord]) -> Self {
        let total = records.len();
        if total == 0 {
            return Self::default();
        }

        let mut field_completeness = HashMap::new();
        let percent = |count: usize| (count as f64 / total as f64) * 100.0;

        let counters: [(&str, Box<dyn Fn(&SecurityRecord) -> bool>); 7] = [
            ("name", Box::new(|r| !r.name.is_empty())),
            ("identifier", Box::new(|r| !r.identifiers.is_empty())),
            ("quantity", Box::new(|r| r.quantity.is_some())),
            ("market_value", Box::new(|r| r.market_value.is_some())),
            ("unit_price", Box::new(|r| r.unit_price.is_some())),
            ("performance_pct", Box::new(|r| r.performance_pct.is_some())),
            ("currency", Box::new(|r| r.currency.is_some())),
        ];

        for (field, pred) in &counters {
            let count = records.iter().filter(|r| pred(r)).count();
            field_completeness.insert(field.to_string(), percent(count));
        }

        Self {
            total_securities: total,
            valid_securities: records
                .iter()
                .filter(|r| r.confidence_score >= 0.5)
                .count(),
            high_confidence_securities: records
                .iter()
                .filter(|r| r.confidence_score >= 0.8)
                .count(),
            field_completeness,
            overall_confidence: records.iter().map(|r| r.confidence_score).sum::<f64>()
                / total as f64,
        }
    }
}
