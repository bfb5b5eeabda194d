//! Text fragment model - one OCR-recognized text span with page position.

use serde::{Deserialize, Serialize};

/// One OCR-recognized text span, positioned on a page.
///
/// Created once from the provider response and never mutated afterwards.
/// Coordinate origin and units are source-dependent; the pipeline only
/// compares coordinates against each other, never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Raw recognized text. May contain OCR noise.
    pub text: String,

    /// 1-based page number (0 when the source did not report one).
    pub page: u32,

    /// Bounding box as `[x1, y1, x2, y2]` in page coordinate space.
    pub bounds: [f64; 4],

    /// Hierarchical locator hint such as `Table[2]/TR[5]`, present only
    /// from structured-extraction APIs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_path: Option<String>,

    /// Whether the source reported a bounding box at all. Fragments without
    /// one are excluded from row grouping but still feed the fallback scan.
    #[serde(default = "default_true")]
    pub has_bounds: bool,
}

fn default_true() -> bool {
    true
}

impl TextFragment {
    /// Create a fragment with bounds.
    pub fn new(text: impl Into<String>, page: u32, bounds: [f64; 4]) -> Self {
        Self {
            text: text.into(),
            page,
            bounds,
            structural_path: None,
            has_bounds: true,
        }
    }

    /// Create a fragment the source reported without a bounding box.
    pub fn unpositioned(text: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            page,
            bounds: [0.0; 4],
            structural_path: None,
            has_bounds: false,
        }
    }

    /// Attach a structural path hint.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.structural_path = Some(path.into());
        self
    }

    /// Left edge of the bounding box.
    pub fn x(&self) -> f64 {
        self.bounds[0]
    }

    /// Top edge of the bounding box.
    pub fn y(&self) -> f64 {
        self.bounds[1]
    }

    /// Whether the structural path marks table membership.
    pub fn in_table(&self) -> bool {
        self.structural_path
            .as_deref()
            .is_some_and(|p| p.contains("Table"))
    }
}
