//! Row reconstruction - clusters page fragments into visual table rows.
//!
//! Fragments on one page are grouped by vertical position within a tolerance,
//! approximating the original table rows, then ordered left-to-right to
//! approximate column order.

use tracing::debug;

use crate::models::config::LayoutConfig;
use crate::models::fragment::TextFragment;

/// Fragments sharing an approximate vertical position on one page, ordered
/// left-to-right. Exists only during grouping, never persisted.
#[derive(Debug, Clone)]
pub struct Row {
    /// Vertical coordinate of the first fragment assigned to this row. New
    /// members are matched against this, not a running mean, so assignment
    /// is first-fit and deterministic.
    pub anchor_y: f64,
    /// Member fragments in left-to-right order.
    pub fragments: Vec<TextFragment>,
}

impl Row {
    fn new(fragment: TextFragment) -> Self {
        Self {
            anchor_y: fragment.y(),
            fragments: vec![fragment],
        }
    }

    /// Concatenated row text in column order.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Page this row belongs to.
    pub fn page(&self) -> u32 {
        self.fragments.first().map(|f| f.page).unwrap_or(0)
    }
}

/// Groups fragments into rows by vertical-position tolerance.
#[derive(Debug, Clone)]
pub struct RowGrouper {
    config: LayoutConfig,
}

impl RowGrouper {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Group one page's fragments into rows, top-to-bottom.
    ///
    /// Each fragment joins the first existing row whose anchor coordinate is
    /// within tolerance, otherwise starts a new row. Fragments without a
    /// bounding box cannot be positioned and are left out.
    pub fn group(&self, fragments: &[TextFragment]) -> Vec<Row> {
        let mut positioned: Vec<&TextFragment> =
            fragments.iter().filter(|f| f.has_bounds).collect();
        positioned.sort_by(|a, b| {
            a.y()
                .partial_cmp(&b.y())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut rows: Vec<Row> = Vec::new();
        for fragment in positioned {
            // First-fit: ties between equally close rows go to the earlier-created one.
            match rows
                .iter_mut()
                .find(|row| (fragment.y() - row.anchor_y).abs() <= self.config.row_tolerance)
            {
                Some(row) => row.fragments.push(fragment.clone()),
                None => rows.push(Row::new(fragment.clone())),
            }
        }

        for row in &mut rows {
            row.fragments.sort_by(|a, b| {
                a.x()
                    .partial_cmp(&b.x())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        rows.sort_by(|a, b| {
            a.anchor_y
                .partial_cmp(&b.anchor_y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!("grouped {} fragments into {} rows", fragments.len(), rows.len());
        rows
    }

    /// Whether a page has any structured table rows at all. Pages without
    /// them fall back to the plain per-fragment keyword scan.
    pub fn has_table_rows(&self, rows: &[Row]) -> bool {
        rows.iter()
            .any(|r| r.fragments.len() >= self.config.min_row_fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frag(text: &str, x: f64, y: f64) -> TextFragment {
        TextFragment::new(text, 14, [x, y, x + 50.0, y + 10.0])
    }

    #[test]
    fn test_within_tolerance_same_row() {
        let grouper = RowGrouper::new(LayoutConfig::default());
        let rows = grouper.group(&[frag("a", 10.0, 100.0), frag("b", 80.0, 105.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), "a b");
    }

    #[test]
    fn test_beyond_tolerance_different_rows() {
        let grouper = RowGrouper::new(LayoutConfig::default());
        let rows = grouper.group(&[frag("a", 10.0, 100.0), frag("b", 80.0, 140.0)]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_column_order_left_to_right() {
        let grouper = RowGrouper::new(LayoutConfig::default());
        let rows = grouper.group(&[
            frag("USD", 300.0, 100.0),
            frag("NATIXIS", 10.0, 102.0),
            frag("99.555", 150.0, 98.0),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), "NATIXIS 99.555 USD");
    }

    #[test]
    fn test_first_fit_tie_break() {
        // y=120 is exactly tolerance away from both row anchors after
        // sorting; it must join the earlier-created row (anchor 100).
        let grouper = RowGrouper::new(LayoutConfig::default());
        let rows = grouper.group(&[
            frag("first", 10.0, 100.0),
            frag("second", 10.0, 140.0),
            frag("tie", 80.0, 120.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "first tie");
        assert_eq!(rows[1].text(), "second");
    }

    #[test]
    fn test_rows_ordered_top_to_bottom() {
        let grouper = RowGrouper::new(LayoutConfig::default());
        let rows = grouper.group(&[frag("lower", 10.0, 300.0), frag("upper", 10.0, 50.0)]);
        assert_eq!(rows[0].text(), "upper");
        assert_eq!(rows[1].text(), "lower");
    }

    #[test]
    fn test_table_row_minimum() {
        let grouper = RowGrouper::new(LayoutConfig::default());
        let rows = grouper.group(&[
            frag("a", 10.0, 100.0),
            frag("b", 80.0, 100.0),
            frag("c", 150.0, 100.0),
            frag("narrow", 10.0, 200.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert!(grouper.has_table_rows(&rows));

        let narrow_only = grouper.group(&[frag("narrow", 10.0, 200.0)]);
        assert!(!grouper.has_table_rows(&narrow_only));
    }

    #[test]
    fn test_unpositioned_fragments_excluded() {
        let grouper = RowGrouper::new(LayoutConfig::default());
        let rows = grouper.group(&[
            frag("a", 10.0, 100.0),
            TextFragment::unpositioned("floating", 14),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), "a");
    }
}
