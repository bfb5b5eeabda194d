//! Heuristic extraction: security detection, field extraction, scoring.

pub mod patterns;
pub mod detector;
pub mod fields;
pub mod scorer;

pub use detector::{Detection, SecurityDetector};
pub use fields::FieldExtractor;
pub use scorer::score_record;
