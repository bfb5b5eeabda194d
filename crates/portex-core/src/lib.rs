//! Core library for securities-holdings extraction.
//!
//! This crate provides:
//! - Loading of positioned text fragments from document-OCR API output
//! - Visual row reconstruction from fragment bounding boxes
//! - Heuristic detection of security name rows
//! - Typed field extraction (ISIN, quantity, price, market value, currency)
//! - Confidence scoring and result validation

pub mod error;
pub mod models;
pub mod loader;
pub mod layout;
pub mod extract;
pub mod validate;
pub mod pipeline;
pub mod reference;

pub use error::{PortexError, ParseWarning, Result};
pub use models::fragment::TextFragment;
pub use models::security::{
    AssetClass, ExtractionSummary, Identifier, IdentifierKind, SecurityRecord,
};
pub use models::config::PortexConfig;
pub use loader::FragmentLoader;
pub use layout::{Row, RowGrouper};
pub use extract::detector::SecurityDetector;
pub use extract::fields::FieldExtractor;
pub use validate::{CheckOutcome, ValidationReport, Validator};
pub use pipeline::{Pipeline, PipelineOutput};
pub use reference::{ReferenceDataset, ReferenceReport};
