//! Error types for the portex-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the portex library.
///
/// Only structurally invalid top-level input is fatal; per-row and per-field
/// problems are recovered locally and surfaced as [`ParseWarning`] values in
/// the run output.
#[derive(Error, Debug)]
pub enum PortexError {
    /// The top-level input is not the expected container shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A non-fatal extraction problem, accumulated and reported with the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// Page the problem occurred on (0 when unknown).
    pub page: u32,
    /// Human-readable description.
    pub message: String,
}

impl ParseWarning {
    pub fn new(page: u32, message: impl Into<String>) -> Self {
        Self {
            page,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}: {}", self.page, self.message)
    }
}

/// Result type for the portex library.
pub type Result<T> = std::result::Result<T, PortexError>;
