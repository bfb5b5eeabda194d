//! Fragment loader - normalizes raw document-API output into text fragments.
//!
//! The provider contract is a JSON object with an `elements` array (a bare
//! top-level array is also accepted); each element carries at minimum `Text`,
//! `Page`, `Bounds`, and optionally a structural `Path`. Individual malformed
//! elements are skipped, counted, and logged; only a wrong top-level shape is
//! fatal.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PortexError, Result};
use crate::models::fragment::TextFragment;

/// Result of loading a provider response.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Normalized fragments, empty-text entries already dropped.
    pub fragments: Vec<TextFragment>,
    /// Elements skipped because they had no usable text.
    pub skipped_empty: usize,
    /// Elements skipped because they were not objects.
    pub skipped_malformed: usize,
}

/// Loads provider JSON into a uniform fragment list.
#[derive(Debug, Clone, Default)]
pub struct FragmentLoader;

impl FragmentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load fragments from a raw JSON string.
    pub fn load_str(&self, raw: &str) -> Result<LoadResult> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| PortexError::MalformedInput(format!("not valid JSON: {}", e)))?;
        self.load_value(&value)
    }

    /// Load fragments from a parsed JSON value.
    pub fn load_value(&self, value: &Value) -> Result<LoadResult> {
        let elements = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => match map.get("elements") {
                Some(Value::Array(items)) => items.as_slice(),
                Some(other) => {
                    return Err(PortexError::MalformedInput(format!(
                        "\"elements\" must be an array, got {}",
                        json_type_name(other)
                    )))
                }
                None => {
                    return Err(PortexError::MalformedInput(
                        "missing \"elements\" array".to_string(),
                    ))
                }
            },
            other => {
                return Err(PortexError::MalformedInput(format!(
                    "expected object or array at top level, got {}",
                    json_type_name(other)
                )))
            }
        };

        let mut fragments = Vec::with_capacity(elements.len());
        let mut skipped_empty = 0;
        let mut skipped_malformed = 0;

        for element in elements {
            let Value::Object(obj) = element else {
                skipped_malformed += 1;
                continue;
            };

            let text = obj
                .get("Text")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or("");
            if text.is_empty() {
                skipped_empty += 1;
                continue;
            }

            let page = obj.get("Page").and_then(Value::as_u64).unwrap_or(0) as u32;

            let bounds = obj.get("Bounds").and_then(parse_bounds);

            let mut fragment = match bounds {
                Some(bounds) => TextFragment::new(text, page, bounds),
                None => TextFragment::unpositioned(text, page),
            };

            if let Some(path) = obj.get("Path").and_then(Value::as_str) {
                if !path.is_empty() {
                    fragment = fragment.with_path(path);
                }
            }

            fragments.push(fragment);
        }

        if skipped_empty + skipped_malformed > 0 {
            warn!(
                "skipped {} empty-text and {} malformed elements while loading",
                skipped_empty, skipped_malformed
            );
        }
        debug!("loaded {} fragments", fragments.len());

        Ok(LoadResult {
            fragments,
            skipped_empty,
            skipped_malformed,
        })
    }
}

fn parse_bounds(value: &Value) -> Option<[f64; 4]> {
    let items = value.as_array()?;
    if items.len() < 4 {
        return None;
    }
    let mut bounds = [0.0; 4];
    for (slot, item) in bounds.iter_mut().zip(items.iter()) {
        *slot = item.as_f64()?;
    }
    Some(bounds)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
