//! Response decoding
//!
//! JSON endpoints answer with either one object or an array of objects.
//! Spectrum files are whitespace-delimited text tables with `#` comments.

use crate::error::{ExomastError, Result};
use crate::models::{AttributeMap, SpectrumLayout, SpectrumTable};
use serde_json::{Map, Value};

/// Top-level shape of a JSON record payload
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPayload {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl JsonPayload {
    /// Pick the record at `index`.
    ///
    /// An object is returned as-is. An empty array yields `Ok(None)`; an
    /// index past the end of a non-empty array is an error.
    pub fn select_record(
        self,
        url: &str,
        what: &'static str,
        index: usize,
    ) -> Result<Option<Map<String, Value>>> {
        match self {
            JsonPayload::Object(map) => Ok(Some(map)),
            JsonPayload::Array(items) if items.is_empty() => Ok(None),
            JsonPayload::Array(mut items) => {
                if index >= items.len() {
                    return Err(ExomastError::IndexOutOfRange {
                        what,
                        index,
                        len: items.len(),
                    });
                }
                match items.swap_remove(index) {
                    Value::Object(map) => Ok(Some(map)),
                    other => Err(ExomastError::service(
                        url,
                        format!("expected {} record to be an object, got {}", what, other),
                    )),
                }
            }
        }
    }
}

/// Parse a body as arbitrary JSON
pub fn decode_json(url: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| ExomastError::Decode(format!("{} returned invalid JSON: {}", url, e)))
}

/// Parse a body that must be a JSON object or array
pub fn decode_payload(url: &str, body: &str) -> Result<JsonPayload> {
    match decode_json(url, body)? {
        Value::Object(map) => Ok(JsonPayload::Object(map)),
        Value::Array(items) => Ok(JsonPayload::Array(items)),
        other => Err(ExomastError::service(
            url,
            format!("expected a JSON object or array, got {}", other),
        )),
    }
}

/// Parse a body that must be a JSON object
pub fn decode_object(url: &str, body: &str) -> Result<Map<String, Value>> {
    match decode_json(url, body)? {
        Value::Object(map) => Ok(map),
        other => Err(ExomastError::service(
            url,
            format!("expected a JSON object, got {}", other),
        )),
    }
}

/// Copy `map` into an [`AttributeMap`], replacing `from` with `to` in keys
pub fn flatten_keys(map: &Map<String, Value>, from: char, to: char) -> AttributeMap {
    map.iter()
        .map(|(key, value)| (key.replace(from, &to.to_string()), value.clone()))
        .collect()
}

/// Parse a spectrum text file into a table with `layout`'s columns
pub fn parse_spectrum_table(body: &str, layout: SpectrumLayout) -> Result<SpectrumTable> {
    let columns = layout.header();
    let mut rows = Vec::new();

    for (line_no, line) in body.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let row = trimmed
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    ExomastError::Decode(format!(
                        "spectrum line {}: {:?} is not a number",
                        line_no + 1,
                        token
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if row.len() != columns.len() {
            return Err(ExomastError::Decode(format!(
                "spectrum line {}: expected {} columns, found {}",
                line_no + 1,
                columns.len(),
                row.len()
            )));
        }

        rows.push(row);
    }

    Ok(SpectrumTable { columns, rows })
}
