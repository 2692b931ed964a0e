//! Cursor token codec.
//!
//! This module owns the opaque wire-token format for positions: base64 over
//! a JSON array of single-key objects, one per order field, in spec order.
//! For fields `[display_index desc, id asc]` and values `(3, 17)` the token
//! decodes to `[{"display_index": 3}, {"id": 17}]`. It contains only
//! encoding/decoding logic and no query semantics.

use crate::{
    error::{PageError, Result},
    order::OrderSpec,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use model::{core::value::Value, records::row::RowData};

// Defensive decode bound for untrusted cursor token input.
const MAX_CURSOR_TOKEN_LEN: usize = 8 * 1024;

/// A record's position under a specific ordering: one `(field, value)` pair
/// per order field, in the same sequence as the spec it was produced under.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    entries: Vec<(String, Value)>,
}

impl Cursor {
    /// Reads the record's position under `spec`. Side-effect free.
    pub fn for_row(row: &RowData, spec: &OrderSpec) -> Cursor {
        let entries = spec
            .fields()
            .iter()
            .map(|field| (field.name.clone(), row.get_value(&field.name)))
            .collect();

        Cursor { entries }
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn value(&self, index: usize) -> &Value {
        &self.entries[index].1
    }

    /// Serializes the position into the opaque wire token.
    pub fn encode(&self) -> String {
        let body: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|(name, value)| {
                let mut entry = serde_json::Map::with_capacity(1);
                entry.insert(name.clone(), value.to_json());
                serde_json::Value::Object(entry)
            })
            .collect();

        // Serializing a Vec<serde_json::Value> cannot fail.
        let json = serde_json::to_vec(&body).unwrap_or_default();
        STANDARD.encode(json)
    }

    /// Parses a token and validates it against the active ordering.
    ///
    /// A cursor may only be replayed against the identical ordering it was
    /// produced under: wrong entry count or any field name diverging from
    /// the spec sequence is rejected, never silently misapplied.
    pub fn decode(token: &str, spec: &OrderSpec) -> Result<Cursor> {
        let token = token.trim();

        if token.is_empty() {
            return Err(PageError::InvalidCursor("token is empty".to_string()));
        }

        if token.len() > MAX_CURSOR_TOKEN_LEN {
            return Err(PageError::InvalidCursor(format!(
                "token exceeds max length ({} > {MAX_CURSOR_TOKEN_LEN})",
                token.len()
            )));
        }

        let bytes = STANDARD
            .decode(token)
            .map_err(|e| PageError::InvalidCursor(format!("token is not valid base64: {e}")))?;

        let body: Vec<serde_json::Value> = serde_json::from_slice(&bytes)
            .map_err(|e| PageError::InvalidCursor(format!("token body is not a JSON array: {e}")))?;

        if body.len() != spec.len() {
            return Err(PageError::InvalidCursor(format!(
                "expected {} entries for the active ordering, got {}",
                spec.len(),
                body.len()
            )));
        }

        let mut entries = Vec::with_capacity(body.len());

        for (entry, expected) in body.iter().zip(spec.field_names()) {
            let object = entry.as_object().filter(|o| o.len() == 1).ok_or_else(|| {
                PageError::InvalidCursor("each entry must be a single-key object".to_string())
            })?;

            // `filter` above guarantees exactly one key.
            let (name, json) = object.iter().next().ok_or_else(|| {
                PageError::InvalidCursor("each entry must be a single-key object".to_string())
            })?;

            if name != expected {
                return Err(PageError::InvalidCursor(format!(
                    "field {name:?} does not match the active ordering (expected {expected:?})"
                )));
            }

            let value = Value::from_json(json).ok_or_else(|| {
                PageError::InvalidCursor(format!("field {name:?} holds a non-scalar value"))
            })?;

            entries.push((name.clone(), value));
        }

        Ok(Cursor { entries })
    }
}
