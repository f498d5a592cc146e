//! Enum columns are stored as their serde string representation (the same
//! `rename_all` the domain enums already carry) so there is exactly one
//! source of truth for the wire form of a status, not a second hand-written
//! parser per enum.

use serde::{de::DeserializeOwned, Serialize};

use gst_core::GstError;

pub fn enum_to_sql<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        other => unreachable!("enum column serialized to non-string: {other:?}"),
    }
}

pub fn enum_from_sql<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T, GstError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|e| {
        GstError::Database {
            operation: format!("decode {column}"),
            reason: format!("{raw:?}: {e}"),
        }
    })
}
