//! Single-item lookup request
//!
//! Describes a `key == value` match against the cached collection.

use serde::Deserialize;
use serde_json::Value;

/// Field/value pair used to select one item from a collection.
///
/// # Fields
/// - `key`: The field name read from each item
/// - `value`: The value the field must loosely equal
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lookup {
    /// Field name to compare
    pub key: String,
    /// Value to compare against
    pub value: Value,
}

impl Lookup {
    /// Creates a new Lookup
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Renders the value the way it appears in error messages.
    ///
    /// Strings are shown without quotes.
    pub fn value_label(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
