//! Records: one row of a store

use std::collections::BTreeMap;

use serde::Serialize;

use super::value::Value;

/// Store-assigned record key. Unique within a store, never reused.
pub type RecordKey = u64;

static NULL_VALUE: Value = Value::Null;

/// A record: field values plus the key its store assigned.
///
/// Records are only created by their store, which guarantees every
/// declared field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    key: RecordKey,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub(crate) fn new(key: RecordKey, values: BTreeMap<String, Value>) -> Self {
        Self { key, values }
    }

    /// The record key
    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// Value of a field, `None` if the field is not on this record
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Value of a field, `Null` if the field is not on this record
    pub fn value(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL_VALUE)
    }

    /// Iterates fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Replaces a field value, returning the previous one
    pub(crate) fn set(&mut self, field: &str, value: Value) -> Value {
        self.values
            .insert(field.to_string(), value)
            .unwrap_or(Value::Null)
    }
}
