//! Store schema: ordered field names and multi-valued declarations

use std::collections::HashMap;

use super::errors::{TableError, TableResult};
use super::value::Value;

/// Field list of a store.
///
/// Multi-valued fields carry the delimiter used when they cross a text
/// boundary. The delimiter plays no part in the in-memory value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
    multi_valued: HashMap<String, String>,
}

impl Schema {
    /// Builds a schema, rejecting duplicate names and multi-valued
    /// declarations for undeclared fields.
    pub fn new(
        store: &str,
        fields: Vec<String>,
        multi_valued: HashMap<String, String>,
    ) -> TableResult<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].contains(field) {
                return Err(TableError::duplicate_field(store, field));
            }
        }
        for (field, delimiter) in &multi_valued {
            if !fields.contains(field) {
                return Err(TableError::undeclared_field(store, field));
            }
            if delimiter.is_empty() {
                return Err(TableError::schema_violation(format!(
                    "multi-valued field '{}' needs a non-empty delimiter",
                    field
                )));
            }
        }
        Ok(Self {
            fields,
            multi_valued,
        })
    }

    /// Field names in declaration order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `field` is declared
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Whether `field` is multi-valued
    pub fn is_multi_valued(&self, field: &str) -> bool {
        self.multi_valued.contains_key(field)
    }

    /// Delimiter of a multi-valued field
    pub fn delimiter(&self, field: &str) -> Option<&str> {
        self.multi_valued.get(field).map(String::as_str)
    }

    /// Default value for a field: empty list or null
    pub fn default_value(&self, field: &str) -> Value {
        if self.is_multi_valued(field) {
            Value::List(Vec::new())
        } else {
            Value::Null
        }
    }

    /// Checks a value against a declared field and brings it into shape.
    ///
    /// Multi-valued fields turn `Null` into the empty list and a scalar
    /// into a one-element list. Single-valued fields reject lists.
    pub fn coerce(&self, store: &str, field: &str, value: Value) -> TableResult<Value> {
        if !self.contains(field) {
            return Err(TableError::undeclared_field(store, field));
        }
        Self::coerce_shape(field, self.is_multi_valued(field), value)
    }

    pub(crate) fn coerce_shape(field: &str, multi_valued: bool, value: Value) -> TableResult<Value> {
        match (multi_valued, value) {
            (true, Value::Null) => Ok(Value::List(Vec::new())),
            (true, Value::Scalar(s)) => Ok(Value::List(vec![s])),
            (true, list @ Value::List(_)) => Ok(list),
            (false, Value::List(_)) => Err(TableError::schema_violation(format!(
                "field '{}' is single-valued and cannot hold a list",
                field
            ))),
            (false, v) => Ok(v),
        }
    }

    /// Appends a field
    pub(crate) fn push(&mut self, field: String, delimiter: Option<String>) {
        if let Some(delimiter) = delimiter {
            self.multi_valued.insert(field.clone(), delimiter);
        }
        self.fields.push(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TableErrorCode;

    fn schema() -> Schema {
        let mut multi = HashMap::new();
        multi.insert("synonyms".to_string(), ",".to_string());
        Schema::new(
            "genes",
            vec!["id".to_string(), "synonyms".to_string()],
            multi,
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Schema::new(
            "genes",
            vec!["id".to_string(), "id".to_string()],
            HashMap::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), TableErrorCode::SchemaViolation);
    }

    #[test]
    fn test_multi_valued_must_be_declared() {
        let mut multi = HashMap::new();
        multi.insert("tags".to_string(), ",".to_string());
        assert!(Schema::new("genes", vec!["id".to_string()], multi).is_err());
    }

    #[test]
    fn test_coerce_multi_valued() {
        let s = schema();
        assert_eq!(
            s.coerce("genes", "synonyms", Value::Null).unwrap(),
            Value::List(vec![])
        );
        assert_eq!(
            s.coerce("genes", "synonyms", Value::str("a")).unwrap(),
            Value::list(["a"])
        );
    }

    #[test]
    fn test_coerce_single_rejects_list() {
        let s = schema();
        let err = s.coerce("genes", "id", Value::list(["a"])).unwrap_err();
        assert_eq!(err.code(), TableErrorCode::SchemaViolation);
    }

    #[test]
    fn test_coerce_undeclared() {
        let s = schema();
        assert!(s.coerce("genes", "name", Value::str("x")).is_err());
    }
}
