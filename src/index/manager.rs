//! Index Manager
//!
//! Maintains the secondary indexes of one store.
//!
//! # API
//!
//! - `rebuild(field, records)` - (Re)build one field index
//! - `index_record(record)` / `unindex_record(record)` - All indexes, one record
//! - `index_value(field, key, value)` / `unindex_value(...)` - One field, one record
//! - `lookup(field, probe)` - Exact match on a normalized value

use std::collections::HashMap;

use super::btree::IndexTree;
use crate::observability::{self, Event, Severity};
use crate::store::{Record, RecordKey, Scalar, Value};

/// Index Manager that maintains in-memory field indexes
#[derive(Debug, Clone, Default)]
pub struct IndexManager {
    /// Lower-case index values when false
    case_sensitive: bool,

    /// Field indexes (field -> IndexTree)
    indexes: HashMap<String, IndexTree>,
}

impl IndexManager {
    /// Creates an empty manager with the given normalization rule
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            indexes: HashMap::new(),
        }
    }

    /// Whether index values keep their case
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Normalizes a scalar into its index value
    pub fn normalize(&self, value: &Scalar) -> String {
        normalize_with(self.case_sensitive, value)
    }

    /// Normalizes already-canonical text into an index value
    pub fn normalize_text(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }

    /// Whether `field` has an index
    pub fn has_index(&self, field: &str) -> bool {
        self.indexes.contains_key(field)
    }

    /// Indexed field names, sorted
    pub fn indexed_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.indexes.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }

    /// The index of one field
    pub fn tree(&self, field: &str) -> Option<&IndexTree> {
        self.indexes.get(field)
    }

    /// Drop every index
    pub fn clear(&mut self) {
        self.indexes.clear();
    }

    /// Discard and rebuild the index for `field` from `records`
    pub fn rebuild<'a, I>(&mut self, field: &str, records: I)
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut tree = IndexTree::new();
        for record in records {
            for scalar in record.value(field).scalars() {
                tree.insert(self.normalize(scalar), record.key());
            }
        }

        if observability::enabled(Severity::Trace) {
            let values = tree.value_count().to_string();
            let entries = tree.entry_count().to_string();
            observability::log_event(
                Severity::Trace,
                Event::IndexBuilt,
                &[("field", field), ("values", &values), ("entries", &entries)],
            );
        }

        self.indexes.insert(field.to_string(), tree);
    }

    /// Add a new record to every index
    pub fn index_record(&mut self, record: &Record) {
        let fields: Vec<String> = self.indexes.keys().cloned().collect();
        for field in fields {
            self.index_value(&field, record.key(), record.value(&field));
        }
    }

    /// Remove a record from every index
    pub fn unindex_record(&mut self, record: &Record) {
        let fields: Vec<String> = self.indexes.keys().cloned().collect();
        for field in fields {
            self.unindex_value(&field, record.key(), record.value(&field));
        }
    }

    /// Add `key` under each element of `value` in the index of `field`.
    ///
    /// Null is never indexed. Does nothing if `field` is unindexed.
    pub fn index_value(&mut self, field: &str, key: RecordKey, value: &Value) {
        let case_sensitive = self.case_sensitive;
        if let Some(tree) = self.indexes.get_mut(field) {
            for scalar in value.scalars() {
                tree.insert(normalize_with(case_sensitive, scalar), key);
            }
        }
    }

    /// Remove `key` from under each element of `value` in the index of `field`
    pub fn unindex_value(&mut self, field: &str, key: RecordKey, value: &Value) {
        let case_sensitive = self.case_sensitive;
        if let Some(tree) = self.indexes.get_mut(field) {
            for scalar in value.scalars() {
                tree.remove(&normalize_with(case_sensitive, scalar), key);
            }
        }
    }

    /// Keys whose `field` holds `probe` after normalization.
    ///
    /// Returns `None` when `field` is unindexed so callers can fall back
    /// to a scan.
    pub fn lookup(&self, field: &str, probe: &Scalar) -> Option<Vec<RecordKey>> {
        let tree = self.indexes.get(field)?;
        Some(tree.lookup_eq(&self.normalize(probe)).to_vec())
    }
}

fn normalize_with(case_sensitive: bool, value: &Scalar) -> String {
    let text = value.canonical();
    if case_sensitive {
        text
    } else {
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn make_record(key: RecordKey, symbol: &str, synonyms: &[&str]) -> Record {
        let mut values = BTreeMap::new();
        values.insert("symbol".to_string(), Value::str(symbol));
        values.insert("synonyms".to_string(), Value::list(synonyms.to_vec()));
        Record::new(key, values)
    }

    #[test]
    fn test_rebuild_and_lookup() {
        let records = vec![
            make_record(0, "Pax6", &[]),
            make_record(1, "Kit", &[]),
            make_record(2, "pax6", &[]),
        ];

        let mut manager = IndexManager::new(false);
        manager.rebuild("symbol", &records);

        assert_eq!(manager.lookup("symbol", &Scalar::from("PAX6")), Some(vec![0, 2]));
        assert_eq!(manager.lookup("symbol", &Scalar::from("kit")), Some(vec![1]));
        assert_eq!(manager.lookup("synonyms", &Scalar::from("x")), None);
    }

    #[test]
    fn test_case_sensitive_lookup() {
        let records = vec![make_record(0, "Pax6", &[]), make_record(1, "pax6", &[])];

        let mut manager = IndexManager::new(true);
        manager.rebuild("symbol", &records);

        assert_eq!(manager.lookup("symbol", &Scalar::from("Pax6")), Some(vec![0]));
        assert_eq!(manager.lookup("symbol", &Scalar::from("PAX6")), Some(vec![]));
    }

    #[test]
    fn test_multi_valued_elements_indexed_individually() {
        let record = make_record(4, "Kit", &["a", "b"]);

        let mut manager = IndexManager::new(false);
        manager.rebuild("synonyms", std::iter::empty::<&Record>());
        manager.index_record(&record);

        assert_eq!(manager.lookup("synonyms", &Scalar::from("a")), Some(vec![4]));
        assert_eq!(manager.lookup("synonyms", &Scalar::from("b")), Some(vec![4]));

        manager.unindex_record(&record);
        assert_eq!(manager.tree("synonyms").unwrap().value_count(), 0);
    }

    #[test]
    fn test_null_not_indexed() {
        let mut values = BTreeMap::new();
        values.insert("symbol".to_string(), Value::Null);
        let record = Record::new(0, values);

        let mut manager = IndexManager::new(false);
        manager.rebuild("symbol", [&record]);

        assert_eq!(manager.tree("symbol").unwrap().entry_count(), 0);
    }

    #[test]
    fn test_numbers_normalize_to_text() {
        let mut values = BTreeMap::new();
        values.insert("id".to_string(), Value::int(10));
        let record = Record::new(0, values);

        let mut manager = IndexManager::new(false);
        manager.rebuild("id", [&record]);

        assert_eq!(manager.lookup("id", &Scalar::from("10")), Some(vec![0]));
        assert_eq!(manager.lookup("id", &Scalar::Int(10)), Some(vec![0]));
    }
}
