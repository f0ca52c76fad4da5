//! Record Store
//!
//! Holds the records of one named table together with its schema and
//! secondary indexes.
//!
//! # Invariants
//!
//! - Every record has a value for every declared field
//! - Record keys increase monotonically and are never reused
//! - Indexes match record contents after every call returns
//! - A call that fails has not mutated the store

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::errors::{TableError, TableResult};
use super::record::{Record, RecordKey};
use super::schema::Schema;
use super::value::{Scalar, Value};
use crate::index::IndexManager;
use crate::query::{KeySorter, SortSpec, ValueMatcher};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl StoreId {
    fn next() -> Self {
        StoreId(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

/// Builder for a [`RecordStore`]
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    name: String,
    fields: Vec<String>,
    multi_valued: HashMap<String, String>,
    case_sensitive: bool,
}

impl StoreBuilder {
    /// Starts a case-insensitive store with no fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends fields in order
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Appends one field
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Declares a field multi-valued with its text delimiter
    pub fn multi_valued(mut self, field: impl Into<String>, delimiter: impl Into<String>) -> Self {
        self.multi_valued.insert(field.into(), delimiter.into());
        self
    }

    /// Sets the index normalization rule
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Validates the schema and creates the store
    pub fn build(self) -> TableResult<RecordStore> {
        let schema = Schema::new(&self.name, self.fields, self.multi_valued)?;
        Ok(RecordStore {
            id: StoreId::next(),
            name: self.name,
            schema,
            records: BTreeMap::new(),
            next_key: 0,
            indexes: IndexManager::new(self.case_sensitive),
        })
    }
}

/// A table of records with secondary indexes
#[derive(Debug)]
pub struct RecordStore {
    id: StoreId,
    name: String,
    schema: Schema,
    records: BTreeMap<RecordKey, Record>,
    next_key: RecordKey,
    indexes: IndexManager,
}

impl RecordStore {
    /// Case-insensitive store with single-valued fields
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StoreBuilder::new(name).fields(fields).build()
    }

    // ------------------------------------------------------------------
    // Simple getters and setters
    // ------------------------------------------------------------------

    /// Process-unique identity
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Printable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the store
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> &[String] {
        self.schema.fields()
    }

    /// Whether `field` is multi-valued
    pub fn is_multi_valued(&self, field: &str) -> bool {
        self.schema.is_multi_valued(field)
    }

    /// Text delimiter of a multi-valued field
    pub fn delimiter(&self, field: &str) -> Option<&str> {
        self.schema.delimiter(field)
    }

    /// Whether index values keep their case
    pub fn case_sensitive(&self) -> bool {
        self.indexes.case_sensitive()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All record keys, ascending
    pub fn keys(&self) -> Vec<RecordKey> {
        self.records.keys().copied().collect()
    }

    /// All records in key order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Read access to the indexes
    pub fn indexes(&self) -> &IndexManager {
        &self.indexes
    }

    /// Whether `field` is indexed
    pub fn has_index(&self, field: &str) -> bool {
        self.indexes.has_index(field)
    }

    /// Indexed field names, sorted
    pub fn indexed_fields(&self) -> Vec<&str> {
        self.indexes.indexed_fields()
    }

    // ------------------------------------------------------------------
    // Adding/deleting records, adding fields
    // ------------------------------------------------------------------

    /// Adds a record and returns its new key.
    ///
    /// The store takes ownership of the values, so nothing the caller
    /// holds is shared with the store. Missing fields get their default.
    pub fn add_record<I, K>(&mut self, fields: I) -> TableResult<RecordKey>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut values = BTreeMap::new();
        for (field, value) in fields {
            let field = field.into();
            let value = self.schema.coerce(&self.name, &field, value)?;
            values.insert(field, value);
        }
        for field in self.schema.fields() {
            if !values.contains_key(field) {
                values.insert(field.clone(), self.schema.default_value(field));
            }
        }

        let key = self.next_key;
        self.next_key += 1;

        let record = Record::new(key, values);
        self.indexes.index_record(&record);
        self.records.insert(key, record);

        Ok(key)
    }

    /// Deletes records. Unknown keys are ignored.
    ///
    /// Returns the number of records deleted.
    pub fn delete_records(&mut self, keys: &[RecordKey]) -> usize {
        let mut deleted = 0;
        for key in keys {
            if let Some(record) = self.records.remove(key) {
                self.indexes.unindex_record(&record);
                deleted += 1;
            }
        }
        deleted
    }

    /// Sets several fields of one record.
    ///
    /// Everything is validated before the first field changes.
    pub fn update_fields(
        &mut self,
        key: RecordKey,
        fields: &[&str],
        values: Vec<Value>,
    ) -> TableResult<()> {
        if fields.len() != values.len() {
            return Err(TableError::arity_mismatch(
                "update fields/values",
                fields.len(),
                values.len(),
            ));
        }

        let updates = fields
            .iter()
            .zip(values)
            .map(|(field, value)| {
                self.schema
                    .coerce(&self.name, field, value)
                    .map(|value| (*field, value))
            })
            .collect::<TableResult<Vec<_>>>()?;

        let record = match self.records.get_mut(&key) {
            Some(record) => record,
            None => return Err(TableError::unknown_key(&self.name, key)),
        };

        for (field, value) in updates {
            let old = record.set(field, value);
            if self.indexes.has_index(field) {
                self.indexes.unindex_value(field, key, &old);
                self.indexes.index_value(field, key, record.value(field));
            }
        }

        Ok(())
    }

    /// Sets one field of one record
    pub fn update_field(&mut self, key: RecordKey, field: &str, value: Value) -> TableResult<()> {
        self.update_fields(key, &[field], vec![value])
    }

    /// Appends a field and back-fills every record with `default`.
    ///
    /// `delimiter` makes the field multi-valued.
    pub fn add_field(
        &mut self,
        field: &str,
        default: Value,
        delimiter: Option<&str>,
    ) -> TableResult<()> {
        if self.schema.contains(field) {
            return Err(TableError::duplicate_field(&self.name, field));
        }
        if delimiter == Some("") {
            return Err(TableError::schema_violation(format!(
                "multi-valued field '{}' needs a non-empty delimiter",
                field
            )));
        }
        let default = Schema::coerce_shape(field, delimiter.is_some(), default)?;

        self.schema
            .push(field.to_string(), delimiter.map(str::to_string));
        for record in self.records.values_mut() {
            record.set(field, default.clone());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Index maintenance
    // ------------------------------------------------------------------

    /// Replaces all indexes with fresh ones for exactly `fields`
    pub fn build_indexes(&mut self, fields: &[&str]) -> TableResult<()> {
        self.check_fields(fields)?;
        self.indexes.clear();
        self.add_indexes(fields)
    }

    /// (Re)builds indexes for `fields`, leaving other indexes alone
    pub fn add_indexes(&mut self, fields: &[&str]) -> TableResult<()> {
        self.check_fields(fields)?;
        for field in fields {
            self.indexes.rebuild(field, self.records.values());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Retrieving records/keys, sorted or not
    // ------------------------------------------------------------------

    /// A single record
    pub fn get_record(&self, key: RecordKey) -> TableResult<&Record> {
        self.records
            .get(&key)
            .ok_or_else(|| TableError::unknown_key(&self.name, key))
    }

    /// Records for `keys` (all records when `None`).
    ///
    /// Without a sort, records come back in the order of `keys`, or key
    /// order when all records are requested.
    pub fn get_records(
        &self,
        keys: Option<&[RecordKey]>,
        sort: Option<&SortSpec>,
    ) -> TableResult<Vec<&Record>> {
        let keys = match keys {
            Some(keys) => keys.to_vec(),
            None => self.keys(),
        };
        let keys = self.sort_keys(keys, sort)?;
        keys.iter().map(|key| self.get_record(*key)).collect()
    }

    /// Sorts a copy of `keys`; returns them unchanged without a sort
    pub fn sort_keys(
        &self,
        keys: Vec<RecordKey>,
        sort: Option<&SortSpec>,
    ) -> TableResult<Vec<RecordKey>> {
        match sort {
            Some(spec) if !spec.is_empty() => KeySorter::sort(self, &keys, spec),
            _ => Ok(keys),
        }
    }

    /// Keys of records whose `field` equals `value`.
    ///
    /// Uses the index when `field` is indexed and `value` is a scalar,
    /// otherwise scans every record with the same normalized equality.
    pub fn select_keys_where(
        &self,
        field: &str,
        value: &Value,
        sort: Option<&SortSpec>,
    ) -> TableResult<Vec<RecordKey>> {
        self.check_fields(&[field])?;

        let indexed = match value {
            Value::Scalar(probe) => self.indexes.lookup(field, probe),
            _ => None,
        };
        let keys = match indexed {
            Some(keys) => keys,
            None => {
                let matcher = ValueMatcher::new(self.case_sensitive());
                self.records
                    .values()
                    .filter(|record| matcher.matches(record.value(field), value))
                    .map(Record::key)
                    .collect()
            }
        };

        self.sort_keys(keys, sort)
    }

    /// Records whose `field` equals `value`
    pub fn select_records_where(
        &self,
        field: &str,
        value: &Value,
        sort: Option<&SortSpec>,
    ) -> TableResult<Vec<&Record>> {
        let keys = self.select_keys_where(field, value, sort)?;
        keys.iter().map(|key| self.get_record(*key)).collect()
    }

    /// Index lookup; falls back to a scan when `field` is unindexed
    pub fn keys_by_index(
        &self,
        field: &str,
        value: &Scalar,
        sort: Option<&SortSpec>,
    ) -> TableResult<Vec<RecordKey>> {
        self.select_keys_where(field, &Value::Scalar(value.clone()), sort)
    }

    /// Records found by [`RecordStore::keys_by_index`]
    pub fn records_by_index(
        &self,
        field: &str,
        value: &Scalar,
        sort: Option<&SortSpec>,
    ) -> TableResult<Vec<&Record>> {
        let keys = self.keys_by_index(field, value, sort)?;
        keys.iter().map(|key| self.get_record(*key)).collect()
    }

    // ------------------------------------------------------------------
    // Duplicates, distinct values, subsets
    // ------------------------------------------------------------------

    /// Distinct normalized values of an indexed field, ascending
    pub fn distinct_values(&self, field: &str) -> TableResult<Vec<String>> {
        let tree = self.require_index(field)?;
        Ok(tree.values().map(str::to_string).collect())
    }

    /// For each field, the values held by more than one record.
    ///
    /// Result: field -> normalized value -> keys. Every field needs an index.
    pub fn dups(
        &self,
        fields: &[&str],
    ) -> TableResult<BTreeMap<String, BTreeMap<String, Vec<RecordKey>>>> {
        let mut result = BTreeMap::new();
        for field in fields {
            let tree = self.require_index(field)?;
            let dups = tree
                .iter()
                .filter(|(_, keys)| keys.len() > 1)
                .map(|(value, keys)| (value.to_string(), keys.to_vec()))
                .collect();
            result.insert(field.to_string(), dups);
        }
        Ok(result)
    }

    /// Keys of records sharing a value of `field` with another record.
    ///
    /// With `omit_first`, the lowest key of each value is left out, so
    /// deleting the result keeps exactly one record per value.
    pub fn keys_for_dups(&self, field: &str, omit_first: bool) -> TableResult<Vec<RecordKey>> {
        let dups = self.dups(&[field])?;
        let mut keys = Vec::new();
        for value_keys in dups.into_values().flat_map(BTreeMap::into_values) {
            let skip = usize::from(omit_first);
            keys.extend(value_keys.into_iter().skip(skip));
        }
        Ok(keys)
    }

    /// Copies records into a new store.
    ///
    /// Keys and the key counter are preserved, indexes are not.
    pub fn select_subset(
        &self,
        name: impl Into<String>,
        keys: Option<&[RecordKey]>,
    ) -> TableResult<RecordStore> {
        let keys = match keys {
            Some(keys) => keys.to_vec(),
            None => self.keys(),
        };

        let mut records = BTreeMap::new();
        for key in keys {
            let record = self.get_record(key)?;
            records.insert(key, record.clone());
        }

        Ok(RecordStore {
            id: StoreId::next(),
            name: name.into(),
            schema: self.schema.clone(),
            records,
            next_key: self.next_key,
            indexes: IndexManager::new(self.case_sensitive()),
        })
    }

    fn check_fields(&self, fields: &[&str]) -> TableResult<()> {
        for field in fields {
            if !self.schema.contains(field) {
                return Err(TableError::undeclared_field(&self.name, field));
            }
        }
        Ok(())
    }

    fn require_index(&self, field: &str) -> TableResult<&crate::index::IndexTree> {
        self.check_fields(&[field])?;
        self.indexes
            .tree(field)
            .ok_or_else(|| TableError::missing_index(&self.name, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TableErrorCode;

    fn make_store() -> RecordStore {
        StoreBuilder::new("markers")
            .fields(["id", "symbol", "tags"])
            .multi_valued("tags", ",")
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_record_fills_defaults() {
        let mut store = make_store();
        let key = store.add_record([("id", Value::str("M1"))]).unwrap();

        let record = store.get_record(key).unwrap();
        assert!(record.value("symbol").is_null());
        assert_eq!(record.value("tags"), &Value::List(vec![]));
    }

    #[test]
    fn test_keys_are_never_reused() {
        let mut store = make_store();
        let k0 = store.add_record([("id", Value::str("M1"))]).unwrap();
        store.delete_records(&[k0]);
        let k1 = store.add_record([("id", Value::str("M1"))]).unwrap();
        assert!(k1 > k0);
    }

    #[test]
    fn test_undeclared_field_rejected_without_mutation() {
        let mut store = make_store();
        let err = store
            .add_record([("id", Value::str("M1")), ("color", Value::str("red"))])
            .unwrap_err();
        assert_eq!(err.code(), TableErrorCode::SchemaViolation);
        assert!(store.is_empty());

        // key counter untouched
        assert_eq!(store.add_record([("id", Value::str("M2"))]).unwrap(), 0);
    }

    #[test]
    fn test_delete_ignores_unknown_keys() {
        let mut store = make_store();
        store.add_record([("id", Value::str("M1"))]).unwrap();
        assert_eq!(store.delete_records(&[0, 5, 9]), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_fields_arity_checked_first() {
        let mut store = make_store();
        store.build_indexes(&["symbol"]).unwrap();
        let key = store.add_record([("symbol", Value::str("Kit"))]).unwrap();

        let err = store
            .update_fields(key, &["symbol", "id"], vec![Value::str("Pax6")])
            .unwrap_err();
        assert_eq!(err.code(), TableErrorCode::ArityMismatch);
        assert_eq!(store.get_record(key).unwrap().value("symbol"), &Value::str("Kit"));
    }

    #[test]
    fn test_update_fields_reindexes() {
        let mut store = make_store();
        store.build_indexes(&["symbol", "tags"]).unwrap();
        let key = store
            .add_record([("symbol", Value::str("Kit")), ("tags", Value::list(["a"]))])
            .unwrap();

        store
            .update_fields(key, &["symbol", "tags"], vec![Value::str("Pax6"), Value::list(["b", "c"])])
            .unwrap();

        let kit = store.keys_by_index("symbol", &Scalar::from("kit"), None).unwrap();
        assert!(kit.is_empty());
        let pax = store.keys_by_index("symbol", &Scalar::from("pax6"), None).unwrap();
        assert_eq!(pax, vec![key]);
        assert!(store.keys_by_index("tags", &Scalar::from("a"), None).unwrap().is_empty());
        assert_eq!(store.keys_by_index("tags", &Scalar::from("c"), None).unwrap(), vec![key]);
    }

    #[test]
    fn test_update_unknown_key() {
        let mut store = make_store();
        let err = store.update_field(3, "symbol", Value::str("x")).unwrap_err();
        assert_eq!(err.code(), TableErrorCode::UnknownKey);
    }

    #[test]
    fn test_add_field_backfills() {
        let mut store = make_store();
        store.add_record([("id", Value::str("M1"))]).unwrap();
        store.add_record([("id", Value::str("M2"))]).unwrap();

        store.add_field("status", Value::str("new"), None).unwrap();
        store.add_field("notes", Value::Null, Some(";")).unwrap();

        for record in store.records() {
            assert_eq!(record.value("status"), &Value::str("new"));
            assert_eq!(record.value("notes"), &Value::List(vec![]));
        }
        assert!(store.is_multi_valued("notes"));
        assert_eq!(store.field_names().last().unwrap(), "notes");
    }

    #[test]
    fn test_add_existing_field_fails() {
        let mut store = make_store();
        let err = store.add_field("symbol", Value::Null, None).unwrap_err();
        assert_eq!(err.code(), TableErrorCode::SchemaViolation);
    }

    #[test]
    fn test_select_uses_index_or_scan() {
        let mut store = make_store();
        store.add_record([("symbol", Value::str("Kit"))]).unwrap();
        store.add_record([("symbol", Value::str("KIT"))]).unwrap();
        store.add_record([("symbol", Value::str("Pax6"))]).unwrap();

        let scanned = store.select_keys_where("symbol", &Value::str("kit"), None).unwrap();
        store.build_indexes(&["symbol"]).unwrap();
        let indexed = store.select_keys_where("symbol", &Value::str("kit"), None).unwrap();

        assert_eq!(scanned, vec![0, 1]);
        assert_eq!(scanned, indexed);
    }

    #[test]
    fn test_select_undeclared_field() {
        let store = make_store();
        let err = store.select_keys_where("color", &Value::str("x"), None).unwrap_err();
        assert_eq!(err.code(), TableErrorCode::SchemaViolation);
    }

    #[test]
    fn test_get_records_in_supplied_order() {
        let mut store = make_store();
        for id in ["a", "b", "c"] {
            store.add_record([("id", Value::str(id))]).unwrap();
        }
        let records = store.get_records(Some(&[2, 0]), None).unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec![2, 0]);

        assert!(store.get_records(Some(&[7]), None).is_err());
    }

    #[test]
    fn test_build_indexes_replaces_all() {
        let mut store = make_store();
        store.build_indexes(&["id", "symbol"]).unwrap();
        store.build_indexes(&["tags"]).unwrap();
        assert_eq!(store.indexed_fields(), vec!["tags"]);

        store.add_indexes(&["id"]).unwrap();
        assert_eq!(store.indexed_fields(), vec!["id", "tags"]);

        store.build_indexes(&[]).unwrap();
        assert!(store.indexed_fields().is_empty());
    }

    #[test]
    fn test_dups() {
        let mut store = make_store();
        for symbol in ["Kit", "Pax6", "kit", "Abl1", "KIT"] {
            store.add_record([("symbol", Value::str(symbol))]).unwrap();
        }
        assert!(store.keys_for_dups("symbol", false).is_err());

        store.build_indexes(&["symbol"]).unwrap();
        assert_eq!(store.keys_for_dups("symbol", false).unwrap(), vec![0, 2, 4]);
        assert_eq!(store.keys_for_dups("symbol", true).unwrap(), vec![2, 4]);

        let dups = store.dups(&["symbol"]).unwrap();
        assert_eq!(dups["symbol"].len(), 1);
        assert_eq!(dups["symbol"]["kit"], vec![0, 2, 4]);
    }

    #[test]
    fn test_distinct_values() {
        let mut store = make_store();
        store.build_indexes(&["tags"]).unwrap();
        store.add_record([("tags", Value::list(["b", "a"]))]).unwrap();
        store.add_record([("tags", Value::list(["B"]))]).unwrap();
        assert_eq!(store.distinct_values("tags").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_select_subset_keeps_keys() {
        let mut store = make_store();
        for id in ["a", "b", "c"] {
            store.add_record([("id", Value::str(id))]).unwrap();
        }
        store.build_indexes(&["id"]).unwrap();

        let mut subset = store.select_subset("subset", Some(&[0, 2])).unwrap();
        assert_eq!(subset.keys(), vec![0, 2]);
        assert!(subset.indexed_fields().is_empty());
        assert_ne!(subset.id(), store.id());

        let next = subset.add_record([("id", Value::str("d"))]).unwrap();
        assert_eq!(next, 3);
        assert_eq!(store.len(), 3);
    }
}
