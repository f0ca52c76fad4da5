//! Record key sorting
//!
//! Sorts a copy of a key list by one or more fields. Each field may carry
//! its own comparator; comparators are passed per call and never stored
//! on the store.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::store::{Record, RecordKey, RecordStore, TableError, TableResult, Value};

/// Caller-supplied ordering for the values of one field
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// One sort field with an optional comparator
#[derive(Clone)]
pub struct SortKey {
    field: String,
    comparator: Option<Comparator>,
}

impl SortKey {
    /// Field sorted by
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether a comparator was supplied
    pub fn has_comparator(&self) -> bool {
        self.comparator.is_some()
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match &self.comparator {
            Some(cmp) => cmp(a, b),
            None => a.compare(b),
        }
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("field", &self.field)
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

/// Ordered list of sort keys.
///
/// Records compare key by key; the first non-equal result decides.
#[derive(Debug, Clone, Default)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Sort by one field with the default ordering
    pub fn by(field: impl Into<String>) -> Self {
        Self::default().then(field)
    }

    /// Sort by one field with a comparator
    pub fn by_with<F>(field: impl Into<String>, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        Self::default().then_with(field, comparator)
    }

    /// Add a tie-breaking field with the default ordering
    pub fn then(mut self, field: impl Into<String>) -> Self {
        self.keys.push(SortKey {
            field: field.into(),
            comparator: None,
        });
        self
    }

    /// Add a tie-breaking field with a comparator
    pub fn then_with<F>(mut self, field: impl Into<String>, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.keys.push(SortKey {
            field: field.into(),
            comparator: Some(Arc::new(comparator)),
        });
        self
    }

    /// Build from parallel field and comparator lists
    pub fn from_parts(fields: &[&str], comparators: Vec<Option<Comparator>>) -> TableResult<Self> {
        if fields.len() != comparators.len() {
            return Err(TableError::arity_mismatch(
                "sort fields/comparators",
                fields.len(),
                comparators.len(),
            ));
        }
        let keys = fields
            .iter()
            .zip(comparators)
            .map(|(field, comparator)| SortKey {
                field: field.to_string(),
                comparator,
            })
            .collect();
        Ok(Self { keys })
    }

    /// Sort keys in priority order
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Whether no sort field was given
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for key in &self.keys {
            let ordering = key.compare(a.value(&key.field), b.value(&key.field));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Sorts record keys of a store
pub struct KeySorter;

impl KeySorter {
    /// Returns `keys` sorted according to `spec`.
    ///
    /// The sort is stable: keys comparing equal keep their input order.
    pub fn sort(
        store: &RecordStore,
        keys: &[RecordKey],
        spec: &SortSpec,
    ) -> TableResult<Vec<RecordKey>> {
        Self::validate(store, spec)?;

        let mut rows: Vec<&Record> = keys
            .iter()
            .map(|key| store.get_record(*key))
            .collect::<TableResult<_>>()?;

        rows.sort_by(|a, b| spec.compare(a, b));

        Ok(rows.into_iter().map(Record::key).collect())
    }

    /// Checks that every sort field exists and can be ordered
    pub fn validate(store: &RecordStore, spec: &SortSpec) -> TableResult<()> {
        for key in spec.keys() {
            if !store.schema().contains(key.field()) {
                return Err(TableError::undeclared_field(store.name(), key.field()));
            }
            if store.is_multi_valued(key.field()) && !key.has_comparator() {
                return Err(TableError::unorderable(key.field()));
            }
        }
        Ok(())
    }
}
