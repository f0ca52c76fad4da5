//! Equi-join of two record stores
//!
//! Execution flow (strict order):
//! 1. Validate both sides and require the right index
//! 2. Build the output schema from the selected, renamed fields
//! 3. For every left record, probe the right index with each join value
//! 4. Emit one output record per distinct matching pair

use std::collections::{BTreeSet, HashSet};

use crate::observability::{self, Event, Severity};
use crate::store::{Record, RecordKey, RecordStore, StoreBuilder, TableError, TableResult, Value};

/// One input of a join: a store, its join field and the fields to copy
#[derive(Debug, Clone)]
pub struct JoinSide<'a> {
    store: &'a RecordStore,
    on: String,
    fields: Vec<String>,
    renamed: Vec<String>,
}

impl<'a> JoinSide<'a> {
    /// Joins on `on` and copies every field under its own name
    pub fn new(store: &'a RecordStore, on: impl Into<String>) -> Self {
        let fields = store.field_names().to_vec();
        Self {
            store,
            on: on.into(),
            renamed: fields.clone(),
            fields,
        }
    }

    /// Copies only `fields`, under their own names
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self.renamed = self.fields.clone();
        self
    }

    /// Output names of the selected fields, position by position
    pub fn rename(mut self, renamed: &[&str]) -> Self {
        self.renamed = renamed.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Names every selected field `<tag><field>` in the output
    pub fn prefixed(mut self, tag: &str) -> Self {
        self.renamed = self.fields.iter().map(|f| format!("{}{}", tag, f)).collect();
        self
    }

    /// The input store
    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// The join field
    pub fn on(&self) -> &str {
        &self.on
    }

    fn validate(&self) -> TableResult<()> {
        let name = self.store.name();
        if !self.store.schema().contains(&self.on) {
            return Err(TableError::undeclared_field(name, &self.on));
        }
        for field in &self.fields {
            if !self.store.schema().contains(field) {
                return Err(TableError::undeclared_field(name, field));
            }
        }
        if self.fields.len() != self.renamed.len() {
            return Err(TableError::arity_mismatch(
                "join fields/renamed",
                self.fields.len(),
                self.renamed.len(),
            ));
        }
        Ok(())
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .zip(&self.renamed)
            .map(|(f, r)| (f.as_str(), r.as_str()))
    }

    fn copy_into(&self, record: &Record, out: &mut Vec<(String, Value)>) {
        for (field, renamed) in self.pairs() {
            out.push((renamed.to_string(), record.value(field).clone()));
        }
    }
}

/// Joins `left` and `right` on equal normalized join values.
///
/// The right store must have an index on its join field; equality follows
/// the right store's case rule. Null join values never match.
pub fn join_on_eq(name: &str, left: &JoinSide<'_>, right: &JoinSide<'_>) -> TableResult<RecordStore> {
    // Step 1: Validate
    left.validate()?;
    right.validate()?;
    let index = right.store.indexes();
    let tree = index
        .tree(&right.on)
        .ok_or_else(|| TableError::missing_index(right.store.name(), &right.on))?;

    // Step 2: Output schema
    let mut builder = StoreBuilder::new(name);
    let mut seen = HashSet::new();
    for side in [left, right] {
        for (field, renamed) in side.pairs() {
            if !seen.insert(renamed) {
                return Err(TableError::duplicate_field(name, renamed));
            }
            builder = builder.field(renamed);
            if let Some(delimiter) = side.store.delimiter(field) {
                builder = builder.multi_valued(renamed, delimiter);
            }
        }
    }
    let mut joined = builder.build()?;

    // Steps 3-4: Probe and emit
    for left_record in left.store.records() {
        let mut matches: BTreeSet<RecordKey> = BTreeSet::new();
        for probe in left_record.value(&left.on).scalars() {
            matches.extend(tree.lookup_eq(&index.normalize(probe)));
        }

        for key in matches {
            let right_record = right.store.get_record(key)?;
            let mut values = Vec::new();
            left.copy_into(left_record, &mut values);
            right.copy_into(right_record, &mut values);
            joined.add_record(values)?;
        }
    }

    if observability::enabled(Severity::Trace) {
        let records = joined.len().to_string();
        observability::log_event(
            Severity::Trace,
            Event::JoinComplete,
            &[
                ("join", name),
                ("left", left.store.name()),
                ("right", right.store.name()),
                ("records", &records),
            ],
        );
    }

    Ok(joined)
}

/// Joins every field of both stores, prefixing output names with a tag
pub fn simple_join_on_eq(
    name: &str,
    left: &RecordStore,
    left_field: &str,
    right: &RecordStore,
    right_field: &str,
    left_tag: &str,
    right_tag: &str,
) -> TableResult<RecordStore> {
    let left = JoinSide::new(left, left_field).prefixed(left_tag);
    let right = JoinSide::new(right, right_field).prefixed(right_tag);
    join_on_eq(name, &left, &right)
}
