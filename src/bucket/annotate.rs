//! Writing bucketization results back into a store
//!
//! Adds a bucket-type field plus optional fields filled from cohort
//! records to every record of one of the two bucketized stores.

use std::collections::{HashMap, HashSet};

use super::bucketizer::Bucketization;
use super::item::Side;
use crate::observability::{self, Event, Severity};
use crate::store::{Record, RecordKey, RecordStore, Scalar, TableError, TableResult, Value};

/// Pseudo source field naming the cohort record's key
pub const KEY_FIELD: &str = "_rcdkey";

/// New field filled from one source field of cohort records
#[derive(Debug, Clone, PartialEq, Eq)]
struct CohortField {
    target: String,
    source: String,
}

/// Fields to add when annotating a store with bucket results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSpec {
    bucket_type_field: String,
    other_fields: Vec<CohortField>,
    this_fields: Vec<CohortField>,
    multi_valued: HashMap<String, String>,
}

impl AnnotationSpec {
    /// Adds only the bucket-type field
    pub fn new(bucket_type_field: impl Into<String>) -> Self {
        Self {
            bucket_type_field: bucket_type_field.into(),
            other_fields: Vec::new(),
            this_fields: Vec::new(),
            multi_valued: HashMap::new(),
        }
    }

    /// Adds `target`, filled from `source` of cohorts in the other store
    pub fn other_cohort_field(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.other_fields.push(CohortField {
            target: target.into(),
            source: source.into(),
        });
        self
    }

    /// Adds `target`, filled from `source` of cohorts in the annotated store
    pub fn this_cohort_field(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.this_fields.push(CohortField {
            target: target.into(),
            source: source.into(),
        });
        self
    }

    /// Makes a new cohort field multi-valued
    pub fn multi_valued(mut self, target: impl Into<String>, delimiter: impl Into<String>) -> Self {
        self.multi_valued.insert(target.into(), delimiter.into());
        self
    }

    /// Builds a spec from parallel target/source lists
    pub fn from_parts(
        bucket_type_field: &str,
        other_targets: &[&str],
        other_sources: &[&str],
        this_targets: &[&str],
        this_sources: &[&str],
    ) -> TableResult<Self> {
        if other_targets.len() != other_sources.len() {
            return Err(TableError::arity_mismatch(
                "other cohort fields",
                other_targets.len(),
                other_sources.len(),
            ));
        }
        if this_targets.len() != this_sources.len() {
            return Err(TableError::arity_mismatch(
                "this cohort fields",
                this_targets.len(),
                this_sources.len(),
            ));
        }
        let mut spec = Self::new(bucket_type_field);
        for (target, source) in other_targets.iter().zip(other_sources) {
            spec = spec.other_cohort_field(*target, *source);
        }
        for (target, source) in this_targets.iter().zip(this_sources) {
            spec = spec.this_cohort_field(*target, *source);
        }
        Ok(spec)
    }

    /// Every new field name, bucket type first
    pub fn new_fields(&self) -> Vec<&str> {
        std::iter::once(self.bucket_type_field.as_str())
            .chain(self.other_fields.iter().map(|f| f.target.as_str()))
            .chain(self.this_fields.iter().map(|f| f.target.as_str()))
            .collect()
    }

    fn delimiter(&self, target: &str) -> Option<&str> {
        self.multi_valued.get(target).map(String::as_str)
    }

    fn validate(&self, target: &RecordStore, other: &RecordStore) -> TableResult<()> {
        let new_fields = self.new_fields();

        let mut seen = HashSet::new();
        for field in &new_fields {
            if target.schema().contains(field) || !seen.insert(*field) {
                return Err(TableError::duplicate_field(target.name(), field));
            }
        }
        for (field, delimiter) in &self.multi_valued {
            if !new_fields.contains(&field.as_str()) || *field == self.bucket_type_field {
                return Err(TableError::schema_violation(format!(
                    "'{}' is not a cohort field and cannot be multi-valued",
                    field
                )));
            }
            if delimiter.is_empty() {
                return Err(TableError::schema_violation(format!(
                    "multi-valued field '{}' needs a non-empty delimiter",
                    field
                )));
            }
        }
        for (store, fields) in [(other, &self.other_fields), (target, &self.this_fields)] {
            for field in fields {
                if field.source != KEY_FIELD && !store.schema().contains(&field.source) {
                    return Err(TableError::undeclared_field(store.name(), &field.source));
                }
            }
        }
        Ok(())
    }
}

impl Bucketization {
    /// Annotates every record of `target` with its bucket results.
    ///
    /// `other` must be the other store of this bucketization. A
    /// single-valued cohort field is set only when there is exactly one
    /// cohort; a multi-valued one collects every cohort value, keeping
    /// duplicates. Nothing changes if validation fails.
    pub fn update_data_set(
        &self,
        target: &mut RecordStore,
        other: &RecordStore,
        spec: &AnnotationSpec,
    ) -> TableResult<()> {
        let side = self.side_of(target)?;
        if self.side_of(other)? != side.other() {
            return Err(TableError::unknown_store(other.name()));
        }
        spec.validate(target, other)?;

        // Compute every value before the first field is added
        let mut updates: Vec<(RecordKey, Vec<Value>)> = Vec::with_capacity(target.len());
        for key in target.keys() {
            let cohorts = self.cohorts(side, key)?;
            let mut values = Vec::with_capacity(spec.new_fields().len());
            values.push(Value::str(self.bucket_type(side, key)?.as_str()));

            for field in &spec.other_fields {
                let keys = cohorts.keys(side.other());
                values.push(cohort_value(other, keys, field, spec.delimiter(&field.target))?);
            }
            for field in &spec.this_fields {
                let keys = cohorts.keys(side);
                values.push(cohort_value(target, keys, field, spec.delimiter(&field.target))?);
            }
            updates.push((key, values));
        }

        for field in spec.new_fields() {
            target.add_field(field, Value::Null, spec.delimiter(field))?;
        }
        let new_fields = spec.new_fields();
        for (key, values) in updates {
            target.update_fields(key, &new_fields, values)?;
        }

        if observability::enabled(Severity::Trace) {
            let records = target.len().to_string();
            let fields = new_fields.len().to_string();
            observability::log_event(
                Severity::Trace,
                Event::DatasetAnnotated,
                &[
                    ("store", target.name()),
                    ("fields", &fields),
                    ("records", &records),
                ],
            );
        }

        Ok(())
    }
}

fn source_value(record: &Record, source: &str) -> Value {
    if source == KEY_FIELD {
        return Value::Scalar(key_scalar(record.key()));
    }
    record.value(source).clone()
}

fn key_scalar(key: RecordKey) -> Scalar {
    // keys beyond i64 range are rendered as text
    i64::try_from(key)
        .map(Scalar::Int)
        .unwrap_or_else(|_| Scalar::Str(key.to_string()))
}

fn cohort_value(
    store: &RecordStore,
    keys: &[RecordKey],
    field: &CohortField,
    target_delimiter: Option<&str>,
) -> TableResult<Value> {
    match target_delimiter {
        // multi-valued target: every cohort value, flattened
        Some(_) => {
            let mut items = Vec::new();
            for key in keys {
                let record = store.get_record(*key)?;
                items.extend_from_slice(source_value(record, &field.source).scalars());
            }
            Ok(Value::List(items))
        }
        None => {
            let [key] = keys else {
                return Ok(Value::Null);
            };
            let record = store.get_record(*key)?;
            Ok(match source_value(record, &field.source) {
                list @ Value::List(_) => {
                    let delimiter = store.delimiter(&field.source).unwrap_or(",");
                    Value::str(list.render(delimiter))
                }
                value => value,
            })
        }
    }
}
