//! Bipartite clustering of two record stores
//!
//! Records of A and B are nodes; a shared normalized value on a paired
//! field is an edge. Connected components are found with a union-find
//! over bucket items, then partitioned by shape.

use std::collections::HashMap;

use super::item::{BucketItem, BucketShape, Cohorts, Side};
use crate::observability::{self, Event, Severity};
use crate::store::{RecordKey, RecordStore, StoreId, TableError, TableResult};

/// Configured bucketization of two stores on paired fields
#[derive(Debug)]
pub struct Bucketizer<'a> {
    left: &'a RecordStore,
    right: &'a RecordStore,
    pairs: Vec<(String, String)>,
}

impl<'a> Bucketizer<'a> {
    /// Pairs `left_fields[i]` with `right_fields[i]`.
    ///
    /// Every paired field must be declared and indexed on its store.
    pub fn new(
        left: &'a RecordStore,
        left_fields: &[&str],
        right: &'a RecordStore,
        right_fields: &[&str],
    ) -> TableResult<Self> {
        if left_fields.len() != right_fields.len() {
            return Err(TableError::arity_mismatch(
                "bucketizer field lists",
                left_fields.len(),
                right_fields.len(),
            ));
        }
        if left.id() == right.id() {
            return Err(TableError::schema_violation(format!(
                "store '{}' cannot be bucketized against itself",
                left.name()
            )));
        }
        for (store, fields) in [(left, left_fields), (right, right_fields)] {
            for field in fields {
                if !store.schema().contains(field) {
                    return Err(TableError::undeclared_field(store.name(), field));
                }
                if !store.has_index(field) {
                    return Err(TableError::missing_index(store.name(), field));
                }
            }
        }

        let pairs = left_fields
            .iter()
            .zip(right_fields)
            .map(|(l, r)| (l.to_string(), r.to_string()))
            .collect();

        Ok(Self { left, right, pairs })
    }

    /// Paired (A field, B field) names
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Runs the clustering.
    ///
    /// Any one shared value on any one pair merges two records.
    pub fn run(&self) -> Bucketization {
        if observability::enabled(Severity::Trace) {
            let pairs = self.pairs.len().to_string();
            observability::log_event(
                Severity::Trace,
                Event::BucketizeStart,
                &[
                    ("left", self.left.name()),
                    ("right", self.right.name()),
                    ("pairs", &pairs),
                ],
            );
        }

        // Step 1: one singleton item per record
        let mut forest = ItemForest::default();
        for key in self.left.keys() {
            forest.add(Side::Left, key);
        }
        for key in self.right.keys() {
            forest.add(Side::Right, key);
        }

        // Step 2: merge along shared values, one pair at a time
        let right_index = self.right.indexes();
        for (left_field, right_field) in &self.pairs {
            let (left_tree, right_tree) = match (
                self.left.indexes().tree(left_field),
                right_index.tree(right_field),
            ) {
                (Some(l), Some(r)) => (l, r),
                // checked in new()
                _ => continue,
            };

            for (value, left_keys) in left_tree.iter() {
                let right_keys = right_tree.lookup_eq(&right_index.normalize_text(value));
                let (Some(&first_left), Some(&first_right)) =
                    (left_keys.first(), right_keys.first())
                else {
                    continue;
                };
                // linking every key to one key of the other side connects all pairs
                for &key in left_keys {
                    forest.union((Side::Left, key), (Side::Right, first_right));
                }
                for &key in right_keys {
                    forest.union((Side::Left, first_left), (Side::Right, key));
                }
            }
        }

        // Step 3: partition
        let result = forest.into_bucketization(self.left, self.right);

        if observability::enabled(Severity::Trace) {
            let counts: Vec<(&str, String)> = result
                .shape_counts()
                .into_iter()
                .map(|(shape, count)| (shape.as_str(), count.to_string()))
                .collect();
            let fields: Vec<(&str, &str)> =
                counts.iter().map(|(k, v)| (*k, v.as_str())).collect();
            observability::log_event(Severity::Trace, Event::BucketizeComplete, &fields);
        }

        result
    }
}

/// Working set of bucket items during a run.
///
/// Items live in an arena; absorbed slots become `None`. Each key maps to
/// the slot of the item that currently owns it.
#[derive(Debug, Default)]
struct ItemForest {
    items: Vec<Option<WorkItem>>,
    left_owner: HashMap<RecordKey, usize>,
    right_owner: HashMap<RecordKey, usize>,
}

#[derive(Debug, Default)]
struct WorkItem {
    left: Vec<RecordKey>,
    right: Vec<RecordKey>,
}

impl WorkItem {
    fn size(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

impl ItemForest {
    fn add(&mut self, side: Side, key: RecordKey) {
        let slot = self.items.len();
        let mut item = WorkItem::default();
        match side {
            Side::Left => {
                item.left.push(key);
                self.left_owner.insert(key, slot);
            }
            Side::Right => {
                item.right.push(key);
                self.right_owner.insert(key, slot);
            }
        }
        self.items.push(Some(item));
    }

    fn owner(&self, side: Side, key: RecordKey) -> Option<usize> {
        match side {
            Side::Left => self.left_owner.get(&key).copied(),
            Side::Right => self.right_owner.get(&key).copied(),
        }
    }

    fn size_of(&self, slot: usize) -> usize {
        self.items[slot].as_ref().map_or(0, WorkItem::size)
    }

    /// Merges the items owning two keys; the larger item survives
    fn union(&mut self, a: (Side, RecordKey), b: (Side, RecordKey)) {
        let (Some(slot_a), Some(slot_b)) = (self.owner(a.0, a.1), self.owner(b.0, b.1)) else {
            return;
        };
        if slot_a == slot_b {
            return;
        }

        let (survivor, absorbed) = if self.size_of(slot_a) >= self.size_of(slot_b) {
            (slot_a, slot_b)
        } else {
            (slot_b, slot_a)
        };

        let Some(absorbed_item) = self.items[absorbed].take() else {
            return;
        };
        for &key in &absorbed_item.left {
            self.left_owner.insert(key, survivor);
        }
        for &key in &absorbed_item.right {
            self.right_owner.insert(key, survivor);
        }
        if let Some(item) = self.items[survivor].as_mut() {
            item.left.extend(absorbed_item.left);
            item.right.extend(absorbed_item.right);
        }
    }

    fn into_bucketization(self, left: &RecordStore, right: &RecordStore) -> Bucketization {
        let mut buckets: [Vec<BucketItem>; 6] = Default::default();
        for item in self.items.into_iter().flatten() {
            let item = BucketItem::new(item.left, item.right);
            buckets[item.shape().slot()].push(item);
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(BucketItem::sort_key);
        }

        let mut left_lookup = HashMap::new();
        let mut right_lookup = HashMap::new();
        for shape in BucketShape::ALL {
            for (position, item) in buckets[shape.slot()].iter().enumerate() {
                for &key in item.left_keys() {
                    left_lookup.insert(key, (shape, position));
                }
                for &key in item.right_keys() {
                    right_lookup.insert(key, (shape, position));
                }
            }
        }

        Bucketization {
            left: StoreRef::of(left),
            right: StoreRef::of(right),
            buckets,
            left_lookup,
            right_lookup,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StoreRef {
    pub(crate) id: StoreId,
    pub(crate) name: String,
}

impl StoreRef {
    fn of(store: &RecordStore) -> Self {
        Self {
            id: store.id(),
            name: store.name().to_string(),
        }
    }
}

/// Result of a bucketizer run.
///
/// Holds keys only, so both stores may be mutated afterwards. Lookups
/// identify a store by its [`StoreId`].
#[derive(Debug, Clone)]
pub struct Bucketization {
    pub(crate) left: StoreRef,
    pub(crate) right: StoreRef,
    buckets: [Vec<BucketItem>; 6],
    left_lookup: HashMap<RecordKey, (BucketShape, usize)>,
    right_lookup: HashMap<RecordKey, (BucketShape, usize)>,
}

impl Bucketization {
    /// Items of one shape, ordered by their smallest keys
    pub fn bucket(&self, shape: BucketShape) -> &[BucketItem] {
        &self.buckets[shape.slot()]
    }

    /// A records that matched nothing
    pub fn one_to_zero(&self) -> &[BucketItem] {
        self.bucket(BucketShape::OneToZero)
    }

    /// B records that matched nothing
    pub fn zero_to_one(&self) -> &[BucketItem] {
        self.bucket(BucketShape::ZeroToOne)
    }

    /// Matched pairs
    pub fn one_to_one(&self) -> &[BucketItem] {
        self.bucket(BucketShape::OneToOne)
    }

    /// One A record with several B records
    pub fn one_to_many(&self) -> &[BucketItem] {
        self.bucket(BucketShape::OneToMany)
    }

    /// Several A records with one B record
    pub fn many_to_one(&self) -> &[BucketItem] {
        self.bucket(BucketShape::ManyToOne)
    }

    /// Several A records with several B records
    pub fn many_to_many(&self) -> &[BucketItem] {
        self.bucket(BucketShape::ManyToMany)
    }

    /// Number of items per shape, in report order
    pub fn shape_counts(&self) -> Vec<(BucketShape, usize)> {
        BucketShape::ALL
            .into_iter()
            .map(|shape| (shape, self.bucket(shape).len()))
            .collect()
    }

    /// Which side `store` was on
    pub fn side_of(&self, store: &RecordStore) -> TableResult<Side> {
        self.side_of_id(store.id(), store.name())
    }

    pub(crate) fn side_of_id(&self, id: StoreId, name: &str) -> TableResult<Side> {
        if id == self.left.id {
            Ok(Side::Left)
        } else if id == self.right.id {
            Ok(Side::Right)
        } else {
            Err(TableError::unknown_store(name))
        }
    }

    /// Name of the store on `side` at the time of the run
    pub fn store_name(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left.name,
            Side::Right => &self.right.name,
        }
    }

    /// The item holding record `key` of `side`
    pub fn item(&self, side: Side, key: RecordKey) -> TableResult<&BucketItem> {
        let lookup = match side {
            Side::Left => &self.left_lookup,
            Side::Right => &self.right_lookup,
        };
        let (shape, position) = lookup
            .get(&key)
            .ok_or_else(|| TableError::unknown_key(self.store_name(side), key))?;
        Ok(&self.buckets[shape.slot()][*position])
    }

    /// Shape of the item holding record `key` of `side`
    pub fn bucket_type(&self, side: Side, key: RecordKey) -> TableResult<BucketShape> {
        Ok(self.item(side, key)?.shape())
    }

    /// The other records in the item holding `key`, split by side
    pub fn cohorts(&self, side: Side, key: RecordKey) -> TableResult<Cohorts> {
        let item = self.item(side, key)?;
        let mut cohorts = Cohorts {
            left: item.left_keys().to_vec(),
            right: item.right_keys().to_vec(),
        };
        match side {
            Side::Left => cohorts.left.retain(|k| *k != key),
            Side::Right => cohorts.right.retain(|k| *k != key),
        }
        Ok(cohorts)
    }
}
