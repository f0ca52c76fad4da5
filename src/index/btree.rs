//! BTreeMap-based index structure
//!
//! Index keys are normalized value strings. Each maps to the ascending
//! list of record keys holding that value.

use std::collections::BTreeMap;

use crate::store::RecordKey;

/// A single field index using BTreeMap for deterministic ordering.
#[derive(Debug, Default, Clone)]
pub struct IndexTree {
    /// Maps normalized values to sorted lists of record keys
    tree: BTreeMap<String, Vec<RecordKey>>,
}

impl IndexTree {
    /// Creates a new empty index tree
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// Insert a record key for a value.
    ///
    /// Maintains sorted ascending order; inserting twice is a no-op.
    pub fn insert(&mut self, value: String, key: RecordKey) {
        let keys = self.tree.entry(value).or_default();

        match keys.binary_search(&key) {
            Ok(_) => {}
            Err(pos) => keys.insert(pos, key),
        }
    }

    /// Remove a record key for a value.
    ///
    /// If the value has no more keys, removes the value entirely.
    pub fn remove(&mut self, value: &str, key: RecordKey) {
        if let Some(keys) = self.tree.get_mut(value) {
            if let Ok(pos) = keys.binary_search(&key) {
                keys.remove(pos);
            }
            if keys.is_empty() {
                self.tree.remove(value);
            }
        }
    }

    /// Keys holding exactly this normalized value, ascending
    pub fn lookup_eq(&self, value: &str) -> &[RecordKey] {
        self.tree.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any record holds this normalized value
    pub fn contains(&self, value: &str) -> bool {
        self.tree.contains_key(value)
    }

    /// Distinct values in ascending order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.tree.keys().map(String::as_str)
    }

    /// (value, keys) pairs in ascending value order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RecordKey])> {
        self.tree.iter().map(|(v, k)| (v.as_str(), k.as_slice()))
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of distinct values
    pub fn value_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the total number of (value, key) entries
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = IndexTree::new();

        tree.insert("alice".to_string(), 7);
        tree.insert("alice".to_string(), 2);
        tree.insert("bob".to_string(), 3);

        assert_eq!(tree.lookup_eq("alice"), &[2, 7]);
        assert_eq!(tree.lookup_eq("bob"), &[3]);
        assert!(tree.lookup_eq("carol").is_empty());
    }

    #[test]
    fn test_duplicate_insert_ignored() {
        let mut tree = IndexTree::new();
        tree.insert("a".to_string(), 1);
        tree.insert("a".to_string(), 1);
        assert_eq!(tree.entry_count(), 1);
    }

    #[test]
    fn test_remove_last_key_drops_value() {
        let mut tree = IndexTree::new();
        tree.insert("a".to_string(), 1);
        tree.insert("a".to_string(), 2);

        tree.remove("a", 1);
        assert!(tree.contains("a"));

        tree.remove("a", 2);
        assert!(!tree.contains("a"));
        assert_eq!(tree.value_count(), 0);
    }

    #[test]
    fn test_values_sorted() {
        let mut tree = IndexTree::new();
        for (v, k) in [("zeta", 1), ("alpha", 2), ("mid", 3)] {
            tree.insert(v.to_string(), k);
        }
        let values: Vec<_> = tree.values().collect();
        assert_eq!(values, vec!["alpha", "mid", "zeta"]);
    }
}
