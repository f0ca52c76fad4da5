//! Bucket items and their shapes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::RecordKey;

/// Which input of a bucketization a record comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// First store (A)
    Left,
    /// Second store (B)
    Right,
}

impl Side {
    /// The opposite side
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Cardinality class of a bucket item: (A count, B count)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BucketShape {
    #[serde(rename = "1:0")]
    OneToZero,
    #[serde(rename = "0:1")]
    ZeroToOne,
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:n")]
    OneToMany,
    #[serde(rename = "n:1")]
    ManyToOne,
    #[serde(rename = "n:m")]
    ManyToMany,
}

impl BucketShape {
    /// Every shape in report order
    pub const ALL: [BucketShape; 6] = [
        BucketShape::OneToZero,
        BucketShape::ZeroToOne,
        BucketShape::OneToOne,
        BucketShape::OneToMany,
        BucketShape::ManyToOne,
        BucketShape::ManyToMany,
    ];

    /// Classifies an item by its key counts.
    ///
    /// Returns `None` for (0, 0), which no bucketization produces.
    pub fn classify(left: usize, right: usize) -> Option<BucketShape> {
        match (left, right) {
            (0, 0) => None,
            (1, 0) => Some(BucketShape::OneToZero),
            (0, 1) => Some(BucketShape::ZeroToOne),
            (1, 1) => Some(BucketShape::OneToOne),
            (1, _) => Some(BucketShape::OneToMany),
            (_, 1) => Some(BucketShape::ManyToOne),
            _ => Some(BucketShape::ManyToMany),
        }
    }

    /// Text form: "1:0", "0:1", "1:1", "1:n", "n:1", "n:m"
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketShape::OneToZero => "1:0",
            BucketShape::ZeroToOne => "0:1",
            BucketShape::OneToOne => "1:1",
            BucketShape::OneToMany => "1:n",
            BucketShape::ManyToOne => "n:1",
            BucketShape::ManyToMany => "n:m",
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BucketShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BucketShape {
    type Err = String;

    /// Accepts "1:n" as well as "1-n" and "1_n"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], ":");
        BucketShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == normalized)
            .ok_or_else(|| format!("unknown bucket shape '{}'", s))
    }
}

/// A connected component of records from the two stores.
///
/// Key lists are ascending. At least one of them is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketItem {
    left: Vec<RecordKey>,
    right: Vec<RecordKey>,
}

impl BucketItem {
    pub(crate) fn new(mut left: Vec<RecordKey>, mut right: Vec<RecordKey>) -> Self {
        left.sort_unstable();
        right.sort_unstable();
        Self { left, right }
    }

    /// Keys from the first store
    pub fn left_keys(&self) -> &[RecordKey] {
        &self.left
    }

    /// Keys from the second store
    pub fn right_keys(&self) -> &[RecordKey] {
        &self.right
    }

    /// Keys from one side
    pub fn keys(&self, side: Side) -> &[RecordKey] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Shape of this item
    pub fn shape(&self) -> BucketShape {
        // items always hold at least one key
        BucketShape::classify(self.left.len(), self.right.len())
            .unwrap_or(BucketShape::ManyToMany)
    }

    pub(crate) fn sort_key(&self) -> (Option<RecordKey>, Option<RecordKey>) {
        (self.left.first().copied(), self.right.first().copied())
    }
}

/// Records sharing a bucket item with a query record, split by store.
///
/// The query record itself is never included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cohorts {
    /// Cohort keys from the first store
    pub left: Vec<RecordKey>,
    /// Cohort keys from the second store
    pub right: Vec<RecordKey>,
}

impl Cohorts {
    /// Cohort keys from one side
    pub fn keys(&self, side: Side) -> &[RecordKey] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}
