//! Bucket reports
//!
//! Unmatched buckets (1:0, 0:1) are written as plain record lines. Every
//! other item is written as a block:
//!
//! ```text
//! [ 1-n BucketItem
//! <A record lines>
//! ----
//! <B record lines>
//! ]
//! ```

use std::io::Write;

use super::errors::ReportResult;
use super::writer::{write_records, RecordFormat};
use crate::bucket::{BucketShape, Bucketization, Side};
use crate::store::{RecordKey, RecordStore, TableError};

/// Writes the buckets of a finished bucketization
#[derive(Debug)]
pub struct BucketReporter<'a> {
    result: &'a Bucketization,
    left: &'a RecordStore,
    right: &'a RecordStore,
    left_format: RecordFormat,
    right_format: RecordFormat,
}

impl<'a> BucketReporter<'a> {
    /// Reporter writing every field of both stores, tab-separated.
    ///
    /// `left` and `right` must be the stores of `result`, in that order.
    pub fn new(
        result: &'a Bucketization,
        left: &'a RecordStore,
        right: &'a RecordStore,
    ) -> ReportResult<Self> {
        if result.side_of(left)? != Side::Left {
            return Err(TableError::unknown_store(left.name()).into());
        }
        if result.side_of(right)? != Side::Right {
            return Err(TableError::unknown_store(right.name()).into());
        }
        Ok(Self {
            result,
            left,
            right,
            left_format: RecordFormat::default(),
            right_format: RecordFormat::default(),
        })
    }

    /// Fields written for A records
    pub fn left_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.left_format = self.left_format.fields(fields);
        self
    }

    /// Fields written for B records
    pub fn right_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.right_format = self.right_format.fields(fields);
        self
    }

    pub fn write_1_0<W: Write + ?Sized>(&self, out: &mut W) -> ReportResult<()> {
        let keys = self.unmatched_keys(BucketShape::OneToZero, Side::Left);
        write_records(out, self.left, Some(&keys), None, &self.left_format)
    }

    pub fn write_0_1<W: Write + ?Sized>(&self, out: &mut W) -> ReportResult<()> {
        let keys = self.unmatched_keys(BucketShape::ZeroToOne, Side::Right);
        write_records(out, self.right, Some(&keys), None, &self.right_format)
    }

    pub fn write_1_1<W: Write + ?Sized>(&self, out: &mut W) -> ReportResult<()> {
        self.write_items(out, BucketShape::OneToOne)
    }

    pub fn write_1_n<W: Write + ?Sized>(&self, out: &mut W) -> ReportResult<()> {
        self.write_items(out, BucketShape::OneToMany)
    }

    pub fn write_n_1<W: Write + ?Sized>(&self, out: &mut W) -> ReportResult<()> {
        self.write_items(out, BucketShape::ManyToOne)
    }

    pub fn write_n_m<W: Write + ?Sized>(&self, out: &mut W) -> ReportResult<()> {
        self.write_items(out, BucketShape::ManyToMany)
    }

    /// Writes one bucket in its own layout
    pub fn write_bucket<W: Write + ?Sized>(&self, out: &mut W, shape: BucketShape) -> ReportResult<()> {
        match shape {
            BucketShape::OneToZero => self.write_1_0(out),
            BucketShape::ZeroToOne => self.write_0_1(out),
            _ => self.write_items(out, shape),
        }
    }

    fn unmatched_keys(&self, shape: BucketShape, side: Side) -> Vec<RecordKey> {
        self.result
            .bucket(shape)
            .iter()
            .flat_map(|item| item.keys(side).iter().copied())
            .collect()
    }

    fn write_items<W: Write + ?Sized>(&self, out: &mut W, shape: BucketShape) -> ReportResult<()> {
        let label = item_label(shape);
        for item in self.result.bucket(shape) {
            writeln!(out, "[ {}", label)?;
            write_records(out, self.left, Some(item.left_keys()), None, &self.left_format)?;
            writeln!(out, "----")?;
            write_records(out, self.right, Some(item.right_keys()), None, &self.right_format)?;
            writeln!(out, "]")?;
        }
        Ok(())
    }
}

fn item_label(shape: BucketShape) -> String {
    format!("{} BucketItem", shape.as_str().replace(':', "-"))
}

/// Writes one `shape<TAB>count` line per bucket shape
pub fn write_summary<W: Write + ?Sized>(out: &mut W, result: &Bucketization) -> ReportResult<()> {
    for (shape, count) in result.shape_counts() {
        writeln!(out, "{}\t{}", shape, count)?;
    }
    Ok(())
}
