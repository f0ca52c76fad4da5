//! Value matching for full-scan selection
//!
//! Scans must agree with index lookups, so matching compares normalized
//! text under the store's case rule rather than raw values.

use crate::store::{Scalar, Value};

/// Evaluates equality probes against stored values
#[derive(Debug, Clone, Copy)]
pub struct ValueMatcher {
    case_sensitive: bool,
}

impl ValueMatcher {
    /// Matcher with the given case rule
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Checks whether a stored value matches a probe.
    ///
    /// - Scalar probe: equal single value, or contained in a list
    /// - List probe: element-wise equal list
    /// - Null probe: null single value only
    pub fn matches(&self, actual: &Value, probe: &Value) -> bool {
        match (actual, probe) {
            (Value::Null, Value::Null) => true,
            (Value::Scalar(a), Value::Scalar(p)) => self.scalar_eq(a, p),
            (Value::List(items), Value::Scalar(p)) => {
                items.iter().any(|item| self.scalar_eq(item, p))
            }
            (Value::List(items), Value::List(probes)) => {
                items.len() == probes.len()
                    && items
                        .iter()
                        .zip(probes)
                        .all(|(item, p)| self.scalar_eq(item, p))
            }
            _ => false,
        }
    }

    fn scalar_eq(&self, a: &Scalar, b: &Scalar) -> bool {
        let (a, b) = (a.canonical(), b.canonical());
        if self.case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }
}
