//! Field values
//!
//! A value is null, a single scalar, or a list of scalars. Lists are the
//! in-memory form of multi-valued fields and never contain nulls.
//!
//! Ordering rules for the default comparison:
//! - null < number < string
//! - Int and Float compare numerically
//! - Lists have no default ordering

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-null field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
}

impl Scalar {
    /// Canonical text form, used for indexing and text output
    pub fn canonical(&self) -> String {
        match self {
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s.clone(),
        }
    }

    /// Default ordering between two scalars
    pub fn compare(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Str(_), _) => Ordering::Greater,
            (_, Scalar::Str(_)) => Ordering::Less,
            // IEEE total order, so NaN has a place too
            (a, b) => {
                let af = a.as_f64().unwrap_or(0.0);
                let bf = b.as_f64().unwrap_or(0.0);
                af.total_cmp(&bf)
            }
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Str(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

/// A field value as stored in a record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Single-valued field content
    Scalar(Scalar),
    /// Multi-valued field content
    List(Vec<Scalar>),
}

impl Value {
    /// String value
    pub fn str(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Str(s.into()))
    }

    /// Integer value
    pub fn int(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }

    /// List value from anything convertible to scalars
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns true for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `List`
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns the scalar if this is a single value
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// All non-null scalars held by this value, in order
    pub fn scalars(&self) -> &[Scalar] {
        match self {
            Value::Null => &[],
            Value::Scalar(s) => std::slice::from_ref(s),
            Value::List(items) => items,
        }
    }

    /// Text form. Lists are joined with `delimiter`, null is empty.
    pub fn render(&self, delimiter: &str) -> String {
        match self {
            Value::Null => String::new(),
            Value::Scalar(s) => s.canonical(),
            Value::List(items) => items
                .iter()
                .map(Scalar::canonical)
                .collect::<Vec<_>>()
                .join(delimiter),
        }
    }

    /// Default ordering for single-valued content.
    ///
    /// Lists compare equal to everything; callers must reject list
    /// fields before relying on this.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Scalar(a), Value::Scalar(b)) => a.compare(b),
            _ => Ordering::Equal,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl<S: Into<Scalar>> From<Vec<S>> for Value {
    fn from(items: Vec<S>) -> Self {
        Value::list(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_forms() {
        assert_eq!(Scalar::Int(-7).canonical(), "-7");
        assert_eq!(Scalar::Float(1.5).canonical(), "1.5");
        assert_eq!(Scalar::from("MGI:1").canonical(), "MGI:1");
    }

    #[test]
    fn test_default_ordering() {
        let ordered = [
            Value::Null,
            Value::int(-3),
            Value::from(2.5),
            Value::int(10),
            Value::str("abc"),
            Value::str("abd"),
        ];

        for i in 1..ordered.len() {
            assert_eq!(ordered[i - 1].compare(&ordered[i]), Ordering::Less);
        }
    }

    #[test]
    fn test_int_float_numeric_equality() {
        assert_eq!(Value::int(2).compare(&Value::from(2.0)), Ordering::Equal);
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::Null.render(","), "");
        assert_eq!(Value::list(["a", "b"]).render("|"), "a|b");
        assert_eq!(Value::int(5).render(","), "5");
    }

    #[test]
    fn test_scalars_view() {
        assert!(Value::Null.scalars().is_empty());
        assert_eq!(Value::str("x").scalars(), &[Scalar::from("x")]);
        assert_eq!(Value::list(["a", "b"]).scalars().len(), 2);
    }

    #[test]
    fn test_json_shape() {
        let v = Value::list(["a", "b"]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"["a","b"]"#);
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");

        let parsed: Value = serde_json::from_str("12").unwrap();
        assert_eq!(parsed, Value::int(12));
    }
}
