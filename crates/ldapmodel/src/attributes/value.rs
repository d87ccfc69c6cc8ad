//! Attribute value types.

use serde::Serialize;
use std::collections::BTreeSet;

/// A value assigned to a field.
///
/// Conversions exist for the common shapes, so callers rarely name this type:
/// `&str`/`String` become [`FieldValue::Scalar`], vectors, arrays and sets become
/// [`FieldValue::List`], and `None` becomes [`FieldValue::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Explicit clear
    Absent,

    /// A single value
    Scalar(String),

    /// Any number of values; order is irrelevant and duplicates collapse
    List(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Scalar(value.clone())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

impl<const N: usize> From<[&str; N]> for FieldValue {
    fn from(values: [&str; N]) -> Self {
        FieldValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

impl From<BTreeSet<String>> for FieldValue {
    fn from(values: BTreeSet<String>) -> Self {
        FieldValue::List(values.into_iter().collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}

/// The value a field read returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Value of a single-valued field
    Single(String),

    /// Values of a multi-valued field (possibly empty)
    Multi(BTreeSet<String>),
}

impl AttrValue {
    /// Get the string if this is a single value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Single(value) => Some(value),
            AttrValue::Multi(_) => None,
        }
    }

    /// Get the set if this is a multi value.
    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            AttrValue::Single(_) => None,
            AttrValue::Multi(values) => Some(values),
        }
    }

    /// Convert into a set; a single value becomes a one-element set.
    pub fn into_set(self) -> BTreeSet<String> {
        match self {
            AttrValue::Single(value) => BTreeSet::from([value]),
            AttrValue::Multi(values) => values,
        }
    }
}
