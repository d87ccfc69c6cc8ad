//! Value resolution.
//!
//! Reads follow one fixed fallback chain, in this order:
//!
//! 1. **Pending**: a value assigned on the instance and not yet saved. An explicit
//!    clear is a pending value too, and shadows whatever the directory holds.
//! 2. **Entry**: the value held by the bound directory entry.
//! 3. **Default**: the attribute's client-side default (single-valued fields only).
//! 4. Otherwise `AttributeNotFound`.
//!
//! Multi-valued fields stop at step 2: absence is the empty set, never an error.

use super::{AttrValue, AttributeSpec, FieldValue};
use crate::directory::Values;
use crate::error::{ModelError, Result};
use tracing::trace;

/// Where a read was satisfied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    Pending,
    Entry,
    Default,
}

/// A resolved read together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: AttrValue,
    pub source: Source,
}

/// Resolve a read of `field` through the fallback chain.
///
/// `stored` is only called when there is no pending value.
pub fn resolve<F>(
    field: &str,
    spec: &AttributeSpec,
    pending: Option<&Values>,
    stored: F,
) -> Result<Resolved>
where
    F: FnOnce() -> Values,
{
    let (values, source) = match pending {
        Some(values) => (values.clone(), Source::Pending),
        None => (stored(), Source::Entry),
    };

    trace!(field, source = ?source, values = values.len(), "resolving attribute");
    if spec.multiple {
        return Ok(Resolved {
            value: AttrValue::Multi(values),
            source,
        });
    }

    let mut values = values.into_iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(Resolved {
            value: AttrValue::Single(value),
            source,
        }),
        (Some(_), Some(_)) => Err(ModelError::MultipleValuesInAttribute(field.to_string())),
        (None, _) => match spec.default {
            Some(default) => Ok(Resolved {
                value: AttrValue::Single(default.to_string()),
                source: Source::Default,
            }),
            None => Err(ModelError::AttributeNotFound(field.to_string())),
        },
    }
}

/// Validate an assignment to `field` and normalize it to a value set.
///
/// An empty set means "clear the attribute".
pub fn normalize(field: &str, spec: &AttributeSpec, value: FieldValue) -> Result<Values> {
    let values: Values = match value {
        FieldValue::Absent => Values::new(),
        FieldValue::Scalar(value) => Values::from([value]),
        FieldValue::List(values) => values.into_iter().collect(),
    };

    if values.is_empty() && !spec.nullable {
        return Err(ModelError::NotNullableAttribute(field.to_string()));
    }
    if values.len() > 1 && !spec.multiple {
        return Err(ModelError::MultipleValuesInAttribute(field.to_string()));
    }
    Ok(values)
}
