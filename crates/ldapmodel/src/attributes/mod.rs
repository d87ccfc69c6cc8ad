//! # Attribute System
//!
//! This module describes how one model field maps to one directory attribute,
//! and implements the value rules shared by every field:
//!
//! - **Specifications**: target attribute, multiplicity, nullability, defaults
//! - **Values**: what callers assign ([`FieldValue`]) and what reads return ([`AttrValue`])
//! - **Resolution**: the ordered fallback used by reads, and write normalization
//! - **Filtering**: structured search filters and their LDAP string form
//!
//! ## Attribute Policies
//!
//! | Policy | Default | Effect |
//! |--------|---------|--------|
//! | `multiple` | off | Reads return a set; scalars are wrapped into one-element sets |
//! | `nullable` | on | When off, clearing the field fails with `NotNullableAttribute` |
//! | `default` | none | Returned by single-valued reads when nothing is stored |
//! | `server_default` | none | Written to the directory when the field is left unset |
//!
//! ## Usage
//!
//! ```ignore
//! let phone = AttributeSpec::new("telephoneNumber").multiple();
//! let shell = AttributeSpec::new("loginShell").with_default("/bin/sh");
//! let lastname = AttributeSpec::new("sn").not_nullable().with_server_default("Default");
//! ```

mod filter;
mod resolve;
mod spec;
mod value;

pub use filter::Filter;
pub use resolve::{normalize, resolve, Resolved, Source};
pub use spec::AttributeSpec;
pub use value::{AttrValue, FieldValue};
