//! # ldapmodel Architecture
//!
//! ldapmodel is a **declarative object-mapping layer** over a directory (LDAP) entry store.
//! A caller describes a model once, as a [`ModelClass`] made of named fields, and every
//! [`ModelInstance`] of that class is transparently backed by one directory entry.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Resolver (resolver.rs)                                     │
//! │  - retrieve by rdn value (exactly one match)                │
//! │  - search by field equality (lazy sequence)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Model Layer (model.rs, instance.rs)                        │
//! │  - ModelClass: object class, fields, rdn                    │
//! │  - ModelInstance: pending values, dirty set, save diff      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Attribute Layer (attributes/)                              │
//! │  - AttributeSpec: multiplicity, nullability, defaults       │
//! │  - read fallback chain, write normalization, filters        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Directory Collaborator (directory/)                        │
//! │  - Directory / DirectoryEntry traits                        │
//! │  - MemDirectory (in-memory reference implementation)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Writes Only Happen on `save()`
//!
//! Field assignment validates eagerly (nullability, multiplicity) and records the
//! value in the instance's dirty set. Nothing reaches the directory until
//! [`ModelInstance::save`], which pushes the whole diff in a single round trip.
//! Reads between saves are served from the instance (read-your-writes).
//!
//! ## Example
//!
//! ```
//! use ldapmodel::{AttributeSpec, MemDirectory, ModelClass, Resolver};
//!
//! # fn main() -> ldapmodel::Result<()> {
//! let person = ModelClass::builder("person")
//!     .attr("cn", AttributeSpec::new("cn"))
//!     .attr("lastname", AttributeSpec::new("sn"))
//!     .attr("phone", AttributeSpec::new("telephoneNumber").multiple())
//!     .rdn("cn")
//!     .build()?;
//!
//! let directory = MemDirectory::new();
//! let people = Resolver::new(&directory, &person);
//!
//! let mut george = people.create(
//!     "cn=george,dc=example,dc=com",
//!     [("cn", "george"), ("lastname", "Hammond")],
//! )?;
//! george.save()?;
//!
//! let mut george = people.retrieve("george")?;
//! george.set("phone", vec!["000", "111"])?;
//! george.save()?;
//!
//! let george = people.retrieve("george")?;
//! assert_eq!(george.get("lastname")?.as_str(), Some("Hammond"));
//! assert_eq!(george.get("phone")?.into_set().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`attributes`]: Attribute specs, values, read resolution and search filters
//! - [`model`]: Model classes and their field accessor table
//! - [`instance`]: Live instances bound to a directory entry
//! - [`resolver`]: Retrieve and search
//! - [`directory`]: The directory collaborator traits and the in-memory directory
//! - [`config`]: Configuration
//! - [`error`]: Error types

pub mod attributes;
pub mod config;
pub mod directory;
pub mod error;
pub mod instance;
pub mod model;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_utils;

pub use attributes::{AttrValue, AttributeSpec, FieldValue, Filter};
pub use config::{FilterValues, ModelConfig};
pub use directory::memory::{MemDirectory, MemEntry};
pub use directory::{Directory, DirectoryEntry, DirectoryError};
pub use error::{ModelError, Result};
pub use instance::{Lifecycle, ModelInstance};
pub use model::{Field, ModelClass};
pub use resolver::{Resolver, SearchResults};
