//! # Directory Collaborator
//!
//! The mapping layer never talks to a directory server itself. Everything it needs
//! goes through the two traits defined here:
//!
//! - [`Directory`]: hands out entry handles and runs filtered searches.
//! - [`DirectoryEntry`]: one entry handle. Attribute changes are *staged* on the
//!   handle and only reach the directory on [`DirectoryEntry::create`] or
//!   [`DirectoryEntry::save`].
//!
//! Connections, binds, DN construction and the wire protocol belong to whoever
//! implements these traits.
//!
//! ## Contract
//!
//! - `get` returns the staged value if there is one, otherwise the value fetched
//!   with the entry. An absent attribute is an empty set, never an error.
//! - `set` with an empty set is the same as `delete_attr`.
//! - `save` with nothing staged must not contact the directory.
//! - `create` and `save` are all-or-nothing from the caller's point of view. On
//!   failure the staged changes stay on the handle.
//! - Errors are reported as [`DirectoryError`] and surface unchanged through
//!   [`crate::ModelError::Directory`].
//!
//! ## Implementations
//!
//! - [`memory::MemDirectory`]: In-memory directory, used for tests and offline use.

use crate::attributes::Filter;
use std::collections::BTreeSet;
use thiserror::Error;

pub mod memory;

/// The values of one attribute. Order is irrelevant and duplicates collapse.
pub type Values = BTreeSet<String>;

/// Lazy sequence of entries produced by [`Directory::search`].
pub type Cursor<'a, E> = Box<dyn Iterator<Item = Result<E, DirectoryError>> + 'a>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Attribute name not permitted by the directory schema: {0}")]
    AttributeNameNotFound(String),

    #[error("Directory write failed: {0}")]
    Write(String),

    #[error("No such entry: {0}")]
    NoSuchEntry(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),
}

/// Abstract interface to a directory server.
pub trait Directory {
    type Entry: DirectoryEntry;

    /// Get a handle for `dn`. Does not require the entry to exist.
    fn entry(&self, dn: &str) -> Self::Entry;

    /// Search below `base` (or the whole tree) for entries matching `filter`.
    ///
    /// Entries are yielded in the order the directory returns them, each with
    /// its attributes already fetched.
    fn search<'a>(
        &'a self,
        base: Option<&str>,
        filter: &Filter,
    ) -> Result<Cursor<'a, Self::Entry>, DirectoryError>;
}

/// A handle on a single directory entry.
pub trait DirectoryEntry {
    /// Distinguished name of the entry.
    fn dn(&self) -> &str;

    /// Check whether the entry currently exists in the directory.
    fn exists(&self) -> Result<bool, DirectoryError>;

    /// Current values of `attribute` (empty if absent).
    fn get(&self, attribute: &str) -> Values;

    /// Stage a replacement of all values of `attribute`.
    fn set(&mut self, attribute: &str, values: Values);

    /// Stage the removal of `attribute`.
    fn delete_attr(&mut self, attribute: &str);

    /// Add the entry, with its staged attributes, to the directory.
    fn create(&mut self) -> Result<(), DirectoryError>;

    /// Persist staged attribute changes of an existing entry.
    fn save(&mut self) -> Result<(), DirectoryError>;

    /// Remove the entry from the directory.
    fn delete(&mut self) -> Result<(), DirectoryError>;
}
