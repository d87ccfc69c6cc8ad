//! # Model Instances
//!
//! A [`ModelInstance`] is a live object bound to one directory entry.
//!
//! ## State
//!
//! - `pending`: values assigned since the last load/save, keyed by field name. An
//!   empty set records an explicit clear.
//! - `dirty`: the names of fields changed since the last load/save. Only
//!   [`ModelInstance::set`]/[`ModelInstance::unset`] add to it and only a
//!   successful save empties it.
//!
//! ## Lifecycle
//!
//! ```text
//!   new() ──► New ──save()──► Persisted ◄── Resolver::retrieve / search
//!                                │
//!                             delete()
//!                                ▼
//!                             Deleted   (every later operation fails)
//! ```
//!
//! ## Saving
//!
//! - **New**: every pending field is staged on the entry, server defaults are
//!   seeded for fields left unset, and the entry is created.
//! - **Persisted**: only dirty fields are staged, then the entry is saved. A
//!   cleared field deletes its attribute; server defaults are not re-seeded. An
//!   empty dirty set returns immediately without contacting the directory.
//!
//! Either way the directory sees a single round trip. On failure the dirty set is
//! left intact so the same diff can be resubmitted.

use crate::attributes::{normalize, resolve, AttrValue, FieldValue, Resolved};
use crate::directory::{DirectoryEntry, Values};
use crate::error::{ModelError, Result};
use crate::model::{Field, ModelClass, OBJECT_CLASS_FIELD};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed locally, not yet in the directory
    New,
    /// Bound to an entry that exists in the directory
    Persisted,
    /// The entry was deleted through this instance
    Deleted,
}

pub struct ModelInstance<'c, E: DirectoryEntry> {
    class: &'c ModelClass,
    entry: E,
    state: Lifecycle,
    pending: BTreeMap<String, Values>,
    dirty: BTreeSet<String>,
}

impl Field {
    /// Read this field from `instance` through the resolution chain.
    pub fn read<E: DirectoryEntry>(&self, instance: &ModelInstance<'_, E>) -> Result<Resolved> {
        resolve(
            self.name(),
            self.spec(),
            instance.pending.get(self.name()),
            || instance.entry.get(self.target()),
        )
    }

    /// Validate `value` and record it as pending on `instance`.
    pub fn write<E: DirectoryEntry>(
        &self,
        instance: &mut ModelInstance<'_, E>,
        value: FieldValue,
    ) -> Result<()> {
        let values = normalize(self.name(), self.spec(), value)?;
        trace!(field = self.name(), values = values.len(), "field assigned");
        instance.pending.insert(self.name().to_string(), values);
        instance.dirty.insert(self.name().to_string());
        Ok(())
    }
}

impl<'c, E: DirectoryEntry> ModelInstance<'c, E> {
    /// Create an unsaved instance on `entry` with the given field values.
    ///
    /// The model's object class is always added to the `objectClass` field.
    pub fn new<I, K, V>(class: &'c ModelClass, entry: E, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut instance = Self {
            class,
            entry,
            state: Lifecycle::New,
            pending: BTreeMap::new(),
            dirty: BTreeSet::new(),
        };
        for (name, value) in values {
            instance.set(name.as_ref(), value)?;
        }

        let mut classes = instance.get(OBJECT_CLASS_FIELD)?.into_set();
        if classes.insert(class.object_class().to_string()) {
            instance.set(OBJECT_CLASS_FIELD, classes)?;
        }
        Ok(instance)
    }

    /// Wrap an entry that already exists in the directory.
    pub(crate) fn bound(class: &'c ModelClass, entry: E) -> Self {
        Self {
            class,
            entry,
            state: Lifecycle::Persisted,
            pending: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    pub fn class(&self) -> &'c ModelClass {
        self.class
    }

    pub fn dn(&self) -> &str {
        self.entry.dn()
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Fields changed since the last load or save.
    pub fn dirty(&self) -> &BTreeSet<String> {
        &self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Check whether the bound entry exists in the directory.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.entry.exists()?)
    }

    /// Read a field.
    pub fn get(&self, field: &str) -> Result<AttrValue> {
        Ok(self.resolve(field)?.value)
    }

    /// Read a field, reporting where the value came from.
    pub fn resolve(&self, field: &str) -> Result<Resolved> {
        self.ensure_live()?;
        self.class.field(field)?.read(self)
    }

    /// Assign a field. Validation happens here, not on save.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.ensure_live()?;
        let class = self.class;
        class.field(field)?.write(self, value.into())
    }

    /// Clear a field, as if assigning `None`.
    pub fn unset(&mut self, field: &str) -> Result<()> {
        self.set(field, FieldValue::Absent)
    }

    /// Current value of every readable field.
    ///
    /// Single-valued fields with nothing stored and no default are left out.
    pub fn snapshot(&self) -> Result<BTreeMap<String, AttrValue>> {
        let mut snapshot = BTreeMap::new();
        for field in self.class.fields() {
            match self.get(field.name()) {
                Ok(value) => {
                    snapshot.insert(field.name().to_string(), value);
                }
                Err(ModelError::AttributeNotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(snapshot)
    }

    /// Push pending changes to the directory in one round trip.
    pub fn save(&mut self) -> Result<()> {
        self.ensure_live()?;
        let result = match self.state {
            Lifecycle::New => self.create(),
            _ => self.modify(),
        };
        if let Err(err) = &result {
            warn!(dn = self.dn(), error = %err, "save failed, dirty fields kept");
        }
        result
    }

    /// Delete the bound entry from the directory.
    pub fn delete(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.entry.delete()?;
        debug!(dn = self.dn(), "entry deleted");
        self.state = Lifecycle::Deleted;
        self.pending.clear();
        self.dirty.clear();
        Ok(())
    }

    fn create(&mut self) -> Result<()> {
        let class = self.class;
        let mut operations = 0;
        for field in class.fields() {
            let spec = field.spec();
            match self.pending.get(field.name()) {
                Some(values) if !values.is_empty() => {
                    self.entry.set(field.target(), values.clone());
                }
                _ => match spec.server_default {
                    Some(seed) => self.entry.set(field.target(), Values::from([seed.to_string()])),
                    None if self.pending.contains_key(field.name()) => {
                        self.entry.delete_attr(field.target())
                    }
                    None => continue,
                },
            }
            operations += 1;
        }

        debug!(dn = self.dn(), operations, "creating entry");
        self.entry.create()?;
        self.state = Lifecycle::Persisted;
        self.commit();
        Ok(())
    }

    fn modify(&mut self) -> Result<()> {
        if self.dirty.is_empty() {
            trace!(dn = self.dn(), "nothing to save");
            return Ok(());
        }

        let class = self.class;
        for name in &self.dirty {
            let field = class.field(name)?;
            match self.pending.get(name) {
                Some(values) if !values.is_empty() => {
                    self.entry.set(field.target(), values.clone())
                }
                _ => self.entry.delete_attr(field.target()),
            }
        }

        debug!(dn = self.dn(), operations = self.dirty.len(), "modifying entry");
        self.entry.save()?;
        self.commit();
        Ok(())
    }

    /// Forget pending state once the entry holds it.
    fn commit(&mut self) {
        self.pending.clear();
        self.dirty.clear();
    }

    fn ensure_live(&self) -> Result<()> {
        match self.state {
            Lifecycle::Deleted => Err(ModelError::EntryDeleted(self.dn().to_string())),
            _ => Ok(()),
        }
    }
}

impl<E: DirectoryEntry> fmt::Display for ModelInstance<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dn())
    }
}

impl<E: DirectoryEntry> fmt::Debug for ModelInstance<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInstance")
            .field("object_class", &self.class.object_class())
            .field("dn", &self.dn())
            .field("state", &self.state)
            .field("dirty", &self.dirty)
            .finish()
    }
}
