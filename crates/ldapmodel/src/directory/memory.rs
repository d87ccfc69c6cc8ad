use super::{Cursor, Directory, DirectoryEntry, DirectoryError, Values};
use crate::attributes::Filter;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::debug;

/// Attribute map keyed by lowercased attribute name.
type Attributes = BTreeMap<String, Values>;

/// LDAP attribute names are case-insensitive.
fn attr_key(attribute: &str) -> String {
    attribute.to_ascii_lowercase()
}

fn under_base(dn: &str, base: Option<&str>) -> bool {
    let Some(base) = base else {
        return true;
    };
    let dn = dn.to_ascii_lowercase();
    let base = base.to_ascii_lowercase();
    dn == base || dn.ends_with(&format!(",{}", base))
}

struct Stored {
    /// Insertion sequence number; strictly increasing along `State::entries`.
    seq: u64,
    dn: String,
    attrs: Attributes,
}

#[derive(Default)]
struct State {
    /// Entries in insertion order, which is also search order.
    entries: Vec<Stored>,
    next_seq: u64,
    /// Permitted attribute names (lowercased). `None` accepts everything.
    schema: Option<BTreeSet<String>>,
    simulate_write_error: bool,
    writes: usize,
}

impl State {
    fn position(&self, dn: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|stored| stored.dn.eq_ignore_ascii_case(dn))
    }

    fn push(&mut self, dn: String, attrs: Attributes) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Stored { seq, dn, attrs });
    }

    fn check_schema<'a>(
        &self,
        mut names: impl Iterator<Item = &'a String>,
    ) -> Result<(), DirectoryError> {
        let Some(schema) = &self.schema else {
            return Ok(());
        };
        match names.find(|name| !schema.contains(*name)) {
            Some(name) => Err(DirectoryError::AttributeNameNotFound(name.clone())),
            None => Ok(()),
        }
    }

    fn check_writable(&self) -> Result<(), DirectoryError> {
        if self.simulate_write_error {
            return Err(DirectoryError::Write("Simulated write error".to_string()));
        }
        Ok(())
    }
}

/// In-memory directory.
///
/// Uses `Rc<RefCell<_>>` since the mapping layer is single-threaded: every entry
/// handle shares the state with the directory that produced it, so a saved
/// handle is immediately visible to later searches.
#[derive(Clone, Default)]
pub struct MemDirectory {
    state: Rc<RefCell<State>>,
}

impl MemDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the attribute names the directory accepts on create/save.
    /// `objectClass` is always permitted.
    pub fn with_schema<I, S>(self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema: BTreeSet<String> = attributes
            .into_iter()
            .map(|name| attr_key(name.as_ref()))
            .collect();
        schema.insert(attr_key("objectClass"));
        self.state.borrow_mut().schema = Some(schema);
        self
    }

    /// Seed an entry directly, bypassing schema checks and the write counter.
    /// Replaces any existing entry with the same DN.
    pub fn insert<I, A, V>(&self, dn: &str, attributes: I)
    where
        I: IntoIterator<Item = (A, V)>,
        A: AsRef<str>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let attrs: Attributes = attributes
            .into_iter()
            .map(|(name, values)| {
                (
                    attr_key(name.as_ref()),
                    values.into_iter().map(Into::into).collect::<Values>(),
                )
            })
            .filter(|(_, values)| !values.is_empty())
            .collect();

        let mut state = self.state.borrow_mut();
        match state.position(dn) {
            Some(index) => state.entries[index].attrs = attrs,
            None => state.push(dn.to_string(), attrs),
        }
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.state.borrow_mut().simulate_write_error = simulate;
    }

    /// Number of successful write round trips (create, modify, delete).
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored values of `attribute` on `dn`, as persisted.
    pub fn stored(&self, dn: &str, attribute: &str) -> Option<Values> {
        let state = self.state.borrow();
        let index = state.position(dn)?;
        Some(
            state.entries[index]
                .attrs
                .get(&attr_key(attribute))
                .cloned()
                .unwrap_or_default(),
        )
    }
}

impl Directory for MemDirectory {
    type Entry = MemEntry;

    fn entry(&self, dn: &str) -> MemEntry {
        let fetched = {
            let state = self.state.borrow();
            state
                .position(dn)
                .map(|index| state.entries[index].attrs.clone())
                .unwrap_or_default()
        };
        MemEntry {
            dn: dn.to_string(),
            state: Rc::clone(&self.state),
            fetched,
            staged: BTreeMap::new(),
        }
    }

    fn search<'a>(
        &'a self,
        base: Option<&str>,
        filter: &Filter,
    ) -> Result<Cursor<'a, MemEntry>, DirectoryError> {
        debug!(filter = %filter, base = ?base, "memory directory search");
        Ok(Box::new(MemCursor {
            state: Rc::clone(&self.state),
            base: base.map(str::to_string),
            filter: filter.clone(),
            after: None,
        }))
    }
}

/// Walks the entry list one match at a time; nothing is collected up front.
///
/// The cursor remembers the sequence number of the last entry it examined, so
/// entries deleted or added while it is open do not shift its place.
struct MemCursor {
    state: Rc<RefCell<State>>,
    base: Option<String>,
    filter: Filter,
    after: Option<u64>,
}

impl Iterator for MemCursor {
    type Item = Result<MemEntry, DirectoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.state.borrow();
        let start = match self.after {
            Some(seq) => state.entries.partition_point(|stored| stored.seq <= seq),
            None => 0,
        };
        for stored in &state.entries[start..] {
            self.after = Some(stored.seq);
            let in_scope = under_base(&stored.dn, self.base.as_deref());
            if in_scope && matches(&self.filter, &stored.attrs) {
                return Some(Ok(MemEntry {
                    dn: stored.dn.clone(),
                    state: Rc::clone(&self.state),
                    fetched: stored.attrs.clone(),
                    staged: BTreeMap::new(),
                }));
            }
        }
        None
    }
}

fn matches(filter: &Filter, attrs: &Attributes) -> bool {
    match filter {
        Filter::And(filters) => filters.iter().all(|f| matches(f, attrs)),
        Filter::Equals { attribute, value } => attrs
            .get(&attr_key(attribute))
            .is_some_and(|values| values.contains(value)),
        Filter::Pattern { attribute, pattern } => attrs
            .get(&attr_key(attribute))
            .is_some_and(|values| values.iter().any(|v| wildcard_match(pattern, v))),
        Filter::Present { attribute } => attrs
            .get(&attr_key(attribute))
            .is_some_and(|values| !values.is_empty()),
    }
}

/// Substring match where `*` stands for any run of characters.
fn wildcard_match(pattern: &str, value: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return false;
    };
    if parts.len() == 1 {
        return pattern == value;
    }
    let Some(mut rest) = value.strip_prefix(first) else {
        return false;
    };
    for middle in &parts[1..parts.len() - 1] {
        match rest.find(middle) {
            Some(index) => rest = &rest[index + middle.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

/// Entry handle produced by [`MemDirectory`].
///
/// `staged` maps an attribute to its replacement values; `None` stages a removal.
pub struct MemEntry {
    dn: String,
    state: Rc<RefCell<State>>,
    fetched: Attributes,
    staged: BTreeMap<String, Option<Values>>,
}

impl MemEntry {
    /// Attributes staged but not yet persisted.
    pub fn has_staged_changes(&self) -> bool {
        !self.staged.is_empty()
    }

    fn apply_staged(&self, attrs: &mut Attributes) {
        for (name, change) in &self.staged {
            match change {
                Some(values) => {
                    attrs.insert(name.clone(), values.clone());
                }
                None => {
                    attrs.remove(name);
                }
            }
        }
    }
}

impl DirectoryEntry for MemEntry {
    fn dn(&self) -> &str {
        &self.dn
    }

    fn exists(&self) -> Result<bool, DirectoryError> {
        Ok(self.state.borrow().position(&self.dn).is_some())
    }

    fn get(&self, attribute: &str) -> Values {
        let key = attr_key(attribute);
        match self.staged.get(&key) {
            Some(Some(values)) => values.clone(),
            Some(None) => Values::new(),
            None => self.fetched.get(&key).cloned().unwrap_or_default(),
        }
    }

    fn set(&mut self, attribute: &str, values: Values) {
        let change = if values.is_empty() {
            None
        } else {
            Some(values)
        };
        self.staged.insert(attr_key(attribute), change);
    }

    fn delete_attr(&mut self, attribute: &str) {
        self.staged.insert(attr_key(attribute), None);
    }

    fn create(&mut self) -> Result<(), DirectoryError> {
        let mut state = self.state.borrow_mut();
        if state.position(&self.dn).is_some() {
            return Err(DirectoryError::AlreadyExists(self.dn.clone()));
        }
        state.check_schema(self.staged.keys())?;
        state.check_writable()?;

        let mut attrs = self.fetched.clone();
        self.apply_staged(&mut attrs);
        state.push(self.dn.clone(), attrs.clone());
        state.writes += 1;
        drop(state);

        self.fetched = attrs;
        self.staged.clear();
        Ok(())
    }

    fn save(&mut self) -> Result<(), DirectoryError> {
        if self.staged.is_empty() {
            return Ok(());
        }
        let mut state = self.state.borrow_mut();
        let index = state
            .position(&self.dn)
            .ok_or_else(|| DirectoryError::NoSuchEntry(self.dn.clone()))?;
        state.check_schema(self.staged.keys())?;
        state.check_writable()?;

        let mut attrs = state.entries[index].attrs.clone();
        self.apply_staged(&mut attrs);
        state.entries[index].attrs = attrs.clone();
        state.writes += 1;
        drop(state);

        self.fetched = attrs;
        self.staged.clear();
        Ok(())
    }

    fn delete(&mut self) -> Result<(), DirectoryError> {
        let mut state = self.state.borrow_mut();
        let index = state
            .position(&self.dn)
            .ok_or_else(|| DirectoryError::NoSuchEntry(self.dn.clone()))?;
        state.check_writable()?;
        state.entries.remove(index);
        state.writes += 1;
        drop(state);

        self.fetched.clear();
        self.staged.clear();
        Ok(())
    }
}
