//! # Resolver
//!
//! Entry point for finding and creating instances of one [`ModelClass`] in one
//! [`Directory`].
//!
//! ## Operations
//!
//! - [`Resolver::retrieve`]: find the single entry whose rdn field equals a value.
//!   Zero matches is `NoResultFound`, more than one is `MultipleResultsFound`.
//! - [`Resolver::search`]: lazily iterate over every entry of the class matching
//!   all given `(field, value)` equality constraints. No match is an empty
//!   sequence, not an error.
//! - [`Resolver::create`]: build an unsaved instance for a new DN.
//!
//! ## Filters
//!
//! Every query is `(&(objectClass=<class>)(<attr>=<value>)...)`, with field names
//! translated to their directory attribute names. How values are placed into the
//! filter is governed by [`ModelConfig::filter_values`]: escaped (exact match) by
//! default, or literal, where `*` is a wildcard.
//!
//! ## Laziness
//!
//! [`SearchResults`] pulls one entry from the directory per `next()`. A search is
//! not restartable; calling `search` again issues a fresh query. `retrieve` pulls
//! at most two entries.

use crate::attributes::{FieldValue, Filter};
use crate::config::ModelConfig;
use crate::directory::{Cursor, Directory, DirectoryEntry};
use crate::error::{ModelError, Result};
use crate::instance::ModelInstance;
use crate::model::ModelClass;
use tracing::debug;

pub struct Resolver<'a, D: Directory> {
    directory: &'a D,
    class: &'a ModelClass,
    config: ModelConfig,
}

impl<'a, D: Directory> Resolver<'a, D> {
    pub fn new(directory: &'a D, class: &'a ModelClass) -> Self {
        Self {
            directory,
            class,
            config: ModelConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn class(&self) -> &'a ModelClass {
        self.class
    }

    /// Build an unsaved instance for `dn`.
    pub fn create<I, K, V>(&self, dn: &str, values: I) -> Result<ModelInstance<'a, D::Entry>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        ModelInstance::new(self.class, self.directory.entry(dn), values)
    }

    /// Retrieve the one entry whose rdn field is `rdn_value`.
    pub fn retrieve(&self, rdn_value: &str) -> Result<ModelInstance<'a, D::Entry>> {
        let rdn = self.class.rdn_field();
        let filter = self.filter([(rdn.name(), rdn_value)])?;
        debug!(object_class = self.class.object_class(), filter = %filter, "retrieve");

        let mut results = self.run(&filter)?;
        let Some(instance) = results.next().transpose()? else {
            return Err(ModelError::NoResultFound {
                object_class: self.class.object_class().to_string(),
                filter: filter.to_string(),
            });
        };
        if results.next().transpose()?.is_some() {
            return Err(ModelError::MultipleResultsFound {
                object_class: self.class.object_class().to_string(),
                filter: filter.to_string(),
            });
        }
        Ok(instance)
    }

    /// Search for entries matching every `(field, value)` equality constraint.
    pub fn search<I, K, V>(&self, filters: I) -> Result<SearchResults<'a, D::Entry>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filter = self.filter(filters)?;
        debug!(object_class = self.class.object_class(), filter = %filter, "search");
        self.run(&filter)
    }

    /// Every entry of the model's object class.
    pub fn all(&self) -> Result<SearchResults<'a, D::Entry>> {
        self.search(std::iter::empty::<(&str, &str)>())
    }

    fn filter<I, K, V>(&self, filters: I) -> Result<Filter>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut terms = vec![self.class.base_filter()];
        for (name, value) in filters {
            let field = self.class.field(name.as_ref())?;
            terms.push(Filter::term(
                field.target(),
                value.as_ref(),
                self.config.filter_values,
            ));
        }
        if terms.len() == 1 {
            return Ok(terms.remove(0));
        }
        Ok(Filter::And(terms))
    }

    fn run(&self, filter: &Filter) -> Result<SearchResults<'a, D::Entry>> {
        let cursor = self
            .directory
            .search(self.config.search_base.as_deref(), filter)?;
        Ok(SearchResults {
            class: self.class,
            cursor,
        })
    }
}

/// Lazy sequence of instances, in directory order.
pub struct SearchResults<'a, E: DirectoryEntry> {
    class: &'a ModelClass,
    cursor: Cursor<'a, E>,
}

impl<'a, E: DirectoryEntry> Iterator for SearchResults<'a, E> {
    type Item = Result<ModelInstance<'a, E>>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.cursor.next()?;
        Some(
            entry
                .map(|entry| ModelInstance::bound(self.class, entry))
                .map_err(ModelError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterValues;
    use crate::directory::memory::{MemDirectory, MemEntry};
    use crate::directory::DirectoryError;
    use crate::instance::Lifecycle;
    use crate::test_utils::{person_class, seeded_directory, JACK};
    use std::cell::Cell;

    fn literal() -> ModelConfig {
        ModelConfig {
            filter_values: FilterValues::Literal,
            ..Default::default()
        }
    }

    fn cns(results: SearchResults<'_, MemEntry>) -> Vec<String> {
        results
            .map(|instance| {
                instance
                    .unwrap()
                    .get("cn")
                    .unwrap()
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect()
    }

    /// Counts how many entries a query pulled from the directory.
    struct CountingDirectory {
        inner: MemDirectory,
        pulled: Cell<usize>,
    }

    impl Directory for CountingDirectory {
        type Entry = MemEntry;

        fn entry(&self, dn: &str) -> MemEntry {
            self.inner.entry(dn)
        }

        fn search<'a>(
            &'a self,
            base: Option<&str>,
            filter: &Filter,
        ) -> std::result::Result<Cursor<'a, MemEntry>, DirectoryError> {
            let pulled = &self.pulled;
            let cursor = self.inner.search(base, filter)?;
            Ok(Box::new(cursor.inspect(move |_| pulled.set(pulled.get() + 1))))
        }
    }

    // --- Retrieve ---

    #[test]
    fn test_retrieve_exactly_one() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);

        let jack = people.retrieve("jack").unwrap();
        assert_eq!(jack.dn(), JACK);
        assert_eq!(jack.state(), Lifecycle::Persisted);
        assert_eq!(jack.get("lastname").unwrap().as_str(), Some("O'Neill"));
    }

    #[test]
    fn test_retrieve_no_result() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);

        let err = people.retrieve("nobody").unwrap_err();
        match err {
            ModelError::NoResultFound {
                object_class,
                filter,
            } => {
                assert_eq!(object_class, "person");
                assert_eq!(filter, "(&(objectClass=person)(cn=nobody))");
            }
            other => panic!("Expected NoResultFound, got {other:?}"),
        }
    }

    #[test]
    fn test_retrieve_only_considers_model_object_class() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);
        assert!(matches!(
            people.retrieve("sgc"),
            Err(ModelError::NoResultFound { .. })
        ));
    }

    #[test]
    fn test_retrieve_wildcard_is_exact_by_default() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);
        assert!(matches!(
            people.retrieve("*a*"),
            Err(ModelError::NoResultFound { .. })
        ));
    }

    #[test]
    fn test_retrieve_wildcard_in_literal_mode() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class).with_config(literal());

        assert!(matches!(
            people.retrieve("*a*"),
            Err(ModelError::MultipleResultsFound { .. })
        ));
        assert_eq!(people.retrieve("ja*").unwrap().dn(), JACK);
    }

    #[test]
    fn test_retrieve_pulls_at_most_two_entries() {
        let class = person_class();
        let directory = CountingDirectory {
            inner: seeded_directory(),
            pulled: Cell::new(0),
        };
        let people = Resolver::new(&directory, &class).with_config(literal());

        assert!(people.retrieve("*").is_err());
        assert_eq!(directory.pulled.get(), 2);
    }

    // --- Search ---

    #[test]
    fn test_search_without_filters_returns_all_of_class() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);

        assert_eq!(
            cns(people.all().unwrap()),
            vec!["jack", "daniel", "sam", "teal'c"]
        );
    }

    #[test]
    fn test_search_translates_field_names() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);

        let bash = people.search([("shell", "/bin/bash")]).unwrap();
        assert_eq!(cns(bash), vec!["jack", "teal'c"]);

        let both = people
            .search([("shell", "/bin/bash"), ("lastname", "O'Neill")])
            .unwrap();
        assert_eq!(cns(both), vec!["jack"]);
    }

    #[test]
    fn test_search_multi_valued_field() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);

        let found = people.search([("phone", "5550101")]).unwrap();
        assert_eq!(cns(found), vec!["daniel"]);
    }

    #[test]
    fn test_search_no_match_is_empty() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);

        let found = people.search([("shell", "/bin/tcsh")]).unwrap();
        assert_eq!(found.count(), 0);
    }

    #[test]
    fn test_search_unknown_field_fails() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);
        assert!(matches!(
            people.search([("nickname", "jack")]),
            Err(ModelError::UnknownField(_))
        ));
    }

    #[test]
    fn test_search_respects_search_base() {
        let class = person_class();
        let directory = seeded_directory();
        let config = ModelConfig {
            search_base: Some("ou=allies,dc=example,dc=com".to_string()),
            ..Default::default()
        };
        let people = Resolver::new(&directory, &class).with_config(config);

        assert_eq!(cns(people.all().unwrap()), vec!["teal'c"]);
        assert!(people.retrieve("jack").is_err());
    }

    #[test]
    fn test_search_is_lazy() {
        let class = person_class();
        let directory = CountingDirectory {
            inner: seeded_directory(),
            pulled: Cell::new(0),
        };
        let people = Resolver::new(&directory, &class);

        let mut results = people.all().unwrap();
        assert_eq!(directory.pulled.get(), 0);
        let first = results.next().unwrap().unwrap();
        assert_eq!(first.dn(), JACK);
        assert_eq!(directory.pulled.get(), 1);
    }

    // --- Create ---

    #[test]
    fn test_create_then_retrieve() {
        let class = person_class();
        let directory = seeded_directory();
        let people = Resolver::new(&directory, &class);

        let mut george = people
            .create(
                "cn=george,dc=example,dc=com",
                [("cn", "george"), ("lastname", "Hammond")],
            )
            .unwrap();
        assert_eq!(george.state(), Lifecycle::New);
        george.save().unwrap();

        let george = people.retrieve("george").unwrap();
        assert_eq!(george.get("lastname").unwrap().as_str(), Some("Hammond"));
        assert_eq!(cns(people.all().unwrap()).len(), 5);
    }
}
