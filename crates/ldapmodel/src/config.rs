//! # Configuration
//!
//! ldapmodel configuration is managed by [`confique`], which handles layered loading
//! from environment variables, a TOML file, and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `LDAPMODEL_FILTER_VALUES`, `LDAPMODEL_SEARCH_BASE`
//! 2. **TOML file**: passed to [`ModelConfig::load`], skipped if missing
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `filter_values` | `escaped` | `escaped` matches search values exactly; `literal` lets `*` act as a wildcard |
//! | `search_base` | none | DN suffix that scopes every retrieve and search |

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How caller-supplied values are placed into search filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterValues {
    /// Values are escaped and matched exactly.
    #[default]
    Escaped,

    /// `*` in a value is a wildcard, so `retrieve("*a*")` may match several
    /// entries. Other filter syntax is still escaped.
    Literal,
}

/// Configuration for ldapmodel, usually stored in `ldapmodel.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// How search values are placed into directory filters ("escaped" or "literal")
    #[config(default = "escaped", env = "LDAPMODEL_FILTER_VALUES")]
    pub filter_values: FilterValues,

    /// DN suffix that scopes every search (e.g. "ou=people,dc=example,dc=com")
    #[config(env = "LDAPMODEL_SEARCH_BASE")]
    pub search_base: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            filter_values: FilterValues::Escaped,
            search_base: None,
        }
    }
}

impl ModelConfig {
    /// Load configuration from the environment, then `path` (if given), then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ModelConfig::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }
}
