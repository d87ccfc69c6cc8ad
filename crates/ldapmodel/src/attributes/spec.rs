//! Attribute specifications.
//!
//! An [`AttributeSpec`] only describes policy. The behavior lives in
//! [`super::resolve`], which every field read and write goes through.

/// Specification for a single mapped attribute.
///
/// Specs are built with `const` builder methods so model definitions can keep
/// them in constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    /// The directory attribute name (e.g., "sn", "telephoneNumber")
    pub target_name: &'static str,

    /// Whether the attribute holds a set of values instead of at most one
    pub multiple: bool,

    /// Whether the attribute may be cleared after having a value
    pub nullable: bool,

    /// Returned by single-valued reads when the attribute is unset
    ///
    /// Applied client-side only; never written to the directory.
    pub default: Option<&'static str>,

    /// Seeded into the directory when the attribute is left unset on save
    ///
    /// Never applied client-side: reading the field before the save that seeds
    /// it does not see this value.
    pub server_default: Option<&'static str>,
}

impl AttributeSpec {
    /// Create a single-valued, nullable spec with no defaults.
    pub const fn new(target_name: &'static str) -> Self {
        Self {
            target_name,
            multiple: false,
            nullable: true,
            default: None,
            server_default: None,
        }
    }

    /// Make the attribute multi-valued.
    pub const fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Forbid clearing the attribute.
    pub const fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the client-side default.
    pub const fn with_default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the value seeded into the directory when left unset.
    pub const fn with_server_default(mut self, value: &'static str) -> Self {
        self.server_default = Some(value);
        self
    }
}
