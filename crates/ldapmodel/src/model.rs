//! # Model Classes
//!
//! A [`ModelClass`] is the definition shared by every instance of one model type:
//! the directory object class it represents, its fields, and the field used as the
//! relative distinguishing name (rdn).
//!
//! Fields are resolved once, when the class is built, into a table of [`Field`]
//! accessors. Instances look fields up in that table by name; there is no other
//! dispatch.
//!
//! ## Implicit Fields
//!
//! Every class carries an `objectClass` field (multi-valued, not nullable) unless
//! the definition declares its own.

use crate::attributes::{AttributeSpec, Filter};
use crate::error::{ModelError, Result};
use std::collections::BTreeMap;

/// Field name of the implicit object class field.
pub const OBJECT_CLASS_FIELD: &str = "objectClass";

const OBJECT_CLASS_SPEC: AttributeSpec = AttributeSpec::new("objectClass")
    .multiple()
    .not_nullable();

/// One entry of a class's accessor table.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    spec: AttributeSpec,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &AttributeSpec {
        &self.spec
    }

    /// The directory attribute this field maps to.
    pub fn target(&self) -> &str {
        self.spec.target_name
    }
}

#[derive(Debug, Clone)]
pub struct ModelClass {
    object_class: String,
    fields: Vec<Field>,
    by_name: BTreeMap<String, usize>,
    rdn: usize,
}

impl ModelClass {
    pub fn builder(object_class: impl Into<String>) -> ModelClassBuilder {
        ModelClassBuilder {
            object_class: object_class.into(),
            attrs: Vec::new(),
            rdn: "cn".to_string(),
        }
    }

    pub fn object_class(&self) -> &str {
        &self.object_class
    }

    /// The field whose value distinguishes entries (the rdn).
    pub fn rdn_field(&self) -> &Field {
        &self.fields[self.rdn]
    }

    /// Look up a field accessor by name.
    pub fn field(&self, name: &str) -> Result<&Field> {
        self.by_name
            .get(name)
            .map(|&index| &self.fields[index])
            .ok_or_else(|| ModelError::UnknownField(name.to_string()))
    }

    /// All fields, in declaration order (the implicit `objectClass` first).
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Filter matching every entry of this class.
    pub fn base_filter(&self) -> Filter {
        Filter::equals(OBJECT_CLASS_SPEC.target_name, self.object_class.clone())
    }
}

pub struct ModelClassBuilder {
    object_class: String,
    attrs: Vec<(String, AttributeSpec)>,
    rdn: String,
}

impl ModelClassBuilder {
    /// Declare a field.
    pub fn attr(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attrs.push((name.into(), spec));
        self
    }

    /// Set the rdn field (defaults to "cn").
    pub fn rdn(mut self, field: impl Into<String>) -> Self {
        self.rdn = field.into();
        self
    }

    pub fn build(self) -> Result<ModelClass> {
        if self.object_class.is_empty() {
            return Err(ModelError::InvalidModel(
                "object class must not be empty".to_string(),
            ));
        }

        let mut fields = Vec::with_capacity(self.attrs.len() + 1);
        let mut by_name = BTreeMap::new();

        let declares_object_class = self
            .attrs
            .iter()
            .any(|(name, _)| name == OBJECT_CLASS_FIELD);
        let implicit = (!declares_object_class)
            .then(|| (OBJECT_CLASS_FIELD.to_string(), OBJECT_CLASS_SPEC));

        for (name, spec) in implicit.into_iter().chain(self.attrs) {
            if by_name.insert(name.clone(), fields.len()).is_some() {
                return Err(ModelError::InvalidModel(format!(
                    "field declared twice: {}",
                    name
                )));
            }
            fields.push(Field { name, spec });
        }

        let rdn = *by_name.get(&self.rdn).ok_or_else(|| {
            ModelError::InvalidModel(format!("rdn field is not declared: {}", self.rdn))
        })?;
        if !fields[by_name[OBJECT_CLASS_FIELD]].spec.multiple {
            return Err(ModelError::InvalidModel(format!(
                "{} field must be multi-valued",
                OBJECT_CLASS_FIELD
            )));
        }
        if fields[rdn].spec.multiple {
            return Err(ModelError::InvalidModel(format!(
                "rdn field must be single-valued: {}",
                self.rdn
            )));
        }

        Ok(ModelClass {
            object_class: self.object_class,
            fields,
            by_name,
            rdn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_builder() -> ModelClassBuilder {
        ModelClass::builder("person")
            .attr("cn", AttributeSpec::new("cn"))
            .attr("lastname", AttributeSpec::new("sn"))
            .attr("phone", AttributeSpec::new("telephoneNumber").multiple())
    }

    #[test]
    fn builds_accessor_table() {
        let class = person_builder().build().unwrap();
        assert_eq!(class.object_class(), "person");
        assert_eq!(class.field("lastname").unwrap().target(), "sn");
        assert!(class.field("phone").unwrap().spec().multiple);
        assert_eq!(class.rdn_field().name(), "cn");
    }

    #[test]
    fn object_class_field_is_implicit() {
        let class = person_builder().build().unwrap();
        let names: Vec<_> = class.fields().map(Field::name).collect();
        assert_eq!(names, vec!["objectClass", "cn", "lastname", "phone"]);

        let spec = class.field(OBJECT_CLASS_FIELD).unwrap().spec();
        assert!(spec.multiple);
        assert!(!spec.nullable);
    }

    #[test]
    fn declared_object_class_replaces_implicit() {
        let class = person_builder()
            .attr("objectClass", AttributeSpec::new("objectClass").multiple())
            .build()
            .unwrap();
        assert!(class.field(OBJECT_CLASS_FIELD).unwrap().spec().nullable);
        assert_eq!(class.fields().count(), 4);
    }

    #[test]
    fn declared_object_class_must_be_multi_valued() {
        let result = person_builder()
            .attr("objectClass", AttributeSpec::new("objectClass"))
            .build();
        assert!(matches!(result, Err(ModelError::InvalidModel(_))));
    }

    #[test]
    fn unknown_field_is_an_error() {
        let class = person_builder().build().unwrap();
        assert!(matches!(
            class.field("nickname"),
            Err(ModelError::UnknownField(name)) if name == "nickname"
        ));
    }

    #[test]
    fn rdn_must_be_declared() {
        let result = person_builder().rdn("uid").build();
        assert!(matches!(result, Err(ModelError::InvalidModel(_))));
    }

    #[test]
    fn rdn_must_be_single_valued() {
        let result = person_builder().rdn("phone").build();
        assert!(matches!(result, Err(ModelError::InvalidModel(_))));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let result = person_builder().attr("cn", AttributeSpec::new("uid")).build();
        assert!(matches!(result, Err(ModelError::InvalidModel(_))));
    }

    #[test]
    fn empty_object_class_is_rejected() {
        let result = ModelClass::builder("")
            .attr("cn", AttributeSpec::new("cn"))
            .build();
        assert!(matches!(result, Err(ModelError::InvalidModel(_))));
    }

    #[test]
    fn base_filter_selects_object_class() {
        let class = person_builder().build().unwrap();
        assert_eq!(class.base_filter().to_string(), "(objectClass=person)");
    }
}
