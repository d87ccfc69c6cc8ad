use crate::directory::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Attribute is not nullable: {0}")]
    NotNullableAttribute(String),

    #[error("Attribute holds more than one value: {0}")]
    MultipleValuesInAttribute(String),

    #[error("No {object_class} entry matches {filter}")]
    NoResultFound {
        object_class: String,
        filter: String,
    },

    #[error("More than one {object_class} entry matches {filter}")]
    MultipleResultsFound {
        object_class: String,
        filter: String,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Entry has been deleted: {0}")]
    EntryDeleted(String),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
