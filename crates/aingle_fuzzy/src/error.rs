//! Error types for the AIngle fuzzy inference engine.

use thiserror::Error;

use crate::model::Role;
use crate::validator::ValidationError;

/// A specialized `Result` type for fuzzy engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while building, editing or evaluating a fuzzy system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A fuzzy set was rejected because its parameters are invalid.
    #[error("Invalid set '{set}' in {role} variable '{variable}': {source}")]
    InvalidSet {
        role: Role,
        variable: String,
        set: String,
        #[source]
        source: ValidationError,
    },

    /// A universe whose bounds are not finite or not strictly increasing.
    #[error("Invalid universe [{min}, {max}]: min must be strictly less than max")]
    InvalidUniverse { min: f64, max: f64 },

    /// A rule was defined incorrectly.
    #[error("Invalid rule definition: {0}")]
    InvalidRule(String),

    /// A variable with the same name already exists in the collection.
    #[error("Duplicate {role} variable: {name}")]
    DuplicateVariable { role: Role, name: String },

    /// A set with the same name already exists in the variable.
    #[error("Duplicate set '{set}' in variable '{variable}'")]
    DuplicateSet { variable: String, set: String },

    /// A rule or operation referenced a variable that does not exist.
    #[error("Unknown {role} variable: {name}")]
    UnknownVariable { role: Role, name: String },

    /// A rule or operation referenced a set that does not exist in its variable.
    #[error("Unknown set '{set}' in variable '{variable}'")]
    UnknownSet { variable: String, set: String },

    /// No crisp value was supplied for an input referenced by a rule.
    #[error("Missing crisp value for input variable: {0}")]
    MissingInput(String),

    /// A rule index outside the rule list.
    #[error("Rule index {index} out of range (system has {len} rules)")]
    RuleOutOfRange { index: usize, len: usize },

    /// A crisp input value that is not a finite number.
    #[error("Invalid crisp value {value} for input variable: {name}")]
    InvalidInput { name: String, value: f64 },

    /// An evaluation setting could not be parsed.
    #[error("Invalid {setting} setting: '{value}'")]
    InvalidSetting {
        setting: &'static str,
        value: String,
    },

    /// A description could not be turned into a system.
    #[error("Invalid description: {0}")]
    InvalidDescription(String),

    /// An error occurred while reading a description from disk.
    #[error("I/O error: {0}")]
    Io(String),

    /// An error occurred during data serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
