//! Error types for reference model serialization and deserialization.
//!
//! Every failure aborts the whole call; no partially built object is ever
//! returned. Deserialization errors raised below the root are wrapped in
//! [`DeserializationError::Field`] so that the message names the path from the
//! root to the failing field.

use std::error::Error as StdError;

use helios_rm_support::FieldError;
use thiserror::Error;

use crate::format::Format;

const EXCERPT_LIMIT: usize = 160;

/// Shortens offending input for inclusion in an error.
pub(crate) fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// A type tag that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type '{type_name}'")]
pub struct TypeNotFoundError {
    pub type_name: String,
}

impl TypeNotFoundError {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

/// A string that uses a terse grammar's delimiters but breaks its rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {grammar} value '{input}': {reason}")]
pub struct InvalidFormatError {
    pub input: String,
    pub grammar: &'static str,
    pub reason: String,
}

/// Errors raised by the type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    NotFound(#[from] TypeNotFoundError),

    #[error("no type name is registered for allocator of {rust_type}")]
    UnknownAllocator { rust_type: &'static str },

    #[error(
        "{rust_type} (declaring itself {declared}) is not registered; register it before encoding"
    )]
    UnregisteredInstance {
        rust_type: &'static str,
        declared: &'static str,
    },

    #[error("rejected registration batch: {}", .problems.join("; "))]
    InvalidBatch { problems: Vec<String> },
}

/// Errors raised while turning a typed object into text.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("cannot serialize {object}: {source}")]
    Unregistered {
        object: String,
        source: RegistryError,
    },

    #[error("{owner} declares field '{field}' but does not expose it")]
    MissingField {
        owner: &'static str,
        field: &'static str,
    },

    #[error("non-finite number {value} has no textual representation")]
    NonFiniteNumber { value: f64 },

    #[error("{format} cannot represent {reason}")]
    Unsupported { format: Format, reason: String },

    #[error("failed to write {format}: {message}")]
    Render { format: Format, message: String },

    #[error("{owner}.{field}: {source}")]
    Field {
        owner: String,
        field: String,
        source: Box<SerializationError>,
    },
}

impl SerializationError {
    pub(crate) fn in_field(self, owner: &str, field: &str) -> Self {
        SerializationError::Field {
            owner: owner.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn render(format: Format, err: impl std::fmt::Display) -> Self {
        SerializationError::Render {
            format,
            message: err.to_string(),
        }
    }

    /// The innermost error below any field wrappers.
    pub fn root_cause(&self) -> &SerializationError {
        match self {
            SerializationError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Errors raised while turning text into a typed object.
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("malformed {format} input: {message}")]
    Malformed {
        format: Format,
        message: String,
        data: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("object has no type tag: {data}")]
    MissingTypeTag { data: String },

    #[error("{source} in {data}")]
    TypeNotFound {
        source: TypeNotFoundError,
        data: String,
    },

    #[error(transparent)]
    InvalidFormat(#[from] InvalidFormatError),

    #[error("ambiguous type{} for {data}: candidates {}", expected_suffix(.expected), .candidates.join(", "))]
    AmbiguousType {
        expected: Option<String>,
        candidates: Vec<String>,
        data: String,
    },

    #[error("no registered type{} matches {data}", expected_suffix(.expected))]
    NoMatchingType {
        expected: Option<String>,
        data: String,
    },

    #[error("'{input}' matches no terse grammar applicable to {expected}")]
    TerseMismatch { input: String, expected: String },

    #[error("{owner} has no field '{field}'")]
    UnknownField { owner: String, field: String },

    #[error("invalid value for {owner}.{field}: {source}")]
    InvalidValue {
        owner: String,
        field: String,
        source: FieldError,
    },

    #[error("expected {expected}, found {found}")]
    UnexpectedNode { expected: String, found: String },

    #[error("{owner}.{field}: {source}")]
    Field {
        owner: String,
        field: String,
        source: Box<DeserializationError>,
    },
}

fn expected_suffix(expected: &Option<String>) -> String {
    match expected {
        Some(name) => format!(" (expected {name})"),
        None => String::new(),
    }
}

impl DeserializationError {
    pub(crate) fn malformed(format: Format, data: &str, err: impl StdError + Send + Sync + 'static) -> Self {
        DeserializationError::Malformed {
            format,
            message: err.to_string(),
            data: excerpt(data),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn structure(format: Format, data: &str, message: impl Into<String>) -> Self {
        DeserializationError::Malformed {
            format,
            message: message.into(),
            data: excerpt(data),
            source: None,
        }
    }

    pub(crate) fn in_field(self, owner: &str, field: &str) -> Self {
        DeserializationError::Field {
            owner: owner.to_string(),
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error below any field wrappers.
    pub fn root_cause(&self) -> &DeserializationError {
        match self {
            DeserializationError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Field names from the root to the failure, e.g. `["content", "data"]`.
    pub fn field_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let DeserializationError::Field { field, source, .. } = current {
            path.push(field.as_str());
            current = source;
        }
        path
    }

    pub fn type_not_found(&self) -> Option<&TypeNotFoundError> {
        match self.root_cause() {
            DeserializationError::TypeNotFound { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn invalid_format(&self) -> Option<&InvalidFormatError> {
        match self.root_cause() {
            DeserializationError::InvalidFormat(err) => Some(err),
            _ => None,
        }
    }
}

/// Top-level error for callers that do not care which direction failed.
#[derive(Debug, Error)]
pub enum SerdeError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid configuration: {}", .0.join("; "))]
    Config(Vec<String>),
}

/// Result type alias for serialization operations
pub type Result<T> = std::result::Result<T, SerdeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(EXCERPT_LIMIT + 10);
        let short = excerpt(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), EXCERPT_LIMIT + 3);
        assert_eq!(excerpt("abc"), "abc");
    }

    #[test]
    fn test_root_cause_and_path() {
        let err = DeserializationError::TypeNotFound {
            source: TypeNotFoundError::new("UNKNOWN_TYPE"),
            data: "{}".into(),
        }
        .in_field("ELEMENT", "value")
        .in_field("CLUSTER", "items");

        assert_eq!(err.field_path(), vec!["items", "value"]);
        assert_eq!(err.type_not_found().unwrap().type_name, "UNKNOWN_TYPE");
        assert!(err.invalid_format().is_none());
        assert_eq!(
            err.to_string(),
            "CLUSTER.items: ELEMENT.value: unknown type 'UNKNOWN_TYPE' in {}"
        );
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = DeserializationError::AmbiguousType {
            expected: Some("DATA_VALUE".into()),
            candidates: vec!["DV_EHR_URI".into(), "DV_TEXT".into()],
            data: r#"{"value":"x"}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"ambiguous type (expected DATA_VALUE) for {"value":"x"}: candidates DV_EHR_URI, DV_TEXT"#
        );
    }
}
