//! Conversion between Rust field types and [`FieldRef`] / [`FieldValue`].

use thiserror::Error;

use crate::object::{FieldRef, FieldValue, RmObject};

/// Failure to assign a decoded value to a field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{owner} has no field '{field}'")]
    UnknownField { owner: &'static str, field: String },

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("'{text}' is not a valid {expected}")]
    Unparseable { expected: &'static str, text: String },
}

impl FieldError {
    pub fn mismatch(expected: impl Into<String>, found: &FieldValue) -> Self {
        FieldError::TypeMismatch {
            expected: expected.into(),
            found: found.describe(),
        }
    }
}

/// A Rust type that can live in a reference model field.
pub trait FieldType: Sized {
    /// Whether the field holds a list of values.
    const MULTIPLE: bool = false;

    fn to_field(&self) -> FieldRef<'_>;

    fn from_field(value: FieldValue) -> Result<Self, FieldError>;
}

/// Moves a boxed object out into its concrete type.
pub fn downcast_object<T: RmObject>(
    object: Box<dyn RmObject>,
    expected: &str,
) -> Result<T, FieldError> {
    let found = object.rm_type_name();
    object
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| FieldError::TypeMismatch {
            expected: expected.to_string(),
            found: format!("object {found}"),
        })
}

impl FieldType for String {
    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Text(self)
    }

    fn from_field(value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Text(text) => Ok(text),
            other => Err(FieldError::mismatch("String", &other)),
        }
    }
}

impl FieldType for bool {
    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Bool(*self)
    }

    // XML and YAML hand booleans over as text; accept the two literals only.
    fn from_field(value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Bool(b) => Ok(b),
            FieldValue::Text(text) => match text.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(FieldError::Unparseable {
                    expected: "Boolean",
                    text,
                }),
            },
            other => Err(FieldError::mismatch("Boolean", &other)),
        }
    }
}

impl FieldType for i64 {
    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Integer(*self)
    }

    fn from_field(value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Integer(i) => Ok(i),
            FieldValue::Real(r) if r.fract() == 0.0 && r.abs() < i64::MAX as f64 => Ok(r as i64),
            FieldValue::Text(text) => text.trim().parse().map_err(|_| FieldError::Unparseable {
                expected: "Integer",
                text,
            }),
            other => Err(FieldError::mismatch("Integer", &other)),
        }
    }
}

impl FieldType for f64 {
    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Real(*self)
    }

    fn from_field(value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Real(r) => Ok(r),
            FieldValue::Integer(i) => Ok(i as f64),
            FieldValue::Text(text) => match text.trim().parse::<f64>() {
                Ok(r) if r.is_finite() => Ok(r),
                _ => Err(FieldError::Unparseable {
                    expected: "Real",
                    text,
                }),
            },
            other => Err(FieldError::mismatch("Real", &other)),
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const MULTIPLE: bool = T::MULTIPLE;

    fn to_field(&self) -> FieldRef<'_> {
        match self {
            Some(value) => value.to_field(),
            None => FieldRef::Null,
        }
    }

    fn from_field(value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field(other).map(Some),
        }
    }
}

/// Lists accept a lone value as a one-element list.
///
/// XML cannot tell a repeated element that occurs once from a single-valued
/// field, so the decoded tree may carry a scalar or object where a list is
/// declared.
impl<T: FieldType> FieldType for Vec<T> {
    const MULTIPLE: bool = true;

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::List(self.iter().map(FieldType::to_field).collect())
    }

    fn from_field(value: FieldValue) -> Result<Self, FieldError> {
        match value {
            FieldValue::Null => Ok(Vec::new()),
            FieldValue::List(items) => items.into_iter().map(T::from_field).collect(),
            single => Ok(vec![T::from_field(single)?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_strict() {
        assert_eq!(
            String::from_field(FieldValue::Text("abc".into())),
            Ok("abc".to_string())
        );
        assert!(matches!(
            String::from_field(FieldValue::Integer(3)),
            Err(FieldError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_primitives_coerce_from_text() {
        assert_eq!(bool::from_field(FieldValue::Text("true".into())), Ok(true));
        assert_eq!(i64::from_field(FieldValue::Text("42".into())), Ok(42));
        assert_eq!(f64::from_field(FieldValue::Text("1.5".into())), Ok(1.5));
        assert_eq!(f64::from_field(FieldValue::Integer(2)), Ok(2.0));
        assert!(matches!(
            bool::from_field(FieldValue::Text("yes".into())),
            Err(FieldError::Unparseable { expected: "Boolean", .. })
        ));
        assert!(f64::from_field(FieldValue::Text("NaN".into())).is_err());
    }

    #[test]
    fn test_single_or_vec() {
        assert_eq!(
            Vec::<String>::from_field(FieldValue::Text("one".into())),
            Ok(vec!["one".to_string()])
        );
        assert_eq!(
            Vec::<i64>::from_field(FieldValue::List(vec![
                FieldValue::Integer(1),
                FieldValue::Integer(2)
            ])),
            Ok(vec![1, 2])
        );
        assert_eq!(Vec::<i64>::from_field(FieldValue::Null), Ok(vec![]));
        assert!(<Vec<i64> as FieldType>::MULTIPLE);
        assert!(<Option<Vec<i64>> as FieldType>::MULTIPLE);
        assert!(!<Option<String> as FieldType>::MULTIPLE);
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<String>::from_field(FieldValue::Null), Ok(None));
        assert!(!Some("x".to_string()).to_field().is_absent());
        assert!(None::<String>.to_field().is_absent());
    }
}
