//! Conversions shared by the canonical and configurable codecs.

use helios_rm_support::{FieldError, FieldRef, FieldValue, RmObject, RmType};

use crate::error::{DeserializationError, SerializationError, excerpt};
use crate::node::{GenericNode, Primitive};

/// Encodes one field value. Objects, including those inside lists, are
/// handed to `encode_object`.
pub(crate) fn encode_field<F>(field: &FieldRef<'_>, encode_object: &mut F) -> Result<GenericNode, SerializationError>
where
    F: FnMut(&dyn RmObject) -> Result<GenericNode, SerializationError>,
{
    match field {
        FieldRef::Null => Ok(GenericNode::Null),
        FieldRef::Bool(value) => Ok(GenericNode::bool(*value)),
        FieldRef::Integer(value) => Ok(GenericNode::integer(*value)),
        FieldRef::Real(value) => {
            GenericNode::real(*value).ok_or(SerializationError::NonFiniteNumber { value: *value })
        }
        FieldRef::Text(value) => Ok(GenericNode::string(*value)),
        FieldRef::List(items) => items
            .iter()
            .map(|item| encode_field(item, encode_object))
            .collect::<Result<Vec<_>, _>>()
            .map(GenericNode::List),
        FieldRef::Object(object) => encode_object(*object),
    }
}

/// Integers stay integers; everything else numeric becomes a real.
pub(crate) fn primitive_value(primitive: &Primitive) -> FieldValue {
    match primitive {
        Primitive::String(value) => FieldValue::Text(value.clone()),
        Primitive::Bool(value) => FieldValue::Bool(*value),
        Primitive::Number(number) => match number.as_i64() {
            Some(value) => FieldValue::Integer(value),
            None => number.as_f64().map_or(FieldValue::Null, FieldValue::Real),
        },
    }
}

/// Rendering of an object for encode-time errors.
pub(crate) fn describe_object(value: &dyn RmObject) -> String {
    excerpt(&format!("{value:?}"))
}

pub(crate) fn assign(
    object: &mut dyn RmObject,
    owner: &str,
    field: &str,
    value: FieldValue,
) -> Result<(), DeserializationError> {
    object.set_field(field, value).map_err(|err| match err {
        FieldError::UnknownField { .. } => DeserializationError::UnknownField {
            owner: owner.to_string(),
            field: field.to_string(),
        },
        source => DeserializationError::InvalidValue {
            owner: owner.to_string(),
            field: field.to_string(),
            source,
        },
    })
}

pub(crate) fn downcast_root<T: RmType>(object: Box<dyn RmObject>) -> Result<T, DeserializationError> {
    let found = object.rm_type_name();
    object
        .into_any()
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| DeserializationError::UnexpectedNode {
            expected: T::TYPE_DEF.name.to_string(),
            found: found.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_value_keeps_integers() {
        let int = Primitive::Number(5.into());
        assert!(matches!(primitive_value(&int), FieldValue::Integer(5)));

        let real = GenericNode::real(2.5).unwrap();
        let GenericNode::Primitive(real) = real else { unreachable!() };
        assert!(matches!(primitive_value(&real), FieldValue::Real(r) if r == 2.5));

        let big = Primitive::Number(u64::MAX.into());
        assert!(matches!(primitive_value(&big), FieldValue::Real(_)));
    }

    #[test]
    fn test_non_finite_number_is_rejected() {
        let mut no_objects = |_: &dyn RmObject| -> Result<GenericNode, SerializationError> {
            panic!("no objects expected")
        };
        let err = encode_field(&FieldRef::Real(f64::INFINITY), &mut no_objects).unwrap_err();
        assert!(matches!(err, SerializationError::NonFiniteNumber { .. }));

        let list = FieldRef::List(vec![FieldRef::Text("x"), FieldRef::Integer(2)]);
        assert_eq!(
            encode_field(&list, &mut no_objects).unwrap(),
            GenericNode::List(vec![GenericNode::string("x"), GenericNode::integer(2)])
        );
    }
}
