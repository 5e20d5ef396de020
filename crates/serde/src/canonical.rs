//! Strict codec: every object carries its tag.
//!
//! Encoding walks the registered field order of each object, writes a tag on
//! every object node and leaves out absent values. Decoding never guesses:
//! a missing tag, an unknown tag or an unknown field aborts the call.

use helios_rm_support::{FieldValue, RmObject, RmType};
use tracing::debug;

use crate::codec::{assign, describe_object, downcast_root, encode_field, primitive_value};
use crate::context::RmContext;
use crate::error::{DeserializationError, SerializationError};
use crate::node::{GenericNode, ObjectNode};

#[derive(Debug, Clone)]
pub struct CanonicalCodec {
    ctx: RmContext,
}

impl CanonicalCodec {
    pub fn new(ctx: RmContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RmContext {
        &self.ctx
    }

    pub fn encode(&self, value: &dyn RmObject) -> Result<GenericNode, SerializationError> {
        debug!(rm_type = value.rm_type_name(), "canonical encode");
        self.encode_object(value).map(GenericNode::Object)
    }

    pub(crate) fn encode_object(&self, value: &dyn RmObject) -> Result<ObjectNode, SerializationError> {
        let registration = self
            .ctx
            .registry()
            .registration_of(value)
            .map_err(|source| SerializationError::Unregistered {
                object: describe_object(value),
                source,
            })?;
        let owner = registration.name();
        let mut node = ObjectNode::tagged(owner);

        for def in registration.fields() {
            let field = value.field(def.name).ok_or(SerializationError::MissingField {
                owner: value.rm_type_name(),
                field: def.name,
            })?;
            if field.is_absent() {
                continue;
            }
            let encoded = encode_field(&field, &mut |object: &dyn RmObject| {
                self.encode_object(object).map(GenericNode::Object)
            })
            .map_err(|err| err.in_field(owner, def.name))?;
            node.insert(def.name, encoded);
        }
        Ok(node)
    }

    pub fn decode(&self, node: &GenericNode) -> Result<Box<dyn RmObject>, DeserializationError> {
        match node {
            GenericNode::Object(object) => {
                debug!(tag = ?object.tag, "canonical decode");
                self.decode_object(object)
            }
            other => Err(DeserializationError::UnexpectedNode {
                expected: "a tagged object".to_string(),
                found: other.kind().to_string(),
            }),
        }
    }

    /// Decodes and checks that the root is a `T`.
    pub fn decode_as<T: RmType>(&self, node: &GenericNode) -> Result<T, DeserializationError> {
        downcast_root(self.decode(node)?)
    }

    fn decode_object(&self, node: &ObjectNode) -> Result<Box<dyn RmObject>, DeserializationError> {
        let tag = node
            .tag
            .as_deref()
            .ok_or_else(|| DeserializationError::MissingTypeTag {
                data: node.excerpt(),
            })?;
        let registration =
            self.ctx
                .registry()
                .resolve(tag)
                .map_err(|source| DeserializationError::TypeNotFound {
                    source,
                    data: node.excerpt(),
                })?;

        let mut object = registration.allocate();
        for (name, value) in &node.fields {
            if registration.field(name).is_none() {
                return Err(DeserializationError::UnknownField {
                    owner: tag.to_string(),
                    field: name.clone(),
                });
            }
            let value = self
                .decode_value(value)
                .map_err(|err| err.in_field(tag, name))?;
            assign(object.as_mut(), tag, name, value)?;
        }
        Ok(object)
    }

    fn decode_value(&self, node: &GenericNode) -> Result<FieldValue, DeserializationError> {
        match node {
            GenericNode::Null => Ok(FieldValue::Null),
            GenericNode::Primitive(primitive) => Ok(primitive_value(primitive)),
            GenericNode::List(items) => items
                .iter()
                .map(|item| self.decode_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            GenericNode::Object(object) => self.decode_object(object).map(FieldValue::Object),
        }
    }
}
