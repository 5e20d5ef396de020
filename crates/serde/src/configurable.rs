//! Permissive codec: tags are optional and terse strings are accepted.
//!
//! Encoding leaves a tag out wherever the declared field type already names
//! the value's type, and writes terse strings for types with a terse grammar
//! when configured to. Decoding resolves an untagged node from the field it
//! sits in, then from its shape; a string in an object position goes through
//! the terse grammars applicable to that position.

use helios_rm_support::{FieldDef, FieldRef, FieldValue, PrimitiveKind, RmObject, RmType};
use tracing::{debug, warn};

use crate::canonical::CanonicalCodec;
use crate::codec::{assign, describe_object, downcast_root, encode_field, primitive_value};
use crate::config::CodecConfig;
use crate::context::RmContext;
use crate::error::{DeserializationError, SerializationError};
use crate::inference::{InferenceError, TypeInferenceEngine};
use crate::node::{GenericNode, ObjectNode, Primitive};
use crate::terse::{TerseCodec, TerseOutcome};

/// Where an object sits: `(owner type, field name)`, or the root.
type Slot<'a> = Option<(&'a str, &'a str)>;

#[derive(Debug)]
pub struct ConfigurableCodec {
    canonical: CanonicalCodec,
    terse: TerseCodec,
    config: CodecConfig,
}

impl ConfigurableCodec {
    pub fn new(ctx: RmContext, config: CodecConfig) -> Self {
        Self::with_terse(ctx, config, TerseCodec::default())
    }

    pub fn with_terse(ctx: RmContext, config: CodecConfig, terse: TerseCodec) -> Self {
        Self {
            canonical: CanonicalCodec::new(ctx),
            terse,
            config,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn terse(&self) -> &TerseCodec {
        &self.terse
    }

    pub fn context(&self) -> &RmContext {
        self.canonical.context()
    }

    fn engine(&self) -> TypeInferenceEngine<'_> {
        TypeInferenceEngine::new(self.context(), &self.terse)
    }

    pub fn encode(&self, value: &dyn RmObject) -> Result<GenericNode, SerializationError> {
        debug!(rm_type = value.rm_type_name(), config = ?self.config, "configurable encode");
        self.encode_object(value, None)
    }

    fn encode_object(&self, value: &dyn RmObject, slot: Slot<'_>) -> Result<GenericNode, SerializationError> {
        let registration = self
            .context()
            .registry()
            .registration_of(value)
            .map_err(|source| SerializationError::Unregistered {
                object: describe_object(value),
                source,
            })?;
        let owner = registration.name();

        if self.config.use_terse_format {
            if let Some(rule) = self.terse.rule_for(owner) {
                let plain = self.canonical.encode_object(value)?;
                if let Some(text) = rule.encode(&plain) {
                    return Ok(GenericNode::string(text));
                }
            }
        }

        let keep_tag = match slot {
            _ if self.config.always_include_type => true,
            None => true,
            Some((parent, field)) => !self.engine().can_omit_type(parent, field, owner),
        };
        let mut node = if keep_tag {
            ObjectNode::tagged(owner)
        } else {
            ObjectNode::new()
        };

        for def in registration.fields() {
            let field = value.field(def.name).ok_or(SerializationError::MissingField {
                owner: value.rm_type_name(),
                field: def.name,
            })?;
            if field.is_absent() {
                let empty_list = !matches!(field, FieldRef::Null);
                if empty_list && self.config.include_empty_collections {
                    node.insert(def.name, GenericNode::List(Vec::new()));
                } else if !empty_list && self.config.include_null_values {
                    node.insert(def.name, GenericNode::Null);
                }
                continue;
            }
            let encoded = encode_field(&field, &mut |object: &dyn RmObject| {
                self.encode_object(object, Some((owner, def.name)))
            })
            .map_err(|err| err.in_field(owner, def.name))?;
            node.insert(def.name, encoded);
        }
        Ok(GenericNode::Object(node))
    }

    pub fn decode(&self, node: &GenericNode) -> Result<Box<dyn RmObject>, DeserializationError> {
        debug!(kind = node.kind(), "configurable decode");
        self.decode_node(node, None)
    }

    /// Decodes a root that may be untagged, known to be of type `expected`
    /// or one of its subtypes.
    pub fn decode_as_type(
        &self,
        node: &GenericNode,
        expected: &str,
    ) -> Result<Box<dyn RmObject>, DeserializationError> {
        debug!(expected, kind = node.kind(), "configurable decode");
        self.decode_node(node, Some(expected))
    }

    pub fn decode_as<T: RmType>(&self, node: &GenericNode) -> Result<T, DeserializationError> {
        downcast_root(self.decode_as_type(node, T::TYPE_DEF.name)?)
    }

    fn decode_node(
        &self,
        node: &GenericNode,
        expected: Option<&str>,
    ) -> Result<Box<dyn RmObject>, DeserializationError> {
        match node {
            GenericNode::Object(object) => self.decode_object(object, expected),
            GenericNode::Primitive(Primitive::String(text)) => self.decode_string(text, expected),
            other => Err(DeserializationError::UnexpectedNode {
                expected: expected.unwrap_or("an object").to_string(),
                found: other.kind().to_string(),
            }),
        }
    }

    fn decode_string(
        &self,
        text: &str,
        expected: Option<&str>,
    ) -> Result<Box<dyn RmObject>, DeserializationError> {
        let engine = self.engine();
        let registry = self.context().registry();

        if text.is_empty() {
            if let Some(expected) = expected.filter(|e| !engine.is_polymorphic(e)) {
                let registration = registry.resolve(expected).map_err(|source| {
                    DeserializationError::TypeNotFound {
                        source,
                        data: "\"\"".to_string(),
                    }
                })?;
                return Ok(registration.allocate());
            }
        }

        if !self.config.parse_terse_format {
            return Err(DeserializationError::UnexpectedNode {
                expected: expected.unwrap_or("an object").to_string(),
                found: format!("string '{text}'"),
            });
        }

        match self.terse.decode(text, expected, self.context().schema()) {
            TerseOutcome::Parsed(object) => self.decode_object(&object, expected),
            TerseOutcome::Invalid(err) => Err(err.into()),
            TerseOutcome::NotTerseSyntax => Err(DeserializationError::TerseMismatch {
                input: text.to_string(),
                expected: expected.unwrap_or("any type").to_string(),
            }),
        }
    }

    fn decode_object(
        &self,
        node: &ObjectNode,
        expected: Option<&str>,
    ) -> Result<Box<dyn RmObject>, DeserializationError> {
        let type_name = self
            .engine()
            .infer_type(node, expected)
            .map_err(|err| match err {
                InferenceError::Ambiguous { candidates } => DeserializationError::AmbiguousType {
                    expected: expected.map(str::to_string),
                    candidates,
                    data: node.excerpt(),
                },
                InferenceError::NoMatch => DeserializationError::NoMatchingType {
                    expected: expected.map(str::to_string),
                    data: node.excerpt(),
                },
            })?;

        let registration = self
            .context()
            .registry()
            .resolve(&type_name)
            .map_err(|source| DeserializationError::TypeNotFound {
                source,
                data: node.excerpt(),
            })?;

        let mut object = registration.allocate();
        for (name, value) in &node.fields {
            let Some(def) = registration.field(name) else {
                if self.config.strict {
                    return Err(DeserializationError::UnknownField {
                        owner: type_name,
                        field: name.clone(),
                    });
                }
                warn!(owner = %type_name, field = %name, "skipping undeclared field");
                continue;
            };
            let value = self
                .decode_field(def, value)
                .map_err(|err| err.in_field(&type_name, name))?;
            assign(object.as_mut(), &type_name, name, value)?;
        }
        Ok(object)
    }

    fn decode_field(&self, def: &FieldDef, node: &GenericNode) -> Result<FieldValue, DeserializationError> {
        match node {
            GenericNode::Null => Ok(FieldValue::Null),
            GenericNode::List(items) => items
                .iter()
                .map(|item| self.decode_element(def.declared_type, item))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            other => self.decode_element(def.declared_type, other),
        }
    }

    fn decode_element(&self, declared: &str, node: &GenericNode) -> Result<FieldValue, DeserializationError> {
        if PrimitiveKind::from_declared(declared).is_some() {
            return match node {
                GenericNode::Null => Ok(FieldValue::Null),
                GenericNode::Primitive(primitive) => Ok(primitive_value(primitive)),
                other => Err(DeserializationError::UnexpectedNode {
                    expected: declared.to_string(),
                    found: other.kind().to_string(),
                }),
            };
        }
        match node {
            GenericNode::Null => Ok(FieldValue::Null),
            other => self.decode_node(other, Some(declared)).map(FieldValue::Object),
        }
    }
}
