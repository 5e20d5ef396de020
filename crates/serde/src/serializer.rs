//! One codec paired with one wire format.
//!
//! [`RmSerde`] is the entry point for callers that want text in and typed
//! objects out. The named constructors cover the usual combinations:
//!
//! | Preset | Codec | Format |
//! |--------|-------|--------|
//! | [`canonical_json`](RmSerde::canonical_json) | canonical | JSON, pretty |
//! | [`compact_json`](RmSerde::compact_json) | configurable, [`CodecConfig::compact`] | JSON |
//! | [`internal_json`](RmSerde::internal_json) | configurable, [`CodecConfig::internal`] | JSON |
//! | [`canonical_xml`](RmSerde::canonical_xml) | canonical | XML |
//! | [`verbose_yaml`](RmSerde::verbose_yaml) | canonical | YAML, block |
//! | [`hybrid_yaml`](RmSerde::hybrid_yaml) | configurable, [`CodecConfig::hybrid`] | YAML, hybrid |
//! | [`flow_yaml`](RmSerde::flow_yaml) | configurable, [`CodecConfig::compact`] | YAML, flow |

use helios_rm_support::{RmObject, RmType};
use tracing::debug;

use crate::canonical::CanonicalCodec;
use crate::config::{CodecConfig, JsonConfig, XmlConfig, YamlConfig};
use crate::configurable::ConfigurableCodec;
use crate::context::RmContext;
use crate::error::{DeserializationError, Result, SerdeError, SerializationError};
use crate::format::Format;
use crate::node::GenericNode;
use crate::{json, xml, yaml};

/// The tree-level half of a serializer.
#[derive(Debug)]
pub enum Codec {
    Canonical(CanonicalCodec),
    Configurable(ConfigurableCodec),
}

impl Codec {
    pub fn context(&self) -> &RmContext {
        match self {
            Codec::Canonical(codec) => codec.context(),
            Codec::Configurable(codec) => codec.context(),
        }
    }

    pub fn encode(&self, value: &dyn RmObject) -> std::result::Result<GenericNode, SerializationError> {
        match self {
            Codec::Canonical(codec) => codec.encode(value),
            Codec::Configurable(codec) => codec.encode(value),
        }
    }

    pub fn decode(&self, node: &GenericNode) -> std::result::Result<Box<dyn RmObject>, DeserializationError> {
        match self {
            Codec::Canonical(codec) => codec.decode(node),
            Codec::Configurable(codec) => codec.decode(node),
        }
    }

    /// Decodes a root of type `expected` or one of its subtypes.
    ///
    /// The canonical codec still requires the root tag; the result is checked
    /// against `expected` afterwards.
    pub fn decode_as_type(
        &self,
        node: &GenericNode,
        expected: &str,
    ) -> std::result::Result<Box<dyn RmObject>, DeserializationError> {
        match self {
            Codec::Canonical(codec) => {
                let object = codec.decode(node)?;
                let actual = object.rm_type_name();
                if codec.context().schema().is_subtype_of(actual, expected) {
                    Ok(object)
                } else {
                    Err(DeserializationError::UnexpectedNode {
                        expected: expected.to_string(),
                        found: actual.to_string(),
                    })
                }
            }
            Codec::Configurable(codec) => codec.decode_as_type(node, expected),
        }
    }

    pub fn decode_as<T: RmType>(&self, node: &GenericNode) -> std::result::Result<T, DeserializationError> {
        match self {
            Codec::Canonical(codec) => codec.decode_as(node),
            Codec::Configurable(codec) => codec.decode_as(node),
        }
    }

    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        match self {
            Codec::Canonical(_) => Ok(()),
            Codec::Configurable(codec) => codec.config().validate(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Codec::Canonical(_) => "canonical",
            Codec::Configurable(_) => "configurable",
        }
    }
}

impl From<CanonicalCodec> for Codec {
    fn from(codec: CanonicalCodec) -> Self {
        Codec::Canonical(codec)
    }
}

impl From<ConfigurableCodec> for Codec {
    fn from(codec: ConfigurableCodec) -> Self {
        Codec::Configurable(codec)
    }
}

/// The text-level half of a serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFormat {
    Json(JsonConfig),
    Xml(XmlConfig),
    Yaml(YamlConfig),
}

impl WireFormat {
    pub fn format(&self) -> Format {
        match self {
            WireFormat::Json(_) => Format::Json,
            WireFormat::Xml(_) => Format::Xml,
            WireFormat::Yaml(_) => Format::Yaml,
        }
    }

    pub fn render(&self, node: &GenericNode) -> std::result::Result<String, SerializationError> {
        match self {
            WireFormat::Json(config) => json::to_json_string(node, config),
            WireFormat::Xml(config) => xml::to_xml_string(node, config),
            WireFormat::Yaml(config) => Ok(yaml::to_yaml_string(node, config)),
        }
    }

    pub fn parse(&self, text: &str) -> std::result::Result<GenericNode, DeserializationError> {
        match self {
            WireFormat::Json(config) => json::from_json_str(text, config),
            WireFormat::Xml(_) => xml::from_xml_str(text),
            WireFormat::Yaml(config) => yaml::from_yaml_str(text, config),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        match self {
            WireFormat::Json(config) => config.validate(),
            WireFormat::Xml(config) => config.validate(),
            WireFormat::Yaml(config) => config.validate(),
        }
    }
}

/// Typed objects to text and back.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use helios_rm::{CodePhrase, DvCodedText};
/// use helios_rm_serde::{RmContext, RmSerde, TypeRegistry};
///
/// let registry = TypeRegistry::from_exports(helios_rm::exports()).unwrap();
/// let ctx = RmContext::new(registry, Arc::new(helios_rm::schema().clone()));
/// let serde = RmSerde::internal_json(ctx);
///
/// let text = DvCodedText::new("event", CodePhrase::new("openehr", "433"));
/// let json = serde.serialize(&text).unwrap();
/// assert_eq!(json, r#""openehr::433|event|""#);
/// assert_eq!(serde.deserialize_as::<DvCodedText>(&json).unwrap(), text);
/// ```
#[derive(Debug)]
pub struct RmSerde {
    codec: Codec,
    wire: WireFormat,
}

impl RmSerde {
    /// Pairs `codec` with `wire` after validating both configurations.
    pub fn new(codec: impl Into<Codec>, wire: WireFormat) -> Result<Self> {
        let codec = codec.into();
        let mut errors = Vec::new();
        if let Err(mut codec_errors) = codec.validate() {
            errors.append(&mut codec_errors);
        }
        if let Err(mut wire_errors) = wire.validate() {
            errors.append(&mut wire_errors);
        }
        if !errors.is_empty() {
            return Err(SerdeError::Config(errors));
        }
        Ok(Self { codec, wire })
    }

    fn preset(codec: impl Into<Codec>, wire: WireFormat) -> Self {
        Self {
            codec: codec.into(),
            wire,
        }
    }

    pub fn canonical_json(ctx: RmContext) -> Self {
        Self::preset(CanonicalCodec::new(ctx), WireFormat::Json(JsonConfig::pretty()))
    }

    pub fn compact_json(ctx: RmContext) -> Self {
        Self::preset(
            ConfigurableCodec::new(ctx, CodecConfig::compact()),
            WireFormat::Json(JsonConfig::default()),
        )
    }

    pub fn internal_json(ctx: RmContext) -> Self {
        Self::preset(
            ConfigurableCodec::new(ctx, CodecConfig::internal()),
            WireFormat::Json(JsonConfig::default()),
        )
    }

    pub fn canonical_xml(ctx: RmContext) -> Self {
        Self::preset(CanonicalCodec::new(ctx), WireFormat::Xml(XmlConfig::default()))
    }

    pub fn verbose_yaml(ctx: RmContext) -> Self {
        Self::preset(CanonicalCodec::new(ctx), WireFormat::Yaml(YamlConfig::verbose()))
    }

    pub fn hybrid_yaml(ctx: RmContext) -> Self {
        Self::preset(
            ConfigurableCodec::new(ctx, CodecConfig::hybrid()),
            WireFormat::Yaml(YamlConfig::hybrid()),
        )
    }

    pub fn flow_yaml(ctx: RmContext) -> Self {
        Self::preset(
            ConfigurableCodec::new(ctx, CodecConfig::compact()),
            WireFormat::Yaml(YamlConfig::flow()),
        )
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn wire_format(&self) -> &WireFormat {
        &self.wire
    }

    pub fn format(&self) -> Format {
        self.wire.format()
    }

    pub fn serialize(&self, value: &dyn RmObject) -> Result<String> {
        debug!(
            rm_type = value.rm_type_name(),
            codec = self.codec.name(),
            format = %self.format(),
            "serialize"
        );
        let node = self.to_node(value)?;
        Ok(self.wire.render(&node)?)
    }

    pub fn deserialize(&self, text: &str) -> Result<Box<dyn RmObject>> {
        debug!(codec = self.codec.name(), format = %self.format(), len = text.len(), "deserialize");
        let node = self.wire.parse(text)?;
        self.from_node(&node)
    }

    /// Deserializes a root known to be of type `expected` or a subtype.
    pub fn deserialize_as_type(&self, text: &str, expected: &str) -> Result<Box<dyn RmObject>> {
        debug!(expected, codec = self.codec.name(), format = %self.format(), "deserialize");
        let node = self.wire.parse(text)?;
        Ok(self.codec.decode_as_type(&node, expected)?)
    }

    pub fn deserialize_as<T: RmType>(&self, text: &str) -> Result<T> {
        debug!(
            expected = T::TYPE_DEF.name,
            codec = self.codec.name(),
            format = %self.format(),
            "deserialize"
        );
        let node = self.wire.parse(text)?;
        Ok(self.codec.decode_as(&node)?)
    }

    pub fn to_node(&self, value: &dyn RmObject) -> Result<GenericNode> {
        Ok(self.codec.encode(value)?)
    }

    pub fn from_node(&self, node: &GenericNode) -> Result<Box<dyn RmObject>> {
        Ok(self.codec.decode(node)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use helios_rm::{CodePhrase, DvText};

    use super::*;
    use crate::registry::TypeRegistry;

    fn ctx() -> RmContext {
        let registry = TypeRegistry::from_exports(helios_rm::exports()).unwrap();
        RmContext::new(registry, Arc::new(helios_rm::schema().clone()))
    }

    #[test]
    fn test_new_rejects_invalid_configuration() {
        let config = CodecConfig {
            use_terse_format: true,
            parse_terse_format: false,
            ..CodecConfig::default()
        };
        let wire = WireFormat::Yaml(YamlConfig {
            indent: 0,
            ..YamlConfig::default()
        });
        let err = RmSerde::new(ConfigurableCodec::new(ctx(), config), wire).unwrap_err();
        let SerdeError::Config(errors) = err else {
            panic!("expected a configuration error, got {err}");
        };
        assert_eq!(errors.len(), 2, "{errors:?}");
    }

    #[test]
    fn test_canonical_decode_as_type_checks_the_tag() {
        let serde = RmSerde::canonical_json(ctx());
        let json = serde.serialize(&CodePhrase::new("ISO_639-1", "en")).unwrap();

        let err = serde.deserialize_as_type(&json, "DATA_VALUE").unwrap_err();
        assert!(
            matches!(
                err,
                SerdeError::Deserialization(DeserializationError::UnexpectedNode { .. })
            ),
            "{err}"
        );
        assert!(serde.deserialize_as_type(&json, "CODE_PHRASE").is_ok());
    }

    #[test]
    fn test_preset_formats() {
        assert_eq!(RmSerde::canonical_xml(ctx()).format(), Format::Xml);
        assert_eq!(RmSerde::flow_yaml(ctx()).format(), Format::Yaml);

        let serde = RmSerde::flow_yaml(ctx());
        assert_eq!(
            serde.serialize(&DvText::new("hi")).unwrap(),
            "{_type: DV_TEXT, value: hi}\n"
        );
    }
}
