//! JSON adapter for the generic tree.
//!
//! Thin wrappers around `serde_json`. The type tag is written as the first
//! key of every tagged object, under [`JsonConfig::type_property_name`].
//! Duplicate keys are rejected on read, and key order is kept both ways.

use serde::de::DeserializeSeed;
use serde::ser::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::config::JsonConfig;
use crate::error::{DeserializationError, SerializationError};
use crate::format::Format;
use crate::node::{GenericNode, NodeSeed, TaggedNode};

/// Writes a tree as JSON text.
///
/// # Examples
///
/// ```
/// use helios_rm_serde::json::to_json_string;
/// use helios_rm_serde::{GenericNode, JsonConfig, ObjectNode};
///
/// let node = GenericNode::from(ObjectNode::tagged("DV_TEXT").with("value", "hi"));
/// let json = to_json_string(&node, &JsonConfig::default()).unwrap();
/// assert_eq!(json, r#"{"_type":"DV_TEXT","value":"hi"}"#);
/// ```
pub fn to_json_string(node: &GenericNode, config: &JsonConfig) -> Result<String, SerializationError> {
    let bytes = to_json_vec(node, config)?;
    String::from_utf8(bytes).map_err(|err| SerializationError::render(Format::Json, err))
}

/// Writes a tree as JSON bytes.
pub fn to_json_vec(node: &GenericNode, config: &JsonConfig) -> Result<Vec<u8>, SerializationError> {
    let tagged = TaggedNode::new(node, &config.type_property_name);
    let mut out = Vec::with_capacity(128);
    if config.pretty_print {
        let indent = " ".repeat(config.indent);
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = Serializer::with_formatter(&mut out, formatter);
        tagged
            .serialize(&mut serializer)
            .map_err(|err| SerializationError::render(Format::Json, err))?;
    } else {
        let mut serializer = Serializer::new(&mut out);
        tagged
            .serialize(&mut serializer)
            .map_err(|err| SerializationError::render(Format::Json, err))?;
    }
    Ok(out)
}

/// Converts a tree to a `serde_json::Value`, tag included.
pub fn to_json_value(node: &GenericNode, config: &JsonConfig) -> Result<serde_json::Value, SerializationError> {
    serde_json::to_value(TaggedNode::new(node, &config.type_property_name))
        .map_err(|err| SerializationError::render(Format::Json, err))
}

/// Reads JSON text into a tree.
///
/// # Examples
///
/// ```
/// use helios_rm_serde::json::from_json_str;
/// use helios_rm_serde::JsonConfig;
///
/// let node = from_json_str(r#"{"_type": "DV_TEXT", "value": "hi"}"#, &JsonConfig::default()).unwrap();
/// let object = node.as_object().unwrap();
/// assert_eq!(object.tag.as_deref(), Some("DV_TEXT"));
/// assert_eq!(object.get_str("value"), Some("hi"));
/// ```
pub fn from_json_str(text: &str, config: &JsonConfig) -> Result<GenericNode, DeserializationError> {
    let mut de = serde_json::Deserializer::from_str(text);
    let node = NodeSeed::new(&config.type_property_name)
        .deserialize(&mut de)
        .map_err(|err| DeserializationError::malformed(Format::Json, text, err))?;
    de.end()
        .map_err(|err| DeserializationError::malformed(Format::Json, text, err))?;
    Ok(node)
}

/// Reads JSON bytes into a tree.
pub fn from_json_slice(bytes: &[u8], config: &JsonConfig) -> Result<GenericNode, DeserializationError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let lossy = || String::from_utf8_lossy(bytes).into_owned();
    let node = NodeSeed::new(&config.type_property_name)
        .deserialize(&mut de)
        .map_err(|err| DeserializationError::malformed(Format::Json, &lossy(), err))?;
    de.end()
        .map_err(|err| DeserializationError::malformed(Format::Json, &lossy(), err))?;
    Ok(node)
}

/// Converts a `serde_json::Value` into a tree.
pub fn from_json_value(value: &serde_json::Value, config: &JsonConfig) -> Result<GenericNode, DeserializationError> {
    NodeSeed::new(&config.type_property_name)
        .deserialize(value)
        .map_err(|err| DeserializationError::malformed(Format::Json, &value.to_string(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ObjectNode;

    fn sample() -> GenericNode {
        ObjectNode::tagged("ELEMENT")
            .with("archetype_node_id", "at0004")
            .with(
                "value",
                ObjectNode::tagged("DV_QUANTITY")
                    .with("magnitude", GenericNode::real(72.5).unwrap())
                    .with("units", "/min"),
            )
            .into()
    }

    #[test]
    fn test_pretty_print_uses_configured_indent() {
        let config = JsonConfig {
            pretty_print: true,
            indent: 4,
            ..JsonConfig::default()
        };
        let json = to_json_string(&sample(), &config).unwrap();
        assert!(json.starts_with("{\n    \"_type\": \"ELEMENT\""));
        assert!(json.contains("\n        \"magnitude\": 72.5"));
    }

    #[test]
    fn test_custom_tag_key_round_trip() {
        let config = JsonConfig {
            type_property_name: "@type".to_string(),
            ..JsonConfig::default()
        };
        let json = to_json_string(&sample(), &config).unwrap();
        assert!(json.starts_with(r#"{"@type":"ELEMENT""#));
        assert_eq!(from_json_str(&json, &config).unwrap(), sample());
    }

    #[test]
    fn test_value_and_slice_entry_points_agree() {
        let config = JsonConfig::default();
        let value = to_json_value(&sample(), &config).unwrap();
        assert_eq!(value["value"]["_type"], "DV_QUANTITY");
        assert_eq!(from_json_value(&value, &config).unwrap(), sample());

        let bytes = to_json_vec(&sample(), &config).unwrap();
        assert_eq!(from_json_slice(&bytes, &config).unwrap(), sample());
    }

    #[test]
    fn test_malformed_input() {
        let config = JsonConfig::default();
        for text in [r#"{"value": }"#, r#"{"a": 1} trailing"#, r#"{"a": 1, "a": 2}"#] {
            let err = from_json_str(text, &config).unwrap_err();
            assert!(
                matches!(err, DeserializationError::Malformed { format: Format::Json, .. }),
                "{text}: {err}"
            );
        }
    }
}
