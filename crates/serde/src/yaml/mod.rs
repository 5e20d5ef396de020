//! YAML adapter for the generic tree.
//!
//! Three presentations of the same tree:
//!
//! - **Block**: nested block mappings and sequences.
//! - **Flow**: the whole document on one line, `{key: value, ...}`.
//! - **Hybrid**: objects with at most
//!   [`max_inline_properties`](crate::YamlConfig::max_inline_properties)
//!   entries (tag included) and no structured children are written inline,
//!   lists of scalars too; everything else as blocks.
//!
//! All three read back to the same tree. Reading accepts any single YAML
//! document regardless of how it was written.
//!
//! ```
//! use helios_rm_serde::yaml::{from_yaml_str, to_yaml_string};
//! use helios_rm_serde::{GenericNode, ObjectNode, YamlConfig};
//!
//! let node = GenericNode::from(
//!     ObjectNode::new()
//!         .with("name", ObjectNode::tagged("DV_TEXT").with("value", "Vital Signs"))
//!         .with("items", vec![GenericNode::from("a")]),
//! );
//! let config = YamlConfig::hybrid().with_max_inline_properties(2);
//! let yaml = to_yaml_string(&node, &config);
//! assert_eq!(yaml, "name: {_type: DV_TEXT, value: Vital Signs}\nitems: [a]\n");
//! assert_eq!(from_yaml_str(&yaml, &config).unwrap(), node);
//! ```

mod render;

use serde::de::DeserializeSeed;

use crate::config::YamlConfig;
use crate::error::DeserializationError;
use crate::format::Format;
use crate::node::{GenericNode, NodeSeed};

pub use render::render;

/// Writes a tree as YAML text.
pub fn to_yaml_string(node: &GenericNode, config: &YamlConfig) -> String {
    render(node, config)
}

/// Reads a single YAML document into a tree.
pub fn from_yaml_str(text: &str, config: &YamlConfig) -> Result<GenericNode, DeserializationError> {
    let de = serde_yaml::Deserializer::from_str(text);
    NodeSeed::new(&config.type_property_name)
        .deserialize(de)
        .map_err(|err| DeserializationError::malformed(Format::Yaml, text, err))
}

/// Reads YAML bytes into a tree.
pub fn from_yaml_slice(bytes: &[u8], config: &YamlConfig) -> Result<GenericNode, DeserializationError> {
    let de = serde_yaml::Deserializer::from_slice(bytes);
    NodeSeed::new(&config.type_property_name)
        .deserialize(de)
        .map_err(|err| {
            DeserializationError::malformed(Format::Yaml, &String::from_utf8_lossy(bytes), err)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ObjectNode;

    fn sample() -> GenericNode {
        ObjectNode::tagged("OBSERVATION")
            .with("archetype_node_id", "openEHR-EHR-OBSERVATION.pulse.v1")
            .with("language", "ISO_639-1::en")
            .with("name", ObjectNode::tagged("DV_TEXT").with("value", "Pulse: rate"))
            .with(
                "items",
                vec![
                    ObjectNode::tagged("DV_COUNT").with("magnitude", 3i64).into(),
                    ObjectNode::tagged("DV_QUANTITY")
                        .with("magnitude", GenericNode::real(72.0).unwrap())
                        .with("units", "/min")
                        .with("precision", GenericNode::Null)
                        .into(),
                    GenericNode::bool(true),
                    GenericNode::string("12"),
                    GenericNode::string(""),
                    GenericNode::string("x\u{7f}y"),
                    GenericNode::string("x\u{85}y"),
                    GenericNode::string("a\u{2028}b\u{2029}c"),
                    GenericNode::string("tab\there\u{0}\u{1b}"),
                ],
            )
            .with("empty", GenericNode::List(vec![]))
            .with("nothing", ObjectNode::new())
            .into()
    }

    #[test]
    fn test_every_style_reads_back_the_same_tree() {
        for config in [
            YamlConfig::block(),
            YamlConfig::flow(),
            YamlConfig::hybrid(),
            YamlConfig::hybrid().with_max_inline_properties(1),
            YamlConfig { indent: 4, ..YamlConfig::block() },
        ] {
            let yaml = to_yaml_string(&sample(), &config);
            let parsed = from_yaml_str(&yaml, &config).unwrap_or_else(|err| panic!("{err}\n{yaml}"));
            assert_eq!(parsed, sample(), "{:?}\n{yaml}", config.style);
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let config = YamlConfig::default();
        for text in ["a: [1, 2", "a: 1\na: 2\n", "_type: [X]\n", "a: .nan\n", "--- 1\n--- 2\n"] {
            let err = from_yaml_str(text, &config).unwrap_err();
            assert!(
                matches!(err, DeserializationError::Malformed { format: Format::Yaml, .. }),
                "{text:?}: {err}"
            );
        }
    }
}
