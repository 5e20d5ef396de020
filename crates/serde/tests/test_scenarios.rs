//! Reference behaviours of the codecs on small inputs.

mod common;

use helios_rm::support::RmObject;
use helios_rm::{CodePhrase, DvCodedText, DvCount, DvText, Element, Item, ItemTree};
use helios_rm_serde::{
    CanonicalCodec, CodecConfig, ConfigurableCodec, DeserializationError, GenericNode,
    JsonConfig, ObjectNode, RmSerde, SerdeError, WireFormat, YamlConfig, from_json_str,
    to_yaml_string,
};

use common::{code, context};

fn terse() -> ConfigurableCodec {
    ConfigurableCodec::new(context(), CodecConfig::internal())
}

#[test]
fn test_code_phrase_encodes_terse() {
    let node = terse().encode(&code("ISO_639-1", "en")).unwrap();
    assert_eq!(node, GenericNode::string("ISO_639-1::en"));

    let json = RmSerde::internal_json(context())
        .serialize(&code("ISO_639-1", "en"))
        .unwrap();
    assert_eq!(json, r#""ISO_639-1::en""#);
}

#[test]
fn test_coded_text_encodes_terse() {
    let value = DvCodedText::new("event", CodePhrase::new("openehr", "433"));
    let node = terse().encode(&value).unwrap();
    assert_eq!(node, GenericNode::string("openehr::433|event|"));

    let decoded: DvCodedText = terse().decode_as(&node).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_terse_versioned_terminology() {
    let value = code("SNOMED-CT(2003)", "75367002");
    let node = terse().encode(&value).unwrap();
    assert_eq!(node, GenericNode::string("SNOMED-CT::2003::75367002"));
    assert_eq!(terse().decode_as::<CodePhrase>(&node).unwrap(), value);
}

#[test]
fn test_strict_decode_of_tagged_text() {
    let node = from_json_str(r#"{"_type":"DV_TEXT","value":"hi"}"#, &JsonConfig::default()).unwrap();
    let object = CanonicalCodec::new(context()).decode(&node).unwrap();

    assert_eq!(object.rm_type_name(), "DV_TEXT");
    let text = object.as_any().downcast_ref::<DvText>().unwrap();
    assert_eq!(text.value, "hi");
}

#[test]
fn test_strict_decode_of_unknown_type() {
    let err = RmSerde::canonical_json(context())
        .deserialize(r#"{"_type":"UNKNOWN_TYPE","value":"x"}"#)
        .unwrap_err();

    let SerdeError::Deserialization(err) = err else {
        panic!("expected a deserialization error, got {err}");
    };
    let missing = err.type_not_found().expect("type not found");
    assert_eq!(missing.type_name, "UNKNOWN_TYPE");
    assert!(err.to_string().contains("UNKNOWN_TYPE"));
}

#[test]
fn test_unknown_type_nested_in_a_field() {
    let json = r#"{"_type":"ELEMENT","archetype_node_id":"at0001",
        "name":{"_type":"DV_TEXT","value":"n"},
        "value":{"_type":"DV_SPARKLE","value":"x"}}"#;
    let err = RmSerde::compact_json(context())
        .deserialize_as::<Element>(json)
        .unwrap_err();
    let SerdeError::Deserialization(err) = err else {
        panic!("expected a deserialization error, got {err}");
    };
    assert_eq!(err.type_not_found().unwrap().type_name, "DV_SPARKLE");
    assert_eq!(err.field_path(), vec!["value"]);
}

#[test]
fn test_hybrid_yaml_threshold() {
    let node: GenericNode = ObjectNode::new()
        .with("name", ObjectNode::new().with("value", "Vital Signs"))
        .with(
            "data",
            ObjectNode::tagged("ITEM_TREE").with(
                "items",
                vec![
                    ObjectNode::tagged("ELEMENT")
                        .with("archetype_node_id", "at0004")
                        .into(),
                ],
            ),
        )
        .into();
    let yaml = to_yaml_string(&node, &YamlConfig::hybrid().with_max_inline_properties(2));
    assert_eq!(
        yaml,
        concat!(
            "name: {value: Vital Signs}\n",
            "data:\n",
            "  _type: ITEM_TREE\n",
            "  items:\n",
            "    - {_type: ELEMENT, archetype_node_id: at0004}\n",
        )
    );
}

#[test]
fn test_hybrid_yaml_of_an_item_tree() {
    let tree = ItemTree {
        name: "Vital Signs".into(),
        archetype_node_id: "at0003".into(),
        items: vec![Item::Element(
            Element::new("at0004", "Pulse").with_value(DvCount {
                magnitude: 72,
                magnitude_status: None,
            }),
        )],
        ..Default::default()
    };
    let expected = concat!(
        "_type: ITEM_TREE\n",
        "name: {_type: DV_TEXT, value: Vital Signs}\n",
        "archetype_node_id: at0003\n",
        "items:\n",
        "  - _type: ELEMENT\n",
        "    name: {_type: DV_TEXT, value: Pulse}\n",
        "    archetype_node_id: at0004\n",
        "    value: {_type: DV_COUNT, magnitude: 72}\n",
    );

    let preset = RmSerde::hybrid_yaml(context());
    assert_eq!(preset.serialize(&tree).unwrap(), expected);

    let two = RmSerde::new(
        ConfigurableCodec::new(context(), CodecConfig::hybrid()),
        WireFormat::Yaml(YamlConfig::hybrid().with_max_inline_properties(2)),
    )
    .unwrap();
    let yaml = two.serialize(&tree).unwrap();
    assert_eq!(yaml, expected);
    assert_eq!(two.deserialize_as::<ItemTree>(&yaml).unwrap(), tree);
}

#[test]
fn test_terse_mismatch_and_invalid_terse() {
    let codec = ConfigurableCodec::new(context(), CodecConfig::compact());

    let err = codec
        .decode_as_type(&GenericNode::string("plain words"), "CODE_PHRASE")
        .unwrap_err();
    assert!(matches!(err, DeserializationError::TerseMismatch { .. }), "{err}");

    let err = codec
        .decode_as_type(&GenericNode::string("a::b::c::d"), "CODE_PHRASE")
        .unwrap_err();
    let invalid = err.invalid_format().expect("invalid terse content");
    assert_eq!(invalid.input, "a::b::c::d");
    assert_eq!(invalid.grammar, "terminology::code");
}
