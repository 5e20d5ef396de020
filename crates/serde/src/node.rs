//! The format-agnostic value tree codecs produce and format adapters render.
//!
//! A [`GenericNode`] is owned by a single encode or decode call. Object field
//! order is preserved, and field names are unique; the type tag is kept apart
//! from the fields so that every format can place it where it belongs (a
//! reserved key in JSON and YAML, `xsi:type` in XML).

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;

use crate::error::excerpt;

/// Key carrying the type tag in JSON and YAML unless configured otherwise.
pub const DEFAULT_TAG_KEY: &str = "_type";

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    String(String),
    Number(Number),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub tag: Option<String>,
    pub fields: IndexMap<String, GenericNode>,
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            fields: IndexMap::new(),
        }
    }

    /// Builder form of [`ObjectNode::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<GenericNode>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field, returning the value it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<GenericNode>,
    ) -> Option<GenericNode> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&GenericNode> {
        self.fields.get(name)
    }

    /// A field holding a string primitive.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(GenericNode::as_str)
    }

    /// Number of rendered entries, the tag included.
    pub fn entry_count(&self) -> usize {
        self.fields.len() + usize::from(self.tag.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    pub fn excerpt(&self) -> String {
        GenericNode::Object(self.clone()).excerpt()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenericNode {
    Null,
    Primitive(Primitive),
    List(Vec<GenericNode>),
    Object(ObjectNode),
}

impl GenericNode {
    pub fn string(value: impl Into<String>) -> Self {
        GenericNode::Primitive(Primitive::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        GenericNode::Primitive(Primitive::Bool(value))
    }

    pub fn integer(value: i64) -> Self {
        GenericNode::Primitive(Primitive::Number(value.into()))
    }

    /// `None` for NaN and infinities.
    pub fn real(value: f64) -> Option<Self> {
        Number::from_f64(value).map(|n| GenericNode::Primitive(Primitive::Number(n)))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GenericNode::Primitive(Primitive::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            GenericNode::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[GenericNode]> {
        match self {
            GenericNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GenericNode::Null)
    }

    /// Shape name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            GenericNode::Null => "null",
            GenericNode::Primitive(Primitive::String(_)) => "string",
            GenericNode::Primitive(Primitive::Number(_)) => "number",
            GenericNode::Primitive(Primitive::Bool(_)) => "boolean",
            GenericNode::List(_) => "list",
            GenericNode::Object(_) => "object",
        }
    }

    /// Compact JSON rendering, shortened, for error messages.
    pub fn excerpt(&self) -> String {
        let tagged = TaggedNode::new(self, DEFAULT_TAG_KEY);
        match serde_json::to_string(&tagged) {
            Ok(json) => excerpt(&json),
            Err(_) => format!("<{}>", self.kind()),
        }
    }
}

impl From<ObjectNode> for GenericNode {
    fn from(object: ObjectNode) -> Self {
        GenericNode::Object(object)
    }
}

impl From<Primitive> for GenericNode {
    fn from(primitive: Primitive) -> Self {
        GenericNode::Primitive(primitive)
    }
}

impl From<&str> for GenericNode {
    fn from(value: &str) -> Self {
        GenericNode::string(value)
    }
}

impl From<String> for GenericNode {
    fn from(value: String) -> Self {
        GenericNode::string(value)
    }
}

impl From<bool> for GenericNode {
    fn from(value: bool) -> Self {
        GenericNode::bool(value)
    }
}

impl From<i64> for GenericNode {
    fn from(value: i64) -> Self {
        GenericNode::integer(value)
    }
}

impl From<Vec<GenericNode>> for GenericNode {
    fn from(items: Vec<GenericNode>) -> Self {
        GenericNode::List(items)
    }
}

/// Serializes a tree with the tag written first under `tag_key`.
pub struct TaggedNode<'a> {
    node: &'a GenericNode,
    tag_key: &'a str,
}

impl<'a> TaggedNode<'a> {
    pub fn new(node: &'a GenericNode, tag_key: &'a str) -> Self {
        Self { node, tag_key }
    }

    fn child(&self, node: &'a GenericNode) -> Self {
        Self::new(node, self.tag_key)
    }
}

impl Serialize for TaggedNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.node {
            GenericNode::Null => serializer.serialize_unit(),
            GenericNode::Primitive(Primitive::String(s)) => serializer.serialize_str(s),
            GenericNode::Primitive(Primitive::Number(n)) => n.serialize(serializer),
            GenericNode::Primitive(Primitive::Bool(b)) => serializer.serialize_bool(*b),
            GenericNode::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            GenericNode::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.entry_count()))?;
                if let Some(tag) = &object.tag {
                    map.serialize_entry(self.tag_key, tag)?;
                }
                for (name, value) in &object.fields {
                    if name == self.tag_key {
                        return Err(ser::Error::custom(format!(
                            "field '{name}' collides with the type tag key"
                        )));
                    }
                    map.serialize_entry(name, &self.child(value))?;
                }
                map.end()
            }
        }
    }
}

/// Deserializes any self-describing input into a tree, lifting the entry
/// named `tag_key` out of every map into [`ObjectNode::tag`].
///
/// Duplicate keys and non-string tags are rejected.
#[derive(Debug, Clone, Copy)]
pub struct NodeSeed<'a> {
    pub tag_key: &'a str,
}

impl<'a> NodeSeed<'a> {
    pub fn new(tag_key: &'a str) -> Self {
        Self { tag_key }
    }
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = GenericNode;

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed<'_> {
    type Value = GenericNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a null, string, number, boolean, sequence or map")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(GenericNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(GenericNode::Null)
    }

    fn visit_some<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(GenericNode::bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(GenericNode::Primitive(Primitive::Number(value.into())))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(GenericNode::Primitive(Primitive::Number(value.into())))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        GenericNode::real(value)
            .ok_or_else(|| E::custom(format!("non-finite number {value} is not supported")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(GenericNode::string(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(GenericNode::string(value))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self)? {
            items.push(item);
        }
        Ok(GenericNode::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut object = ObjectNode::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == self.tag_key {
                if object.tag.is_some() {
                    return Err(de::Error::custom(format!("duplicate key '{key}'")));
                }
                match map.next_value_seed(self)? {
                    GenericNode::Primitive(Primitive::String(tag)) => object.tag = Some(tag),
                    other => {
                        return Err(de::Error::custom(format!(
                            "type tag '{key}' must be a string, found {}",
                            other.kind()
                        )));
                    }
                }
                continue;
            }
            if object.fields.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key '{key}'")));
            }
            let value = map.next_value_seed(self)?;
            object.fields.insert(key, value);
        }
        Ok(GenericNode::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<GenericNode, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_str(json);
        NodeSeed::new(DEFAULT_TAG_KEY).deserialize(&mut de)
    }

    #[test]
    fn test_tag_is_lifted_and_order_kept() {
        let node = parse(r#"{"zeta": 1, "_type": "DV_TEXT", "alpha": [true, null]}"#).unwrap();
        let object = node.as_object().unwrap();
        assert_eq!(object.tag.as_deref(), Some("DV_TEXT"));
        let keys: Vec<_> = object.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(
            object.get("alpha"),
            Some(&GenericNode::List(vec![GenericNode::bool(true), GenericNode::Null]))
        );
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = parse(r#"{"value": "a", "value": "b"}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate key 'value'"));
        assert!(parse(r#"{"_type": "A", "_type": "B"}"#).is_err());
    }

    #[test]
    fn test_non_string_tag_rejected() {
        let err = parse(r#"{"_type": 5}"#).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_tag_serialized_first() {
        let node = GenericNode::from(
            ObjectNode::new()
                .with("value", "hi")
                .with("count", 3i64),
        );
        let mut object = node.as_object().cloned().unwrap();
        object.tag = Some("DV_TEXT".into());
        let json = serde_json::to_string(&TaggedNode::new(&object.into(), "@type")).unwrap();
        assert_eq!(json, r#"{"@type":"DV_TEXT","value":"hi","count":3}"#);
    }

    #[test]
    fn test_field_colliding_with_tag_key() {
        let node = GenericNode::from(ObjectNode::new().with("_type", "x"));
        assert!(serde_json::to_string(&TaggedNode::new(&node, DEFAULT_TAG_KEY)).is_err());
    }

    #[test]
    fn test_entry_count_includes_tag() {
        assert_eq!(ObjectNode::tagged("DV_TEXT").with("value", "x").entry_count(), 2);
        assert_eq!(ObjectNode::new().entry_count(), 0);
        assert!(GenericNode::real(f64::NAN).is_none());
    }
}
