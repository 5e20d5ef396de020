//! Tree to XML.
//!
//! Each field becomes a child element named after the field; list items are
//! repeated sibling elements. Tags are written as `xsi:type`, nulls as
//! `xsi:nil="true"` and the fields listed in
//! [`ATTRIBUTE_FIELDS`](super::utils::ATTRIBUTE_FIELDS) as attributes.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::config::XmlConfig;
use crate::error::SerializationError;
use crate::format::Format;
use crate::node::{GenericNode, ObjectNode, Primitive};
use crate::xml::utils;

/// Serialize a tree to an XML string.
///
/// # Examples
///
/// ```
/// use helios_rm_serde::xml::to_xml_string;
/// use helios_rm_serde::{GenericNode, ObjectNode, XmlConfig};
///
/// let node = GenericNode::from(ObjectNode::tagged("DV_TEXT").with("value", "hi"));
/// let xml = to_xml_string(&node, &XmlConfig::compact()).unwrap();
/// assert!(xml.starts_with("<dv_text "));
/// assert!(xml.contains(r#"xsi:type="DV_TEXT""#));
/// assert!(xml.ends_with("<value>hi</value></dv_text>"));
/// ```
pub fn to_xml_string(node: &GenericNode, config: &XmlConfig) -> Result<String, SerializationError> {
    let buffer = to_xml_vec(node, config)?;
    String::from_utf8(buffer).map_err(|err| SerializationError::render(Format::Xml, err))
}

/// Serialize a tree to an XML byte vector.
pub fn to_xml_vec(node: &GenericNode, config: &XmlConfig) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    to_xml_writer(node, config, &mut buffer)?;
    Ok(buffer)
}

/// Serialize a tree to an XML writer.
///
/// A primitive root, such as a terse `CODE_PHRASE`, becomes a text-only
/// element named by `root_element` or [`UNTYPED_ROOT`](utils::UNTYPED_ROOT).
pub fn to_xml_writer<W: Write>(node: &GenericNode, config: &XmlConfig, writer: W) -> Result<(), SerializationError> {
    if matches!(node, GenericNode::List(_) | GenericNode::Null) {
        return Err(unsupported_root(node));
    }

    let writer = if config.pretty_print {
        Writer::new_with_indent(writer, b' ', config.indent)
    } else {
        Writer::new(writer)
    };
    let mut serializer = XmlSerializer { writer, config };

    if config.include_declaration {
        serializer.write(Event::Decl(BytesDecl::new(
            &config.version,
            Some(&config.encoding),
            None,
        )))?;
    }

    match node {
        GenericNode::Object(root) => {
            let name = config
                .root_element
                .clone()
                .unwrap_or_else(|| utils::root_element_name(root.tag.as_deref()));
            serializer.write_object(&name, root, true)
        }
        GenericNode::Primitive(primitive) => {
            let name = config
                .root_element
                .clone()
                .unwrap_or_else(|| utils::UNTYPED_ROOT.to_string());
            serializer.write_text_root(&name, primitive)
        }
        GenericNode::List(_) | GenericNode::Null => Err(unsupported_root(node)),
    }
}

fn unsupported_root(node: &GenericNode) -> SerializationError {
    SerializationError::Unsupported {
        format: Format::Xml,
        reason: format!("a {} at the document root", node.kind()),
    }
}

struct XmlSerializer<'c, W: Write> {
    writer: Writer<W>,
    config: &'c XmlConfig,
}

impl<W: Write> XmlSerializer<'_, W> {
    fn write(&mut self, event: Event<'_>) -> Result<(), SerializationError> {
        self.writer
            .write_event(event)
            .map_err(|err| SerializationError::render(Format::Xml, err))
    }

    fn write_field(&mut self, name: &str, value: &GenericNode) -> Result<(), SerializationError> {
        match value {
            GenericNode::List(items) => {
                for item in items {
                    if matches!(item, GenericNode::List(_)) {
                        return Err(SerializationError::Unsupported {
                            format: Format::Xml,
                            reason: format!("a nested list in '{name}'"),
                        });
                    }
                    self.write_field(name, item)?;
                }
                Ok(())
            }
            GenericNode::Object(object) => self.write_object(name, object, false),
            GenericNode::Null => {
                let mut element = BytesStart::new(name);
                element.push_attribute((utils::XSI_NIL, "true"));
                self.write(Event::Empty(element))
            }
            GenericNode::Primitive(primitive) => {
                let text = primitive_text(primitive);
                if text.is_empty() {
                    return self.write(Event::Empty(BytesStart::new(name)));
                }
                self.write(Event::Start(BytesStart::new(name)))?;
                self.write(Event::Text(BytesText::new(&text)))?;
                self.write(Event::End(BytesEnd::new(name)))
            }
        }
    }

    fn write_text_root(&mut self, name: &str, primitive: &Primitive) -> Result<(), SerializationError> {
        let mut element = BytesStart::new(name);
        if self.config.use_namespaces {
            element.push_attribute(("xmlns", self.config.namespace.as_str()));
        }
        let text = primitive_text(primitive);
        if text.is_empty() {
            return self.write(Event::Empty(element));
        }
        self.write(Event::Start(element))?;
        self.write(Event::Text(BytesText::new(&text)))?;
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn write_object(&mut self, name: &str, object: &ObjectNode, root: bool) -> Result<(), SerializationError> {
        let mut element = BytesStart::new(name);
        if root && self.config.use_namespaces {
            element.push_attribute(("xmlns", self.config.namespace.as_str()));
            element.push_attribute(("xmlns:xsi", utils::XSI_NAMESPACE));
        }
        if let Some(tag) = &object.tag {
            element.push_attribute((utils::XSI_TYPE, tag.as_str()));
        }

        let mut children = Vec::with_capacity(object.fields.len());
        for (field, value) in &object.fields {
            match value.as_str() {
                Some(text) if utils::is_attribute_field(field) => {
                    element.push_attribute((field.as_str(), text));
                }
                _ => children.push((field, value)),
            }
        }

        if children.is_empty() {
            return self.write(Event::Empty(element));
        }
        self.write(Event::Start(element))?;
        for (field, value) in children {
            self.write_field(field, value)
                .map_err(|err| err.in_field(object.tag.as_deref().unwrap_or(name), field))?;
        }
        self.write(Event::End(BytesEnd::new(name)))
    }
}

fn primitive_text(primitive: &Primitive) -> String {
    match primitive {
        Primitive::String(value) => value.clone(),
        Primitive::Number(value) => value.to_string(),
        Primitive::Bool(value) => utils::bool_to_string(*value).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact() -> XmlConfig {
        XmlConfig {
            use_namespaces: false,
            ..XmlConfig::compact()
        }
    }

    #[test]
    fn test_attribute_fields_and_lists() {
        let node: GenericNode = ObjectNode::tagged("CLUSTER")
            .with("archetype_node_id", "at0001")
            .with(
                "items",
                vec![
                    ObjectNode::tagged("ELEMENT").with("archetype_node_id", "at0002").into(),
                    ObjectNode::tagged("ELEMENT").with("archetype_node_id", "at0003").into(),
                ],
            )
            .into();
        let xml = to_xml_string(&node, &compact()).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<cluster xsi:type="CLUSTER" archetype_node_id="at0001">"#,
                r#"<items xsi:type="ELEMENT" archetype_node_id="at0002"/>"#,
                r#"<items xsi:type="ELEMENT" archetype_node_id="at0003"/>"#,
                "</cluster>"
            )
        );
    }

    #[test]
    fn test_text_is_escaped_and_nulls_marked() {
        let node: GenericNode = ObjectNode::new()
            .with("value", "a < b & c")
            .with("null_flavour", GenericNode::Null)
            .into();
        let xml = to_xml_string(&node, &compact()).unwrap();
        assert_eq!(
            xml,
            r#"<object><value>a &lt; b &amp; c</value><null_flavour xsi:nil="true"/></object>"#
        );
    }

    #[test]
    fn test_declaration_namespaces_and_root_override() {
        let config = XmlConfig {
            pretty_print: false,
            root_element: Some("record".into()),
            ..XmlConfig::default()
        };
        let node: GenericNode = ObjectNode::tagged("DV_COUNT").with("magnitude", 3i64).into();
        let xml = to_xml_string(&node, &config).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<record xmlns="http://schemas.openehr.org/v1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="DV_COUNT">"#));
        assert!(xml.ends_with("<magnitude>3</magnitude></record>"));
    }

    #[test]
    fn test_terse_root_is_a_text_element() {
        let node = GenericNode::string("openehr::433|event|");
        let xml = to_xml_string(&node, &compact()).unwrap();
        assert_eq!(xml, "<object>openehr::433|event|</object>");
        assert_eq!(crate::xml::from_xml_str(&xml).unwrap(), node);

        let config = XmlConfig {
            root_element: Some("code".into()),
            ..XmlConfig::default()
        };
        let xml = to_xml_string(&GenericNode::string("ISO_639-1::en"), &config).unwrap();
        assert!(xml.ends_with(r#"<code xmlns="http://schemas.openehr.org/v1">ISO_639-1::en</code>"#), "{xml}");
        assert_eq!(
            crate::xml::from_xml_str(&xml).unwrap(),
            GenericNode::string("ISO_639-1::en")
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        let err = to_xml_string(&GenericNode::List(vec![]), &compact()).unwrap_err();
        assert!(matches!(err, SerializationError::Unsupported { format: Format::Xml, .. }));
        let err = to_xml_string(&GenericNode::Null, &compact()).unwrap_err();
        assert!(matches!(err, SerializationError::Unsupported { format: Format::Xml, .. }));

        let nested: GenericNode = ObjectNode::tagged("X")
            .with("items", vec![GenericNode::List(vec![])])
            .into();
        let err = to_xml_string(&nested, &compact()).unwrap_err();
        assert!(err.to_string().contains("nested list"));
    }
}
