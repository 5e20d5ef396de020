//! XML to tree.
//!
//! The inverse of [`ser`](super::ser): `xsi:type` becomes the tag,
//! `xsi:nil="true"` a null, repeated sibling elements a list, and every
//! other attribute a string field. An element with neither children,
//! attributes nor a tag is a string primitive, empty when the element is.
//!
//! Text is kept exactly as written inside leaf elements. Whitespace between
//! child elements is ignored; any other text next to child elements is mixed
//! content and rejected.

use std::borrow::Cow;

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::DeserializationError;
use crate::format::Format;
use crate::node::{GenericNode, ObjectNode, Primitive};
use crate::xml::utils;

/// Deserialize a tree from an XML string.
///
/// # Examples
///
/// ```
/// use helios_rm_serde::xml::from_xml_str;
///
/// let xml = r#"<?xml version="1.0"?>
/// <dv_text xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="DV_TEXT">
///   <value>hi</value>
/// </dv_text>"#;
/// let node = from_xml_str(xml).unwrap();
/// let object = node.as_object().unwrap();
/// assert_eq!(object.tag.as_deref(), Some("DV_TEXT"));
/// assert_eq!(object.get_str("value"), Some("hi"));
/// ```
pub fn from_xml_str(xml: &str) -> Result<GenericNode, DeserializationError> {
    XmlDeserializer::new(xml).parse_document()
}

/// Deserialize a tree from XML bytes.
pub fn from_xml_slice(xml: &[u8]) -> Result<GenericNode, DeserializationError> {
    let text = std::str::from_utf8(xml).map_err(|err| {
        DeserializationError::malformed(Format::Xml, &String::from_utf8_lossy(xml), err)
    })?;
    from_xml_str(text)
}

/// An element being read.
#[derive(Debug, Default)]
struct Frame {
    name: String,
    tag: Option<String>,
    nil: bool,
    attributes: Vec<(String, String)>,
    children: IndexMap<String, Vec<GenericNode>>,
    text: String,
    /// Escaped text not yet resolved into `text`.
    pending: String,
}

impl Frame {
    fn flush_text(&mut self) -> Result<(), String> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let resolved = unescape(&self.pending).map_err(|err| format!("in <{}>: {err}", self.name))?;
        self.text.push_str(&resolved);
        self.pending.clear();
        Ok(())
    }

    fn finish(mut self) -> Result<(String, GenericNode), String> {
        self.flush_text()?;
        if self.nil {
            return Ok((self.name, GenericNode::Null));
        }
        if self.children.is_empty() && self.attributes.is_empty() && self.tag.is_none() {
            return Ok((self.name, GenericNode::string(self.text)));
        }
        if !self.text.trim().is_empty() {
            return Err(format!(
                "element <{}> mixes text '{}' with child elements or attributes",
                self.name,
                self.text.trim()
            ));
        }

        let mut object = ObjectNode {
            tag: self.tag,
            fields: IndexMap::with_capacity(self.attributes.len() + self.children.len()),
        };
        for (name, value) in self.attributes {
            object.insert(name, value);
        }
        for (name, mut values) in self.children {
            if object.fields.contains_key(&name) {
                return Err(format!(
                    "'{name}' appears both as attribute and element of <{}>",
                    self.name
                ));
            }
            let value = match values.len() {
                1 => values.remove(0),
                _ => GenericNode::List(values),
            };
            object.insert(name, value);
        }
        Ok((self.name, GenericNode::Object(object)))
    }
}

struct XmlDeserializer<'a> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
    stack: Vec<Frame>,
}

impl<'a> XmlDeserializer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            reader: Reader::from_str(input),
            stack: Vec::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> DeserializationError {
        DeserializationError::structure(Format::Xml, self.input, message)
    }

    fn parse_document(mut self) -> Result<GenericNode, DeserializationError> {
        let mut root: Option<(String, GenericNode)> = None;

        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|err| DeserializationError::malformed(Format::Xml, self.input, err))?;

            match event {
                Event::Start(start) => {
                    self.ensure_single_root(&root)?;
                    let frame = self.open(&start)?;
                    self.stack.push(frame);
                }
                Event::Empty(start) => {
                    self.ensure_single_root(&root)?;
                    let frame = self.open(&start)?;
                    self.close(frame, &mut root)?;
                }
                Event::End(end) => {
                    let frame = self
                        .stack
                        .pop()
                        .ok_or_else(|| self.error("closing tag without an open element"))?;
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if name != frame.name {
                        return Err(self.error(format!(
                            "expected </{}>, found </{name}>",
                            frame.name
                        )));
                    }
                    self.close(frame, &mut root)?;
                }
                Event::Text(text) => {
                    let raw = String::from_utf8_lossy(text.as_ref());
                    self.push_text(raw, false)?;
                }
                Event::GeneralRef(reference) => {
                    let name = String::from_utf8_lossy(&reference);
                    self.push_text(Cow::Owned(format!("&{name};")), false)?;
                }
                Event::CData(cdata) => {
                    let raw = String::from_utf8_lossy(&cdata);
                    self.push_text(raw, true)?;
                }
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(self.error(format!("unexpected end of input inside <{}>", open.name)));
        }
        let (name, node) = root.ok_or_else(|| self.error("document has no root element"))?;

        match node {
            GenericNode::Object(mut object) => {
                if object.tag.is_none() {
                    object.tag = utils::tag_from_root_name(&name);
                }
                Ok(GenericNode::Object(object))
            }
            GenericNode::Primitive(Primitive::String(text)) if text.trim().is_empty() => {
                // `<dv_text/>`: a root with nothing but its name.
                let tag = utils::tag_from_root_name(&name);
                Ok(GenericNode::Object(ObjectNode { tag, ..ObjectNode::default() }))
            }
            other => Ok(other),
        }
    }

    fn ensure_single_root(&self, root: &Option<(String, GenericNode)>) -> Result<(), DeserializationError> {
        match root {
            Some((name, _)) if self.stack.is_empty() => Err(self.error(format!(
                "content after the root element <{name}>"
            ))),
            _ => Ok(()),
        }
    }

    fn open(&self, start: &BytesStart<'_>) -> Result<Frame, DeserializationError> {
        let mut frame = Frame {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Frame::default()
        };

        for attr in start.attributes() {
            let attr = attr.map_err(|err| DeserializationError::malformed(Format::Xml, self.input, err))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw)
                .map_err(|err| DeserializationError::malformed(Format::Xml, self.input, err))?
                .into_owned();

            match key.as_str() {
                utils::XSI_TYPE => frame.tag = Some(value),
                utils::XSI_NIL => frame.nil = value == "true" || value == "1",
                k if utils::is_namespace_attribute(k) || utils::is_xsi_attribute(k) => {}
                _ => frame.attributes.push((key, value)),
            }
        }
        Ok(frame)
    }

    fn close(&mut self, frame: Frame, root: &mut Option<(String, GenericNode)>) -> Result<(), DeserializationError> {
        let (name, node) = frame.finish().map_err(|message| self.error(message))?;
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.entry(name).or_default().push(node);
                Ok(())
            }
            None => {
                *root = Some((name, node));
                Ok(())
            }
        }
    }

    fn push_text(&mut self, raw: Cow<'_, str>, literal: bool) -> Result<(), DeserializationError> {
        let Some(frame) = self.stack.last_mut() else {
            if raw.trim().is_empty() {
                return Ok(());
            }
            return Err(self.error(format!("text '{}' outside the root element", raw.trim())));
        };
        if literal {
            let flushed = frame.flush_text();
            flushed.map_err(|message| self.error(message))?;
            if let Some(frame) = self.stack.last_mut() {
                frame.text.push_str(&raw);
            }
        } else {
            frame.pending.push_str(&raw);
        }
        Ok(())
    }
}
