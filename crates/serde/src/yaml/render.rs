//! YAML text from a tree.
//!
//! Rendering depends only on the tree and the presentation settings, never
//! on what the tree means, so a style change cannot affect what is read back.

use std::fmt::Write;

use crate::config::{YamlConfig, YamlStyle};
use crate::node::{GenericNode, ObjectNode, Primitive};

/// Renders `node` as a YAML document ending in a newline.
pub fn render(node: &GenericNode, config: &YamlConfig) -> String {
    let renderer = Renderer {
        config,
        unit: " ".repeat(config.indent),
    };
    let mut out = String::new();
    if renderer.inline(node) {
        renderer.flow(node, &mut out);
        out.push('\n');
    } else {
        renderer.block(node, "", &mut out);
    }
    out
}

struct Renderer<'c> {
    config: &'c YamlConfig,
    /// One level of block indentation.
    unit: String,
}

impl Renderer<'_> {
    /// Whether `node` is written on a single line.
    fn inline(&self, node: &GenericNode) -> bool {
        match node {
            GenericNode::Null | GenericNode::Primitive(_) => true,
            GenericNode::List(items) if items.is_empty() => true,
            GenericNode::Object(object) if object.is_empty() => true,
            _ => match self.config.style {
                YamlStyle::Flow => true,
                YamlStyle::Block => false,
                YamlStyle::Hybrid => self.hybrid_inline(node),
            },
        }
    }

    /// Small objects without structured children, and lists of scalars.
    fn hybrid_inline(&self, node: &GenericNode) -> bool {
        match node {
            GenericNode::List(items) => items
                .iter()
                .all(|item| matches!(item, GenericNode::Null | GenericNode::Primitive(_))),
            GenericNode::Object(object) => {
                object.entry_count() <= self.config.max_inline_properties
                    && object.fields.values().all(|value| match value {
                        GenericNode::Object(child) => child.entry_count() <= 1,
                        GenericNode::List(items) => items.is_empty(),
                        _ => true,
                    })
            }
            _ => true,
        }
    }

    fn flow(&self, node: &GenericNode, out: &mut String) {
        match node {
            GenericNode::Null => out.push_str("null"),
            GenericNode::Primitive(primitive) => scalar(primitive, out),
            GenericNode::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.flow(item, out);
                }
                out.push(']');
            }
            GenericNode::Object(object) => {
                out.push('{');
                for (i, (key, value)) in self.entries(object).enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    string_scalar(key, out);
                    out.push_str(": ");
                    match value {
                        EntryValue::Tag(tag) => string_scalar(tag, out),
                        EntryValue::Node(node) => self.flow(node, out),
                    }
                }
                out.push('}');
            }
        }
    }

    /// Writes a non-inline node as lines indented by `pad`.
    fn block(&self, node: &GenericNode, pad: &str, out: &mut String) {
        match node {
            GenericNode::Object(object) => {
                for (key, value) in self.entries(object) {
                    out.push_str(pad);
                    string_scalar(key, out);
                    out.push(':');
                    match value {
                        EntryValue::Tag(tag) => {
                            out.push(' ');
                            string_scalar(tag, out);
                            out.push('\n');
                        }
                        EntryValue::Node(node) => self.block_value(node, pad, out),
                    }
                }
            }
            GenericNode::List(items) => {
                for item in items {
                    if self.inline(item) {
                        out.push_str(pad);
                        out.push_str("- ");
                        self.flow(item, out);
                        out.push('\n');
                    } else {
                        // Render the item two columns in, then put the dash
                        // in front of its first line.
                        let item_pad = format!("{pad}  ");
                        let mut nested = String::new();
                        self.block(item, &item_pad, &mut nested);
                        out.push_str(pad);
                        out.push_str("- ");
                        out.push_str(&nested[item_pad.len()..]);
                    }
                }
            }
            scalar_node => {
                out.push_str(pad);
                self.flow(scalar_node, out);
                out.push('\n');
            }
        }
    }

    /// The part after `key:` for a value under a mapping indented by `pad`.
    fn block_value(&self, value: &GenericNode, pad: &str, out: &mut String) {
        if self.inline(value) {
            out.push(' ');
            self.flow(value, out);
            out.push('\n');
        } else {
            out.push('\n');
            let child_pad = format!("{pad}{}", self.unit);
            self.block(value, &child_pad, out);
        }
    }

    /// The tag entry first, then the fields.
    fn entries<'n>(&'n self, object: &'n ObjectNode) -> impl Iterator<Item = (&'n str, EntryValue<'n>)> + 'n {
        let tag = object
            .tag
            .as_deref()
            .map(|tag| (self.config.type_property_name.as_str(), EntryValue::Tag(tag)));
        tag.into_iter().chain(
            object
                .fields
                .iter()
                .map(|(key, value)| (key.as_str(), EntryValue::Node(value))),
        )
    }
}

/// A mapping entry value: the tag string or a field node.
#[derive(Clone, Copy)]
enum EntryValue<'n> {
    Tag(&'n str),
    Node(&'n GenericNode),
}

fn scalar(primitive: &Primitive, out: &mut String) {
    match primitive {
        Primitive::String(value) => string_scalar(value, out),
        Primitive::Number(value) => out.push_str(&value.to_string()),
        Primitive::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
    }
}

/// Plain when the YAML parser reads the text back as the same string in
/// both block and flow context; double-quoted otherwise.
fn string_scalar(value: &str, out: &mut String) {
    if is_plain_safe(value) {
        out.push_str(value);
    } else {
        double_quoted(value, out);
    }
}

/// A YAML double-quoted scalar. Line breaks YAML would fold (`\u{85}`,
/// `\u{2028}`, `\u{2029}`) and characters outside the printable set are
/// escaped.
fn double_quoted(value: &str, out: &mut String) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\u{1b}' => out.push_str("\\e"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if needs_escape(c) && u32::from(c) <= 0xFF => {
                let _ = write!(out, "\\x{:02X}", u32::from(c));
            }
            c if needs_escape(c) => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Characters YAML forbids unescaped, or would read as a line break.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}')
}

fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if first.is_whitespace() || value.ends_with(char::is_whitespace) {
        return false;
    }
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if value
        .chars()
        .any(|c| needs_escape(c) || matches!(c, ':' | '#' | ',' | '[' | ']' | '{' | '}'))
    {
        return false;
    }
    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(value),
        Ok(serde_yaml::Value::String(parsed)) if parsed == value
    )
}
