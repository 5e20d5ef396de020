//! Names and helpers shared by the XML writer and reader.

/// XML Schema instance namespace, bound to the `xsi` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Attribute carrying the type tag.
pub const XSI_TYPE: &str = "xsi:type";

/// Attribute marking an explicit null.
pub const XSI_NIL: &str = "xsi:nil";

/// Root element name used when the root carries no tag.
pub const UNTYPED_ROOT: &str = "object";

/// Scalar fields written as attributes of their owner element.
pub const ATTRIBUTE_FIELDS: &[&str] = &["archetype_node_id"];

/// `COMPOSITION` is written as `<composition>`.
pub fn root_element_name(tag: Option<&str>) -> String {
    match tag {
        Some(tag) if !tag.is_empty() => tag.to_ascii_lowercase(),
        _ => UNTYPED_ROOT.to_string(),
    }
}

/// The tag implied by a root element without `xsi:type`.
pub fn tag_from_root_name(name: &str) -> Option<String> {
    (name != UNTYPED_ROOT).then(|| name.to_ascii_uppercase())
}

pub fn is_attribute_field(name: &str) -> bool {
    ATTRIBUTE_FIELDS.contains(&name)
}

/// Namespace declarations are not data.
pub fn is_namespace_attribute(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

/// Attributes in the `xsi` namespace other than `xsi:type` and `xsi:nil`
/// (such as `xsi:schemaLocation`) are not data either.
pub fn is_xsi_attribute(key: &str) -> bool {
    key.starts_with("xsi:")
}

pub fn bool_to_string(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}
