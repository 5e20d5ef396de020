//! XML adapter for the generic tree.
//!
//! ## Tree ↔ XML Mapping
//!
//! | Tree | XML |
//! |------|-----|
//! | root object tagged `COMPOSITION` | `<composition xsi:type="COMPOSITION">` |
//! | tag on a nested object | `xsi:type` attribute |
//! | `{"value": "hi"}` | `<value>hi</value>` |
//! | `{"items": [a, b]}` | `<items>..</items><items>..</items>` |
//! | `{"archetype_node_id": "at0001"}` | `archetype_node_id="at0001"` attribute |
//! | `null` | `<x xsi:nil="true"/>` |
//!
//! ## Namespace Handling
//!
//! The openEHR namespace (`http://schemas.openehr.org/v1`) is the default
//! namespace of the root element, next to the `xsi` prefix declaration.
//!
//! ## Limits
//!
//! XML has no typed scalars and cannot tell a one-element list from a single
//! value: scalars come back as strings and a single repeated element as a
//! single node. The codecs coerce both using the declared field types.
//! Lists nested directly in lists cannot be written.
//!
//! ## Examples
//!
//! ```
//! use helios_rm_serde::xml::{from_xml_str, to_xml_string};
//! use helios_rm_serde::{GenericNode, ObjectNode, XmlConfig};
//!
//! let node = GenericNode::from(
//!     ObjectNode::tagged("ELEMENT")
//!         .with("archetype_node_id", "at0004")
//!         .with("null_flavour", GenericNode::Null),
//! );
//! let xml = to_xml_string(&node, &XmlConfig::default()).unwrap();
//! assert_eq!(from_xml_str(&xml).unwrap(), node);
//! ```

pub mod de;
pub mod ser;
mod utils;

pub use de::{from_xml_slice, from_xml_str};
pub use ser::{to_xml_string, to_xml_vec, to_xml_writer};
pub use utils::{XSI_NAMESPACE, root_element_name};
