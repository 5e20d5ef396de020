//! Codec and wire format configuration.
//!
//! [`CodecConfig`] controls what the configurable codec puts in the tree;
//! [`JsonConfig`], [`XmlConfig`] and [`YamlConfig`] control how a tree is
//! written. All of them deserialize from partial documents (missing keys take
//! their defaults) and [`CodecConfig`] can also be read from the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RM_SERDE_ALWAYS_INCLUDE_TYPE` | false | Tag every object |
//! | `RM_SERDE_USE_TERSE_FORMAT` | false | Write terse strings where possible |
//! | `RM_SERDE_PARSE_TERSE_FORMAT` | true | Accept terse strings on decode |
//! | `RM_SERDE_INCLUDE_NULL_VALUES` | false | Write absent optional fields as null |
//! | `RM_SERDE_INCLUDE_EMPTY_COLLECTIONS` | false | Write empty lists |
//! | `RM_SERDE_STRICT` | true | Reject unknown fields on decode |
//!
//! # Example
//!
//! ```rust
//! use helios_rm_serde::{CodecConfig, YamlConfig};
//!
//! let codec = CodecConfig {
//!     use_terse_format: true,
//!     ..CodecConfig::compact()
//! };
//! assert!(codec.validate().is_ok());
//!
//! let yaml = YamlConfig::hybrid().with_max_inline_properties(2);
//! assert_eq!(yaml.max_inline_properties, 2);
//! ```

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};

use crate::node::DEFAULT_TAG_KEY;

pub const OPENEHR_NAMESPACE: &str = "http://schemas.openehr.org/v1";

/// Behaviour of the configurable codec.
#[derive(Debug, Clone, PartialEq, Eq, Parser, Serialize, Deserialize)]
#[command(name = "rm-serde")]
#[command(about = "openEHR reference model codec options")]
#[serde(default)]
pub struct CodecConfig {
    /// Tag every object, not only those whose type cannot be inferred.
    #[arg(long, env = "RM_SERDE_ALWAYS_INCLUDE_TYPE", default_value_t = false, action = ArgAction::Set)]
    pub always_include_type: bool,

    /// Write values with a terse grammar as single strings.
    #[arg(long, env = "RM_SERDE_USE_TERSE_FORMAT", default_value_t = false, action = ArgAction::Set)]
    pub use_terse_format: bool,

    /// Accept terse strings in object positions.
    #[arg(long, env = "RM_SERDE_PARSE_TERSE_FORMAT", default_value_t = true, action = ArgAction::Set)]
    pub parse_terse_format: bool,

    /// Write absent optional fields as explicit nulls.
    #[arg(long, env = "RM_SERDE_INCLUDE_NULL_VALUES", default_value_t = false, action = ArgAction::Set)]
    pub include_null_values: bool,

    /// Write empty lists instead of leaving them out.
    #[arg(long, env = "RM_SERDE_INCLUDE_EMPTY_COLLECTIONS", default_value_t = false, action = ArgAction::Set)]
    pub include_empty_collections: bool,

    /// Reject fields the resolved type does not declare.
    #[arg(long, env = "RM_SERDE_STRICT", default_value_t = true, action = ArgAction::Set)]
    pub strict: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            always_include_type: false,
            use_terse_format: false,
            parse_terse_format: true,
            include_null_values: false,
            include_empty_collections: false,
            strict: true,
        }
    }
}

impl CodecConfig {
    /// Reads `RM_SERDE_*` variables, ignoring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse_from(["rm-serde"]).unwrap_or_default()
    }

    /// Every object tagged, nothing terse.
    pub fn canonical() -> Self {
        Self {
            always_include_type: true,
            ..Self::default()
        }
    }

    /// Tags only where the type cannot be inferred.
    pub fn compact() -> Self {
        Self::default()
    }

    /// Compact, with terse strings and empty lists written out.
    pub fn hybrid() -> Self {
        Self {
            use_terse_format: true,
            include_empty_collections: true,
            ..Self::default()
        }
    }

    /// Tagged throughout but with terse strings, for storage that is read
    /// back by this library only.
    pub fn internal() -> Self {
        Self {
            always_include_type: true,
            use_terse_format: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.use_terse_format && !self.parse_terse_format {
            errors.push(
                "use_terse_format requires parse_terse_format, or written values cannot be read back"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_tag_key(key: &str, errors: &mut Vec<String>) {
    if key.is_empty() {
        errors.push("Type property name cannot be empty".to_string());
    }
}

fn validate_indent(indent: usize, errors: &mut Vec<String>) {
    if indent == 0 || indent > 16 {
        errors.push(format!("Indent must be between 1 and 16, got {indent}"));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    /// Key holding the type tag.
    pub type_property_name: String,
    pub pretty_print: bool,
    pub indent: usize,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            type_property_name: DEFAULT_TAG_KEY.to_string(),
            pretty_print: false,
            indent: 2,
        }
    }
}

impl JsonConfig {
    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        validate_tag_key(&self.type_property_name, &mut errors);
        if self.pretty_print {
            validate_indent(self.indent, &mut errors);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
    pub include_declaration: bool,
    pub version: String,
    pub encoding: String,
    /// Write the openEHR default namespace and the `xsi` namespace on the
    /// root element.
    pub use_namespaces: bool,
    pub namespace: String,
    pub pretty_print: bool,
    pub indent: usize,
    /// Root element name; the lower-cased root tag when unset.
    pub root_element: Option<String>,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            include_declaration: true,
            version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
            use_namespaces: true,
            namespace: OPENEHR_NAMESPACE.to_string(),
            pretty_print: true,
            indent: 2,
            root_element: None,
        }
    }
}

impl XmlConfig {
    /// No declaration, no indentation.
    pub fn compact() -> Self {
        Self {
            include_declaration: false,
            pretty_print: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.include_declaration && self.version.is_empty() {
            errors.push("XML version cannot be empty".to_string());
        }
        if self.use_namespaces && self.namespace.is_empty() {
            errors.push("Namespace cannot be empty when namespaces are enabled".to_string());
        }
        if let Some(root) = &self.root_element {
            if root.is_empty() || root.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
                errors.push(format!("'{root}' is not a valid root element name"));
            }
        }
        if self.pretty_print {
            validate_indent(self.indent, &mut errors);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// YAML presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YamlStyle {
    /// Nested block mappings and sequences throughout.
    #[default]
    Block,
    /// Everything inline.
    Flow,
    /// Small objects inline, the rest as blocks.
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YamlConfig {
    pub style: YamlStyle,
    pub indent: usize,
    /// Largest entry count, tag included, an object may have and still be
    /// written inline in [`YamlStyle::Hybrid`].
    pub max_inline_properties: usize,
    pub type_property_name: String,
}

impl Default for YamlConfig {
    fn default() -> Self {
        Self {
            style: YamlStyle::Block,
            indent: 2,
            max_inline_properties: 3,
            type_property_name: DEFAULT_TAG_KEY.to_string(),
        }
    }
}

impl YamlConfig {
    pub fn block() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self::block()
    }

    pub fn flow() -> Self {
        Self {
            style: YamlStyle::Flow,
            ..Self::default()
        }
    }

    pub fn hybrid() -> Self {
        Self {
            style: YamlStyle::Hybrid,
            ..Self::default()
        }
    }

    pub fn with_max_inline_properties(mut self, max: usize) -> Self {
        self.max_inline_properties = max;
        self
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        validate_tag_key(&self.type_property_name, &mut errors);
        validate_indent(self.indent, &mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
