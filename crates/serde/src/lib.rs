//! # Helios RM Serialization
//!
//! Polymorphic JSON, XML and YAML serialization for openEHR reference model
//! objects.
//!
//! ## Features
//!
//! - **Type Registry**: a bidirectional map between openEHR type names
//!   (`DV_CODED_TEXT`) and the allocators of the Rust types implementing them,
//!   filled once at start-up from an explicit export list.
//! - **Canonical Codec**: every object tagged with its type, decoding never
//!   guesses.
//! - **Configurable Codec**: tags only where the declared field type leaves
//!   the concrete type open, terse strings such as `ISO_639-1::en`, and
//!   structural inference when a tag is missing.
//! - **Three Formats**: JSON, XML (`xsi:type` for tags) and YAML in block,
//!   flow and hybrid presentation.
//!
//! ## Architecture
//!
//! Every call goes through a format-neutral tree:
//!
//! - **Codec Layer**: typed objects to [`GenericNode`] trees and back, driven
//!   by the [`TypeRegistry`] and the schema of the model.
//! - **Format Layer**: [`GenericNode`] trees to text and back, with no
//!   knowledge of the model.
//!
//! [`RmSerde`] pairs one codec with one format.
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use helios_rm::{CodePhrase, DvText};
//! use helios_rm_serde::{RmContext, RmSerde, TypeRegistry};
//!
//! let registry = TypeRegistry::from_exports(helios_rm::exports())?;
//! let ctx = RmContext::new(registry, Arc::new(helios_rm::schema().clone()));
//!
//! let serde = RmSerde::compact_json(ctx);
//! let mut text = DvText::new("Vital Signs");
//! text.language = Some(CodePhrase::new("ISO_639-1", "en"));
//!
//! let json = serde.serialize(&text)?;
//! assert_eq!(
//!     json,
//!     r#"{"_type":"DV_TEXT","value":"Vital Signs","language":{"terminology_id":{"value":"ISO_639-1"},"code_string":"en"}}"#
//! );
//! assert_eq!(serde.deserialize_as::<DvText>(&json)?, text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod canonical;
mod codec;
pub mod config;
pub mod configurable;
pub mod context;
pub mod error;
pub mod format;
pub mod inference;
pub mod json;
pub mod node;
pub mod registry;
pub mod serializer;
pub mod terse;
pub mod xml;
pub mod yaml;

pub use canonical::CanonicalCodec;
pub use config::{CodecConfig, JsonConfig, OPENEHR_NAMESPACE, XmlConfig, YamlConfig, YamlStyle};
pub use configurable::ConfigurableCodec;
pub use context::RmContext;
pub use error::{
    DeserializationError, InvalidFormatError, RegistryError, Result, SerdeError,
    SerializationError, TypeNotFoundError,
};
pub use format::Format;
pub use inference::{InferenceCandidate, InferenceError, TypeInferenceEngine};
pub use node::{DEFAULT_TAG_KEY, GenericNode, ObjectNode, Primitive};
pub use registry::{TypeRegistration, TypeRegistry};
pub use serializer::{Codec, RmSerde, WireFormat};
pub use terse::{TerseCodec, TerseOutcome, TerseRule};

pub use json::{from_json_str, to_json_string};
pub use xml::{from_xml_str, to_xml_string};
pub use yaml::{from_yaml_str, to_yaml_string};
