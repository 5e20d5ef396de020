//! # Helios RM Support
//!
//! Bridge traits between the openEHR reference model crate (`helios-rm`) and the
//! serialization engine (`helios-rm-serde`).
//!
//! The engine never sees concrete model structs. It talks to them through:
//!
//! - [`RmObject`]: object-safe field access by name, `Any` downcasting and
//!   dynamic clone/equality.
//! - [`FieldType`]: conversion of one Rust field type to and from the
//!   format-neutral [`FieldRef`] / [`FieldValue`] pair.
//! - [`SchemaView`]: the read-only schema (declared fields and supertypes of
//!   every type name) used for type inference.
//! - [`TypeAllocator`] / [`Export`]: monomorphized constructors handed to the
//!   type registry at start-up.

mod allocator;
mod field;
mod object;
mod schema;

pub use allocator::{Export, RmType, TypeAllocator};
pub use field::{FieldError, FieldType, downcast_object};
pub use object::{FieldRef, FieldValue, RmObject};
pub use schema::{FieldDef, PrimitiveKind, SchemaView, StaticSchema, TypeDef};
