//! Monomorphized constructors for registry entries.

use std::any::{TypeId, type_name};
use std::fmt;

use crate::object::RmObject;
use crate::schema::{FieldDef, TypeDef};

/// A concrete, constructible reference model type.
pub trait RmType: RmObject + Default {
    const TYPE_DEF: TypeDef;
}

fn allocate_default<T: RmType>() -> Box<dyn RmObject> {
    Box::new(T::default())
}

/// Creates empty instances of one concrete type.
///
/// Identity is the Rust [`TypeId`] of the type the allocator was built for.
#[derive(Clone, Copy)]
pub struct TypeAllocator {
    type_id: TypeId,
    rust_name: &'static str,
    declared_name: &'static str,
    fields: &'static [FieldDef],
    allocate: fn() -> Box<dyn RmObject>,
}

impl TypeAllocator {
    pub fn of<T: RmType>() -> Self {
        Self::with_constructor::<T>(allocate_default::<T>)
    }

    /// An allocator for `T` that builds instances with `allocate` instead of
    /// `T::default()`.
    pub fn with_constructor<T: RmType>(allocate: fn() -> Box<dyn RmObject>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            declared_name: T::TYPE_DEF.name,
            fields: T::TYPE_DEF.fields,
            allocate,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// The name the type declares for itself.
    pub fn declared_name(&self) -> &'static str {
        self.declared_name
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn allocate(&self) -> Box<dyn RmObject> {
        (self.allocate)()
    }

    /// Whether the constructor really produces the type the allocator claims.
    pub fn is_genuine(&self) -> bool {
        self.allocate().as_any().type_id() == self.type_id
    }
}

impl PartialEq for TypeAllocator {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeAllocator {}

impl fmt::Debug for TypeAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeAllocator")
            .field("declared_name", &self.declared_name)
            .field("rust_name", &self.rust_name)
            .finish()
    }
}

/// One named entry of a schema module's export bag.
///
/// Only [`Export::Type`] entries can be registered; the other variants exist so
/// that a bag gathered from a module can be handed to bulk registration as-is
/// and be rejected with a precise message.
#[derive(Debug, Clone)]
pub enum Export {
    Type(TypeAllocator),
    Constant(&'static str),
    Function(&'static str),
}

impl Export {
    pub fn kind(&self) -> &'static str {
        match self {
            Export::Type(_) => "type",
            Export::Constant(_) => "constant",
            Export::Function(_) => "function",
        }
    }
}
