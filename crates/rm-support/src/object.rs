//! Dynamic access to reference model objects.

use std::any::Any;
use std::fmt;

use crate::field::FieldError;
use crate::schema::FieldDef;

/// A reference model value that can be walked and populated by field name.
///
/// Implementations are generated by the model crate; the field set returned by
/// [`RmObject::field_defs`] is in declaration order and never includes
/// back-references such as a `parent` link.
pub trait RmObject: Any + fmt::Debug + Send + Sync {
    /// The type name the value declares for itself (e.g. `DV_TEXT`).
    fn rm_type_name(&self) -> &'static str;

    /// The Rust path of the concrete type, used in diagnostics.
    fn rust_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Declared fields, in order.
    fn field_defs(&self) -> &'static [FieldDef];

    /// Borrow a field by name. `None` if the type has no such field.
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;

    /// Assign a field by name.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldError>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn clone_object(&self) -> Box<dyn RmObject>;

    fn eq_object(&self, other: &dyn RmObject) -> bool;
}

impl dyn RmObject {
    /// Returns `true` if the value is a `T`.
    pub fn is<T: RmObject>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: RmObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl Clone for Box<dyn RmObject> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

impl PartialEq for dyn RmObject {
    fn eq(&self, other: &Self) -> bool {
        self.eq_object(other)
    }
}

/// A borrowed view of a single field value.
#[derive(Debug, Clone)]
pub enum FieldRef<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(&'a str),
    List(Vec<FieldRef<'a>>),
    Object(&'a dyn RmObject),
}

impl FieldRef<'_> {
    /// `true` for `Null` and for empty lists.
    pub fn is_absent(&self) -> bool {
        match self {
            FieldRef::Null => true,
            FieldRef::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// An owned field value produced by a decoder.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<FieldValue>),
    Object(Box<dyn RmObject>),
}

impl FieldValue {
    /// Short description of the value's shape for error messages.
    pub fn describe(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(_) => "boolean".to_string(),
            FieldValue::Integer(_) => "integer".to_string(),
            FieldValue::Real(_) => "real".to_string(),
            FieldValue::Text(_) => "string".to_string(),
            FieldValue::List(items) => format!("list of {}", items.len()),
            FieldValue::Object(object) => format!("object {}", object.rm_type_name()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Real(value)
    }
}
