//! Declaration macros for reference model types.
//!
//! `rm_type!` declares one concrete type: the struct, its [`RmType`] schema
//! entry and the [`RmObject`] / [`FieldType`] plumbing the serialization engine
//! uses. Fields are listed as
//!
//! ```text
//! name: RustType => "DECLARED_TYPE" [mandatory|optional]
//! ```
//!
//! in declaration order, inherited fields first. An optional `links { .. }`
//! block adds back-references that are part of the struct but not of the
//! serialized field set.
//!
//! `rm_family!` declares the enum standing in for an abstract type whose
//! concrete subtypes can appear in a field.
//!
//! [`RmType`]: helios_rm_support::RmType
//! [`RmObject`]: helios_rm_support::RmObject
//! [`FieldType`]: helios_rm_support::FieldType

#[macro_export]
#[doc(hidden)]
macro_rules! rm_cardinality {
    (mandatory) => {
        true
    };
    (optional) => {
        false
    };
}

#[macro_export]
macro_rules! rm_type {
    (
        $(#[$meta:meta])*
        pub struct $name:ident as $tag:literal extends [$($sup:literal),* $(,)?] {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $fty:ty => $decl:literal [$card:ident]
            ),* $(,)?
        }
        $(links {
            $( $(#[$lmeta:meta])* $link:ident : $lty:ty ),* $(,)?
        })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $fty, )*
            $($( $(#[$lmeta])* pub $link: $lty, )*)?
        }

        impl $crate::support::RmType for $name {
            const TYPE_DEF: $crate::support::TypeDef = $crate::support::TypeDef {
                name: $tag,
                super_types: &[$($sup),*],
                fields: &[$(
                    $crate::support::FieldDef {
                        name: stringify!($field),
                        declared_type: $decl,
                        mandatory: $crate::rm_cardinality!($card),
                        multiple: <$fty as $crate::support::FieldType>::MULTIPLE,
                    }
                ),*],
                is_abstract: false,
            };
        }

        impl $name {
            pub const TYPE_NAME: &'static str = $tag;
        }

        impl $crate::support::RmObject for $name {
            fn rm_type_name(&self) -> &'static str {
                $tag
            }

            fn field_defs(&self) -> &'static [$crate::support::FieldDef] {
                <Self as $crate::support::RmType>::TYPE_DEF.fields
            }

            fn field(&self, name: &str) -> Option<$crate::support::FieldRef<'_>> {
                match name {
                    $( stringify!($field) => Some($crate::support::FieldType::to_field(&self.$field)), )*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: $crate::support::FieldValue,
            ) -> Result<(), $crate::support::FieldError> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::support::FieldType::from_field(value)?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::support::FieldError::UnknownField {
                        owner: $tag,
                        field: name.to_string(),
                    }),
                }
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }

            fn clone_object(&self) -> Box<dyn $crate::support::RmObject> {
                Box::new(self.clone())
            }

            fn eq_object(&self, other: &dyn $crate::support::RmObject) -> bool {
                other
                    .as_any()
                    .downcast_ref::<Self>()
                    .is_some_and(|other| self == other)
            }
        }

        impl $crate::support::FieldType for $name {
            fn to_field(&self) -> $crate::support::FieldRef<'_> {
                $crate::support::FieldRef::Object(self)
            }

            fn from_field(
                value: $crate::support::FieldValue,
            ) -> Result<Self, $crate::support::FieldError> {
                match value {
                    $crate::support::FieldValue::Object(object) => {
                        $crate::support::downcast_object::<Self>(object, $tag)
                    }
                    other => Err($crate::support::FieldError::mismatch($tag, &other)),
                }
            }
        }
    };
}

#[macro_export]
macro_rules! rm_family {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $tag:literal {
            $first:ident($fty:ty)
            $(, $variant:ident($vty:ty))* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            $first($fty),
            $($variant($vty),)*
        }

        impl $name {
            pub const TYPE_NAME: &'static str = $tag;

            pub fn as_object(&self) -> &dyn $crate::support::RmObject {
                match self {
                    $name::$first(value) => value,
                    $($name::$variant(value) => value,)*
                }
            }

            /// The concrete type name of the held value.
            pub fn rm_type_name(&self) -> &'static str {
                self.as_object().rm_type_name()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$first(Default::default())
            }
        }

        impl From<$fty> for $name {
            fn from(value: $fty) -> Self {
                $name::$first(value)
            }
        }

        $(
            impl From<$vty> for $name {
                fn from(value: $vty) -> Self {
                    $name::$variant(value)
                }
            }
        )*

        impl $crate::support::FieldType for $name {
            fn to_field(&self) -> $crate::support::FieldRef<'_> {
                $crate::support::FieldRef::Object(self.as_object())
            }

            fn from_field(
                value: $crate::support::FieldValue,
            ) -> Result<Self, $crate::support::FieldError> {
                let object = match value {
                    $crate::support::FieldValue::Object(object) => object,
                    other => return Err($crate::support::FieldError::mismatch($tag, &other)),
                };
                let found = object.rm_type_name();
                let any = object.into_any();
                let any = match any.downcast::<$fty>() {
                    Ok(value) => return Ok($name::$first(*value)),
                    Err(any) => any,
                };
                $(
                    let any = match any.downcast::<$vty>() {
                        Ok(value) => return Ok($name::$variant(*value)),
                        Err(any) => any,
                    };
                )*
                drop(any);
                Err($crate::support::FieldError::TypeMismatch {
                    expected: $tag.to_string(),
                    found: format!("object {found}"),
                })
            }
        }
    };
}
