//! Type registry: type names ↔ allocators.
//!
//! The registry is built once at start-up from an explicit export list (see
//! [`TypeRegistry::register_all`]) and is read-only afterwards. Lookups in both
//! directions are exact: [`TypeRegistry::name_of`] is the inverse of
//! [`TypeRegistry::resolve`], and re-registering a name or an allocator drops
//! the stale half of the old pairing so the mapping stays one-to-one.
//!
//! A process-wide instance is available through [`global`]; it is published
//! through an [`ArcSwap`] so readers never lock.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use helios_rm_support::{Export, FieldDef, RmObject, RmType, TypeAllocator};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::{RegistryError, TypeNotFoundError};

/// A registered type: its name and the allocator behind it.
#[derive(Debug, Clone)]
pub struct TypeRegistration {
    name: String,
    allocator: TypeAllocator,
}

impl TypeRegistration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allocator(&self) -> &TypeAllocator {
        &self.allocator
    }

    /// A fresh, empty instance.
    pub fn allocate(&self) -> Box<dyn RmObject> {
        self.allocator.allocate()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &'static [FieldDef] {
        self.allocator.fields()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.allocator.fields().iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    by_name: HashMap<String, TypeRegistration>,
    by_type: HashMap<TypeId, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from an export list; see [`TypeRegistry::register_all`].
    pub fn from_exports<I, S>(exports: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, Export)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        registry.register_all(exports)?;
        Ok(registry)
    }

    /// Binds `name` to `allocator`, replacing any previous binding of either.
    pub fn register(&mut self, name: impl Into<String>, allocator: TypeAllocator) {
        let name = name.into();

        if let Some(previous) = self.by_name.get(&name) {
            if previous.allocator != allocator {
                warn!(
                    type_name = %name,
                    previous = previous.allocator.rust_name(),
                    replacement = allocator.rust_name(),
                    "type name re-registered with a different allocator"
                );
                self.by_type.remove(&previous.allocator.type_id());
            }
        }
        if let Some(old_name) = self.by_type.get(&allocator.type_id()) {
            if *old_name != name {
                warn!(
                    rust_type = allocator.rust_name(),
                    previous = %old_name,
                    replacement = %name,
                    "allocator re-registered under a different name"
                );
                self.by_name.remove(old_name);
            }
        }

        debug!(type_name = %name, rust_type = allocator.rust_name(), "registered type");
        self.by_type.insert(allocator.type_id(), name.clone());
        self.by_name
            .insert(name.clone(), TypeRegistration { name, allocator });
    }

    /// Registers `T` under the name it declares.
    pub fn register_type<T: RmType>(&mut self) {
        self.register(T::TYPE_DEF.name, TypeAllocator::of::<T>());
    }

    /// Registers a whole export list, or nothing at all.
    ///
    /// Every entry is checked before any is committed: the name must be an
    /// upper-snake identifier, the export must be a type whose allocator
    /// produces the type it claims, and one batch may not bind a name to two
    /// different allocators. The error lists every offending entry.
    pub fn register_all<I, S>(&mut self, exports: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = (S, Export)>,
        S: Into<String>,
    {
        let entries: Vec<(String, Export)> = exports
            .into_iter()
            .map(|(name, export)| (name.into(), export))
            .collect();

        let mut problems = Vec::new();
        let mut accepted: Vec<(String, TypeAllocator)> = Vec::with_capacity(entries.len());

        for (name, export) in entries {
            if !is_valid_type_name(&name) {
                problems.push(format!("'{name}' is not a valid type name"));
            }
            match export {
                Export::Type(allocator) if allocator.is_genuine() => {
                    let clash = accepted
                        .iter()
                        .any(|(other, existing)| *other == name && *existing != allocator);
                    if clash {
                        problems.push(format!("'{name}' is bound to more than one type"));
                    }
                    accepted.push((name, allocator));
                }
                Export::Type(allocator) => problems.push(format!(
                    "'{name}': allocator for {} produces a different type",
                    allocator.rust_name()
                )),
                other => problems.push(format!(
                    "'{name}' is a {}, not a type allocator",
                    other.kind()
                )),
            }
        }

        if !problems.is_empty() {
            warn!(problems = problems.len(), "rejected registration batch");
            return Err(RegistryError::InvalidBatch { problems });
        }

        let count = accepted.len();
        for (name, allocator) in accepted {
            self.register(name, allocator);
        }
        debug!(count, total = self.len(), "registered export batch");
        Ok(count)
    }

    pub fn resolve(&self, name: &str) -> Result<&TypeRegistration, TypeNotFoundError> {
        self.by_name
            .get(name)
            .ok_or_else(|| TypeNotFoundError::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&TypeRegistration> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn name_of(&self, allocator: &TypeAllocator) -> Result<&str, RegistryError> {
        self.by_type
            .get(&allocator.type_id())
            .map(String::as_str)
            .ok_or(RegistryError::UnknownAllocator {
                rust_type: allocator.rust_name(),
            })
    }

    /// The registered name of a value's concrete type.
    ///
    /// Values whose type was never registered are an error, even when the
    /// name they declare for themselves happens to be registered for another
    /// type.
    pub fn name_of_instance(&self, value: &dyn RmObject) -> Result<&str, RegistryError> {
        self.by_type
            .get(&value.as_any().type_id())
            .map(String::as_str)
            .ok_or(RegistryError::UnregisteredInstance {
                rust_type: value.rust_type_name(),
                declared: value.rm_type_name(),
            })
    }

    /// Registration of a value's concrete type.
    pub fn registration_of(&self, value: &dyn RmObject) -> Result<&TypeRegistration, RegistryError> {
        let name = self.name_of_instance(value)?;
        Ok(self.resolve(name)?)
    }

    /// Registered names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_type.clear();
    }
}

/// Upper-snake identifiers such as `DV_CODED_TEXT`.
pub fn is_valid_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

static GLOBAL: Lazy<ArcSwap<TypeRegistry>> =
    Lazy::new(|| ArcSwap::from_pointee(TypeRegistry::new()));

/// Snapshot of the process-wide registry.
pub fn global() -> Arc<TypeRegistry> {
    GLOBAL.load_full()
}

/// Replaces the process-wide registry.
pub fn install_global(registry: TypeRegistry) {
    debug!(types = registry.len(), "installed global type registry");
    GLOBAL.store(Arc::new(registry));
}

/// Adds an export list to the process-wide registry.
///
/// Meant for start-up; concurrent writers may lose each other's updates.
pub fn register_global<I, S>(exports: I) -> Result<usize, RegistryError>
where
    I: IntoIterator<Item = (S, Export)>,
    S: Into<String>,
{
    let mut next = TypeRegistry::clone(&GLOBAL.load());
    let count = next.register_all(exports)?;
    GLOBAL.store(Arc::new(next));
    Ok(count)
}

/// Empties the process-wide registry.
pub fn reset_global() {
    install_global(TypeRegistry::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_rm_support::{FieldError, FieldRef, FieldValue, TypeDef};
    use std::any::Any;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Probe;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Other;

    macro_rules! probe_type {
        ($ty:ident, $name:literal) => {
            impl RmObject for $ty {
                fn rm_type_name(&self) -> &'static str {
                    $name
                }
                fn field_defs(&self) -> &'static [FieldDef] {
                    &[]
                }
                fn field(&self, _name: &str) -> Option<FieldRef<'_>> {
                    None
                }
                fn set_field(&mut self, name: &str, _value: FieldValue) -> Result<(), FieldError> {
                    Err(FieldError::UnknownField {
                        owner: $name,
                        field: name.to_string(),
                    })
                }
                fn as_any(&self) -> &dyn Any {
                    self
                }
                fn into_any(self: Box<Self>) -> Box<dyn Any> {
                    self
                }
                fn clone_object(&self) -> Box<dyn RmObject> {
                    Box::new(self.clone())
                }
                fn eq_object(&self, other: &dyn RmObject) -> bool {
                    other.as_any().is::<Self>()
                }
            }

            impl RmType for $ty {
                const TYPE_DEF: TypeDef = TypeDef {
                    name: $name,
                    super_types: &[],
                    fields: &[],
                    is_abstract: false,
                };
            }
        };
    }

    probe_type!(Probe, "PROBE");
    probe_type!(Other, "OTHER");

    #[test]
    fn test_resolve_and_inverse() {
        let mut registry = TypeRegistry::new();
        registry.register_type::<Probe>();

        let registration = registry.resolve("PROBE").unwrap();
        assert_eq!(registry.name_of(registration.allocator()).unwrap(), "PROBE");
        assert!(registration.allocate().is::<Probe>());
        assert_eq!(registry.name_of_instance(&Probe).unwrap(), "PROBE");
        assert_eq!(
            registry.resolve("NOPE").unwrap_err(),
            TypeNotFoundError::new("NOPE")
        );
    }

    #[test]
    fn test_reregistration_replaces_both_directions() {
        let mut registry = TypeRegistry::new();
        registry.register("PROBE", TypeAllocator::of::<Probe>());
        registry.register("PROBE", TypeAllocator::of::<Other>());

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("PROBE").unwrap().allocate().is::<Other>());
        assert!(registry.name_of(&TypeAllocator::of::<Probe>()).is_err());

        registry.register("RENAMED", TypeAllocator::of::<Other>());
        assert_eq!(registry.type_names(), vec!["RENAMED"]);
        assert_eq!(registry.name_of_instance(&Other).unwrap(), "RENAMED");
    }

    #[test]
    fn test_unregistered_instance_is_an_error() {
        let mut registry = TypeRegistry::new();
        registry.register_type::<Probe>();
        assert_eq!(
            registry.name_of_instance(&Other).unwrap_err(),
            RegistryError::UnregisteredInstance {
                rust_type: std::any::type_name::<Other>(),
                declared: "OTHER",
            }
        );
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register_all([
                ("PROBE", Export::Type(TypeAllocator::of::<Probe>())),
                ("VERSION", Export::Constant("1.0.4")),
                ("lower", Export::Type(TypeAllocator::of::<Other>())),
                (
                    "FAKE",
                    Export::Type(TypeAllocator::with_constructor::<Probe>(|| Box::new(Other))),
                ),
            ])
            .unwrap_err();

        let RegistryError::InvalidBatch { problems } = err else {
            panic!("expected a batch error");
        };
        assert_eq!(
            problems,
            vec![
                "'VERSION' is a constant, not a type allocator".to_string(),
                "'lower' is not a valid type name".to_string(),
                format!(
                    "'FAKE': allocator for {} produces a different type",
                    std::any::type_name::<Probe>()
                ),
            ]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_batch_rejects_conflicting_names() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register_all([
                ("PROBE", Export::Type(TypeAllocator::of::<Probe>())),
                ("PROBE", Export::Type(TypeAllocator::of::<Other>())),
            ])
            .unwrap_err();
        assert!(err.to_string().contains("'PROBE' is bound to more than one type"));
    }

    #[test]
    fn test_type_names() {
        assert!(is_valid_type_name("DV_CODED_TEXT"));
        assert!(is_valid_type_name("ISO8601_DATE"));
        assert!(!is_valid_type_name("_HIDDEN"));
        assert!(!is_valid_type_name("DvText"));
        assert!(!is_valid_type_name(""));
    }
}
