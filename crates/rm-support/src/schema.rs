//! Read-only view of the domain schema.

use indexmap::IndexMap;

/// One declared field of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: &'static str,
    /// A type name from the schema, or one of the primitive names
    /// understood by [`PrimitiveKind::from_declared`].
    pub declared_type: &'static str,
    pub mandatory: bool,
    pub multiple: bool,
}

/// A type as declared by the model crate.
///
/// `super_types` lists the direct parents only; [`StaticSchema`] computes the
/// transitive closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDef {
    pub name: &'static str,
    pub super_types: &'static [&'static str],
    pub fields: &'static [FieldDef],
    pub is_abstract: bool,
}

impl TypeDef {
    pub const fn abstract_type(name: &'static str, super_types: &'static [&'static str]) -> Self {
        Self {
            name,
            super_types,
            fields: &[],
            is_abstract: true,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Primitive declared types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Boolean,
    Integer,
    Real,
}

impl PrimitiveKind {
    pub fn from_declared(name: &str) -> Option<Self> {
        match name {
            "String" => Some(PrimitiveKind::String),
            "Boolean" => Some(PrimitiveKind::Boolean),
            "Integer" | "Integer64" => Some(PrimitiveKind::Integer),
            "Real" | "Double" => Some(PrimitiveKind::Real),
            _ => None,
        }
    }
}

/// The schema queries the serialization engine relies on.
///
/// Unknown type names answer `false` / empty rather than failing.
pub trait SchemaView: Send + Sync {
    fn has_type(&self, name: &str) -> bool;

    /// Declared fields of `name`, inherited ones included, in order.
    fn fields_of(&self, name: &str) -> &[FieldDef];

    /// All ancestors of `name`, nearest first.
    fn super_types_of(&self, name: &str) -> &[&'static str];

    fn is_abstract(&self, name: &str) -> bool;

    /// Every type name, in declaration order.
    fn type_names(&self) -> Vec<&'static str>;

    fn field_def(&self, owner: &str, field: &str) -> Option<&FieldDef> {
        self.fields_of(owner).iter().find(|f| f.name == field)
    }

    /// Reflexive subtype test.
    fn is_subtype_of(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.super_types_of(sub).contains(&sup)
    }
}

#[derive(Debug, Clone)]
struct SchemaEntry {
    def: TypeDef,
    ancestors: Vec<&'static str>,
}

/// A [`SchemaView`] over compile-time [`TypeDef`]s.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    types: IndexMap<&'static str, SchemaEntry>,
}

impl StaticSchema {
    pub fn new(defs: impl IntoIterator<Item = TypeDef>) -> Self {
        let declared: IndexMap<&'static str, TypeDef> =
            defs.into_iter().map(|def| (def.name, def)).collect();

        let types = declared
            .values()
            .map(|def| {
                let ancestors = Self::ancestors(&declared, def);
                (def.name, SchemaEntry { def: *def, ancestors })
            })
            .collect();

        Self { types }
    }

    // Breadth-first so that nearer ancestors come first; the seen list stops cycles.
    fn ancestors(declared: &IndexMap<&'static str, TypeDef>, def: &TypeDef) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        let mut queue: Vec<&'static str> = def.super_types.to_vec();
        while !queue.is_empty() {
            let current = queue.remove(0);
            if current == def.name || out.contains(&current) {
                continue;
            }
            out.push(current);
            if let Some(parent) = declared.get(current) {
                queue.extend(parent.super_types.iter().copied());
            }
        }
        out
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name).map(|entry| &entry.def)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Reports dangling supertypes and fields whose declared type is neither
    /// primitive nor part of the schema.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for entry in self.types.values() {
            for parent in entry.def.super_types {
                if !self.types.contains_key(parent) {
                    errors.push(format!(
                        "{} extends unknown type {}",
                        entry.def.name, parent
                    ));
                }
            }
            for field in entry.def.fields {
                if PrimitiveKind::from_declared(field.declared_type).is_none()
                    && !self.types.contains_key(field.declared_type)
                {
                    errors.push(format!(
                        "{}.{} declares unknown type {}",
                        entry.def.name, field.name, field.declared_type
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl SchemaView for StaticSchema {
    fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    fn fields_of(&self, name: &str) -> &[FieldDef] {
        self.types.get(name).map_or(&[], |entry| entry.def.fields)
    }

    fn super_types_of(&self, name: &str) -> &[&'static str] {
        self.types
            .get(name)
            .map_or(&[], |entry| entry.ancestors.as_slice())
    }

    fn is_abstract(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(|entry| entry.def.is_abstract)
    }

    fn type_names(&self) -> Vec<&'static str> {
        self.types.keys().copied().collect()
    }
}
