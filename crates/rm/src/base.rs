//! Identifiers, archetype details and structural back-references.

use crate::support::{FieldRef, RmObject};

rm_type! {
    /// Identifier of a terminology, optionally versioned as `name(version)`.
    pub struct TerminologyId as "TERMINOLOGY_ID" extends ["OBJECT_ID"] {
        value: String => "String" [mandatory],
    }
}

impl TerminologyId {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// The terminology name without any `(version)` suffix.
    pub fn name(&self) -> &str {
        match self.split_version() {
            Some((name, _)) => name,
            None => &self.value,
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.split_version().map(|(_, version)| version)
    }

    fn split_version(&self) -> Option<(&str, &str)> {
        let inner = self.value.strip_suffix(')')?;
        let (name, version) = inner.split_once('(')?;
        if name.is_empty() || version.is_empty() || version.contains('(') {
            return None;
        }
        Some((name, version))
    }
}

rm_type! {
    pub struct ArchetypeId as "ARCHETYPE_ID" extends ["OBJECT_ID"] {
        value: String => "String" [mandatory],
    }
}

impl ArchetypeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

rm_type! {
    pub struct HierObjectId as "HIER_OBJECT_ID" extends ["UID_BASED_ID"] {
        value: String => "String" [mandatory],
    }
}

rm_type! {
    pub struct ObjectVersionId as "OBJECT_VERSION_ID" extends ["UID_BASED_ID"] {
        value: String => "String" [mandatory],
    }
}

rm_type! {
    pub struct GenericId as "GENERIC_ID" extends ["OBJECT_ID"] {
        value: String => "String" [mandatory],
        scheme: String => "String" [mandatory],
    }
}

rm_family! {
    pub enum UidBasedId as "UID_BASED_ID" {
        HierObjectId(HierObjectId),
        ObjectVersionId(ObjectVersionId),
    }
}

rm_type! {
    /// Archetype and reference model version a locatable was built from.
    pub struct Archetyped as "ARCHETYPED" extends [] {
        archetype_id: ArchetypeId => "ARCHETYPE_ID" [mandatory],
        rm_version: String => "String" [mandatory],
    }
}

/// Non-owning link from a node to its structural parent.
///
/// Holds the parent's path from the composition root, in the form
/// `/content[openEHR-EHR-SECTION.vitals.v1]/items[at0001]`. A segment
/// without a predicate selects a single-valued field or the first list entry.
/// The link is never serialized; it is resolved against the root on demand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParentRef {
    pub path: String,
}

impl ParentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Walks the path from `root`.
    pub fn resolve<'a>(&self, root: &'a dyn RmObject) -> Option<&'a dyn RmObject> {
        let mut current = root;
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            let (field, predicate) = match segment.split_once('[') {
                Some((field, rest)) => (field, Some(rest.strip_suffix(']')?)),
                None => (segment, None),
            };
            current = step(current.field(field)?, predicate)?;
        }
        Some(current)
    }
}

fn step<'a>(value: FieldRef<'a>, predicate: Option<&str>) -> Option<&'a dyn RmObject> {
    match value {
        FieldRef::Object(object) => match predicate {
            Some(node_id) if node_id_of(object) != Some(node_id) => None,
            _ => Some(object),
        },
        FieldRef::List(items) => items.into_iter().find_map(|item| match item {
            FieldRef::Object(object) => match predicate {
                Some(node_id) if node_id_of(object) != Some(node_id) => None,
                _ => Some(object),
            },
            _ => None,
        }),
        _ => None,
    }
}

fn node_id_of(object: &dyn RmObject) -> Option<&str> {
    match object.field("archetype_node_id")? {
        FieldRef::Text(id) => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminology_version() {
        let plain = TerminologyId::new("openehr");
        assert_eq!(plain.name(), "openehr");
        assert_eq!(plain.version(), None);

        let versioned = TerminologyId::new("SNOMED-CT(2003)");
        assert_eq!(versioned.name(), "SNOMED-CT");
        assert_eq!(versioned.version(), Some("2003"));

        assert_eq!(TerminologyId::new("odd(").version(), None);
        assert_eq!(TerminologyId::new("()").version(), None);
    }
}
