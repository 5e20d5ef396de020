//! Type inference for untagged nodes.
//!
//! Context comes first: a node under a field whose declared type has no
//! registered subtypes can only be that type. Otherwise the node's shape is
//! matched against every registered candidate, and inference succeeds only
//! when exactly one most-specific candidate remains.

use helios_rm_support::{FieldDef, PrimitiveKind, SchemaView};
use thiserror::Error;
use tracing::{debug, trace};

use crate::context::RmContext;
use crate::node::{GenericNode, ObjectNode, Primitive};
use crate::registry::TypeRegistry;
use crate::terse::{TerseCodec, TerseOutcome};

/// Nesting limit for structural matching of untagged children.
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("ambiguous: {}", .candidates.join(", "))]
    Ambiguous { candidates: Vec<String> },

    #[error("no registered type matches")]
    NoMatch,
}

/// A concrete type a node might decode to, with the fields it cannot do without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceCandidate {
    pub type_name: &'static str,
    pub mandatory: Vec<&'static str>,
}

pub struct TypeInferenceEngine<'a> {
    registry: &'a TypeRegistry,
    schema: &'a dyn SchemaView,
    terse: &'a TerseCodec,
}

impl<'a> TypeInferenceEngine<'a> {
    pub fn new(ctx: &'a RmContext, terse: &'a TerseCodec) -> Self {
        Self {
            registry: ctx.registry(),
            schema: ctx.schema(),
            terse,
        }
    }

    /// Declared type of `owner.field`.
    pub fn get_property_type(&self, owner: &str, field: &str) -> Option<&'static str> {
        self.schema.field_def(owner, field).map(|def| def.declared_type)
    }

    /// Registered strict subtypes of `name`, in schema declaration order.
    pub fn subtypes_of(&self, name: &str) -> Vec<&'static str> {
        self.schema
            .type_names()
            .into_iter()
            .filter(|candidate| {
                *candidate != name
                    && self.registry.contains(candidate)
                    && self.schema.is_subtype_of(candidate, name)
            })
            .collect()
    }

    /// A type is polymorphic when a value in a slot of that type may be of
    /// some other registered type, or when the type itself cannot be
    /// instantiated.
    pub fn is_polymorphic(&self, name: &str) -> bool {
        !self.registry.contains(name) || !self.subtypes_of(name).is_empty()
    }

    /// Whether `owner.field` holding a value of type `actual` may be written
    /// without a tag.
    pub fn can_omit_type(&self, owner: &str, field: &str, actual: &str) -> bool {
        self.get_property_type(owner, field) == Some(actual) && !self.is_polymorphic(actual)
    }

    /// Registered concrete types a value in a slot of type `expected` could
    /// be. Every registered type when nothing is expected.
    pub fn candidates(&self, expected: Option<&str>) -> Vec<InferenceCandidate> {
        self.schema
            .type_names()
            .into_iter()
            .filter(|name| self.registry.contains(name) && !self.schema.is_abstract(name))
            .filter(|name| match expected {
                Some(expected) => self.schema.is_subtype_of(name, expected),
                None => true,
            })
            .map(|name| InferenceCandidate {
                type_name: name,
                mandatory: self
                    .schema
                    .fields_of(name)
                    .iter()
                    .filter(|def| def.mandatory)
                    .map(|def| def.name)
                    .collect(),
            })
            .collect()
    }

    /// The type of `node` in a slot of type `expected`: the explicit tag,
    /// else the expected type when it is a registered leaf, else the single
    /// structural match.
    pub fn infer_type(&self, node: &ObjectNode, expected: Option<&str>) -> Result<String, InferenceError> {
        if let Some(tag) = &node.tag {
            return Ok(tag.clone());
        }
        if let Some(expected) = expected {
            if !self.is_polymorphic(expected) {
                trace!(expected, "untagged node takes its declared leaf type");
                return Ok(expected.to_string());
            }
        }
        self.infer_from_structure(node, expected).map(str::to_string)
    }

    pub fn infer_from_structure(
        &self,
        node: &ObjectNode,
        expected: Option<&str>,
    ) -> Result<&'static str, InferenceError> {
        let matches = self.structural_matches(node, expected, 0);

        let survivors: Vec<&'static str> = matches
            .iter()
            .copied()
            .filter(|candidate| {
                !matches
                    .iter()
                    .any(|other| other != candidate && self.schema.is_subtype_of(other, candidate))
            })
            .collect();

        match survivors.as_slice() {
            [] => {
                debug!(?expected, fields = node.fields.len(), "no structural match");
                Err(InferenceError::NoMatch)
            }
            [single] => {
                debug!(?expected, inferred = *single, "inferred type from structure");
                Ok(*single)
            }
            _ => {
                let mut candidates: Vec<String> = survivors.iter().map(|s| s.to_string()).collect();
                candidates.sort();
                debug!(?expected, ?candidates, "ambiguous structure");
                Err(InferenceError::Ambiguous { candidates })
            }
        }
    }

    fn structural_matches(&self, node: &ObjectNode, expected: Option<&str>, depth: usize) -> Vec<&'static str> {
        self.candidates(expected)
            .into_iter()
            .filter(|candidate| {
                let matched = self.matches(candidate, node, depth);
                trace!(candidate = candidate.type_name, matched, depth, "structural candidate");
                matched
            })
            .map(|candidate| candidate.type_name)
            .collect()
    }

    fn matches(&self, candidate: &InferenceCandidate, node: &ObjectNode, depth: usize) -> bool {
        let mandatory_present = candidate
            .mandatory
            .iter()
            .all(|name| node.get(name).is_some_and(|value| !value.is_null()));
        if !mandatory_present {
            return false;
        }

        let fields = self.schema.fields_of(candidate.type_name);
        node.fields.iter().all(|(name, value)| {
            fields
                .iter()
                .find(|def| def.name == name.as_str())
                .is_some_and(|def| value.is_null() || self.value_fits(def, value, depth))
        })
    }

    fn value_fits(&self, def: &FieldDef, value: &GenericNode, depth: usize) -> bool {
        match value {
            GenericNode::List(items) => {
                def.multiple
                    && items
                        .iter()
                        .all(|item| self.element_fits(def.declared_type, item, depth))
            }
            other => self.element_fits(def.declared_type, other, depth),
        }
    }

    fn element_fits(&self, declared: &str, node: &GenericNode, depth: usize) -> bool {
        if let Some(kind) = PrimitiveKind::from_declared(declared) {
            return primitive_fits(kind, node);
        }
        match node {
            GenericNode::Object(object) => match &object.tag {
                // Unknown tags are left for the decoder to report.
                Some(tag) => !self.registry.contains(tag) || self.schema.is_subtype_of(tag, declared),
                None => {
                    depth < MAX_DEPTH
                        && !self
                            .structural_matches(object, Some(declared), depth + 1)
                            .is_empty()
                }
            },
            GenericNode::Primitive(Primitive::String(text)) if text.is_empty() => {
                !self.is_polymorphic(declared)
            }
            GenericNode::Primitive(Primitive::String(text)) => matches!(
                self.terse.decode(text, Some(declared), self.schema),
                TerseOutcome::Parsed(_)
            ),
            _ => false,
        }
    }
}

fn primitive_fits(kind: PrimitiveKind, node: &GenericNode) -> bool {
    let GenericNode::Primitive(primitive) = node else {
        return false;
    };
    match (kind, primitive) {
        (PrimitiveKind::String, Primitive::String(_)) => true,
        (PrimitiveKind::Boolean, Primitive::Bool(_)) => true,
        (PrimitiveKind::Boolean, Primitive::String(s)) => s == "true" || s == "false",
        (PrimitiveKind::Integer, Primitive::Number(n)) => {
            n.as_i64().is_some() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        (PrimitiveKind::Integer, Primitive::String(s)) => s.trim().parse::<i64>().is_ok(),
        (PrimitiveKind::Real, Primitive::Number(_)) => true,
        (PrimitiveKind::Real, Primitive::String(s)) => {
            s.trim().parse::<f64>().is_ok_and(f64::is_finite)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_fits() {
        assert!(primitive_fits(PrimitiveKind::String, &GenericNode::string("x")));
        assert!(!primitive_fits(PrimitiveKind::String, &GenericNode::integer(1)));
        assert!(primitive_fits(PrimitiveKind::Boolean, &GenericNode::string("true")));
        assert!(!primitive_fits(PrimitiveKind::Boolean, &GenericNode::string("yes")));
        assert!(primitive_fits(PrimitiveKind::Integer, &GenericNode::string("42")));
        assert!(primitive_fits(PrimitiveKind::Integer, &GenericNode::real(3.0).unwrap()));
        assert!(!primitive_fits(PrimitiveKind::Integer, &GenericNode::real(3.5).unwrap()));
        assert!(primitive_fits(PrimitiveKind::Real, &GenericNode::integer(7)));
        assert!(!primitive_fits(PrimitiveKind::Real, &GenericNode::string("inf")));
        assert!(!primitive_fits(PrimitiveKind::Real, &GenericNode::Null));
    }
}
