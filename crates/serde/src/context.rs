//! The registry and schema a codec works against.

use std::fmt;
use std::sync::Arc;

use helios_rm_support::SchemaView;

use crate::registry::{self, TypeRegistry};

/// A registry snapshot paired with the schema describing the same types.
#[derive(Clone)]
pub struct RmContext {
    registry: Arc<TypeRegistry>,
    schema: Arc<dyn SchemaView>,
}

impl RmContext {
    pub fn new(registry: impl Into<Arc<TypeRegistry>>, schema: Arc<dyn SchemaView>) -> Self {
        Self {
            registry: registry.into(),
            schema,
        }
    }

    /// Uses the current snapshot of the process-wide registry.
    pub fn from_global(schema: Arc<dyn SchemaView>) -> Self {
        Self::new(registry::global(), schema)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn schema(&self) -> &dyn SchemaView {
        self.schema.as_ref()
    }

    /// Reports registered types the schema does not know, registers abstract
    /// types, or disagrees with on the field set.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for name in self.registry.type_names() {
            if !self.schema.has_type(name) {
                errors.push(format!("{name} is registered but absent from the schema"));
                continue;
            }
            if self.schema.is_abstract(name) {
                errors.push(format!("{name} is abstract but registered"));
            }
            if let Some(registration) = self.registry.get(name) {
                if registration.fields() != self.schema.fields_of(name) {
                    errors.push(format!(
                        "{name} field set differs between registry and schema"
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

impl fmt::Debug for RmContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RmContext")
            .field("registered_types", &self.registry.len())
            .finish_non_exhaustive()
    }
}
