//! # Registry Compatibility
//!
//! Format-specific [`registry_core::CompatibilityChecker`] implementations,
//! plus a [`CompatibilityRegistry`] that dispatches on [`SchemaType`].

mod avro;
mod json_schema;
mod protobuf;

use std::collections::HashMap;
use std::sync::Arc;

use registry_core::{CompatibilityChecker, Error, Result, SchemaType};

pub use avro::AvroCompatibilityChecker;
pub use json_schema::JsonSchemaCompatibilityChecker;
pub use protobuf::ProtobufCompatibilityChecker;

/// Maps [`SchemaType`] to the [`CompatibilityChecker`] that handles it.
pub struct CompatibilityRegistry {
    checkers: HashMap<SchemaType, Arc<dyn CompatibilityChecker>>,
}

impl CompatibilityRegistry {
    /// An empty registry with no checkers registered.
    pub fn new() -> Self {
        Self {
            checkers: HashMap::new(),
        }
    }

    /// A registry with the built-in Avro, JSON Schema, and Protobuf checkers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AvroCompatibilityChecker::new()));
        registry.register(Arc::new(JsonSchemaCompatibilityChecker::new()));
        registry.register(Arc::new(ProtobufCompatibilityChecker::new()));
        registry
    }

    /// Registers (or replaces) the checker for its declared schema type.
    pub fn register(&mut self, checker: Arc<dyn CompatibilityChecker>) {
        self.checkers.insert(checker.schema_type(), checker);
    }

    /// Looks up the checker for `schema_type`.
    pub fn get(&self, schema_type: SchemaType) -> Result<Arc<dyn CompatibilityChecker>> {
        self.checkers
            .get(&schema_type)
            .cloned()
            .ok_or_else(|| Error::UnsupportedSchemaType(schema_type.to_string()))
    }
}

impl Default for CompatibilityRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_with_defaults_covers_all_types() {
        let registry = CompatibilityRegistry::with_defaults();
        assert!(registry.get(SchemaType::Avro).is_ok());
        assert!(registry.get(SchemaType::Json).is_ok());
        assert!(registry.get(SchemaType::Protobuf).is_ok());
    }
}
