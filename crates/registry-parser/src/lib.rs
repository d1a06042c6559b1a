//! # Registry Parser
//!
//! Format-specific implementations of the [`registry_core::SchemaParser`] /
//! [`registry_core::ParsedSchema`] contract, plus a small [`ParserRegistry`]
//! that dispatches on [`SchemaType`].

mod avro;
mod json_schema;
mod protobuf;

use std::collections::HashMap;
use std::sync::Arc;

use registry_core::{Error, ParsedSchema, Result, SchemaParser, SchemaType};

pub use avro::AvroParser;
pub use json_schema::JsonSchemaParser;
pub use protobuf::ProtobufParser;

/// Maps [`SchemaType`] to the [`SchemaParser`] that handles it.
///
/// Built once at startup with [`ParserRegistry::with_defaults`] and shared
/// behind an `Arc` by the engine.
pub struct ParserRegistry {
    parsers: HashMap<SchemaType, Arc<dyn SchemaParser>>,
}

impl ParserRegistry {
    /// An empty registry with no parsers registered.
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// A registry with the built-in Avro, JSON Schema, and Protobuf parsers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AvroParser::new()));
        registry.register(Arc::new(JsonSchemaParser::new()));
        registry.register(Arc::new(ProtobufParser::new()));
        registry
    }

    /// Registers (or replaces) the parser for its declared schema type.
    pub fn register(&mut self, parser: Arc<dyn SchemaParser>) {
        self.parsers.insert(parser.schema_type(), parser);
    }

    /// Looks up the parser for `schema_type`.
    pub fn get(&self, schema_type: SchemaType) -> Result<Arc<dyn SchemaParser>> {
        self.parsers
            .get(&schema_type)
            .cloned()
            .ok_or_else(|| Error::UnsupportedSchemaType(schema_type.to_string()))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Computes the sha256 hex digest of `parts` joined by `\n`, used by every
/// format-specific fingerprint so that reference content participates in the
/// content address.
pub(crate) fn sha256_hex_joined(parts: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(part.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_with_defaults_covers_all_types() {
        let registry = ParserRegistry::with_defaults();
        assert!(registry.get(SchemaType::Avro).is_ok());
        assert!(registry.get(SchemaType::Json).is_ok());
        assert!(registry.get(SchemaType::Protobuf).is_ok());
    }

    #[test]
    fn empty_registry_rejects_lookups() {
        let registry = ParserRegistry::new();
        assert!(registry.get(SchemaType::Avro).is_err());
    }
}
