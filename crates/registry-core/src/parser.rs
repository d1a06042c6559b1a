//! The schema parser plane contract (§4.1).

use crate::error::Result;
use crate::model::ResolvedReference;
use crate::types::SchemaType;

/// A schema that has been parsed and (optionally) normalized.
///
/// Object-safe so that a [`SchemaParser`] registry can hand back
/// `Box<dyn ParsedSchema>` regardless of the concrete schema-format library
/// backing a given schema type.
pub trait ParsedSchema: Send + Sync {
    /// The schema type this was parsed as.
    fn schema_type(&self) -> SchemaType;

    /// A deterministic, content-addressed fingerprint over the canonicalized
    /// schema text and its fully-resolved reference closure.
    fn fingerprint(&self) -> String;

    /// Canonicalizes field order, namespace qualification, whitespace, etc.
    /// Idempotent: `normalize().normalize() == normalize()`.
    fn normalize(&self) -> Box<dyn ParsedSchema>;

    /// The text form of this parsed schema (normalized iff `self` is the
    /// result of a prior `normalize()` call).
    fn canonical_string(&self) -> String;

    /// Implementation-defined pretty-printing for diagnostic output.
    fn formatted_string(&self, format: &str) -> Result<String>;

    /// Whether this schema declares a top-level field with the given name.
    /// Used by reserved-field validation (§4.5.6). Always `false` for schema
    /// shapes with no notion of top-level fields (e.g. a bare Avro scalar).
    fn has_top_level_field(&self, name: &str) -> bool;
}

/// Per-schema-type parser.
pub trait SchemaParser: Send + Sync {
    /// The schema type this parser handles.
    fn schema_type(&self) -> SchemaType;

    /// Parses `text` given the already-looked-up content of every reference
    /// it declares. Fails with [`crate::Error::InvalidSchema`] on syntactic
    /// errors, unresolved references, or reference cycles.
    fn parse(
        &self,
        text: &str,
        resolved_refs: &[ResolvedReference],
    ) -> Result<Box<dyn ParsedSchema>>;
}
