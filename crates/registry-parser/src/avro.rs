//! Avro schema parsing, grounded in `apache-avro`'s own schema resolution
//! rather than a hand-rolled Avro parser.

use apache_avro::Schema as AvroSchema;
use registry_core::{Error, ParsedSchema, Result, ResolvedReference, SchemaParser, SchemaType};

use crate::sha256_hex_joined;

/// [`SchemaParser`] for Avro, backed by `apache_avro::Schema`.
#[derive(Debug, Default)]
pub struct AvroParser;

impl AvroParser {
    /// A new Avro parser. Stateless; safe to construct freely.
    pub fn new() -> Self {
        Self
    }
}

impl SchemaParser for AvroParser {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Avro
    }

    fn parse(&self, text: &str, resolved_refs: &[ResolvedReference]) -> Result<Box<dyn ParsedSchema>> {
        // apache_avro resolves named-schema references when earlier entries in
        // the list declare the names later entries use; referenced schemas
        // must therefore be parsed ahead of the schema that imports them.
        let mut sources: Vec<&str> = resolved_refs.iter().map(|r| r.schema.as_str()).collect();
        sources.push(text);

        let schemas = AvroSchema::parse_list(&sources)
            .map_err(|e| Error::InvalidSchema(format!("avro: {e}")))?;

        let schema = schemas
            .into_iter()
            .last()
            .ok_or_else(|| Error::InvalidSchema("avro: empty schema list".to_string()))?;

        Ok(Box::new(AvroParsedSchema {
            schema,
            reference_fingerprints: resolved_refs
                .iter()
                .map(|r| format!("{}:{}", r.reference.subject, r.reference.version))
                .collect(),
            normalized: false,
        }))
    }
}

#[derive(Clone)]
struct AvroParsedSchema {
    schema: AvroSchema,
    reference_fingerprints: Vec<String>,
    normalized: bool,
}

impl ParsedSchema for AvroParsedSchema {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Avro
    }

    fn fingerprint(&self) -> String {
        let canonical = self.schema.canonical_form();
        let mut parts = vec![canonical];
        parts.extend(self.reference_fingerprints.iter().cloned());
        sha256_hex_joined(parts)
    }

    fn normalize(&self) -> Box<dyn ParsedSchema> {
        Box::new(AvroParsedSchema {
            schema: self.schema.clone(),
            reference_fingerprints: self.reference_fingerprints.clone(),
            normalized: true,
        })
    }

    fn canonical_string(&self) -> String {
        if self.normalized {
            self.schema.canonical_form()
        } else {
            serde_json::to_string(&self.schema).unwrap_or_else(|_| self.schema.canonical_form())
        }
    }

    fn formatted_string(&self, format: &str) -> Result<String> {
        match format {
            "json" | "" => serde_json::to_string_pretty(&self.schema)
                .map_err(|e| Error::Internal(e.into())),
            "canonical" => Ok(self.schema.canonical_form()),
            other => Err(Error::InvalidSchema(format!(
                "avro: unsupported format '{other}'"
            ))),
        }
    }

    fn has_top_level_field(&self, name: &str) -> bool {
        match &self.schema {
            AvroSchema::Record(record) => record.fields.iter().any(|f| f.name == name),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_schema(name: &str, field: &str) -> String {
        format!(
            r#"{{"type":"record","name":"{name}","fields":[{{"name":"{field}","type":"string"}}]}}"#
        )
    }

    #[test]
    fn parses_simple_record() {
        let parser = AvroParser::new();
        let parsed = parser.parse(&record_schema("User", "id"), &[]).unwrap();
        assert!(parsed.has_top_level_field("id"));
        assert!(!parsed.has_top_level_field("missing"));
    }

    #[test]
    fn rejects_invalid_schema() {
        let parser = AvroParser::new();
        assert!(parser.parse("{not avro}", &[]).is_err());
    }

    #[test]
    fn fingerprint_is_stable_for_identical_input() {
        let parser = AvroParser::new();
        let text = record_schema("Order", "sku");
        let a = parser.parse(&text, &[]).unwrap();
        let b = parser.parse(&text, &[]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_differs_with_references() {
        let parser = AvroParser::new();
        let text = record_schema("Order", "sku");
        let without_refs = parser.parse(&text, &[]).unwrap();
        let with_refs = parser
            .parse(
                &text,
                &[ResolvedReference {
                    reference: registry_core::SchemaReference {
                        name: "com.example.Money".to_string(),
                        subject: "money".to_string(),
                        version: 1,
                    },
                    schema: r#"{"type":"record","name":"com.example.Money","fields":[{"name":"cents","type":"long"}]}"#.to_string(),
                }],
            )
            .unwrap();
        assert_ne!(without_refs.fingerprint(), with_refs.fingerprint());
    }

    #[test]
    fn normalize_is_idempotent() {
        let parser = AvroParser::new();
        let parsed = parser.parse(&record_schema("User", "id"), &[]).unwrap();
        let once = parsed.normalize();
        let twice = once.normalize();
        assert_eq!(once.canonical_string(), twice.canonical_string());
    }
}
