//! Avro compatibility checking, built on Avro's own schema resolution rules
//! (promotable primitive types, union widening, record field resolution)
//! rather than a bespoke diff algorithm.

use apache_avro::schema::RecordSchema;
use apache_avro::Schema as AvroSchema;

use registry_core::{
    CheckSchema, CompatibilityChecker, CompatibilityLevel, CompatibilityOutcome, Error, Result,
    SchemaType,
};

/// [`CompatibilityChecker`] for Avro.
#[derive(Debug, Default)]
pub struct AvroCompatibilityChecker;

impl AvroCompatibilityChecker {
    /// A new Avro compatibility checker. Stateless; safe to construct freely.
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, schema: &CheckSchema) -> Result<AvroSchema> {
        let mut sources: Vec<&str> = schema.references.iter().map(|r| r.schema.as_str()).collect();
        sources.push(&schema.schema);
        let schemas = AvroSchema::parse_list(&sources)
            .map_err(|e| Error::InvalidSchema(format!("avro: {e}")))?;
        schemas
            .into_iter()
            .last()
            .ok_or_else(|| Error::InvalidSchema("avro: empty schema list".to_string()))
    }

    fn as_record(schema: &AvroSchema) -> Option<&RecordSchema> {
        match schema {
            AvroSchema::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Whether data written with `writer` can be read with `reader`, per
    /// Avro's schema resolution rules.
    fn are_types_compatible(writer: &AvroSchema, reader: &AvroSchema) -> bool {
        match (writer, reader) {
            (AvroSchema::Null, AvroSchema::Null)
            | (AvroSchema::Boolean, AvroSchema::Boolean)
            | (AvroSchema::Int, AvroSchema::Int)
            | (AvroSchema::Long, AvroSchema::Long)
            | (AvroSchema::Float, AvroSchema::Float)
            | (AvroSchema::Double, AvroSchema::Double)
            | (AvroSchema::Bytes, AvroSchema::Bytes)
            | (AvroSchema::String, AvroSchema::String) => true,

            // Promotions allowed by the Avro spec.
            (AvroSchema::Int, AvroSchema::Long)
            | (AvroSchema::Int, AvroSchema::Float)
            | (AvroSchema::Int, AvroSchema::Double)
            | (AvroSchema::Long, AvroSchema::Float)
            | (AvroSchema::Long, AvroSchema::Double)
            | (AvroSchema::Float, AvroSchema::Double)
            | (AvroSchema::String, AvroSchema::Bytes)
            | (AvroSchema::Bytes, AvroSchema::String) => true,

            (AvroSchema::Array(w), AvroSchema::Array(r)) => Self::are_types_compatible(w, r),
            (AvroSchema::Map(w), AvroSchema::Map(r)) => Self::are_types_compatible(w, r),

            (AvroSchema::Union(w), AvroSchema::Union(r)) => w
                .variants()
                .iter()
                .all(|wv| r.variants().iter().any(|rv| Self::are_types_compatible(wv, rv))),
            (w, AvroSchema::Union(r)) => r.variants().iter().any(|rv| Self::are_types_compatible(w, rv)),
            (AvroSchema::Union(w), r) => w.variants().iter().all(|wv| Self::are_types_compatible(wv, r)),

            (AvroSchema::Record(w), AvroSchema::Record(r)) => r.fields.iter().all(|r_field| {
                w.fields
                    .iter()
                    .any(|w_field| w_field.name == r_field.name && Self::are_types_compatible(&w_field.schema, &r_field.schema))
                    || r_field.default.is_some()
            }),

            (AvroSchema::Enum(w), AvroSchema::Enum(r)) => {
                w.symbols.iter().all(|s| r.symbols.contains(s))
            }

            _ => false,
        }
    }

    /// `reader` must be able to decode data written with `writer`. Returns
    /// violation messages; empty means compatible.
    fn check_direction(&self, writer: &AvroSchema, reader: &AvroSchema) -> Vec<String> {
        let mut messages = Vec::new();

        if !Self::are_types_compatible(writer, reader) {
            messages.push("schemas are not compatible per Avro schema resolution rules".to_string());
        }

        if let (Some(w_record), Some(r_record)) = (Self::as_record(writer), Self::as_record(reader)) {
            for w_field in &w_record.fields {
                if !r_record.fields.iter().any(|f| f.name == w_field.name) && w_field.default.is_none() {
                    messages.push(format!(
                        "field '{}' removed without a default value",
                        w_field.name
                    ));
                }
            }
            for r_field in &r_record.fields {
                if !w_record.fields.iter().any(|f| f.name == r_field.name) && r_field.default.is_none() {
                    messages.push(format!(
                        "new field '{}' added without a default value",
                        r_field.name
                    ));
                }
            }
            for r_field in &r_record.fields {
                if let Some(w_field) = w_record.fields.iter().find(|f| f.name == r_field.name) {
                    if !Self::are_types_compatible(&w_field.schema, &r_field.schema) {
                        messages.push(format!("field '{}' changed type incompatibly", r_field.name));
                    }
                }
            }
        }

        messages
    }
}

impl CompatibilityChecker for AvroCompatibilityChecker {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Avro
    }

    fn check(
        &self,
        mode: CompatibilityLevel,
        new_schema: &CheckSchema,
        existing_schemas: &[CheckSchema],
    ) -> Result<CompatibilityOutcome> {
        if mode == CompatibilityLevel::None {
            return Ok(CompatibilityOutcome::compatible());
        }

        let new = self.parse(new_schema)?;
        let mut outcome = CompatibilityOutcome::compatible();

        for existing in existing_schemas {
            let old = self.parse(existing)?;

            if mode.checks_backward() {
                let messages = self.check_direction(&old, &new);
                if !messages.is_empty() {
                    outcome = outcome.and(CompatibilityOutcome::incompatible(messages));
                }
            }
            if mode.checks_forward() {
                let messages = self.check_direction(&new, &old);
                if !messages.is_empty() {
                    outcome = outcome.and(CompatibilityOutcome::incompatible(messages));
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_schema(text: &str) -> CheckSchema {
        CheckSchema {
            schema: text.to_string(),
            references: vec![],
        }
    }

    #[test]
    fn adding_optional_field_is_backward_compatible() {
        let checker = AvroCompatibilityChecker::new();
        let old = check_schema(r#"{"type":"record","name":"R","fields":[{"name":"a","type":"string"}]}"#);
        let new = check_schema(
            r#"{"type":"record","name":"R","fields":[{"name":"a","type":"string"},{"name":"b","type":"string","default":"x"}]}"#,
        );
        let outcome = checker.check(CompatibilityLevel::Backward, &new, &[old]).unwrap();
        assert!(outcome.is_compatible);
    }

    #[test]
    fn removing_field_without_default_breaks_backward_compatibility() {
        let checker = AvroCompatibilityChecker::new();
        let old = check_schema(
            r#"{"type":"record","name":"R","fields":[{"name":"a","type":"string"},{"name":"b","type":"string"}]}"#,
        );
        let new = check_schema(r#"{"type":"record","name":"R","fields":[{"name":"a","type":"string"}]}"#);
        let outcome = checker.check(CompatibilityLevel::Backward, &new, &[old]).unwrap();
        assert!(!outcome.is_compatible);
    }

    #[test]
    fn none_mode_always_compatible() {
        let checker = AvroCompatibilityChecker::new();
        let old = check_schema(r#"{"type":"record","name":"R","fields":[{"name":"a","type":"string"}]}"#);
        let new = check_schema(r#"{"type":"record","name":"R","fields":[{"name":"b","type":"int"}]}"#);
        let outcome = checker.check(CompatibilityLevel::None, &new, &[old]).unwrap();
        assert!(outcome.is_compatible);
    }

    #[test]
    fn int_to_long_promotion_is_compatible() {
        let checker = AvroCompatibilityChecker::new();
        let old = check_schema(r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"#);
        let new = check_schema(r#"{"type":"record","name":"R","fields":[{"name":"a","type":"long"}]}"#);
        let outcome = checker.check(CompatibilityLevel::Backward, &new, &[old]).unwrap();
        assert!(outcome.is_compatible);
    }
}
