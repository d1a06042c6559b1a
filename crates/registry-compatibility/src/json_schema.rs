//! JSON Schema compatibility checking: structural diffing over `properties`,
//! `required`, and `type`, grounded in the same rule set Confluent applies
//! (no removed required fields, no narrowed types, no added required fields).

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use registry_core::{
    CheckSchema, CompatibilityChecker, CompatibilityLevel, CompatibilityOutcome, Error, Result,
    SchemaType,
};

/// [`CompatibilityChecker`] for JSON Schema.
#[derive(Debug, Default)]
pub struct JsonSchemaCompatibilityChecker;

impl JsonSchemaCompatibilityChecker {
    /// A new JSON Schema compatibility checker. Stateless; safe to construct freely.
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, schema: &CheckSchema) -> Result<Value> {
        let mut value: Value = serde_json::from_str(&schema.schema)
            .map_err(|e| Error::InvalidSchema(format!("json schema: {e}")))?;

        if !schema.references.is_empty() {
            let mut defs = serde_json::Map::new();
            for r in &schema.references {
                let referent: Value = serde_json::from_str(&r.schema)
                    .map_err(|e| Error::InvalidSchema(format!("json schema reference: {e}")))?;
                defs.insert(r.reference.name.clone(), referent);
            }
            if let Value::Object(ref mut map) = value {
                map.insert("$defs".to_string(), Value::Object(defs));
            }
        }

        Ok(value)
    }

    fn properties(schema: &Value) -> HashMap<String, Value> {
        schema
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn required(schema: &Value) -> HashSet<String> {
        schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }

    fn has_default(field: &Value) -> bool {
        field.get("default").is_some()
    }

    fn types_compatible(old_type: &Value, new_type: &Value) -> bool {
        if old_type == new_type {
            return true;
        }
        let (old_s, new_s) = (old_type.as_str().unwrap_or(""), new_type.as_str().unwrap_or(""));
        matches!((old_s, new_s), ("integer", "number") | ("number", "number"))
    }

    /// `reader` must accept every field `writer` produced. Returns violation
    /// messages; empty means compatible.
    fn check_direction(&self, writer: &Value, reader: &Value) -> Vec<String> {
        let mut messages = Vec::new();

        let writer_props = Self::properties(writer);
        let reader_props = Self::properties(reader);
        let reader_required = Self::required(reader);
        let writer_required = Self::required(writer);

        for (name, field) in &writer_props {
            if !reader_props.contains_key(name) && !Self::has_default(field) {
                messages.push(format!("field '{name}' removed without a default value"));
            }
        }

        for (name, field) in &reader_props {
            if let Some(old_field) = writer_props.get(name) {
                if let (Some(old_type), Some(new_type)) = (old_field.get("type"), field.get("type")) {
                    if !Self::types_compatible(old_type, new_type) {
                        messages.push(format!("field '{name}' changed type incompatibly"));
                    }
                }
            } else if reader_required.contains(name) && !Self::has_default(field) {
                messages.push(format!("new required field '{name}' added without a default value"));
            }
        }

        for name in &reader_required {
            if !writer_required.contains(name) && writer_props.contains_key(name) {
                messages.push(format!("field '{name}' made required"));
            }
        }

        messages
    }
}

impl CompatibilityChecker for JsonSchemaCompatibilityChecker {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Json
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
