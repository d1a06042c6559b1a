//! Protobuf compatibility checking: field-number-keyed diffing, grounded in
//! the same line-scanning approach used elsewhere for Protobuf (no `protoc`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use registry_core::{
    CheckSchema, CompatibilityChecker, CompatibilityLevel, CompatibilityOutcome, Error, Result,
    SchemaType,
};

static FIELD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:required|optional|repeated)?\s*([A-Za-z_][A-Za-z0-9_.]*)\s+([a-zA-Z_][A-Za-z0-9_]*)\s*=\s*(\d+)\s*[;\[]").unwrap()
});

#[derive(Debug, Clone)]
struct ProtoField {
    field_type: String,
    name: String,
}

fn parse_fields(text: &str) -> HashMap<u32, ProtoField> {
    let mut fields = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("//") || line.starts_with("message") || line.starts_with("enum") {
            continue;
        }
        if let Some(caps) = FIELD_REGEX.captures(line) {
            let number: u32 = match caps[3].parse() {
                Ok(n) => n,
                Err(_) => continue,
            };
            fields.insert(
                number,
                ProtoField {
                    field_type: caps[1].to_string(),
                    name: caps[2].to_string(),
                },
            );
        }
    }
    fields
}

fn types_compatible(old_type: &str, new_type: &str) -> bool {
    if old_type == new_type {
        return true;
    }
    let numeric = ["int32", "uint32", "int64", "uint64", "bool"];
    if numeric.contains(&old_type) && numeric.contains(&new_type) {
        return true;
    }
    matches!(
        (old_type, new_type),
        ("string", "bytes") | ("bytes", "string")
    )
}

/// [`CompatibilityChecker`] for Protobuf.
#[derive(Debug, Default)]
pub struct ProtobufCompatibilityChecker;

impl ProtobufCompatibilityChecker {
    /// A new Protobuf compatibility checker. Stateless; safe to construct freely.
    pub fn new() -> Self {
        Self
    }

    fn parse(&self, schema: &CheckSchema) -> Result<HashMap<u32, ProtoField>> {
        if !FIELD_REGEX.is_match(&schema.schema) && !schema.schema.contains("message") {
            return Err(Error::InvalidSchema("protobuf: no message definition found".to_string()));
        }
        Ok(parse_fields(&schema.schema))
    }

    /// `reader` must decode data written with `writer`: field numbers shared
    /// between the two must keep compatible types; a writer field dropped by
    /// the reader is fine in proto3 (all fields are optional on the wire).
    fn check_direction(&self, writer: &HashMap<u32, ProtoField>, reader: &HashMap<u32, ProtoField>) -> Vec<String> {
        let mut messages = Vec::new();

        for (number, writer_field) in writer {
            if let Some(reader_field) = reader.get(number) {
                if !types_compatible(&writer_field.field_type, &reader_field.field_type) {
                    messages.push(format!(
                        "field number {number} type changed incompatibly: '{}' -> '{}'",
                        writer_field.field_type, reader_field.field_type
                    ));
                }
            }
        }

        messages
    }
}

impl CompatibilityChecker for ProtobufCompatibilityChecker {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Protobuf
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

    fn msg(fields: &str) -> String {
        format!("syntax = \"proto3\";\nmessage M {{\n{fields}\n}}\n")
    }

    #[test]
    fn reusing_field_number_with_incompatible_type_breaks_compatibility() {
        let checker = ProtobufCompatibilityChecker::new();
        let old = check_schema(&msg("  string a = 1;"));
        let new = check_schema(&msg("  int32 a = 1;"));
        let outcome = checker.check(CompatibilityLevel::Backward, &new, &[old]).unwrap();
        assert!(!outcome.is_compatible);
    }

    #[test]
    fn removing_a_field_is_backward_compatible_in_proto3() {
        let checker = ProtobufCompatibilityChecker::new();
        let old = check_schema(&msg("  string a = 1;\n  string b = 2;"));
        let new = check_schema(&msg("  string a = 1;"));
        let outcome = checker.check(CompatibilityLevel::Backward, &new, &[old]).unwrap();
        assert!(outcome.is_compatible);
    }

    #[test]
    fn numeric_type_widening_is_compatible() {
        let checker = ProtobufCompatibilityChecker::new();
        let old = check_schema(&msg("  int32 a = 1;"));
        let new = check_schema(&msg("  int64 a = 1;"));
        let outcome = checker.check(CompatibilityLevel::Backward, &new, &[old]).unwrap();
        assert!(outcome.is_compatible);
    }
}
