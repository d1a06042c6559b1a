//! JSON Schema parsing. Syntactic validity is checked with the `jsonschema`
//! crate; canonical ordering falls out of `serde_json::Map`'s default
//! (non-`preserve_order`) `BTreeMap` backing, which sorts keys alphabetically.

use serde_json::Value;

use registry_core::{Error, ParsedSchema, Result, ResolvedReference, SchemaParser, SchemaType};

use crate::sha256_hex_joined;

/// [`SchemaParser`] for JSON Schema.
#[derive(Debug, Default)]
pub struct JsonSchemaParser;

impl JsonSchemaParser {
    /// A new JSON Schema parser. Stateless; safe to construct freely.
    pub fn new() -> Self {
        Self
    }
}

impl SchemaParser for JsonSchemaParser {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Json
    }

    fn parse(&self, text: &str, resolved_refs: &[ResolvedReference]) -> Result<Box<dyn ParsedSchema>> {
        let mut value: Value =
            serde_json::from_str(text).map_err(|e| Error::InvalidSchema(format!("json schema: {e}")))?;

        let mut defs = serde_json::Map::new();
        for r in resolved_refs {
            let referent: Value = serde_json::from_str(&r.schema)
                .map_err(|e| Error::InvalidSchema(format!("json schema reference '{}': {e}", r.reference.name)))?;
            defs.insert(r.reference.name.clone(), referent);
        }
        if !defs.is_empty() {
            if let Value::Object(ref mut map) = value {
                map.insert("$defs".to_string(), Value::Object(defs));
            }
        }

        jsonschema::JSONSchema::compile(&value)
            .map_err(|e| Error::InvalidSchema(format!("json schema: {e}")))?;

        Ok(Box::new(JsonParsedSchema {
            value,
            reference_fingerprints: resolved_refs
                .iter()
                .map(|r| format!("{}:{}", r.reference.subject, r.reference.version))
                .collect(),
        }))
    }
}

#[derive(Clone)]
struct JsonParsedSchema {
    value: Value,
    reference_fingerprints: Vec<String>,
}

impl ParsedSchema for JsonParsedSchema {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Json
    }

    fn fingerprint(&self) -> String {
        let mut parts = vec![self.canonical_string()];
        parts.extend(self.reference_fingerprints.iter().cloned());
        sha256_hex_joined(parts)
    }

    fn normalize(&self) -> Box<dyn ParsedSchema> {
        Box::new(self.clone())
    }

    fn canonical_string(&self) -> String {
        serde_json::to_string(&self.value).unwrap_or_default()
    }

    fn formatted_string(&self, format: &str) -> Result<String> {
        match format {
            "json" | "" => {
                serde_json::to_string_pretty(&self.value).map_err(|e| Error::Internal(e.into()))
            }
            other => Err(Error::InvalidSchema(format!(
                "json schema: unsupported format '{other}'"
            ))),
        }
    }

    fn has_top_level_field(&self, name: &str) -> bool {
        let Value::Object(map) = &self.value else {
            return false;
        };
        if let Some(Value::Object(props)) = map.get("properties") {
            if props.contains_key(name) {
                return true;
            }
        }
        if let Some(Value::Array(required)) = map.get("required") {
            if required.iter().any(|v| v.as_str() == Some(name)) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_schema(field: &str) -> String {
        format!(r#"{{"type":"object","properties":{{"{field}":{{"type":"string"}}}}}}"#)
    }

    #[test]
    fn parses_object_schema() {
        let parser = JsonSchemaParser::new();
        let parsed = parser.parse(&object_schema("id"), &[]).unwrap();
        assert!(parsed.has_top_level_field("id"));
        assert!(!parsed.has_top_level_field("missing"));
    }

    #[test]
    fn rejects_invalid_json() {
        let parser = JsonSchemaParser::new();
        assert!(parser.parse("{not json", &[]).is_err());
    }

    #[test]
    fn canonical_string_sorts_keys() {
        let parser = JsonSchemaParser::new();
        let parsed = parser
            .parse(r#"{"type":"object","title":"a"}"#, &[])
            .unwrap();
        let canonical = parsed.canonical_string();
        assert!(canonical.find("\"title\"").unwrap() < canonical.find("\"type\"").unwrap());
    }

    #[test]
    fn reference_merges_into_defs() {
        let parser = JsonSchemaParser::new();
        let parsed = parser
            .parse(
                r##"{"type":"object","properties":{"amount":{"$ref":"#/$defs/Money"}}}"##,
                &[ResolvedReference {
                    reference: registry_core::SchemaReference {
                        name: "Money".to_string(),
                        subject: "money".to_string(),
                        version: 1,
                    },
                    schema: r#"{"type":"object","properties":{"cents":{"type":"integer"}}}"#
                        .to_string(),
                }],
            )
            .unwrap();
        assert!(parsed.canonical_string().contains("Money"));
    }
}
