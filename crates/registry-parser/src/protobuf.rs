//! Protobuf schema parsing.
//!
//! There is no `protoc` dependency here: schemas are scanned textually with
//! the same regex-based approach used for Protobuf validation elsewhere in
//! this codebase, extracting just enough structure (package, first message,
//! its fields) to fingerprint and apply compatibility rules.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use registry_core::{Error, ParsedSchema, Result, ResolvedReference, SchemaParser, SchemaType};

use crate::sha256_hex_joined;

static PACKAGE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"package\s+([a-zA-Z0-9_.]+)\s*;").unwrap());
static MESSAGE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"message\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{").unwrap());
static FIELD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:required|optional|repeated)?\s*([A-Za-z_][A-Za-z0-9_.]*)\s+([a-zA-Z_][A-Za-z0-9_]*)\s*=\s*(\d+)\s*[;\[]").unwrap()
});

/// One scanned field within a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProtoField {
    field_type: String,
    name: String,
    number: u32,
}

/// [`SchemaParser`] for Protobuf, using a descriptor-shape text scan.
#[derive(Debug, Default)]
pub struct ProtobufParser;

impl ProtobufParser {
    /// A new Protobuf parser. Stateless; safe to construct freely.
    pub fn new() -> Self {
        Self
    }

    fn scan_message_body(text: &str, message_start: usize) -> (String, Vec<ProtoField>) {
        // Walk from the '{' that opens the message to its matching '}',
        // tracking brace depth so nested messages/enums don't terminate early.
        let bytes = text.as_bytes();
        let open = text[message_start..].find('{').map(|i| message_start + i).unwrap_or(message_start);
        let mut depth = 0i32;
        let mut end = open;
        for (i, &b) in bytes[open..].iter().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = open + i;
                        break;
                    }
                }
                _ => {}
            }
        }
        let body = &text[open + 1..end];

        let mut fields = Vec::new();
        for line in body.lines() {
            let line = line.trim();
            if line.starts_with("message") || line.starts_with("enum") || line.starts_with("//") {
                continue;
            }
            if let Some(caps) = FIELD_REGEX.captures(line) {
                let field_type = caps[1].to_string();
                let name = caps[2].to_string();
                let number: u32 = caps[3].parse().unwrap_or_default();
                fields.push(ProtoField { field_type, name, number });
            }
        }
        (body.to_string(), fields)
    }
}

impl SchemaParser for ProtobufParser {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Protobuf
    }

    fn parse(&self, text: &str, resolved_refs: &[ResolvedReference]) -> Result<Box<dyn ParsedSchema>> {
        let message_match = MESSAGE_REGEX
            .captures(text)
            .ok_or_else(|| Error::InvalidSchema("protobuf: no message definition found".to_string()))?;
        let message_name = message_match[1].to_string();
        let message_start = message_match.get(0).unwrap().start();

        let (_, fields) = Self::scan_message_body(text, message_start);

        let mut by_number: BTreeMap<u32, &ProtoField> = BTreeMap::new();
        for field in &fields {
            if by_number.insert(field.number, field).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "protobuf: duplicate field number {} in message '{}'",
                    field.number, message_name
                )));
            }
        }

        let package = PACKAGE_REGEX
            .captures(text)
            .map(|c| c[1].to_string());

        Ok(Box::new(ProtobufParsedSchema {
            package,
            message_name,
            fields: by_number.into_values().cloned().collect(),
            reference_fingerprints: resolved_refs
                .iter()
                .map(|r| format!("{}:{}:{}", r.reference.subject, r.reference.version, r.schema))
                .collect(),
        }))
    }
}

#[derive(Clone)]
struct ProtobufParsedSchema {
    package: Option<String>,
    message_name: String,
    fields: Vec<ProtoField>,
    reference_fingerprints: Vec<String>,
}

impl ParsedSchema for ProtobufParsedSchema {
    fn schema_type(&self) -> SchemaType {
        SchemaType::Protobuf
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
        let mut out = String::new();
        if let Some(package) = &self.package {
            out.push_str(&format!("package {package};\n"));
        }
        out.push_str(&format!("message {} {{\n", self.message_name));
        for field in &self.fields {
            out.push_str(&format!(
                "  {} {} = {};\n",
                field.field_type, field.name, field.number
            ));
        }
        out.push_str("}\n");
        out
    }

    fn formatted_string(&self, format: &str) -> Result<String> {
        match format {
            "proto" | "" => Ok(self.canonical_string()),
            other => Err(Error::InvalidSchema(format!(
                "protobuf: unsupported format '{other}'"
            ))),
        }
    }

    fn has_top_level_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(fields: &str) -> String {
        format!("syntax = \"proto3\";\npackage example;\nmessage User {{\n{fields}\n}}\n")
    }

    #[test]
    fn parses_message_fields() {
        let parser = ProtobufParser::new();
        let parsed = parser
            .parse(&schema("  int64 id = 1;\n  string name = 2;"), &[])
            .unwrap();
        assert!(parsed.has_top_level_field("id"));
        assert!(parsed.has_top_level_field("name"));
        assert!(!parsed.has_top_level_field("missing"));
    }

    #[test]
    fn rejects_schema_without_message() {
        let parser = ProtobufParser::new();
        assert!(parser.parse("syntax = \"proto3\";\n", &[]).is_err());
    }

    #[test]
    fn rejects_duplicate_field_numbers() {
        let parser = ProtobufParser::new();
        let result = parser.parse(&schema("  int64 id = 1;\n  string other = 1;"), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn canonical_string_orders_fields_by_number() {
        let parser = ProtobufParser::new();
        let parsed = parser
            .parse(&schema("  string b = 2;\n  string a = 1;"), &[])
            .unwrap();
        let canonical = parsed.canonical_string();
        assert!(canonical.find("= 1;").unwrap() < canonical.find("= 2;").unwrap());
    }

    #[test]
    fn fingerprint_differs_with_references() {
        let parser = ProtobufParser::new();
        let text = schema("  int64 id = 1;");
        let without_refs = parser.parse(&text, &[]).unwrap();
        let with_refs = parser
            .parse(
                &text,
                &[ResolvedReference {
                    reference: registry_core::SchemaReference {
                        name: "other.proto".to_string(),
                        subject: "other".to_string(),
                        version: 1,
                    },
                    schema: "message Other { int64 x = 1; }".to_string(),
                }],
            )
            .unwrap();
        assert_ne!(without_refs.fingerprint(), with_refs.fingerprint());
    }
}
