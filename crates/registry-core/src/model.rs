//! The schema/version/reference/config/mode data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CompatibilityLevel, SchemaType};

/// Reserved context holding cross-context default config/mode. Never holds schemas
/// and is filtered from public context listings.
pub const GLOBAL_CONTEXT: &str = "__GLOBAL";

/// The default (unnamed) context.
pub const DEFAULT_CONTEXT: &str = ".";

/// Metadata property key used as an optimistic-concurrency control channel and,
/// on the response path, as a decoration of the assigned version.
pub const CONFLUENT_VERSION_KEY: &str = "confluent:version";

/// Metadata property key naming a comma-separated reserved-field list.
pub const CONFLUENT_RESERVED_KEY: &str = "confluent:reserved";

/// A named reference from one schema to another, scoped to the same context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    /// The symbol used inside the referring schema's text (Avro full name,
    /// Protobuf import path, JSON Schema `$ref` target).
    pub name: String,
    /// Subject of the referenced version.
    pub subject: String,
    /// Version of the referenced version.
    pub version: i32,
}

/// A [`SchemaReference`] together with the full schema text of the referent,
/// as produced by the reference resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReference {
    /// The reference this resolves.
    pub reference: SchemaReference,
    /// The referent's schema text at resolution time.
    pub schema: String,
}

/// Schema metadata: free-form properties, tags, and a sensitive-field list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Arbitrary key/value properties (includes the transient `confluent:version`
    /// and `confluent:reserved` control channels).
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Tag lists keyed by tag namespace.
    #[serde(default)]
    pub tags: HashMap<String, Vec<String>>,
    /// Field/property names that should be treated as sensitive.
    #[serde(default)]
    pub sensitive: Vec<String>,
}

impl Metadata {
    /// Returns a copy of this metadata with `confluent:version` removed.
    pub fn without_confluent_version(&self) -> Metadata {
        let mut m = self.clone();
        m.properties.remove(CONFLUENT_VERSION_KEY);
        m
    }

    /// Returns a copy of this metadata with `confluent:version` set to `version`.
    pub fn with_confluent_version(&self, version: i32) -> Metadata {
        let mut m = self.clone();
        m.properties
            .insert(CONFLUENT_VERSION_KEY.to_string(), version.to_string());
        m
    }

    /// Parses the `confluent:reserved` property into a field name list.
    pub fn reserved_fields(&self) -> Vec<String> {
        self.properties
            .get(CONFLUENT_RESERVED_KEY)
            .map(|s| {
                s.split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Three-/two-layer merge: `self` is the lower layer, `other` wins per key.
    ///
    /// `properties` and `tags` use right-hand-wins-per-key; `sensitive` is a
    /// deduplicated union preserving first-seen order.
    pub fn merge(&self, other: &Metadata) -> Metadata {
        let mut properties = self.properties.clone();
        for (k, v) in &other.properties {
            properties.insert(k.clone(), v.clone());
        }

        let mut tags = self.tags.clone();
        for (k, v) in &other.tags {
            tags.insert(k.clone(), v.clone());
        }

        let mut sensitive = Vec::new();
        for s in self.sensitive.iter().chain(other.sensitive.iter()) {
            if !sensitive.contains(s) {
                sensitive.push(s.clone());
            }
        }

        Metadata {
            properties,
            tags,
            sensitive,
        }
    }

    /// Whether this metadata has no content at all.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.tags.is_empty() && self.sensitive.is_empty()
    }
}

/// A single migration/domain/encoding rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique name within its rule list; merge key for the 3-layer merge.
    pub name: String,
    /// Human-readable documentation.
    #[serde(default)]
    pub doc: Option<String>,
    /// Rule kind (e.g. `TRANSFORM`, `CONDITION`).
    #[serde(default)]
    pub kind: Option<String>,
    /// Rule mode (e.g. `UPGRADE`, `DOWNGRADE`, `UPDOWN`, `WRITE`, `READ`).
    #[serde(default)]
    pub mode: Option<String>,
    /// The rule engine type (e.g. `CEL`, `JSONATA`).
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Rule engine parameters.
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// The rule expression.
    #[serde(default)]
    pub expr: Option<String>,
    /// What to do on success.
    #[serde(default)]
    pub on_success: Option<String>,
    /// What to do on failure.
    #[serde(default)]
    pub on_failure: Option<String>,
    /// Whether this rule is currently disabled.
    #[serde(default)]
    pub disabled: bool,
}

/// Ordered lists of rules applied at different points in the encode/decode path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules run during schema migration between versions.
    #[serde(default)]
    pub migration_rules: Vec<Rule>,
    /// Domain validation rules.
    #[serde(default)]
    pub domain_rules: Vec<Rule>,
    /// Wire encoding rules.
    #[serde(default)]
    pub encoding_rules: Vec<Rule>,
}

impl RuleSet {
    fn merge_rule_list(base: &[Rule], over: &[Rule]) -> Vec<Rule> {
        let mut merged: Vec<Rule> = Vec::with_capacity(base.len() + over.len());
        for rule in base {
            match over.iter().find(|r| r.name == rule.name) {
                Some(replacement) => merged.push(replacement.clone()),
                None => merged.push(rule.clone()),
            }
        }
        for rule in over {
            if !merged.iter().any(|r| r.name == rule.name) {
                merged.push(rule.clone());
            }
        }
        merged
    }

    /// Three-/two-layer merge by rule `name`: `other` rules replace same-named
    /// `self` rules; `other`-only rules are appended, in `other`'s order.
    pub fn merge(&self, other: &RuleSet) -> RuleSet {
        RuleSet {
            migration_rules: Self::merge_rule_list(&self.migration_rules, &other.migration_rules),
            domain_rules: Self::merge_rule_list(&self.domain_rules, &other.domain_rules),
            encoding_rules: Self::merge_rule_list(&self.encoding_rules, &other.encoding_rules),
        }
    }

    /// Whether every rule list is empty.
    pub fn is_empty(&self) -> bool {
        self.migration_rules.is_empty() && self.domain_rules.is_empty() && self.encoding_rules.is_empty()
    }
}

/// One version within a subject, scoped to a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Unique within a context; allocated from the per-context monotonic sequence.
    pub id: i64,
    /// The subject this version belongs to.
    pub subject: String,
    /// 1-based, strictly monotonically increasing, never reused.
    pub version: i32,
    /// Serialization format.
    pub schema_type: SchemaType,
    /// The schema text: canonicalized if normalize was applied, else verbatim.
    pub schema: String,
    /// Content-addressed identifier over the resolved schema.
    pub fingerprint: String,
    /// Ordered references to other schemas.
    #[serde(default)]
    pub references: Vec<SchemaReference>,
    /// Optional metadata.
    #[serde(default)]
    pub metadata: Option<Metadata>,
    /// Optional rule set.
    #[serde(default)]
    pub rule_set: Option<RuleSet>,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
}

impl SchemaRecord {
    /// Returns a copy of this record with `confluent:version` populated in its
    /// metadata, creating metadata if there was none. The stored record itself
    /// is never mutated by this call.
    pub fn with_confluent_version_decoration(&self) -> SchemaRecord {
        let mut copy = self.clone();
        let base = copy.metadata.take().unwrap_or_default();
        copy.metadata = Some(base.with_confluent_version(copy.version));
        copy
    }
}

/// Compatibility settings at one level of the 4-tier hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Compatibility level to enforce at this level.
    #[serde(default)]
    pub compatibility_level: Option<CompatibilityLevel>,
    /// Tri-state: whether to normalize schemas at register time.
    #[serde(default)]
    pub normalize: Option<bool>,
    /// Tri-state: whether to run reserved-field validation at register time.
    #[serde(default)]
    pub validate_fields: Option<bool>,
    /// Names a metadata property key used to partition the compatibility check set.
    #[serde(default)]
    pub compatibility_group: Option<String>,
    /// Base layer of the metadata 3-layer merge.
    #[serde(default)]
    pub default_metadata: Option<Metadata>,
    /// Top layer of the metadata 3-layer merge.
    #[serde(default)]
    pub override_metadata: Option<Metadata>,
    /// Base layer of the ruleSet 3-layer merge.
    #[serde(default)]
    pub default_rule_set: Option<RuleSet>,
    /// Top layer of the ruleSet 3-layer merge.
    #[serde(default)]
    pub override_rule_set: Option<RuleSet>,
    /// Opaque subject alias; the engine never interprets this.
    #[serde(default)]
    pub alias: Option<String>,
}

/// The mode in effect at one level of the 4-tier hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRecord {
    /// The stored mode value.
    pub mode: crate::types::Mode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(k: &str, v: &str) -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert(k.to_string(), v.to_string());
        m
    }

    #[test]
    fn metadata_merge_right_wins_per_key() {
        let base = Metadata {
            properties: prop("tier", "bronze"),
            ..Default::default()
        };
        let over = Metadata {
            properties: prop("tier", "gold"),
            ..Default::default()
        };
        let merged = base.merge(&over);
        assert_eq!(merged.properties.get("tier"), Some(&"gold".to_string()));
    }

    #[test]
    fn metadata_merge_sensitive_union_preserves_order() {
        let base = Metadata {
            sensitive: vec!["ssn".into(), "dob".into()],
            ..Default::default()
        };
        let over = Metadata {
            sensitive: vec!["dob".into(), "email".into()],
            ..Default::default()
        };
        let merged = base.merge(&over);
        assert_eq!(merged.sensitive, vec!["ssn", "dob", "email"]);
    }

    #[test]
    fn metadata_three_layer_merge_overlapping_keys() {
        let default_md = Metadata {
            properties: prop("owner", "team-a"),
            ..Default::default()
        };
        let specific_md = Metadata {
            properties: {
                let mut m = prop("owner", "team-b");
                m.insert("tier".into(), "silver".into());
                m
            },
            ..Default::default()
        };
        let override_md = Metadata {
            properties: prop("tier", "gold"),
            ..Default::default()
        };

        let merged = default_md.merge(&specific_md).merge(&override_md);
        assert_eq!(merged.properties.get("owner"), Some(&"team-b".to_string()));
        assert_eq!(merged.properties.get("tier"), Some(&"gold".to_string()));
    }

    #[test]
    fn ruleset_merge_by_name_with_append() {
        let base = RuleSet {
            migration_rules: vec![Rule {
                name: "r1".into(),
                doc: None,
                kind: None,
                mode: None,
                rule_type: "CEL".into(),
                tags: vec![],
                params: HashMap::new(),
                expr: Some("true".into()),
                on_success: None,
                on_failure: None,
                disabled: false,
            }],
            ..Default::default()
        };
        let over = RuleSet {
            migration_rules: vec![
                Rule {
                    name: "r1".into(),
                    doc: None,
                    kind: None,
                    mode: None,
                    rule_type: "CEL".into(),
                    tags: vec![],
                    params: HashMap::new(),
                    expr: Some("false".into()),
                    on_success: None,
                    on_failure: None,
                    disabled: false,
                },
                Rule {
                    name: "r2".into(),
                    doc: None,
                    kind: None,
                    mode: None,
                    rule_type: "CEL".into(),
                    tags: vec![],
                    params: HashMap::new(),
                    expr: Some("true".into()),
                    on_success: None,
                    on_failure: None,
                    disabled: false,
                },
            ],
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert_eq!(merged.migration_rules.len(), 2);
        assert_eq!(merged.migration_rules[0].expr, Some("false".into()));
        assert_eq!(merged.migration_rules[1].name, "r2");
    }

    #[test]
    fn reserved_fields_parses_comma_separated() {
        let md = Metadata {
            properties: prop(CONFLUENT_RESERVED_KEY, "id, legacy_field ,other"),
            ..Default::default()
        };
        assert_eq!(
            md.reserved_fields(),
            vec!["id".to_string(), "legacy_field".to_string(), "other".to_string()]
        );
    }

    #[test]
    fn confluent_version_decoration_does_not_mutate_original() {
        let record = SchemaRecord {
            id: 1,
            subject: "s".into(),
            version: 3,
            schema_type: SchemaType::Avro,
            schema: "{}".into(),
            fingerprint: "fp".into(),
            references: vec![],
            metadata: None,
            rule_set: None,
            deleted: false,
        };
        let decorated = record.with_confluent_version_decoration();
        assert!(record.metadata.is_none());
        assert_eq!(
            decorated
                .metadata
                .unwrap()
                .properties
                .get(CONFLUENT_VERSION_KEY),
            Some(&"3".to_string())
        );
    }
}
