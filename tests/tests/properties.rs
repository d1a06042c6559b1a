//! The ten universal properties from the design notes, each as its own test.
//! Where a property is naturally parameterized by a count or an index,
//! `proptest` drives it; the others are checked directly.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use registry_compatibility::CompatibilityRegistry;
use registry_core::{CompatibilityLevel, Metadata, Mode, SchemaStorage};
use registry_engine::{RegisterOptions, RegistryEngine, VersionSelector};
use registry_parser::ParserRegistry;
use registry_storage::InMemoryStorage;

const DOT: &str = ".";

fn engine() -> RegistryEngine {
    let storage: Arc<dyn SchemaStorage> = Arc::new(InMemoryStorage::new());
    RegistryEngine::new(
        storage,
        Arc::new(ParserRegistry::with_defaults()),
        Arc::new(CompatibilityRegistry::with_defaults()),
        CompatibilityLevel::Backward,
    )
}

fn record_n(n: usize) -> String {
    let fields: Vec<String> = (0..=n)
        .map(|i| {
            if i == 0 {
                r#"{"name":"f0","type":"int"}"#.to_string()
            } else {
                format!(r#"{{"name":"f{i}","type":"int","default":0}}"#)
            }
        })
        .collect();
    format!(r#"{{"type":"record","name":"Rec","fields":[{}]}}"#, fields.join(","))
}

fn metadata_with(key: &str, value: &str) -> Metadata {
    let mut properties = HashMap::new();
    properties.insert(key.to_string(), value.to_string());
    Metadata { properties, ..Default::default() }
}

#[tokio::test]
async fn property_1_register_is_idempotent_on_identical_inputs() {
    let engine = engine();
    let text = record_n(0);
    let first = engine.register_schema(DOT, "s", "AVRO", &text, vec![], RegisterOptions::default()).await.unwrap();
    let second = engine.register_schema(DOT, "s", "AVRO", &text, vec![], RegisterOptions::default()).await.unwrap();
    assert_eq!((first.id, first.version), (second.id, second.version));
}

proptest! {
    #[test]
    fn property_2_versions_are_strictly_monotonic(count in 1usize..8) {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let engine = engine();
            for i in 0..count {
                let record = engine
                    .register_schema(DOT, "s", "AVRO", &record_n(i), vec![], RegisterOptions::default())
                    .await
                    .unwrap();
                prop_assert_eq!(record.version as usize, i + 1);
            }
            Ok(())
        })?;
    }
}

#[tokio::test]
async fn property_3_lookup_after_register_returns_the_registered_record() {
    let engine = engine();
    let text = record_n(0);
    let registered = engine.register_schema(DOT, "s", "AVRO", &text, vec![], RegisterOptions::default()).await.unwrap();
    let looked_up = engine.lookup_schema(DOT, "s", "AVRO", &text, vec![]).await.unwrap();
    assert_eq!(registered.id, looked_up.id);
    assert_eq!(registered.version, looked_up.version);
}

#[tokio::test]
async fn property_4_stored_text_is_canonicalized_iff_normalize_applied() {
    let engine = engine();
    let text = record_n(0);

    let not_normalized = engine
        .register_schema(DOT, "plain", "AVRO", &text, vec![], RegisterOptions::default())
        .await
        .unwrap();
    assert_eq!(not_normalized.schema, text);

    let normalized = engine
        .register_schema(DOT, "norm", "AVRO", &text, vec![], RegisterOptions { normalize: Some(true), ..Default::default() })
        .await
        .unwrap();
    assert_ne!(normalized.schema, text);
}

#[tokio::test]
async fn property_5_list_subjects_respects_include_deleted() {
    let engine = engine();
    engine.register_schema(DOT, "s", "AVRO", &record_n(0), vec![], RegisterOptions::default()).await.unwrap();
    engine.delete_subject(DOT, "s", false).await.unwrap();

    assert!(!engine.list_subjects(DOT, false).await.unwrap().contains(&"s".to_string()));
    assert!(engine.list_subjects(DOT, true).await.unwrap().contains(&"s".to_string()));
}

#[tokio::test]
async fn property_6_delete_blocked_while_a_live_referent_exists() {
    let engine = engine();
    engine.register_schema(DOT, "base", "AVRO", &record_n(0), vec![], RegisterOptions::default()).await.unwrap();
    let wrapper = r#"{"type":"record","name":"Wrap","fields":[{"name":"b","type":"Rec"}]}"#;
    engine
        .register_schema(
            DOT,
            "dependent",
            "AVRO",
            wrapper,
            vec![registry_core::SchemaReference { name: "Rec".into(), subject: "base".into(), version: 1 }],
            RegisterOptions::default(),
        )
        .await
        .unwrap();

    let err = engine.delete_version(DOT, "base", &VersionSelector::Number(1), false).await.unwrap_err();
    assert!(matches!(err, registry_core::Error::ReferenceExists { .. }));
}

#[tokio::test]
async fn property_7_contexts_are_isolated() {
    let engine = engine();
    engine.register_schema("ctx-a", "s", "AVRO", &record_n(0), vec![], RegisterOptions::default()).await.unwrap();
    assert!(engine.list_subjects("ctx-b", false).await.unwrap().is_empty());
}

#[tokio::test]
async fn property_8_config_cascade_precedence_with_deletes() {
    let engine = engine();
    let ctx = ".c";
    engine
        .set_config("__GLOBAL", None, registry_core::ConfigRecord { compatibility_level: Some(CompatibilityLevel::None), ..Default::default() })
        .await
        .unwrap();
    engine
        .set_config(ctx, Some("s"), registry_core::ConfigRecord { compatibility_level: Some(CompatibilityLevel::Full), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(engine.get_config(ctx, Some("s")).await.unwrap().compatibility_level, Some(CompatibilityLevel::Full));
    engine.delete_config(ctx, Some("s")).await.unwrap();
    assert_eq!(engine.get_config(ctx, Some("s")).await.unwrap().compatibility_level, Some(CompatibilityLevel::None));
}

#[tokio::test]
async fn property_9_readonly_override_is_global() {
    let engine = engine();
    engine.set_mode(DOT, None, Mode::ReadOnlyOverride, true).await.unwrap();
    assert_eq!(engine.get_mode("any-context", Some("any-subject")).await.unwrap(), Mode::ReadOnlyOverride);
}

#[tokio::test]
async fn property_10_confluent_version_cas_requires_exact_next_version() {
    let engine = engine();
    engine.register_schema(DOT, "s", "AVRO", &record_n(0), vec![], RegisterOptions::default()).await.unwrap();
    let opts = RegisterOptions { metadata: Some(metadata_with("confluent:version", "1")), ..Default::default() };
    let err = engine.register_schema(DOT, "s", "AVRO", &record_n(1), vec![], opts).await.unwrap_err();
    assert!(matches!(err, registry_core::Error::VersionConflict { expected: 2, actual: 1 }));
}

