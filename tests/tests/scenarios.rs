//! Literal scenario tests (S1-S6): each mirrors one walkthrough from the
//! design notes almost step for step.

use std::sync::Arc;

use registry_compatibility::CompatibilityRegistry;
use registry_core::{CompatibilityLevel, ConfigRecord, Metadata, Mode, SchemaReference, SchemaStorage};
use registry_engine::{RegisterOptions, RegistryEngine, VersionSelector};
use registry_parser::ParserRegistry;
use registry_storage::InMemoryStorage;

const DOT: &str = ".";
const GLOBAL: &str = "__GLOBAL";

fn engine() -> RegistryEngine {
    let storage: Arc<dyn SchemaStorage> = Arc::new(InMemoryStorage::new());
    RegistryEngine::new(
        storage,
        Arc::new(ParserRegistry::with_defaults()),
        Arc::new(CompatibilityRegistry::with_defaults()),
        CompatibilityLevel::Backward,
    )
}

fn record(fields: &str) -> String {
    format!(r#"{{"type":"record","name":"Rec","fields":[{fields}]}}"#)
}

fn metadata_with(key: &str, value: &str) -> Metadata {
    let mut properties = std::collections::HashMap::new();
    properties.insert(key.to_string(), value.to_string());
    Metadata { properties, ..Default::default() }
}

#[tokio::test]
async fn s1_monotonic_versions_across_deletes() {
    let engine = engine();

    let v1 = engine
        .register_schema(DOT, "s", "AVRO", &record(r#"{"name":"id","type":"int"}"#), vec![], RegisterOptions::default())
        .await
        .unwrap();
    assert_eq!((v1.id, v1.version), (1, 1));

    let v2 = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &record(r#"{"name":"id","type":"int"},{"name":"f","type":"string","default":"d"}"#),
            vec![],
            RegisterOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!((v2.id, v2.version), (2, 2));

    let v3 = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &record(
                r#"{"name":"id","type":"int"},{"name":"f","type":"string","default":"d"},{"name":"g","type":"int","default":0}"#,
            ),
            vec![],
            RegisterOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!((v3.id, v3.version), (3, 3));

    engine.delete_version(DOT, "s", &VersionSelector::Number(2), false).await.unwrap();

    let v4 = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &record(
                r#"{"name":"id","type":"int"},{"name":"f","type":"string","default":"d"},{"name":"g","type":"int","default":0},{"name":"h","type":"long","default":0}"#,
            ),
            vec![],
            RegisterOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!((v4.id, v4.version), (4, 4));
}

#[tokio::test]
async fn s2_dedup_with_different_metadata_creates_new_version() {
    let engine = engine();
    let text = record(r#"{"name":"id","type":"int"}"#);

    let first = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &text,
            vec![],
            RegisterOptions { metadata: Some(metadata_with("tier", "bronze")), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(first.version, 1);

    let second = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &text,
            vec![],
            RegisterOptions { metadata: Some(metadata_with("tier", "bronze")), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!((second.id, second.version), (first.id, 1));

    let third = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &text,
            vec![],
            RegisterOptions { metadata: Some(metadata_with("tier", "gold")), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(third.id, first.id);
    assert_eq!(third.version, 2);
}

#[tokio::test]
async fn s3_reference_blocks_soft_delete() {
    let engine = engine();
    engine
        .register_schema(DOT, "base", "AVRO", &record(r#"{"name":"id","type":"int"}"#), vec![], RegisterOptions::default())
        .await
        .unwrap();

    let wrapper = r#"{"type":"record","name":"Wrap","fields":[{"name":"b","type":"Rec"}]}"#;
    engine
        .register_schema(
            DOT,
            "wrap",
            "AVRO",
            wrapper,
            vec![SchemaReference { name: "Rec".into(), subject: "base".into(), version: 1 }],
            RegisterOptions::default(),
        )
        .await
        .unwrap();

    let err = engine.delete_version(DOT, "base", &VersionSelector::Number(1), false).await.unwrap_err();
    assert!(matches!(err, registry_core::Error::ReferenceExists { .. }));

    engine.delete_version(DOT, "wrap", &VersionSelector::Number(1), false).await.unwrap();
    engine.delete_version(DOT, "base", &VersionSelector::Number(1), false).await.unwrap();
}

#[tokio::test]
async fn s4_cascade_fallback() {
    let engine = engine();
    let ctx = ".myctx";

    engine
        .set_config(GLOBAL, None, ConfigRecord { compatibility_level: Some(CompatibilityLevel::None), ..Default::default() })
        .await
        .unwrap();
    engine
        .set_config(ctx, None, ConfigRecord { compatibility_level: Some(CompatibilityLevel::Full), ..Default::default() })
        .await
        .unwrap();
    engine
        .set_config(
            ctx,
            Some("s"),
            ConfigRecord { compatibility_level: Some(CompatibilityLevel::Forward), ..Default::default() },
        )
        .await
        .unwrap();

    assert_eq!(engine.get_config(ctx, Some("s")).await.unwrap().compatibility_level, Some(CompatibilityLevel::Forward));

    engine.delete_config(ctx, Some("s")).await.unwrap();
    assert_eq!(engine.get_config(ctx, Some("s")).await.unwrap().compatibility_level, Some(CompatibilityLevel::Full));

    engine.delete_config(ctx, None).await.unwrap();
    assert_eq!(engine.get_config(ctx, Some("s")).await.unwrap().compatibility_level, Some(CompatibilityLevel::None));

    engine.delete_config(GLOBAL, None).await.unwrap();
    assert_eq!(engine.get_config(ctx, Some("s")).await.unwrap().compatibility_level, Some(CompatibilityLevel::Backward));
}

#[tokio::test]
async fn s5_readonly_override_kill_switch() {
    let engine = engine();

    engine.set_mode(DOT, None, Mode::ReadOnlyOverride, true).await.unwrap();
    engine.set_mode(".x", Some("s"), Mode::ReadWrite, false).await.unwrap();

    assert_eq!(engine.get_mode(".x", Some("s")).await.unwrap(), Mode::ReadOnlyOverride);
}

#[tokio::test]
async fn s6_confluent_version_cas() {
    let engine = engine();
    let v1 = engine
        .register_schema(DOT, "s", "AVRO", &record(r#"{"name":"id","type":"int"}"#), vec![], RegisterOptions::default())
        .await
        .unwrap();
    assert_eq!(v1.version, 1);

    let v2_text = record(r#"{"name":"id","type":"int"},{"name":"f","type":"string","default":"d"}"#);

    let bad = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &v2_text,
            vec![],
            RegisterOptions { metadata: Some(metadata_with("confluent:version", "3")), ..Default::default() },
        )
        .await
        .unwrap_err();
    assert!(matches!(bad, registry_core::Error::VersionConflict { expected: 2, actual: 3 }));

    let good = engine
        .register_schema(
            DOT,
            "s",
            "AVRO",
            &v2_text,
            vec![],
            RegisterOptions { metadata: Some(metadata_with("confluent:version", "2")), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(good.version, 2);
}
