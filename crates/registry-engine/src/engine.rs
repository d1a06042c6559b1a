//! The registry engine (§4.5): the orchestration layer wiring the parser
//! plane, compatibility plane, cascade resolver, and reference resolver
//! together against a [`SchemaStorage`] backend.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use registry_compatibility::CompatibilityRegistry;
use registry_core::storage::NewSchema;
use registry_core::{
    CheckSchema, CompatibilityLevel, ConfigRecord, Error, ListFilter, Metadata, Mode, ModeRecord,
    Result, RuleSet, SchemaReference, SchemaRecord, SchemaStorage, SchemaType,
};
use registry_parser::ParserRegistry;

use crate::cascade::CascadeResolver;
use crate::reference_resolver::ReferenceResolver;

/// Content fingerprint for batch-imported items, which bypass the parser
/// plane entirely (§4.5.3): a plain digest over the verbatim schema text,
/// since there is no canonicalized form to hash against.
fn raw_fingerprint(schema_text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(schema_text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Optional per-call overrides for [`RegistryEngine::register_schema`].
/// Any field left `None` falls back to the cascaded config.
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Overrides the cascaded `normalize` flag for this call only.
    pub normalize: Option<bool>,
    /// Schema-specific metadata (the middle layer of the 3-layer merge).
    pub metadata: Option<Metadata>,
    /// Schema-specific rule set (the middle layer of the 3-layer merge).
    pub rule_set: Option<RuleSet>,
}

/// A single item in a batch [`RegistryEngine::import_schemas`] call.
#[derive(Debug, Clone)]
pub struct ImportItem {
    /// Caller-specified ID; must be positive.
    pub id: i64,
    /// Subject to import into.
    pub subject: String,
    /// Caller-specified version; must be positive.
    pub version: i32,
    /// Raw schema type string (empty defaults to Avro).
    pub schema_type: String,
    /// Schema text, verbatim.
    pub schema: String,
    /// Declared references.
    pub references: Vec<SchemaReference>,
    /// Metadata, stored as given with no merge applied.
    pub metadata: Option<Metadata>,
    /// RuleSet, stored as given with no merge applied.
    pub rule_set: Option<RuleSet>,
}

/// The outcome of importing a single [`ImportItem`].
#[derive(Debug, Clone)]
pub struct ImportItemResult {
    /// ID of the item this result corresponds to.
    pub id: i64,
    /// Subject of the item this result corresponds to.
    pub subject: String,
    /// Version of the item this result corresponds to.
    pub version: i32,
    /// Whether the item was imported.
    pub success: bool,
    /// Failure detail, present iff `success` is `false`.
    pub error: Option<String>,
}

/// Which schemas to resolve a version selector against, used by
/// [`RegistryEngine::delete_schema`], [`RegistryEngine::check_compatibility`].
#[derive(Debug, Clone)]
pub enum VersionSelector {
    /// The highest non-deleted version.
    Latest,
    /// A specific version number.
    Number(i32),
    /// Every non-deleted version (only meaningful for compatibility checks).
    All,
}

impl VersionSelector {
    /// Parses the wire-level selector convention: `"latest"`, an empty
    /// string (meaning "all"), or a decimal version number.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "latest" => Ok(VersionSelector::Latest),
            "" => Ok(VersionSelector::All),
            other => other
                .parse::<i32>()
                .map(VersionSelector::Number)
                .map_err(|_| Error::InvalidSchema(format!("invalid version selector: {other}"))),
        }
    }
}

/// The registry engine: the single entry point orchestrating parsing,
/// compatibility checking, reference resolution, and cascaded config/mode
/// against a [`SchemaStorage`] backend.
pub struct RegistryEngine {
    storage: Arc<dyn SchemaStorage>,
    parsers: Arc<ParserRegistry>,
    checkers: Arc<CompatibilityRegistry>,
    cascade: CascadeResolver,
    references: ReferenceResolver,
    default_compatibility: CompatibilityLevel,
}

impl RegistryEngine {
    /// Builds an engine over `storage`, using `default_compatibility` as the
    /// server-level fallback when no tier of the cascade sets one.
    pub fn new(
        storage: Arc<dyn SchemaStorage>,
        parsers: Arc<ParserRegistry>,
        checkers: Arc<CompatibilityRegistry>,
        default_compatibility: CompatibilityLevel,
    ) -> Self {
        Self {
            cascade: CascadeResolver::new(storage.clone()),
            references: ReferenceResolver::new(storage.clone()),
            storage,
            parsers,
            checkers,
            default_compatibility,
        }
    }

    /// Registers a new schema version under `subject`, or returns the
    /// existing version if its content already matches (§4.5.1).
    #[instrument(skip(self, schema_text, references, opts), fields(context, subject))]
    pub async fn register_schema(
        &self,
        context: &str,
        subject: &str,
        schema_type_raw: &str,
        schema_text: &str,
        references: Vec<SchemaReference>,
        opts: RegisterOptions,
    ) -> Result<SchemaRecord> {
        let schema_type = SchemaType::from_wire(schema_type_raw)?;
        let parser = self.parsers.get(schema_type)?;

        let resolved_refs = self.references.resolve(context, &references).await?;
        let mut parsed = parser.parse(schema_text, &resolved_refs)?;

        let normalize = match opts.normalize {
            Some(n) => n,
            None => self.cascade.resolve_normalize(context, subject).await?,
        };
        let mut text = schema_text.to_string();
        if normalize {
            parsed = parsed.normalize();
            text = parsed.canonical_string();
        }
        let fingerprint = parsed.fingerprint();

        if let Some(existing) = self
            .storage
            .get_schema_by_fingerprint(context, subject, &fingerprint, false)
            .await?
        {
            let incoming_md = opts.metadata.clone().unwrap_or_default().without_confluent_version();
            let existing_md = existing.metadata.clone().unwrap_or_default().without_confluent_version();
            if existing_md == incoming_md && existing.rule_set == opts.rule_set {
                debug!(id = existing.id, version = existing.version, "dedup hit, returning existing version");
                return Ok(existing.with_confluent_version_decoration());
            }
        }

        let level = self.cascade.resolve_compatibility_level(context, subject, self.default_compatibility).await?;
        if level != CompatibilityLevel::None {
            self.check_register_compatibility(context, subject, schema_type, &text, &resolved_refs, level, &opts).await?;
        }

        if self.cascade.resolve_validate_fields(context, subject).await? {
            self.validate_reserved_fields(context, subject, parsed.as_ref(), &opts).await?;
        }

        if let Some(version_claim) = opts
            .metadata
            .as_ref()
            .and_then(|m| m.properties.get(registry_core::CONFLUENT_VERSION_KEY))
            .and_then(|v| v.parse::<i32>().ok())
        {
            self.check_confluent_version_cas(context, subject, version_claim).await?;
        }

        let previous = self.storage.get_schemas_by_subject(context, subject, false).await.ok();
        let previous_latest = previous.as_ref().and_then(|v| v.iter().max_by_key(|r| r.version));

        let specific_metadata = opts.metadata.clone().or_else(|| previous_latest.and_then(|r| r.metadata.clone()));
        let specific_rule_set = opts.rule_set.clone().or_else(|| previous_latest.and_then(|r| r.rule_set.clone()));

        let merged_metadata = self
            .cascade
            .merge_metadata(context, subject, specific_metadata.as_ref())
            .await?
            .map(|m| m.without_confluent_version());
        let merged_rule_set = self.cascade.merge_rule_set(context, subject, specific_rule_set.as_ref()).await?;

        let fingerprint_for_refetch = fingerprint.clone();
        let new_schema = NewSchema {
            subject: subject.to_string(),
            schema_type,
            schema: text,
            fingerprint,
            references,
            metadata: merged_metadata,
            rule_set: merged_rule_set,
        };

        match self.storage.create_schema(context, new_schema).await {
            Ok(record) => Ok(record.with_confluent_version_decoration()),
            Err(registry_core::StorageError::SchemaExists) => {
                // Lost a race with a concurrent writer that committed the same
                // (subject, fingerprint, metadata, ruleSet) tuple first.
                let refetched = self
                    .storage
                    .get_schema_by_fingerprint(context, subject, &fingerprint_for_refetch, false)
                    .await
                    .ok()
                    .flatten();
                match refetched {
                    Some(record) => Ok(record.with_confluent_version_decoration()),
                    None => Err(Error::Storage(registry_core::StorageError::SchemaExists)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn check_register_compatibility(
        &self,
        context: &str,
        subject: &str,
        schema_type: SchemaType,
        new_text: &str,
        new_refs: &[registry_core::ResolvedReference],
        level: CompatibilityLevel,
        opts: &RegisterOptions,
    ) -> Result<()> {
        let checker = self.checkers.get(schema_type)?;
        let mut candidates = self.storage.get_schemas_by_subject(context, subject, false).await.unwrap_or_default();

        if let Some(group_key) = self.cascade_compatibility_group(context, subject).await? {
            let incoming_group_value = opts.metadata.as_ref().and_then(|m| m.properties.get(&group_key));
            candidates.retain(|c| c.metadata.as_ref().and_then(|m| m.properties.get(&group_key)) == incoming_group_value);
        }

        if candidates.is_empty() {
            return Ok(());
        }

        let targets: Vec<&SchemaRecord> = if level.is_transitive() {
            candidates.iter().collect()
        } else {
            candidates.iter().max_by_key(|r| r.version).into_iter().collect()
        };

        let mut existing_checks = Vec::with_capacity(targets.len());
        for record in &targets {
            let resolved = self.references.resolve(context, &record.references).await?;
            existing_checks.push(CheckSchema { schema: record.schema.clone(), references: resolved });
        }

        let new_check = CheckSchema { schema: new_text.to_string(), references: new_refs.to_vec() };
        let outcome = checker.check(level, &new_check, &existing_checks)?;
        if !outcome.is_compatible {
            return Err(Error::IncompatibleSchema(outcome.messages.join("; ")));
        }
        Ok(())
    }

    async fn cascade_compatibility_group(&self, context: &str, subject: &str) -> Result<Option<String>> {
        let cfg = self.cascade.resolve_config(context, subject, self.default_compatibility).await?;
        Ok(cfg.compatibility_group)
    }

    async fn validate_reserved_fields(
        &self,
        context: &str,
        subject: &str,
        parsed: &dyn registry_core::ParsedSchema,
        opts: &RegisterOptions,
    ) -> Result<()> {
        let own_reserved: Vec<String> = opts.metadata.as_ref().map(|m| m.reserved_fields()).unwrap_or_default();
        let mut violations = Vec::new();

        for name in &own_reserved {
            if parsed.has_top_level_field(name) {
                violations.push(format!("reserved field '{name}' present in new schema"));
            }
        }

        if let Ok(latest) = self.storage.get_latest_schema(context, subject).await {
            let prev_reserved = latest.metadata.as_ref().map(|m| m.reserved_fields()).unwrap_or_default();
            for name in &prev_reserved {
                if !own_reserved.contains(name) {
                    violations.push(format!("previously reserved field '{name}' dropped from confluent:reserved"));
                }
            }
        }

        if !violations.is_empty() {
            return Err(Error::IncompatibleSchema(violations.join("; ")));
        }
        Ok(())
    }

    async fn check_confluent_version_cas(&self, context: &str, subject: &str, claimed: i32) -> Result<()> {
        if claimed <= 0 {
            return Ok(());
        }
        let existing = self.storage.get_schemas_by_subject(context, subject, true).await.unwrap_or_default();
        let max_version = existing.iter().map(|r| r.version).max().unwrap_or(0);
        let expected = max_version + 1;
        if claimed != expected {
            return Err(Error::VersionConflict { expected, actual: claimed });
        }
        Ok(())
    }

    /// Registers a schema with a caller-specified ID, for IMPORT mode
    /// (§4.5.2). Idempotent on exact content match; rejects ID reuse with
    /// different content.
    #[instrument(skip(self, schema_text, references, opts), fields(context, subject, id))]
    pub async fn register_schema_with_id(
        &self,
        context: &str,
        subject: &str,
        id: i64,
        schema_type_raw: &str,
        schema_text: &str,
        references: Vec<SchemaReference>,
        opts: RegisterOptions,
    ) -> Result<SchemaRecord> {
        let schema_type = SchemaType::from_wire(schema_type_raw)?;
        let parser = self.parsers.get(schema_type)?;
        let resolved_refs = self.references.resolve(context, &references).await?;
        let parsed = parser.parse(schema_text, &resolved_refs)?;
        let fingerprint = parsed.fingerprint();

        if let Some(existing) = self
            .storage
            .get_schema_by_fingerprint(context, subject, &fingerprint, false)
            .await?
        {
            return Ok(existing.with_confluent_version_decoration());
        }

        let existing_versions = self.storage.get_schemas_by_subject(context, subject, true).await.unwrap_or_default();
        let next_version = existing_versions.iter().map(|r| r.version).max().unwrap_or(0) + 1;

        let record = SchemaRecord {
            id,
            subject: subject.to_string(),
            version: next_version,
            schema_type,
            schema: schema_text.to_string(),
            fingerprint,
            references,
            metadata: opts.metadata,
            rule_set: opts.rule_set,
            deleted: false,
        };

        let stored = self.storage.import_schema(context, record).await.map_err(|e| match e {
            registry_core::StorageError::SchemaIdConflict(id) => Error::ImportIDConflict(id),
            other => Error::Storage(other),
        })?;

        let max_id = self.storage.get_max_schema_id(context).await?;
        let target = std::cmp::max(max_id + 1, id + 1);
        if let Err(source) = self.storage.set_next_id(context, target).await {
            warn!(id = stored.id, "sequence advance failed after successful import");
            return Err(Error::SequenceAdvanceFailed { record: Box::new(stored), source });
        }

        Ok(stored.with_confluent_version_decoration())
    }

    /// Bulk-loads a batch of raw [`ImportItem`]s, bypassing parsing and
    /// compatibility checking entirely (§4.5.3). Invalid items are recorded
    /// as per-item failures and do not halt the batch. Returns the per-item
    /// results, plus a sequence-advance error if the final bookkeeping step
    /// failed (the imported items themselves remain committed either way).
    #[instrument(skip(self, items), fields(context, batch_size = items.len()))]
    pub async fn import_schemas(&self, context: &str, items: Vec<ImportItem>) -> (Vec<ImportItemResult>, Option<Error>) {
        let mut results = Vec::with_capacity(items.len());
        let mut max_imported_id = 0i64;

        for item in items {
            let outcome = self.import_one(context, &item).await;
            match outcome {
                Ok(()) => {
                    max_imported_id = max_imported_id.max(item.id);
                    results.push(ImportItemResult {
                        id: item.id,
                        subject: item.subject,
                        version: item.version,
                        success: true,
                        error: None,
                    });
                }
                Err(message) => {
                    results.push(ImportItemResult {
                        id: item.id,
                        subject: item.subject,
                        version: item.version,
                        success: false,
                        error: Some(message),
                    });
                }
            }
        }

        if max_imported_id == 0 {
            return (results, None);
        }

        let max_id = match self.storage.get_max_schema_id(context).await {
            Ok(v) => v,
            Err(e) => return (results, Some(e.into())),
        };
        let target = std::cmp::max(max_id + 1, max_imported_id + 1);
        match self.storage.set_next_id(context, target).await {
            Ok(()) => (results, None),
            Err(e) => (results, Some(e.into())),
        }
    }

    async fn import_one(&self, context: &str, item: &ImportItem) -> std::result::Result<(), String> {
        if item.id <= 0 {
            return Err("id must be positive".to_string());
        }
        if item.subject.is_empty() {
            return Err("subject must not be empty".to_string());
        }
        if item.version <= 0 {
            return Err("version must be positive".to_string());
        }
        if item.schema.is_empty() {
            return Err("schema must not be empty".to_string());
        }
        let schema_type = SchemaType::from_wire(&item.schema_type).map_err(|e| e.to_string())?;

        let record = SchemaRecord {
            id: item.id,
            subject: item.subject.clone(),
            version: item.version,
            schema_type,
            schema: item.schema.clone(),
            fingerprint: raw_fingerprint(&item.schema),
            references: item.references.clone(),
            metadata: item.metadata.clone(),
            rule_set: item.rule_set.clone(),
            deleted: false,
        };

        self.storage.import_schema(context, record).await.map(|_| ()).map_err(|e| e.to_string())
    }

    /// Resolves a [`VersionSelector`] against the subject's current versions
    /// to a concrete version number (`latest`/`All` are not meaningful here
    /// and only `Latest`/`Number` are accepted).
    async fn resolve_single_version(&self, context: &str, subject: &str, selector: &VersionSelector) -> Result<i32> {
        match selector {
            VersionSelector::Number(v) => Ok(*v),
            VersionSelector::Latest => {
                let record = self.storage.get_latest_schema(context, subject).await?;
                Ok(record.version)
            }
            VersionSelector::All => Err(Error::InvalidSchema("version selector must name a specific version".to_string())),
        }
    }

    /// Deletes one version (§4.5.9). Soft delete requires no other live
    /// version still references it; hard delete requires prior soft delete
    /// (enforced by storage).
    #[instrument(skip(self), fields(context, subject))]
    pub async fn delete_version(&self, context: &str, subject: &str, selector: &VersionSelector, permanent: bool) -> Result<i32> {
        let version = self.resolve_single_version(context, subject, selector).await?;

        if !permanent {
            let referents = self.storage.get_referenced_by(context, subject, version).await?;
            if let Some((ref_subject, ref_version)) = referents.into_iter().next() {
                return Err(Error::ReferenceExists {
                    subject: subject.to_string(),
                    version,
                    referenced_by: format!("{ref_subject}/{ref_version}"),
                });
            }
        }

        self.storage.delete_schema(context, subject, version, permanent).await?;
        Ok(version)
    }

    /// Deletes every version of `subject` (§4.5.9). A permanent deletion also
    /// clears the subject's own config and mode records.
    #[instrument(skip(self), fields(context, subject))]
    pub async fn delete_subject(&self, context: &str, subject: &str, permanent: bool) -> Result<Vec<i32>> {
        if !permanent {
            let versions = self.storage.get_schemas_by_subject(context, subject, false).await?;
            for record in &versions {
                let referents = self.storage.get_referenced_by(context, subject, record.version).await?;
                if let Some((ref_subject, ref_version)) = referents.into_iter().next() {
                    return Err(Error::ReferenceExists {
                        subject: subject.to_string(),
                        version: record.version,
                        referenced_by: format!("{ref_subject}/{ref_version}"),
                    });
                }
            }
        }

        let affected = self.storage.delete_subject(context, subject, permanent).await?;

        if permanent {
            let _ = self.storage.delete_config(context, subject).await;
            let _ = self.storage.delete_mode(context, subject).await;
        }

        Ok(affected)
    }

    /// Finds the version in `subject` whose content matches `schema_text`
    /// exactly (after the same parse/normalize pipeline used at registration
    /// time), §4.5.10.
    #[instrument(skip(self, schema_text, references), fields(context, subject))]
    pub async fn lookup_schema(
        &self,
        context: &str,
        subject: &str,
        schema_type_raw: &str,
        schema_text: &str,
        references: Vec<SchemaReference>,
    ) -> Result<SchemaRecord> {
        let schema_type = SchemaType::from_wire(schema_type_raw)?;
        let parser = self.parsers.get(schema_type)?;
        let resolved_refs = self.references.resolve(context, &references).await?;
        let mut parsed = parser.parse(schema_text, &resolved_refs)?;

        if self.cascade.resolve_normalize(context, subject).await? {
            parsed = parsed.normalize();
        }
        let fingerprint = parsed.fingerprint();

        self.storage
            .get_schema_by_fingerprint(context, subject, &fingerprint, false)
            .await?
            .ok_or_else(|| Error::VersionNotFound {
                subject: subject.to_string(),
                version: "<no matching content>".to_string(),
            })
    }

    /// Checks `schema_text` for compatibility against the versions named by
    /// `selector`, without registering it (§4.5.11).
    #[instrument(skip(self, schema_text, references), fields(context, subject))]
    pub async fn check_compatibility(
        &self,
        context: &str,
        subject: &str,
        schema_type_raw: &str,
        schema_text: &str,
        references: Vec<SchemaReference>,
        selector: &VersionSelector,
    ) -> Result<registry_core::CompatibilityOutcome> {
        let schema_type = SchemaType::from_wire(schema_type_raw)?;
        let parser = self.parsers.get(schema_type)?;
        let resolved_refs = self.references.resolve(context, &references).await?;
        let mut parsed = parser.parse(schema_text, &resolved_refs)?;
        if self.cascade.resolve_normalize(context, subject).await? {
            parsed = parsed.normalize();
        }

        let targets = match selector {
            VersionSelector::All => self.storage.get_schemas_by_subject(context, subject, false).await?,
            VersionSelector::Latest => match self.storage.get_latest_schema(context, subject).await {
                Ok(record) => vec![record],
                Err(registry_core::StorageError::SubjectNotFound(_)) => vec![],
                Err(e) => return Err(e.into()),
            },
            VersionSelector::Number(v) => {
                vec![self.storage.get_schema_by_subject_version(context, subject, *v, false).await?]
            }
        };

        if targets.is_empty() {
            return Ok(registry_core::CompatibilityOutcome::compatible());
        }

        let mut existing_checks = Vec::with_capacity(targets.len());
        for record in &targets {
            let resolved = self.references.resolve(context, &record.references).await?;
            existing_checks.push(CheckSchema { schema: record.schema.clone(), references: resolved });
        }

        let level = self.cascade.resolve_compatibility_level(context, subject, self.default_compatibility).await?;
        let new_check = CheckSchema { schema: parsed.canonical_string(), references: resolved_refs };
        let checker = self.checkers.get(schema_type)?;
        checker.check(level, &new_check, &existing_checks)
    }

    /// Sets config at `subject` level, or context-global if `subject` is `None`.
    pub async fn set_config(&self, context: &str, subject: Option<&str>, record: ConfigRecord) -> Result<()> {
        match subject {
            Some(s) if !s.is_empty() => self.storage.set_config(context, s, record).await?,
            _ => self.storage.set_global_config(context, record).await?,
        }
        Ok(())
    }

    /// Gets the cascaded effective config at `subject` level, or
    /// context-global if `subject` is `None`.
    pub async fn get_config(&self, context: &str, subject: Option<&str>) -> Result<ConfigRecord> {
        self.cascade.resolve_config(context, subject.unwrap_or(""), self.default_compatibility).await
    }

    /// Deletes config at `subject` level, or context-global if `subject` is `None`.
    pub async fn delete_config(&self, context: &str, subject: Option<&str>) -> Result<()> {
        match subject {
            Some(s) if !s.is_empty() => self.storage.delete_config(context, s).await?,
            _ => self.storage.delete_global_config(context).await?,
        }
        Ok(())
    }

    /// Sets mode at `subject` level, or context-global if `subject` is `None`.
    /// Switching to `IMPORT` without `force` is refused if the target scope
    /// already has non-deleted schemas.
    pub async fn set_mode(&self, context: &str, subject: Option<&str>, mode: Mode, force: bool) -> Result<()> {
        if mode == Mode::Import && !force {
            let has_schemas = match subject {
                Some(s) if !s.is_empty() => !self.storage.get_schemas_by_subject(context, s, false).await?.is_empty(),
                _ => !self.storage.list_subjects(context, false).await?.is_empty(),
            };
            if has_schemas {
                return Err(Error::OperationNotPermitted(
                    "cannot switch to IMPORT mode over a non-empty scope without force".to_string(),
                ));
            }
        }

        match subject {
            Some(s) if !s.is_empty() => self.storage.set_mode(context, s, ModeRecord { mode }).await?,
            _ => self.storage.set_global_mode(context, ModeRecord { mode }).await?,
        }
        Ok(())
    }

    /// Gets the cascaded effective mode at `subject` level, or context-global
    /// if `subject` is `None`, honoring the `READONLY_OVERRIDE` kill switch.
    pub async fn get_mode(&self, context: &str, subject: Option<&str>) -> Result<Mode> {
        self.cascade.resolve_mode(context, subject.unwrap_or("")).await
    }

    /// Deletes mode at `subject` level, or context-global if `subject` is `None`.
    pub async fn delete_mode(&self, context: &str, subject: Option<&str>) -> Result<()> {
        match subject {
            Some(s) if !s.is_empty() => self.storage.delete_mode(context, s).await?,
            _ => self.storage.delete_global_mode(context).await?,
        }
        Ok(())
    }

    /// Lists schemas in the context matching `filter`.
    pub async fn list_schemas(&self, context: &str, filter: ListFilter) -> Result<Vec<SchemaRecord>> {
        Ok(self.storage.list_schemas(context, filter).await?)
    }

    /// Lists subjects in the context.
    pub async fn list_subjects(&self, context: &str, include_deleted: bool) -> Result<Vec<String>> {
        Ok(self.storage.list_subjects(context, include_deleted).await?)
    }

    /// Lists contexts holding at least one subject.
    pub async fn list_contexts(&self) -> Result<Vec<String>> {
        Ok(self.storage.list_contexts().await?)
    }
}
