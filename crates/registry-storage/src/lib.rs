//! # Registry Storage
//!
//! An in-process, in-memory reference implementation of
//! [`registry_core::SchemaStorage`], suitable for tests and for embedding
//! the registry engine without an external database.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use registry_core::{
    ConfigRecord, ListFilter, ModeRecord, NewSchema, SchemaReference, SchemaRecord, SchemaStorage,
    StorageError, StorageResult,
};

#[derive(Default)]
struct ContextState {
    /// Versions per subject, kept sorted ascending by `version`.
    subjects: HashMap<String, Vec<SchemaRecord>>,
    next_id: i64,
    subject_config: HashMap<String, ConfigRecord>,
    global_config: Option<ConfigRecord>,
    subject_mode: HashMap<String, ModeRecord>,
    global_mode: Option<ModeRecord>,
}

/// In-memory [`SchemaStorage`]. Cheap to clone via `Arc`; internally
/// synchronized with `parking_lot::RwLock` rather than async locks, since no
/// operation here ever awaits while holding one.
#[derive(Default)]
pub struct InMemoryStorage {
    contexts: RwLock<HashMap<String, ContextState>>,
}

impl InMemoryStorage {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn same_content(a: &NewSchema, b: &SchemaRecord) -> bool {
        a.subject == b.subject
            && a.schema_type == b.schema_type
            && a.fingerprint == b.fingerprint
            && a.references == b.references
            && a.metadata == b.metadata
            && a.rule_set == b.rule_set
    }
}

#[async_trait]
impl SchemaStorage for InMemoryStorage {
    #[instrument(skip(self, new_schema))]
    async fn create_schema(&self, context: &str, new_schema: NewSchema) -> StorageResult<SchemaRecord> {
        let mut contexts = self.contexts.write();
        let state = contexts.entry(context.to_string()).or_default();

        let already_exists = state
            .subjects
            .get(&new_schema.subject)
            .map(|versions| versions.iter().any(|r| !r.deleted && Self::same_content(&new_schema, r)))
            .unwrap_or(false);
        if already_exists {
            return Err(StorageError::SchemaExists);
        }

        // Global ID reuse: identical content anywhere in the context keeps its
        // ID, regardless of metadata/ruleSet (those can differ per version;
        // only schema_type/fingerprint/references define "same content" here).
        let reused_id = state.subjects.values().flatten().find_map(|r| {
            (r.schema_type == new_schema.schema_type
                && r.fingerprint == new_schema.fingerprint
                && r.references == new_schema.references)
                .then_some(r.id)
        });

        let id = match reused_id {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };

        let versions = state.subjects.entry(new_schema.subject.clone()).or_default();
        let next_version = versions.iter().map(|r| r.version).max().unwrap_or(0) + 1;

        let record = SchemaRecord {
            id,
            subject: new_schema.subject,
            version: next_version,
            schema_type: new_schema.schema_type,
            schema: new_schema.schema,
            fingerprint: new_schema.fingerprint,
            references: new_schema.references,
            metadata: new_schema.metadata,
            rule_set: new_schema.rule_set,
            deleted: false,
        };
        versions.push(record.clone());
        Ok(record)
    }

    #[instrument(skip(self, record))]
    async fn import_schema(&self, context: &str, record: SchemaRecord) -> StorageResult<SchemaRecord> {
        let mut contexts = self.contexts.write();
        let state = contexts.entry(context.to_string()).or_default();

        for existing in state.subjects.values().flatten() {
            if existing.id == record.id
                && (existing.fingerprint != record.fingerprint || existing.schema_type != record.schema_type)
            {
                return Err(StorageError::SchemaIdConflict(record.id));
            }
        }

        let versions = state.subjects.entry(record.subject.clone()).or_default();
        if versions.iter().any(|r| r.version == record.version) {
            return Err(StorageError::InvalidVersion(format!(
                "version {} already exists in subject {}",
                record.version, record.subject
            )));
        }
        versions.push(record.clone());
        if record.id > state.next_id {
            state.next_id = record.id;
        }
        Ok(record)
    }

    async fn get_schema_by_id(&self, context: &str, id: i64) -> StorageResult<SchemaRecord> {
        let contexts = self.contexts.read();
        contexts
            .get(context)
            .and_then(|state| state.subjects.values().flatten().find(|r| r.id == id))
            .cloned()
            .ok_or(StorageError::SchemaNotFound(id))
    }

    async fn get_schema_by_subject_version(
        &self,
        context: &str,
        subject: &str,
        version: i32,
        include_deleted: bool,
    ) -> StorageResult<SchemaRecord> {
        let contexts = self.contexts.read();
        let record = contexts
            .get(context)
            .and_then(|state| state.subjects.get(subject))
            .and_then(|versions| versions.iter().find(|r| r.version == version))
            .filter(|r| include_deleted || !r.deleted)
            .cloned();
        record.ok_or_else(|| StorageError::VersionNotFound {
            subject: subject.to_string(),
            version,
        })
    }

    async fn get_schema_by_fingerprint(
        &self,
        context: &str,
        subject: &str,
        fingerprint: &str,
        include_deleted: bool,
    ) -> StorageResult<Option<SchemaRecord>> {
        let contexts = self.contexts.read();
        Ok(contexts
            .get(context)
            .and_then(|state| state.subjects.get(subject))
            .and_then(|versions| {
                versions
                    .iter()
                    .find(|r| r.fingerprint == fingerprint && (include_deleted || !r.deleted))
            })
            .cloned())
    }

    async fn get_latest_schema(&self, context: &str, subject: &str) -> StorageResult<SchemaRecord> {
        let contexts = self.contexts.read();
        contexts
            .get(context)
            .and_then(|state| state.subjects.get(subject))
            .and_then(|versions| versions.iter().filter(|r| !r.deleted).max_by_key(|r| r.version))
            .cloned()
            .ok_or_else(|| StorageError::SubjectNotFound(subject.to_string()))
    }

    async fn get_schemas_by_subject(
        &self,
        context: &str,
        subject: &str,
        include_deleted: bool,
    ) -> StorageResult<Vec<SchemaRecord>> {
        let contexts = self.contexts.read();
        let mut versions: Vec<SchemaRecord> = contexts
            .get(context)
            .and_then(|state| state.subjects.get(subject))
            .map(|versions| {
                versions
                    .iter()
                    .filter(|r| include_deleted || !r.deleted)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        versions.sort_by_key(|r| r.version);
        Ok(versions)
    }

    async fn list_subjects(&self, context: &str, include_deleted: bool) -> StorageResult<Vec<String>> {
        let contexts = self.contexts.read();
        let mut subjects: Vec<String> = contexts
            .get(context)
            .map(|state| {
                state
                    .subjects
                    .iter()
                    .filter(|(_, versions)| include_deleted || versions.iter().any(|r| !r.deleted))
                    .map(|(subject, _)| subject.clone())
                    .collect()
            })
            .unwrap_or_default();
        subjects.sort();
        Ok(subjects)
    }

    async fn subject_exists(&self, context: &str, subject: &str) -> StorageResult<bool> {
        let contexts = self.contexts.read();
        Ok(contexts
            .get(context)
            .map(|state| state.subjects.contains_key(subject))
            .unwrap_or(false))
    }

    async fn get_subjects_by_schema_id(
        &self,
        context: &str,
        id: i64,
        include_deleted: bool,
    ) -> StorageResult<Vec<String>> {
        let contexts = self.contexts.read();
        let mut subjects: Vec<String> = contexts
            .get(context)
            .map(|state| {
                state
                    .subjects
                    .iter()
                    .filter(|(_, versions)| versions.iter().any(|r| r.id == id && (include_deleted || !r.deleted)))
                    .map(|(subject, _)| subject.clone())
                    .collect()
            })
            .unwrap_or_default();
        subjects.sort();
        Ok(subjects)
    }

    async fn get_versions_by_schema_id(
        &self,
        context: &str,
        id: i64,
        include_deleted: bool,
    ) -> StorageResult<Vec<(String, i32)>> {
        let contexts = self.contexts.read();
        let mut pairs: Vec<(String, i32)> = contexts
            .get(context)
            .map(|state| {
                state
                    .subjects
                    .values()
                    .flatten()
                    .filter(|r| r.id == id && (include_deleted || !r.deleted))
                    .map(|r| (r.subject.clone(), r.version))
                    .collect()
            })
            .unwrap_or_default();
        pairs.sort();
        Ok(pairs)
    }

    async fn get_referenced_by(
        &self,
        context: &str,
        subject: &str,
        version: i32,
    ) -> StorageResult<Vec<(String, i32)>> {
        let contexts = self.contexts.read();
        let mut referents: Vec<(String, i32)> = contexts
            .get(context)
            .map(|state| {
                state
                    .subjects
                    .values()
                    .flatten()
                    .filter(|r| !r.deleted)
                    .filter(|r| {
                        r.references
                            .iter()
                            .any(|reference| reference.subject == subject && reference.version == version)
                    })
                    .map(|r| (r.subject.clone(), r.version))
                    .collect()
            })
            .unwrap_or_default();
        referents.sort();
        Ok(referents)
    }

    #[instrument(skip(self))]
    async fn delete_schema(
        &self,
        context: &str,
        subject: &str,
        version: i32,
        permanent: bool,
    ) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        let state = contexts
            .get_mut(context)
            .ok_or_else(|| StorageError::SubjectNotFound(subject.to_string()))?;
        let versions = state
            .subjects
            .get_mut(subject)
            .ok_or_else(|| StorageError::SubjectNotFound(subject.to_string()))?;
        let record = versions
            .iter_mut()
            .find(|r| r.version == version)
            .ok_or_else(|| StorageError::VersionNotFound {
                subject: subject.to_string(),
                version,
            })?;

        if permanent {
            if !record.deleted {
                return Err(StorageError::VersionNotSoftDeleted {
                    subject: subject.to_string(),
                    version,
                });
            }
            versions.retain(|r| r.version != version);
            for other in state.subjects.values_mut().flatten() {
                other
                    .references
                    .retain(|reference| !(reference.subject == subject && reference.version == version));
            }
        } else {
            record.deleted = true;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_subject(&self, context: &str, subject: &str, permanent: bool) -> StorageResult<Vec<i32>> {
        let mut contexts = self.contexts.write();
        let state = contexts
            .get_mut(context)
            .ok_or_else(|| StorageError::SubjectNotFound(subject.to_string()))?;
        let versions = state
            .subjects
            .get(subject)
            .ok_or_else(|| StorageError::SubjectNotFound(subject.to_string()))?
            .iter()
            .map(|r| r.version)
            .collect::<Vec<_>>();

        if permanent {
            state.subjects.remove(subject);
            for other in state.subjects.values_mut().flatten() {
                other.references.retain(|reference| reference.subject != subject);
            }
        } else if let Some(records) = state.subjects.get_mut(subject) {
            for record in records.iter_mut() {
                record.deleted = true;
            }
        }
        Ok(versions)
    }

    async fn get_max_schema_id(&self, context: &str) -> StorageResult<i64> {
        let contexts = self.contexts.read();
        Ok(contexts.get(context).map(|state| state.next_id).unwrap_or(0))
    }

    async fn set_next_id(&self, context: &str, next_id: i64) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        let state = contexts.entry(context.to_string()).or_default();
        if next_id > state.next_id {
            state.next_id = next_id;
        }
        Ok(())
    }

    async fn list_schemas(&self, context: &str, filter: ListFilter) -> StorageResult<Vec<SchemaRecord>> {
        let contexts = self.contexts.read();
        let Some(state) = contexts.get(context) else {
            return Ok(Vec::new());
        };

        let mut records: Vec<SchemaRecord> = Vec::new();
        for (subject, versions) in &state.subjects {
            if let Some(prefix) = &filter.subject_prefix {
                if !subject.starts_with(prefix.as_str()) {
                    continue;
                }
            }
            let mut candidates: Vec<&SchemaRecord> = versions
                .iter()
                .filter(|r| filter.include_deleted || !r.deleted)
                .filter(|r| filter.schema_types.is_empty() || filter.schema_types.contains(&r.schema_type))
                .collect();
            if filter.latest_only {
                candidates.sort_by_key(|r| r.version);
                if let Some(last) = candidates.last() {
                    records.push((*last).clone());
                }
            } else {
                records.extend(candidates.into_iter().cloned());
            }
        }
        records.sort_by(|a, b| (a.subject.as_str(), a.version).cmp(&(b.subject.as_str(), b.version)));
        Ok(records)
    }

    async fn list_contexts(&self) -> StorageResult<Vec<String>> {
        let contexts = self.contexts.read();
        let mut names: Vec<String> = contexts
            .iter()
            .filter(|(name, state)| name.as_str() != registry_core::GLOBAL_CONTEXT && !state.subjects.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn get_config(&self, context: &str, subject: &str) -> StorageResult<Option<ConfigRecord>> {
        let contexts = self.contexts.read();
        Ok(contexts.get(context).and_then(|s| s.subject_config.get(subject).cloned()))
    }

    async fn set_config(&self, context: &str, subject: &str, record: ConfigRecord) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        contexts
            .entry(context.to_string())
            .or_default()
            .subject_config
            .insert(subject.to_string(), record);
        Ok(())
    }

    async fn delete_config(&self, context: &str, subject: &str) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        if let Some(state) = contexts.get_mut(context) {
            state.subject_config.remove(subject);
        }
        Ok(())
    }

    async fn get_global_config(&self, context: &str) -> StorageResult<Option<ConfigRecord>> {
        let contexts = self.contexts.read();
        Ok(contexts.get(context).and_then(|s| s.global_config.clone()))
    }

    async fn set_global_config(&self, context: &str, record: ConfigRecord) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        contexts.entry(context.to_string()).or_default().global_config = Some(record);
        Ok(())
    }

    async fn delete_global_config(&self, context: &str) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        if let Some(state) = contexts.get_mut(context) {
            state.global_config = None;
        }
        Ok(())
    }

    async fn get_mode(&self, context: &str, subject: &str) -> StorageResult<Option<ModeRecord>> {
        let contexts = self.contexts.read();
        Ok(contexts.get(context).and_then(|s| s.subject_mode.get(subject).copied()))
    }

    async fn set_mode(&self, context: &str, subject: &str, record: ModeRecord) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        contexts
            .entry(context.to_string())
            .or_default()
            .subject_mode
            .insert(subject.to_string(), record);
        Ok(())
    }

    async fn delete_mode(&self, context: &str, subject: &str) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        if let Some(state) = contexts.get_mut(context) {
            state.subject_mode.remove(subject);
        }
        Ok(())
    }

    async fn get_global_mode(&self, context: &str) -> StorageResult<Option<ModeRecord>> {
        let contexts = self.contexts.read();
        Ok(contexts.get(context).and_then(|s| s.global_mode))
    }

    async fn set_global_mode(&self, context: &str, record: ModeRecord) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        contexts.entry(context.to_string()).or_default().global_mode = Some(record);
        Ok(())
    }

    async fn delete_global_mode(&self, context: &str) -> StorageResult<()> {
        let mut contexts = self.contexts.write();
        if let Some(state) = contexts.get_mut(context) {
            state.global_mode = None;
        }
        Ok(())
    }
}
