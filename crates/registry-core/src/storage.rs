//! The storage contract (§6.1): the persistence abstraction the registry
//! engine depends on. This module only defines the contract; see
//! `registry-storage` for the in-process reference implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ConfigRecord, ModeRecord, SchemaReference, SchemaRecord};
use crate::types::SchemaType;

/// Storage-layer error signals (§6.1), distinct from the engine's semantic
/// [`crate::Error`] taxonomy. The engine translates these at its boundary.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No subject with this name exists in the context.
    #[error("subject not found: {0}")]
    SubjectNotFound(String),

    /// No version with this number exists for the subject.
    #[error("version not found: {subject}/{version}")]
    VersionNotFound {
        /// Subject queried.
        subject: String,
        /// Version queried.
        version: i32,
    },

    /// No schema with this ID exists in the context.
    #[error("schema not found: {0}")]
    SchemaNotFound(i64),

    /// A record with the same `(subject, fingerprint, metadata, ruleSet)`
    /// tuple already exists; the caller should refetch it.
    #[error("schema already exists")]
    SchemaExists,

    /// An IMPORT-specified ID is already taken by different content.
    #[error("schema id conflict: {0}")]
    SchemaIdConflict(i64),

    /// A generic not-found condition (context, config, mode).
    #[error("not found: {0}")]
    NotFound(String),

    /// An invalid version argument was supplied (e.g. non-positive).
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// The requested operation is not permitted in the current state.
    #[error("operation not permitted: {0}")]
    OperationNotPermitted(String),

    /// A hard delete was requested on a version that was never soft-deleted.
    #[error("version not soft-deleted: {subject}/{version}")]
    VersionNotSoftDeleted {
        /// Subject of the version.
        subject: String,
        /// Version number.
        version: i32,
    },

    /// An unexpected internal storage failure.
    #[error("internal storage error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Input to [`SchemaStorage::create_schema`]: everything the engine has
/// already computed except the ID and version, which storage allocates.
#[derive(Debug, Clone)]
pub struct NewSchema {
    /// Subject to register under.
    pub subject: String,
    /// Schema type.
    pub schema_type: SchemaType,
    /// Schema text (already normalized if applicable).
    pub schema: String,
    /// Content-addressed fingerprint.
    pub fingerprint: String,
    /// Ordered references.
    pub references: Vec<SchemaReference>,
    /// Metadata to persist (already merged, with `confluent:version` stripped).
    pub metadata: Option<crate::model::Metadata>,
    /// RuleSet to persist (already merged).
    pub rule_set: Option<crate::model::RuleSet>,
}

/// Filter parameters for [`SchemaStorage::list_schemas`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Only subjects whose name starts with this prefix.
    pub subject_prefix: Option<String>,
    /// Only these schema types; empty means all types.
    pub schema_types: Vec<SchemaType>,
    /// Include soft-deleted records.
    pub include_deleted: bool,
    /// Only the latest non-deleted version per subject.
    pub latest_only: bool,
}

/// The persistence abstraction the registry engine depends on.
///
/// Implementations must provide the atomicity guarantees in §4.6: a single
/// linearization point per `CreateSchema`/`ImportSchema` call, and a
/// monotonic, non-rewinding `set_next_id`.
#[async_trait]
pub trait SchemaStorage: Send + Sync {
    // -- Schemas --------------------------------------------------------

    /// Atomically allocates the next ID and version and persists the record.
    /// Returns [`StorageError::SchemaExists`] if a concurrent writer already
    /// committed the same `(subject, fingerprint, metadata, ruleSet)` tuple.
    async fn create_schema(&self, context: &str, new_schema: NewSchema) -> StorageResult<SchemaRecord>;

    /// Commits `record` with its caller-specified `id` and `version`. Returns
    /// [`StorageError::SchemaIdConflict`] if `id` is taken by different content.
    async fn import_schema(&self, context: &str, record: SchemaRecord) -> StorageResult<SchemaRecord>;

    /// Fetches a record by ID. If multiple subjects share the ID (identical
    /// content), any one matching record may be returned.
    async fn get_schema_by_id(&self, context: &str, id: i64) -> StorageResult<SchemaRecord>;

    /// Fetches the record at `(subject, version)`.
    async fn get_schema_by_subject_version(
        &self,
        context: &str,
        subject: &str,
        version: i32,
        include_deleted: bool,
    ) -> StorageResult<SchemaRecord>;

    /// Fetches the record in `(context, subject)` with the given fingerprint.
    async fn get_schema_by_fingerprint(
        &self,
        context: &str,
        subject: &str,
        fingerprint: &str,
        include_deleted: bool,
    ) -> StorageResult<Option<SchemaRecord>>;

    /// Fetches the highest non-deleted version in the subject.
    async fn get_latest_schema(&self, context: &str, subject: &str) -> StorageResult<SchemaRecord>;

    /// Lists every version in the subject, ordered by version ascending.
    async fn get_schemas_by_subject(
        &self,
        context: &str,
        subject: &str,
        include_deleted: bool,
    ) -> StorageResult<Vec<SchemaRecord>>;

    /// Lists subjects in the context.
    async fn list_subjects(&self, context: &str, include_deleted: bool) -> StorageResult<Vec<String>>;

    /// Whether the subject has at least one (possibly soft-deleted) version.
    async fn subject_exists(&self, context: &str, subject: &str) -> StorageResult<bool>;

    /// Lists every subject that has a version carrying this ID.
    async fn get_subjects_by_schema_id(
        &self,
        context: &str,
        id: i64,
        include_deleted: bool,
    ) -> StorageResult<Vec<String>>;

    /// Lists every version number carrying this ID, across all subjects.
    async fn get_versions_by_schema_id(
        &self,
        context: &str,
        id: i64,
        include_deleted: bool,
    ) -> StorageResult<Vec<(String, i32)>>;

    /// Lists every `(subject, version)` that references `(subject, version)`.
    async fn get_referenced_by(
        &self,
        context: &str,
        subject: &str,
        version: i32,
    ) -> StorageResult<Vec<(String, i32)>>;

    /// Soft- or hard-deletes one version. Hard delete requires the version to
    /// already be soft-deleted ([`StorageError::VersionNotSoftDeleted`] otherwise)
    /// and removes any `referenced_by` index entries for it.
    async fn delete_schema(
        &self,
        context: &str,
        subject: &str,
        version: i32,
        permanent: bool,
    ) -> StorageResult<()>;

    /// Soft- or hard-deletes every version in the subject. Returns the
    /// affected version numbers.
    async fn delete_subject(
        &self,
        context: &str,
        subject: &str,
        permanent: bool,
    ) -> StorageResult<Vec<i32>>;

    /// The highest ID ever assigned in the context (0 if none).
    async fn get_max_schema_id(&self, context: &str) -> StorageResult<i64>;

    /// Advances the per-context ID sequence. Implementations must treat a
    /// `next_id` lower than the current sequence value as a no-op.
    async fn set_next_id(&self, context: &str, next_id: i64) -> StorageResult<()>;

    /// Lists schemas in the context matching `filter`.
    async fn list_schemas(&self, context: &str, filter: ListFilter) -> StorageResult<Vec<SchemaRecord>>;

    /// Lists contexts that hold at least one subject. `__GLOBAL` is never
    /// included, even though it may exist as a config/mode holder.
    async fn list_contexts(&self) -> StorageResult<Vec<String>>;

    // -- Config -----------------------------------------------------------

    /// Per-subject config, if one is stored at this exact level.
    async fn get_config(&self, context: &str, subject: &str) -> StorageResult<Option<ConfigRecord>>;
    /// Stores per-subject config.
    async fn set_config(&self, context: &str, subject: &str, record: ConfigRecord) -> StorageResult<()>;
    /// Deletes per-subject config.
    async fn delete_config(&self, context: &str, subject: &str) -> StorageResult<()>;

    /// Context-global config, if one is stored at this exact level.
    async fn get_global_config(&self, context: &str) -> StorageResult<Option<ConfigRecord>>;
    /// Stores context-global config.
    async fn set_global_config(&self, context: &str, record: ConfigRecord) -> StorageResult<()>;
    /// Deletes context-global config.
    async fn delete_global_config(&self, context: &str) -> StorageResult<()>;

    // -- Mode ---------------------------------------------------------------

    /// Per-subject mode, if one is stored at this exact level.
    async fn get_mode(&self, context: &str, subject: &str) -> StorageResult<Option<ModeRecord>>;
    /// Stores per-subject mode.
    async fn set_mode(&self, context: &str, subject: &str, record: ModeRecord) -> StorageResult<()>;
    /// Deletes per-subject mode.
    async fn delete_mode(&self, context: &str, subject: &str) -> StorageResult<()>;

    /// Context-global mode, if one is stored at this exact level.
    async fn get_global_mode(&self, context: &str) -> StorageResult<Option<ModeRecord>>;
    /// Stores context-global mode.
    async fn set_global_mode(&self, context: &str, record: ModeRecord) -> StorageResult<()>;
    /// Deletes context-global mode.
    async fn delete_global_mode(&self, context: &str) -> StorageResult<()>;
}
