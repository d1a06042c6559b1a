//! Error taxonomy for the registry engine.
//!
//! Every variant corresponds to one semantic kind from the error handling
//! design: the engine never retries or recovers, it only translates lower
//! level (storage, parser, compatibility plane) failures into one of these
//! and surfaces it to the caller.

use thiserror::Error;

use crate::model::SchemaRecord;

/// Result type alias used throughout the registry engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Registry engine error.
#[derive(Error, Debug)]
pub enum Error {
    /// The parser rejected the schema text or one of its references.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// No parser is registered for the requested schema type.
    #[error("unsupported schema type: {0}")]
    UnsupportedSchemaType(String),

    /// A referenced `(subject, version)` could not be found.
    #[error("failed to resolve reference {subject}/{version}")]
    FailedResolveReferences {
        /// Subject of the missing referent.
        subject: String,
        /// Version of the missing referent.
        version: i32,
    },

    /// The compatibility plane or reserved-field validation rejected the schema.
    #[error("incompatible schema: {0}")]
    IncompatibleSchema(String),

    /// The `confluent:version` CAS check failed.
    #[error("version conflict: expected {expected}, got {actual}")]
    VersionConflict {
        /// Version the engine computed as the only acceptable next version.
        expected: i32,
        /// Version the caller asserted via `confluent:version`.
        actual: i32,
    },

    /// An IMPORT-specified ID already exists with different content.
    #[error("import id conflict: id {0} already exists with different content")]
    ImportIDConflict(i64),

    /// The named subject does not exist (or is soft-deleted and the caller excluded deleted).
    #[error("subject not found: {0}")]
    SubjectNotFound(String),

    /// The named version does not exist (or is soft-deleted and the caller excluded deleted).
    #[error("version not found: {subject}/{version}")]
    VersionNotFound {
        /// Subject the caller queried.
        subject: String,
        /// Version the caller queried.
        version: String,
    },

    /// No schema exists with the given id.
    #[error("schema not found: {0}")]
    SchemaNotFound(i64),

    /// Deletion would orphan a live referent.
    #[error("reference exists: {subject}/{version} is referenced by {referenced_by}")]
    ReferenceExists {
        /// Subject of the record the caller tried to delete.
        subject: String,
        /// Version of the record the caller tried to delete.
        version: i32,
        /// A `subject/version` pair that still references it.
        referenced_by: String,
    },

    /// An unknown compatibility level string was supplied.
    #[error("invalid compatibility level: {0}")]
    InvalidCompatibility(String),

    /// An unknown mode string was supplied.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// A mode transition was refused (e.g. IMPORT without `force` over a non-empty subject).
    #[error("operation not permitted: {0}")]
    OperationNotPermitted(String),

    /// The context does not exist.
    #[error("context not found: {0}")]
    ContextNotFound(String),

    /// The per-context ID sequence failed to advance after a successful write.
    ///
    /// The schema named here *is* committed to storage; this error only
    /// signals that the sequence bookkeeping may now lag behind it.
    #[error("schema {} stored but sequence advance failed: {source}", .record.id)]
    SequenceAdvanceFailed {
        /// The record that was successfully persisted.
        record: Box<SchemaRecord>,
        /// The underlying storage failure.
        #[source]
        source: crate::storage::StorageError,
    },

    /// A storage-layer failure that does not map to any semantic kind above.
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Catch-all for unexpected internal failures.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// The record carried by a [`Error::SequenceAdvanceFailed`], if applicable.
    pub fn stored_record(&self) -> Option<&SchemaRecord> {
        match self {
            Error::SequenceAdvanceFailed { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Whether this error represents a "not found" condition of any kind.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SubjectNotFound(_)
                | Error::VersionNotFound { .. }
                | Error::SchemaNotFound(_)
                | Error::ContextNotFound(_)
        )
    }
}
