//! The reference resolver (§4.3): turns a schema's declared
//! [`SchemaReference`] list into full [`ResolvedReference`] content by
//! concurrent lookups against storage.

use std::sync::Arc;

use futures::future::try_join_all;

use registry_core::{Error, ResolvedReference, Result, SchemaReference, SchemaStorage};

/// Resolves [`SchemaReference`] lists against a [`SchemaStorage`] backend.
pub struct ReferenceResolver {
    storage: Arc<dyn SchemaStorage>,
}

impl ReferenceResolver {
    /// Builds a resolver over `storage`.
    pub fn new(storage: Arc<dyn SchemaStorage>) -> Self {
        Self { storage }
    }

    /// Resolves every reference in `references` concurrently, preserving
    /// declaration order in the result. Fails with
    /// [`Error::FailedResolveReferences`] on the first unresolvable entry.
    pub async fn resolve(&self, context: &str, references: &[SchemaReference]) -> Result<Vec<ResolvedReference>> {
        let fetches = references.iter().map(|r| self.resolve_one(context, r));
        try_join_all(fetches).await
    }

    async fn resolve_one(&self, context: &str, reference: &SchemaReference) -> Result<ResolvedReference> {
        let record = self
            .storage
            .get_schema_by_subject_version(context, &reference.subject, reference.version, false)
            .await
            .map_err(|_| Error::FailedResolveReferences {
                subject: reference.subject.clone(),
                version: reference.version,
            })?;

        Ok(ResolvedReference {
            reference: reference.clone(),
            schema: record.schema,
        })
    }
}
