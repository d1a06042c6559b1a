//! The context/cascade resolver (§4.4): walks the 4-tier config/mode
//! hierarchy (subject -> context-global -> `__GLOBAL` -> server default) and
//! implements the `READONLY_OVERRIDE` kill switch as a small pure function
//! ahead of the mode cascade.

use std::sync::Arc;

use registry_core::{
    CompatibilityLevel, ConfigRecord, Metadata, Mode, ModeRecord, Result, RuleSet, SchemaStorage,
    DEFAULT_CONTEXT, GLOBAL_CONTEXT,
};

/// Resolves effective config and mode values by walking the 4-tier cascade.
pub struct CascadeResolver {
    storage: Arc<dyn SchemaStorage>,
}

impl CascadeResolver {
    /// Builds a resolver over `storage`.
    pub fn new(storage: Arc<dyn SchemaStorage>) -> Self {
        Self { storage }
    }

    /// The three config records visible to `(context, subject)`, from nearest
    /// to farthest: per-subject, context-global, and (unless `context` is
    /// already `__GLOBAL`) the reserved global context's global record.
    async fn cascade_configs(&self, context: &str, subject: &str) -> Result<Vec<ConfigRecord>> {
        let mut layers = Vec::with_capacity(3);
        if let Some(c) = self.storage.get_config(context, subject).await? {
            layers.push(c);
        }
        if let Some(c) = self.storage.get_global_config(context).await? {
            layers.push(c);
        }
        if context != GLOBAL_CONTEXT {
            if let Some(c) = self.storage.get_global_config(GLOBAL_CONTEXT).await? {
                layers.push(c);
            }
        }
        Ok(layers)
    }

    /// The effective, fully cascaded config for `(context, subject)`. Every
    /// field falls back independently to the server default given in
    /// `default_compatibility`.
    pub async fn resolve_config(
        &self,
        context: &str,
        subject: &str,
        default_compatibility: CompatibilityLevel,
    ) -> Result<ConfigRecord> {
        let layers = self.cascade_configs(context, subject).await?;

        let compatibility_level = layers
            .iter()
            .find_map(|c| c.compatibility_level)
            .unwrap_or(default_compatibility);
        let normalize = layers.iter().find_map(|c| c.normalize).unwrap_or(false);
        let validate_fields = layers.iter().find_map(|c| c.validate_fields).unwrap_or(false);
        let compatibility_group = layers.iter().find_map(|c| c.compatibility_group.clone());
        let default_metadata = layers.iter().find_map(|c| c.default_metadata.clone());
        let override_metadata = layers.iter().find_map(|c| c.override_metadata.clone());
        let default_rule_set = layers.iter().find_map(|c| c.default_rule_set.clone());
        let override_rule_set = layers.iter().find_map(|c| c.override_rule_set.clone());
        let alias = layers.iter().find_map(|c| c.alias.clone());

        Ok(ConfigRecord {
            compatibility_level: Some(compatibility_level),
            normalize: Some(normalize),
            validate_fields: Some(validate_fields),
            compatibility_group,
            default_metadata,
            override_metadata,
            default_rule_set,
            override_rule_set,
            alias,
        })
    }

    /// Convenience accessor: the effective compatibility level only.
    pub async fn resolve_compatibility_level(
        &self,
        context: &str,
        subject: &str,
        default_compatibility: CompatibilityLevel,
    ) -> Result<CompatibilityLevel> {
        let cfg = self.resolve_config(context, subject, default_compatibility).await?;
        Ok(cfg.compatibility_level.unwrap_or(default_compatibility))
    }

    /// Convenience accessor: the effective `normalize` flag only.
    pub async fn resolve_normalize(&self, context: &str, subject: &str) -> Result<bool> {
        let cfg = self.resolve_config(context, subject, CompatibilityLevel::None).await?;
        Ok(cfg.normalize.unwrap_or(false))
    }

    /// Convenience accessor: the effective `validateFields` flag only.
    pub async fn resolve_validate_fields(&self, context: &str, subject: &str) -> Result<bool> {
        let cfg = self.resolve_config(context, subject, CompatibilityLevel::None).await?;
        Ok(cfg.validate_fields.unwrap_or(false))
    }

    /// Applies the 3-layer metadata merge for `(context, subject)`: cascaded
    /// `defaultMetadata` merged with `specific`, merged with cascaded
    /// `overrideMetadata`. Returns `None` if the result carries no content.
    pub async fn merge_metadata(
        &self,
        context: &str,
        subject: &str,
        specific: Option<&Metadata>,
    ) -> Result<Option<Metadata>> {
        let cfg = self.resolve_config(context, subject, CompatibilityLevel::None).await?;
        let mut acc = cfg.default_metadata.unwrap_or_default();
        if let Some(s) = specific {
            acc = acc.merge(s);
        }
        if let Some(o) = cfg.override_metadata {
            acc = acc.merge(&o);
        }
        Ok(if acc.is_empty() { None } else { Some(acc) })
    }

    /// Applies the 3-layer ruleSet merge for `(context, subject)`, mirroring
    /// [`CascadeResolver::merge_metadata`].
    pub async fn merge_rule_set(
        &self,
        context: &str,
        subject: &str,
        specific: Option<&RuleSet>,
    ) -> Result<Option<RuleSet>> {
        let cfg = self.resolve_config(context, subject, CompatibilityLevel::None).await?;
        let mut acc = cfg.default_rule_set.unwrap_or_default();
        if let Some(s) = specific {
            acc = acc.merge(s);
        }
        if let Some(o) = cfg.override_rule_set {
            acc = acc.merge(&o);
        }
        Ok(if acc.is_empty() { None } else { Some(acc) })
    }

    /// The `READONLY_OVERRIDE` kill switch: a pure function of the two global
    /// mode records that, whenever it fires, forces every mode query on every
    /// context and subject to report `READONLY_OVERRIDE` regardless of
    /// anything stored more specifically.
    fn kill_switch(default_ctx_mode: Option<ModeRecord>, global_ctx_mode: Option<ModeRecord>) -> Option<Mode> {
        match default_ctx_mode.map(|m| m.mode).or_else(|| global_ctx_mode.map(|m| m.mode)) {
            Some(Mode::ReadOnlyOverride) => Some(Mode::ReadOnlyOverride),
            _ => None,
        }
    }

    /// The effective mode for `(context, subject)`: the kill switch takes
    /// priority over the ordinary 4-tier cascade.
    pub async fn resolve_mode(&self, context: &str, subject: &str) -> Result<Mode> {
        let default_ctx_mode = self.storage.get_global_mode(DEFAULT_CONTEXT).await?;
        let global_ctx_mode = self.storage.get_global_mode(GLOBAL_CONTEXT).await?;
        if let Some(killed) = Self::kill_switch(default_ctx_mode, global_ctx_mode) {
            return Ok(killed);
        }

        if let Some(m) = self.storage.get_mode(context, subject).await? {
            return Ok(m.mode);
        }
        if let Some(m) = self.storage.get_global_mode(context).await? {
            return Ok(m.mode);
        }
        if context != GLOBAL_CONTEXT {
            if let Some(m) = self.storage.get_global_mode(GLOBAL_CONTEXT).await? {
                return Ok(m.mode);
            }
        }
        Ok(Mode::ReadWrite)
    }
}
