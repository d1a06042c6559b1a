//! The compatibility plane contract (§4.2).

use crate::error::Result;
use crate::model::ResolvedReference;
use crate::types::{CompatibilityLevel, SchemaType};

/// One schema to check, with its references already resolved to full text —
/// "inputs carry fully resolved reference content".
#[derive(Debug, Clone)]
pub struct CheckSchema {
    /// The schema text (already normalized, if applicable).
    pub schema: String,
    /// Resolved reference content, in declaration order.
    pub references: Vec<ResolvedReference>,
}

/// Result of a compatibility check: a pure predicate plus diagnostic messages.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityOutcome {
    /// Whether the new schema is compatible under the checked mode.
    pub is_compatible: bool,
    /// Human-readable violation messages, empty when compatible.
    pub messages: Vec<String>,
}

impl CompatibilityOutcome {
    /// A compatible outcome with no messages.
    pub fn compatible() -> Self {
        Self {
            is_compatible: true,
            messages: Vec::new(),
        }
    }

    /// An incompatible outcome carrying the given violation messages.
    pub fn incompatible(messages: Vec<String>) -> Self {
        Self {
            is_compatible: false,
            messages,
        }
    }

    /// Merges another outcome into this one: incompatibility and messages
    /// accumulate, compatibility requires both sides to be compatible.
    pub fn and(mut self, other: CompatibilityOutcome) -> Self {
        self.is_compatible = self.is_compatible && other.is_compatible;
        self.messages.extend(other.messages);
        self
    }
}

/// Per-schema-type compatibility checker.
///
/// The engine treats this as a pure predicate: given a mode and a list of
/// schemas already selected per the mode table in §4.2, evaluate compatibility.
/// Mode-to-"which schemas to check" selection is the engine's job, not the
/// checker's — by the time `check` is called, `existing_schemas` already holds
/// exactly the schemas that should be checked against.
pub trait CompatibilityChecker: Send + Sync {
    /// The schema type this checker handles.
    fn schema_type(&self) -> SchemaType;

    /// Checks `new_schema` against each of `existing_schemas` in the
    /// direction(s) implied by `mode`, returning the conjunction of all
    /// individual checks.
    fn check(
        &self,
        mode: CompatibilityLevel,
        new_schema: &CheckSchema,
        existing_schemas: &[CheckSchema],
    ) -> Result<CompatibilityOutcome>;
}
