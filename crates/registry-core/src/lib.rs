//! # Registry Core
//!
//! Core types, traits, and error taxonomy for the schema registry engine.
//!
//! This crate provides the foundational data structures and abstractions used
//! throughout the registry, including:
//!
//! - The schema/version/reference/config/mode data model
//! - The storage contract (`SchemaStorage`)
//! - The parser plane contract (`SchemaParser`, `ParsedSchema`)
//! - The compatibility plane contract (`CompatibilityChecker`)
//! - The error taxonomy

pub mod compat;
pub mod error;
pub mod model;
pub mod parser;
pub mod storage;
pub mod types;

pub use compat::{CheckSchema, CompatibilityChecker, CompatibilityOutcome};
pub use error::{Error, Result};
pub use model::{
    ConfigRecord, Metadata, ModeRecord, ResolvedReference, Rule, RuleSet, SchemaReference,
    SchemaRecord, CONFLUENT_RESERVED_KEY, CONFLUENT_VERSION_KEY, DEFAULT_CONTEXT, GLOBAL_CONTEXT,
};
pub use parser::{ParsedSchema, SchemaParser};
pub use storage::{ListFilter, SchemaStorage, StorageError, StorageResult};
pub use types::{CompatibilityLevel, Mode, SchemaType};
