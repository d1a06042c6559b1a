//! # Registry Engine
//!
//! The orchestration layer (§4, §4.4, §4.5) wiring the parser plane, the
//! compatibility plane, the cascaded config/mode resolver, and the reference
//! resolver together against a [`registry_core::SchemaStorage`] backend.

mod cascade;
mod engine;
mod reference_resolver;

pub use cascade::CascadeResolver;
pub use engine::{
    ImportItem, ImportItemResult, RegisterOptions, RegistryEngine, VersionSelector,
};
pub use reference_resolver::ReferenceResolver;
