//! The declarative resource-schema framework.
//!
//! This module provides the schema half of the resource model:
//!
//! - [`SchemaType`]: semantic attribute types with structural validation
//! - [`AttributeDef`]: per-attribute metadata (type, default, flags, wire key)
//! - [`ToOneDef`]/[`ToManyDef`]: relation metadata
//! - [`Query`]/[`Comparator`]: filter predicates and their `q=` wire encoding
//! - [`ResourceSchema`]/[`SchemaBuilder`]: the per-type record, built once
//!   at startup
//! - [`SchemaRegistry`]: the explicit type-name → schema mapping held by
//!   the client
//!
//! Schemas are plain data consumed by the generic accessor logic on
//! [`Resource`](crate::resource::Resource); nothing is generated per type
//! and no global state exists.

mod attribute;
mod query;
mod registry;
mod relation;
mod types;

pub use attribute::AttributeDef;
pub use query::{Comparator, Filter, Query};
pub use registry::{
    ResourceSchema, SchemaBuilder, SchemaRegistry, ScopeParent, SummaryFn, SummaryRule,
};
pub use relation::{ToManyDef, ToOneDef};
pub use types::SchemaType;
