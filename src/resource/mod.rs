//! Resource instances: the model half of the resource framework.
//!
//! This module provides:
//!
//! - [`Manifest`]/[`Metadata`]: the `{metadata, entity}` server
//!   representation
//! - [`Resource`]: the generic typed instance — lazy attribute access,
//!   validated writes with dirty-diff tracking, relation traversal, and
//!   the create/update/delete/invalidate lifecycle
//! - [`LifecycleState`]: Unsaved → Persisted → Deleted
//!
//! Instances are created through the [`Client`](crate::Client) factory and
//! carry their schema; all accessor logic is generic over the schema
//! record, so no per-type code exists.

mod instance;
mod manifest;
mod relations;
mod summary;

pub use instance::{LifecycleState, Resource};
pub use manifest::{Manifest, Metadata};

pub(crate) use instance::parse_manifest;
