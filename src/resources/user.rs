//! User resource schema.
//!
//! The controller's user record is thin: identity lives with the identity
//! provider, the controller only tracks admin status and membership.

use serde_json::json;

use crate::schema::{AttributeDef, ResourceSchema, SchemaType, ToManyDef, ToOneDef};

/// Builds the `user` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("user", "users")
        .attribute(AttributeDef::new("admin", SchemaType::Bool).with_default(json!(false)))
        .to_one(ToOneDef::new("default_space", "space"))
        .to_many(ToManyDef::new("organizations", "organization"))
        .to_many(ToManyDef::new("spaces", "space"))
        .queryable(["organization_guid", "space_guid"])
        .build()
}
