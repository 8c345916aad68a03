//! Domain resource schema.

use serde_json::json;

use crate::schema::{AttributeDef, ResourceSchema, SchemaType, ScopeParent, ToOneDef};

/// Builds the `domain` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("domain", "domains")
        .attribute(AttributeDef::new(
            "name",
            SchemaType::pattern(r"^[a-z0-9-]+(\.[a-z0-9-]+)+$"),
        ))
        .attribute(AttributeDef::new("wildcard", SchemaType::Bool).with_default(json!(true)))
        .to_one(ToOneDef::new("owning_organization", "organization"))
        .queryable(["name", "owning_organization_guid"])
        .scoped_to(ScopeParent::Organization)
        .build()
}
