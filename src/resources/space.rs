//! Space resource schema.

use crate::schema::{
    AttributeDef, ResourceSchema, SchemaType, ScopeParent, ToManyDef, ToOneDef,
};

/// Builds the `space` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("space", "spaces")
        .attribute(AttributeDef::new("name", SchemaType::Str))
        .to_one(ToOneDef::new("organization", "organization"))
        .to_many(ToManyDef::new("apps", "app"))
        .to_many(ToManyDef::new("domains", "domain"))
        .to_many(ToManyDef::new("service_instances", "service_instance"))
        .to_many(ToManyDef::new("developers", "user"))
        .queryable(["name", "organization_guid", "developer_guid"])
        .scoped_to(ScopeParent::Organization)
        .summary()
        .build()
}
