//! Service instance resource schema.

use serde_json::json;

use crate::schema::{
    AttributeDef, ResourceSchema, SchemaType, ScopeParent, ToManyDef, ToOneDef,
};

/// Builds the `service_instance` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("service_instance", "service_instances")
        .attribute(AttributeDef::new("name", SchemaType::Str))
        .attribute(
            AttributeDef::new("credentials", SchemaType::Any).with_default(json!({})),
        )
        .to_one(ToOneDef::new("space", "space"))
        .to_one(ToOneDef::new("service_plan", "service_plan"))
        .to_many(ToManyDef::new("service_bindings", "service_binding"))
        .queryable(["name", "space_guid", "service_plan_guid"])
        .scoped_to(ScopeParent::Space)
        .build()
}
