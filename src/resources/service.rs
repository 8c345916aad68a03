//! Service resource schema.
//!
//! A service is a catalog entry (label/provider/version) whose concrete
//! offerings are its service plans.

use serde_json::json;

use crate::schema::{AttributeDef, ResourceSchema, SchemaType, ToManyDef};

/// Builds the `service` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("service", "services")
        .attribute(AttributeDef::new("label", SchemaType::Str))
        .attribute(AttributeDef::new("provider", SchemaType::Str))
        .attribute(AttributeDef::new("url", SchemaType::Str))
        .attribute(AttributeDef::new("description", SchemaType::Str))
        .attribute(AttributeDef::new("version", SchemaType::Str))
        .attribute(AttributeDef::new("active", SchemaType::Bool).with_default(json!(false)))
        .to_many(ToManyDef::new("service_plans", "service_plan"))
        .queryable(["label", "provider"])
        .build()
}
