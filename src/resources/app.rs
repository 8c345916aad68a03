//! Application resource schema.
//!
//! Applications are the central entity of the controller: staged code with
//! a memory allocation, an instance count, and a lifecycle state, bound to
//! a space and reachable through routes.
//!
//! # Wire notes
//!
//! The instance count travels as `instances` while the attribute is named
//! `total_instances` locally, and the environment travels as
//! `environment_json`. The summary endpoint's `urls` key duplicates the
//! route collection and is dropped during hydration.

use serde_json::json;

use crate::schema::{
    AttributeDef, ResourceSchema, SchemaType, ScopeParent, SummaryRule, ToManyDef, ToOneDef,
};

/// Builds the `app` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("app", "apps")
        .attribute(AttributeDef::new("name", SchemaType::Str))
        .attribute(
            AttributeDef::new("production", SchemaType::Bool).with_default(json!(false)),
        )
        .attribute(AttributeDef::new("memory", SchemaType::Integer).with_default(json!(256)))
        .attribute(
            AttributeDef::new("total_instances", SchemaType::Integer)
                .at("instances")
                .with_default(json!(1)),
        )
        .attribute(
            AttributeDef::new("state", SchemaType::pattern("^(STARTED|STOPPED)$"))
                .with_default(json!("STOPPED")),
        )
        .attribute(AttributeDef::new("command", SchemaType::Str))
        .attribute(AttributeDef::new("console", SchemaType::Bool).with_default(json!(false)))
        .attribute(AttributeDef::new("buildpack", SchemaType::Str))
        .attribute(AttributeDef::new("detected_buildpack", SchemaType::Str).read_only())
        .attribute(
            AttributeDef::new("environment", SchemaType::Any)
                .at("environment_json")
                .with_default(json!({})),
        )
        .to_one(ToOneDef::new("space", "space"))
        .to_many(ToManyDef::new("service_bindings", "service_binding"))
        .to_many(ToManyDef::new("routes", "route"))
        .queryable(["name", "space_guid", "organization_guid"])
        .scoped_to(ScopeParent::Space)
        .summary_rule("urls", SummaryRule::Ignore)
        .build()
}
