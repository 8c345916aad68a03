//! Organization resource schema.

use serde_json::json;

use crate::schema::{AttributeDef, ResourceSchema, SchemaType, ToManyDef};

/// Builds the `organization` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("organization", "organizations")
        .attribute(AttributeDef::new("name", SchemaType::Str))
        .attribute(
            AttributeDef::new("billing_enabled", SchemaType::Bool).with_default(json!(false)),
        )
        .attribute(
            AttributeDef::new("status", SchemaType::pattern("^(active|suspended)$"))
                .with_default(json!("active")),
        )
        .to_many(ToManyDef::new("spaces", "space"))
        .to_many(ToManyDef::new("domains", "domain"))
        .to_many(ToManyDef::new("users", "user"))
        .to_many(ToManyDef::new("managers", "user"))
        .queryable(["name", "status"])
        .summary()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_schema_shape() {
        let schema = schema();
        assert_eq!(schema.name(), "organization");
        assert_eq!(schema.plural(), "organizations");
        assert!(schema.scope_parent().is_none());
        assert!(schema.has_summary());
    }

    #[test]
    fn test_organization_user_collections() {
        let schema = schema();
        assert_eq!(schema.to_many("users").unwrap().target(), "user");
        assert_eq!(schema.to_many("managers").unwrap().target(), "user");
    }
}
