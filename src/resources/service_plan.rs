//! Service plan resource schema.

use serde_json::json;

use crate::schema::{AttributeDef, ResourceSchema, SchemaType, ToManyDef, ToOneDef};

/// Builds the `service_plan` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("service_plan", "service_plans")
        .attribute(AttributeDef::new("name", SchemaType::Str))
        .attribute(AttributeDef::new("description", SchemaType::Str))
        .attribute(AttributeDef::new("free", SchemaType::Bool).with_default(json!(false)))
        .to_one(ToOneDef::new("service", "service"))
        .to_many(ToManyDef::new("service_instances", "service_instance"))
        .queryable(["service_guid"])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_plan_schema_shape() {
        let schema = schema();
        assert_eq!(schema.plural(), "service_plans");
        assert_eq!(schema.to_one("service").unwrap().guid_key(), "service_guid");
        assert!(schema.is_queryable("service_guid"));
    }
}
