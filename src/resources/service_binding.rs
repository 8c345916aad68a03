//! Service binding resource schema.
//!
//! A binding joins an app to a service instance; the broker-issued
//! credentials are server-assigned and read-only.

use serde_json::json;

use crate::schema::{AttributeDef, ResourceSchema, SchemaType, ToOneDef};

/// Builds the `service_binding` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("service_binding", "service_bindings")
        .attribute(
            AttributeDef::new("binding_options", SchemaType::Any).with_default(json!({})),
        )
        .attribute(AttributeDef::new("credentials", SchemaType::Any).read_only())
        .to_one(ToOneDef::new("app", "app"))
        .to_one(ToOneDef::new("service_instance", "service_instance"))
        .queryable(["app_guid", "service_instance_guid"])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_binding_schema_shape() {
        let schema = schema();
        assert_eq!(schema.plural(), "service_bindings");
        assert_eq!(schema.to_one("app").unwrap().guid_key(), "app_guid");
        assert!(schema.attribute("credentials").unwrap().is_read_only());
    }
}
