//! Route resource schema.
//!
//! A route is a host under a domain, mapped into a space and bound to
//! apps through the app's `routes` relation.

use serde_json::json;

use crate::schema::{AttributeDef, ResourceSchema, SchemaType, ToOneDef};

/// Builds the `route` schema.
#[must_use]
pub fn schema() -> ResourceSchema {
    ResourceSchema::builder("route", "routes")
        .attribute(
            AttributeDef::new("host", SchemaType::pattern("^[a-z0-9-]*$"))
                .with_default(json!("")),
        )
        .to_one(ToOneDef::new("domain", "domain"))
        .to_one(ToOneDef::new("space", "space"))
        .queryable(["host", "domain_guid"])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_schema_shape() {
        let schema = schema();
        assert_eq!(schema.plural(), "routes");
        assert_eq!(schema.to_one("domain").unwrap().target(), "domain");
        assert!(schema.is_queryable("host"));
    }

    #[test]
    fn test_route_host_pattern() {
        let host = schema().attribute("host").cloned().unwrap();
        assert!(host.validate(&json!("dora-staging")).is_ok());
        assert!(host.validate(&json!("")).is_ok());
        assert!(host.validate(&json!("No Spaces Allowed")).is_err());
    }
}
