//! The shipped schema set for the controller's entity kinds.
//!
//! One module per resource type, each building its [`ResourceSchema`]
//! record; [`default_registry`] collects them into the registry
//! [`Client::new`](crate::Client::new) installs by default. Callers can
//! start from this registry and [`register`](SchemaRegistry::register)
//! additional or replacement types before constructing the client.

pub mod app;
pub mod domain;
pub mod organization;
pub mod route;
pub mod service;
pub mod service_binding;
pub mod service_instance;
pub mod service_plan;
pub mod space;
pub mod user;

use crate::schema::{ResourceSchema, SchemaRegistry};

/// Builds the registry covering every shipped resource type.
#[must_use]
pub fn default_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(app::schema());
    registry.register(domain::schema());
    registry.register(organization::schema());
    registry.register(route::schema());
    registry.register(service::schema());
    registry.register(service_binding::schema());
    registry.register(service_instance::schema());
    registry.register(service_plan::schema());
    registry.register(space::schema());
    registry.register(user::schema());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_all_types() {
        let registry = default_registry();
        assert_eq!(
            registry.type_names(),
            vec![
                "app",
                "domain",
                "organization",
                "route",
                "service",
                "service_binding",
                "service_instance",
                "service_plan",
                "space",
                "user",
            ]
        );
    }

    #[test]
    fn test_every_relation_target_resolves() {
        let registry = default_registry();
        for name in registry.type_names() {
            let schema = registry.get(name).unwrap();
            for relation in schema.to_ones() {
                assert!(
                    registry.get(relation.target()).is_ok(),
                    "{name}.{} points at unregistered type {}",
                    relation.name(),
                    relation.target()
                );
            }
            for relation in schema.to_manys() {
                assert!(
                    registry.get(relation.target()).is_ok(),
                    "{name}.{} points at unregistered type {}",
                    relation.plural(),
                    relation.target()
                );
            }
        }
    }
}
