//! Summary fetch and recursive graph hydration.
//!
//! Types declaring a summary endpoint expose `GET
//! /v2/<plural>/<guid>/summary`, a denormalized body covering the resource
//! and its relation graph. [`Resource::summarize`] performs the single
//! round trip and [`Resource::hydrate`] populates the object graph from
//! the body: per key, a declared rule runs, a plain attribute is absorbed,
//! a to-one relation hydrates recursively, or each member of a to-many
//! relation hydrates. Hydrated values are server state — they land in the
//! manifest and caches, never in the diff.

use serde_json::Value;

use crate::client::Client;
use crate::clients::ApiError;
use crate::resource::instance::Resource;
use crate::schema::{SchemaRegistry, SummaryRule};

impl Resource {
    /// Fetches the summary body and hydrates the instance from it.
    ///
    /// Returns the raw summary body for callers that want keys the schema
    /// does not model.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotPersisted`] on unsaved instances,
    /// [`ApiError::UnknownRelation`] when the type declares no summary
    /// endpoint, and propagates fetch errors.
    pub async fn summarize(&mut self, client: &Client) -> Result<Value, ApiError> {
        if !self.schema().has_summary() {
            return Err(ApiError::UnknownRelation {
                resource: self.type_name().to_string(),
                relation: "summary".to_string(),
            });
        }
        let Some(guid) = self.guid().map(ToString::to_string) else {
            return Err(self.not_persisted("summarize"));
        };

        let body = client
            .transport()
            .get_json(
                [
                    "v2".to_string(),
                    self.schema().plural().to_string(),
                    guid,
                    "summary".to_string(),
                ],
                Vec::new(),
            )
            .await?;

        self.hydrate(client.registry(), &body)?;
        Ok(body)
    }

    /// Populates the instance (and its relation graph) from a summary
    /// body.
    ///
    /// Key handling, in order: a declared [`SummaryRule`], the `guid`
    /// identity key, a plain attribute matched by wire key, a to-one
    /// relation (object value, hydrated recursively), a to-many relation
    /// (array value, each member hydrated). Unmatched keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownType`] when a relation target is not
    /// registered.
    pub fn hydrate(&mut self, registry: &SchemaRegistry, body: &Value) -> Result<(), ApiError> {
        let Some(object) = body.as_object() else {
            return Ok(());
        };

        for (key, value) in object {
            if let Some(rule) = self.schema().summary_rule(key).cloned() {
                match rule {
                    SummaryRule::Ignore => {}
                    SummaryRule::AssignTo(attribute) => self.absorb(&attribute, value.clone()),
                    SummaryRule::Custom(action) => (*action)(self, value),
                }
                continue;
            }

            if key == "guid" {
                if let Some(guid) = value.as_str() {
                    self.assume_guid(guid);
                }
                continue;
            }

            if let Some(def) = self.schema().attribute_by_wire_key(key) {
                let name = def.name().to_string();
                self.absorb(&name, value.clone());
                continue;
            }

            if let Some(def) = self.schema().to_one(key).cloned() {
                if value.is_object() {
                    let child_schema = registry.get(def.target())?;
                    let mut child = Resource::new(child_schema);
                    child.hydrate(registry, value)?;
                    self.relation_cache.insert(key.clone(), vec![child]);
                }
                continue;
            }

            if let Some(def) = self.schema().to_many(key).cloned() {
                if let Some(values) = value.as_array() {
                    let child_schema = registry.get(def.target())?;
                    let mut children = Vec::with_capacity(values.len());
                    for member in values {
                        let mut child = Resource::new(child_schema.clone());
                        child.hydrate(registry, member)?;
                        children.push(child);
                    }
                    self.relation_cache.insert(key.clone(), children);
                }
                continue;
            }
        }

        Ok(())
    }

    /// Absorbs server state into an attribute: manifest entity and cache,
    /// never the diff.
    pub(crate) fn absorb(&mut self, attribute: &str, value: Value) {
        let Some(def) = self.schema.attribute(attribute) else {
            return;
        };
        let wire_key = def.wire_key().to_string();
        self.cache.insert(attribute.to_string(), value.clone());
        self.manifest
            .get_or_insert_with(Default::default)
            .entity
            .insert(wire_key, value);
    }

    /// Adopts a server-reported identity without touching local edits.
    pub(crate) fn assume_guid(&mut self, guid: &str) {
        self.guid = Some(guid.to_string());
        self.manifest
            .get_or_insert_with(Default::default)
            .metadata
            .guid = Some(guid.to_string());
        self.deleted = false;
    }
}
