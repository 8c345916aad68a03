//! Resource instances: lazy attributes, dirty diff, CRUD lifecycle.
//!
//! A [`Resource`] is a typed local handle on a remote entity. Reads are
//! lazy (the manifest is fetched at most once per invalidation), writes are
//! validated and purely local, and the accumulated diff is transmitted by
//! [`create`](Resource::create) / [`update`](Resource::update).
//!
//! # State invariant
//!
//! The externally visible value of an attribute is
//! `cache[attr] ?? manifest.entity[wire_key] ?? default`. A successful
//! write updates `cache`, `manifest.entity`, and `diff` together; a write
//! failing validation changes nothing.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::client::Client;
use crate::clients::{ApiError, HttpMethod, HttpRequest, MimeType, Payload};
use crate::resource::manifest::{Manifest, Metadata};
use crate::schema::ResourceSchema;

/// The lifecycle state of a resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No remote identity yet; `create` will POST.
    Unsaved,
    /// Has a GUID; `update`/`delete` address it.
    Persisted,
    /// Deleted remotely; the GUID is cleared.
    Deleted,
}

/// A typed local handle on one remote entity.
///
/// Constructed through the [`Client`] factory methods
/// ([`build`](Client::build), [`find`](Client::find), ...); the schema
/// drives all attribute and relation access, so one generic type serves
/// every registered resource kind.
///
/// # Concurrency
///
/// `Resource` is not internally synchronized. The cache/diff/manifest
/// triple is mutated through `&mut self`; sharing an instance across tasks
/// requires caller-side serialization.
///
/// # Example
///
/// ```rust,ignore
/// let mut app = client.build("app")?;
/// app.set("name", json!("dora"))?;
/// app.set("memory", json!(256))?;
/// app.create(&client).await?;            // POST /v2/apps with the diff
///
/// app.set("memory", json!(512))?;
/// app.update(&client).await?;            // PUT only {"memory": 512}
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    pub(super) schema: Arc<ResourceSchema>,
    pub(super) guid: Option<String>,
    pub(super) manifest: Option<Manifest>,
    pub(super) cache: HashMap<String, Value>,
    pub(super) relation_cache: HashMap<String, Vec<Resource>>,
    pub(super) diff: serde_json::Map<String, Value>,
    pub(super) changes: HashMap<String, (Value, Value)>,
    pub(super) errors: Vec<ApiError>,
    pub(super) deleted: bool,
}

impl Resource {
    /// Creates an unsaved instance of the given type.
    pub(crate) fn new(schema: Arc<ResourceSchema>) -> Self {
        Self {
            schema,
            guid: None,
            manifest: None,
            cache: HashMap::new(),
            relation_cache: HashMap::new(),
            diff: serde_json::Map::new(),
            changes: HashMap::new(),
            errors: Vec::new(),
            deleted: false,
        }
    }

    /// Creates an instance addressing a known GUID, manifest unfetched.
    pub(crate) fn with_guid(schema: Arc<ResourceSchema>, guid: impl Into<String>) -> Self {
        let mut resource = Self::new(schema);
        resource.guid = Some(guid.into());
        resource
    }

    /// Creates an instance from a fetched manifest.
    pub(crate) fn from_manifest(schema: Arc<ResourceSchema>, manifest: Manifest) -> Self {
        let mut resource = Self::new(schema);
        resource.guid = manifest.guid().map(ToString::to_string);
        resource.manifest = Some(manifest);
        resource
    }

    /// Returns the schema backing this instance.
    #[must_use]
    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Returns the type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// Returns the GUID, if the instance is persisted.
    #[must_use]
    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        if self.deleted {
            LifecycleState::Deleted
        } else if self.guid.is_some() {
            LifecycleState::Persisted
        } else {
            LifecycleState::Unsaved
        }
    }

    /// Returns `true` when the instance has a remote identity.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.guid.is_some()
    }

    /// Returns the last-known manifest, if fetched.
    #[must_use]
    pub const fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Returns the pending wire-keyed diff.
    #[must_use]
    pub const fn diff(&self) -> &serde_json::Map<String, Value> {
        &self.diff
    }

    /// Returns the human-readable `{attr: (old, new)}` change log.
    ///
    /// For introspection only; never transmitted.
    #[must_use]
    pub const fn changes(&self) -> &HashMap<String, (Value, Value)> {
        &self.changes
    }

    /// Returns the errors accumulated by the lenient create/delete
    /// variants.
    #[must_use]
    pub fn errors(&self) -> &[ApiError] {
        &self.errors
    }

    /// Drains and returns the accumulated errors.
    pub fn take_errors(&mut self) -> Vec<ApiError> {
        std::mem::take(&mut self.errors)
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Reads an attribute: cached value, else manifest (fetched at most
    /// once), else the declared default.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownAttribute`] for undeclared names,
    /// [`ApiError::AccessDenied`] for write-only attributes, and
    /// propagates fetch errors.
    pub async fn get(&mut self, client: &Client, name: &str) -> Result<Value, ApiError> {
        let def = self.attribute_def(name)?;
        if def.is_write_only() {
            return Err(ApiError::AccessDenied {
                resource: self.type_name().to_string(),
                attribute: name.to_string(),
                write: false,
            });
        }

        if let Some(value) = self.cache.get(name) {
            return Ok(value.clone());
        }

        self.ensure_manifest(client).await?;

        // Declared defaults bypass validation; only caller writes validate.
        let value = self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.entity.get(def.wire_key()))
            .cloned()
            .unwrap_or_else(|| def.default().clone());

        self.cache.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Reads an attribute without I/O: cached value, local manifest, or
    /// default.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), minus fetch errors.
    pub fn get_local(&self, name: &str) -> Result<Value, ApiError> {
        let def = self.attribute_def(name)?;
        if def.is_write_only() {
            return Err(ApiError::AccessDenied {
                resource: self.type_name().to_string(),
                attribute: name.to_string(),
                write: false,
            });
        }

        if let Some(value) = self.cache.get(name) {
            return Ok(value.clone());
        }
        Ok(self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.entity.get(def.wire_key()))
            .cloned()
            .unwrap_or_else(|| def.default().clone()))
    }

    /// Writes an attribute after validating it, updating cache, manifest
    /// entity, and diff together. No I/O happens until `create`/`update`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Mismatch`] (leaving all state untouched) when
    /// the value fails validation, [`ApiError::AccessDenied`] for
    /// read-only attributes, [`ApiError::UnknownAttribute`] for undeclared
    /// names.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ApiError> {
        let def = self.attribute_def(name)?;
        if def.is_read_only() {
            return Err(ApiError::AccessDenied {
                resource: self.type_name().to_string(),
                attribute: name.to_string(),
                write: true,
            });
        }
        def.validate(&value)?;

        let wire_key = def.wire_key().to_string();
        let old = self
            .cache
            .get(name)
            .cloned()
            .or_else(|| {
                self.manifest
                    .as_ref()
                    .and_then(|manifest| manifest.entity.get(&wire_key))
                    .cloned()
            })
            .unwrap_or_else(|| def.default().clone());

        self.changes
            .insert(name.to_string(), (old, value.clone()));
        self.cache.insert(name.to_string(), value.clone());
        self.manifest
            .get_or_insert_with(Manifest::default)
            .entity
            .insert(wire_key.clone(), value.clone());
        self.diff.insert(wire_key, value);
        Ok(())
    }

    fn attribute_def(&self, name: &str) -> Result<crate::schema::AttributeDef, ApiError> {
        self.schema
            .attribute(name)
            .cloned()
            .ok_or_else(|| ApiError::UnknownAttribute {
                resource: self.type_name().to_string(),
                attribute: name.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Fetches the manifest if the instance is persisted and has none.
    pub(super) async fn ensure_manifest(&mut self, client: &Client) -> Result<(), ApiError> {
        if self.manifest.is_some() {
            return Ok(());
        }
        let Some(guid) = self.guid.clone() else {
            return Ok(());
        };

        let body = client
            .transport()
            .get_json(
                [
                    "v2".to_string(),
                    self.schema.plural().to_string(),
                    guid,
                ],
                Vec::new(),
            )
            .await?;
        self.manifest = Some(parse_manifest(&body)?);
        Ok(())
    }

    /// Drops local state and refetches the manifest.
    ///
    /// # Errors
    ///
    /// Propagates transport and classification errors.
    pub async fn fetch(&mut self, client: &Client) -> Result<(), ApiError> {
        self.invalidate();
        self.ensure_manifest(client).await
    }

    /// Refetches with a server-side relation embedding depth.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotPersisted`] on unsaved instances, and
    /// propagates transport errors.
    pub async fn fetch_with_depth(&mut self, client: &Client, depth: u32) -> Result<(), ApiError> {
        let Some(guid) = self.guid.clone() else {
            return Err(self.not_persisted("fetch"));
        };
        self.invalidate();

        let body = client
            .transport()
            .get_json(
                ["v2".to_string(), self.schema.plural().to_string(), guid],
                vec![("inline-relations-depth".to_string(), depth.to_string())],
            )
            .await?;
        self.manifest = Some(parse_manifest(&body)?);
        Ok(())
    }

    /// Creates the resource: POST the accumulated diff as the entity body.
    ///
    /// When the type declares a scope parent and the client carries the
    /// matching current scope, the parent relation's foreign key is
    /// auto-populated into the body (the diff itself is left untouched,
    /// and an explicit write always wins).
    ///
    /// On success the GUID is assigned from the response, the response
    /// manifest is merged, and the diff is cleared. On failure the
    /// instance remains Unsaved with its diff intact.
    ///
    /// # Errors
    ///
    /// Propagates transport and classification errors.
    pub async fn create(&mut self, client: &Client) -> Result<(), ApiError> {
        let mut body = self.diff.clone();
        if let Some(parent) = self.schema.scope_parent() {
            let scope = match parent {
                crate::schema::ScopeParent::Organization => client.current_organization(),
                crate::schema::ScopeParent::Space => client.current_space(),
            };
            if let Some(guid) = scope {
                if !body.contains_key(parent.guid_key()) {
                    body.insert(
                        parent.guid_key().to_string(),
                        Value::String(guid.to_string()),
                    );
                }
            }
        }

        let request = HttpRequest {
            method: HttpMethod::Post,
            segments: vec!["v2".to_string(), self.schema.plural().to_string()],
            query: Vec::new(),
            payload: Some(Payload::Json(Value::Object(body))),
            content_type: Some(MimeType::Json),
            accept: Some(MimeType::Json),
            extra_headers: Vec::new(),
            follow_redirects: true,
        };
        let response = client.transport().request(request).await?;
        let manifest = parse_manifest_response(&response)?;

        self.guid = manifest.guid().map(ToString::to_string);
        self.merge_manifest(manifest);
        self.diff.clear();
        self.changes.clear();
        self.deleted = false;
        Ok(())
    }

    /// Updates the resource: PUT the diff only. A clean instance performs
    /// no round trip.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotPersisted`] on unsaved instances, and
    /// propagates transport errors.
    pub async fn update(&mut self, client: &Client) -> Result<(), ApiError> {
        let Some(guid) = self.guid.clone() else {
            return Err(self.not_persisted("update"));
        };
        if self.diff.is_empty() {
            return Ok(());
        }

        let request = HttpRequest {
            method: HttpMethod::Put,
            segments: vec![
                "v2".to_string(),
                self.schema.plural().to_string(),
                guid,
            ],
            query: Vec::new(),
            payload: Some(Payload::Json(Value::Object(self.diff.clone()))),
            content_type: Some(MimeType::Json),
            accept: Some(MimeType::Json),
            extra_headers: Vec::new(),
            follow_redirects: true,
        };
        let response = client.transport().request(request).await?;

        if let Ok(manifest) = parse_manifest_response(&response) {
            self.merge_manifest(manifest);
        }
        self.diff.clear();
        self.changes.clear();
        Ok(())
    }

    /// Deletes the resource. Idempotent against an already-deleted
    /// instance. On success the identity metadata is cleared and the
    /// instance becomes non-persisted.
    ///
    /// # Errors
    ///
    /// Propagates transport and classification errors; on failure the
    /// instance keeps its identity.
    pub async fn delete(&mut self, client: &Client) -> Result<(), ApiError> {
        let Some(guid) = self.guid.clone() else {
            return Ok(());
        };

        let request = HttpRequest {
            method: HttpMethod::Delete,
            segments: vec![
                "v2".to_string(),
                self.schema.plural().to_string(),
                guid,
            ],
            query: Vec::new(),
            payload: None,
            content_type: None,
            accept: Some(MimeType::Json),
            extra_headers: Vec::new(),
            follow_redirects: true,
        };
        client.transport().request(request).await?;

        self.guid = None;
        if let Some(manifest) = &mut self.manifest {
            manifest.metadata = Metadata::default();
        }
        self.diff.clear();
        self.changes.clear();
        self.deleted = true;
        Ok(())
    }

    /// Like [`create`](Self::create), but controller API rejections are
    /// recorded into [`errors`](Self::errors) instead of returned.
    ///
    /// Returns `true` when the resource was created. Transport-level
    /// failures still propagate.
    ///
    /// # Errors
    ///
    /// Propagates every error other than [`ApiError::Denied`] and
    /// [`ApiError::Api`].
    pub async fn create_lenient(&mut self, client: &Client) -> Result<bool, ApiError> {
        match self.create(client).await {
            Ok(()) => Ok(true),
            Err(error @ (ApiError::Denied { .. } | ApiError::Api { .. })) => {
                self.errors.push(error);
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Like [`delete`](Self::delete), but controller API rejections are
    /// recorded into [`errors`](Self::errors) instead of returned.
    ///
    /// # Errors
    ///
    /// Propagates every error other than [`ApiError::Denied`] and
    /// [`ApiError::Api`].
    pub async fn delete_lenient(&mut self, client: &Client) -> Result<bool, ApiError> {
        match self.delete(client).await {
            Ok(()) => Ok(true),
            Err(error @ (ApiError::Denied { .. } | ApiError::Api { .. })) => {
                self.errors.push(error);
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Drops manifest, caches, diff, and change log, forcing a refetch on
    /// the next read. The lifecycle state is unchanged.
    pub fn invalidate(&mut self) {
        self.manifest = None;
        self.cache.clear();
        self.relation_cache.clear();
        self.diff.clear();
        self.changes.clear();
    }

    pub(super) fn merge_manifest(&mut self, manifest: Manifest) {
        match &mut self.manifest {
            Some(existing) => existing.merge(manifest),
            None => self.manifest = Some(manifest),
        }
        // Cached reads must reflect the fresher server copy.
        self.cache.clear();
    }

    pub(super) fn not_persisted(&self, operation: &'static str) -> ApiError {
        ApiError::NotPersisted {
            resource: self.type_name().to_string(),
            operation,
        }
    }
}

pub(crate) fn parse_manifest(body: &Value) -> Result<Manifest, ApiError> {
    serde_json::from_value(body.clone()).map_err(|_| ApiError::BadResponse {
        status: 200,
        body: body.to_string(),
        trace: None,
    })
}

fn parse_manifest_response(
    response: &crate::clients::HttpResponse,
) -> Result<Manifest, ApiError> {
    let body = response.body.as_ref().ok_or_else(|| ApiError::BadResponse {
        status: response.status,
        body: response.raw_body.clone(),
        trace: None,
    })?;
    parse_manifest(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDef, SchemaType};
    use serde_json::json;

    fn app_schema() -> Arc<ResourceSchema> {
        Arc::new(
            ResourceSchema::builder("app", "apps")
                .attribute(AttributeDef::new("name", SchemaType::Str))
                .attribute(
                    AttributeDef::new("total_instances", SchemaType::Integer)
                        .at("instances")
                        .with_default(json!(1)),
                )
                .attribute(AttributeDef::new("state", SchemaType::Str).read_only())
                .attribute(AttributeDef::new("secret", SchemaType::Str).write_only())
                .build(),
        )
    }

    #[test]
    fn test_new_instance_is_unsaved() {
        let app = Resource::new(app_schema());
        assert_eq!(app.state(), LifecycleState::Unsaved);
        assert!(app.guid().is_none());
        assert!(app.diff().is_empty());
    }

    #[test]
    fn test_with_guid_is_persisted() {
        let app = Resource::with_guid(app_schema(), "app-1");
        assert_eq!(app.state(), LifecycleState::Persisted);
        assert_eq!(app.guid(), Some("app-1"));
    }

    #[test]
    fn test_set_updates_cache_manifest_and_diff_together() {
        let mut app = Resource::new(app_schema());
        app.set("total_instances", json!(3)).unwrap();

        assert_eq!(app.cache.get("total_instances"), Some(&json!(3)));
        assert_eq!(app.manifest.as_ref().unwrap().entity["instances"], json!(3));
        assert_eq!(app.diff().get("instances"), Some(&json!(3)));
        assert_eq!(
            app.changes().get("total_instances"),
            Some(&(json!(1), json!(3)))
        );
    }

    #[test]
    fn test_set_round_trips_through_get_local() {
        let mut app = Resource::new(app_schema());
        app.set("name", json!("dora")).unwrap();
        assert_eq!(app.get_local("name").unwrap(), json!("dora"));
    }

    #[test]
    fn test_failed_validation_leaves_state_untouched() {
        let mut app = Resource::new(app_schema());
        let error = app.set("total_instances", json!("three")).unwrap_err();

        assert!(matches!(error, ApiError::Mismatch { .. }));
        assert!(app.cache.is_empty());
        assert!(app.diff().is_empty());
        assert!(app.changes().is_empty());
        assert!(app.manifest.is_none());
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let mut app = Resource::new(app_schema());
        assert!(matches!(
            app.set("droplet", json!(1)),
            Err(ApiError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            app.get_local("droplet"),
            Err(ApiError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_read_only_and_write_only_flags_enforced() {
        let mut app = Resource::new(app_schema());
        assert!(matches!(
            app.set("state", json!("STARTED")),
            Err(ApiError::AccessDenied { write: true, .. })
        ));
        assert!(matches!(
            app.get_local("secret"),
            Err(ApiError::AccessDenied { write: false, .. })
        ));
        // The write-only attribute is still writable.
        assert!(app.set("secret", json!("hunter2")).is_ok());
    }

    #[test]
    fn test_default_returned_before_any_write_or_fetch() {
        let app = Resource::new(app_schema());
        assert_eq!(app.get_local("total_instances").unwrap(), json!(1));
        assert_eq!(app.get_local("name").unwrap(), Value::Null);
    }

    #[test]
    fn test_manifest_value_beats_default_cache_beats_manifest() {
        let manifest: Manifest = serde_json::from_value(json!({
            "metadata": {"guid": "app-1"},
            "entity": {"instances": 4}
        }))
        .unwrap();
        let mut app = Resource::from_manifest(app_schema(), manifest);

        assert_eq!(app.get_local("total_instances").unwrap(), json!(4));

        app.set("total_instances", json!(8)).unwrap();
        assert_eq!(app.get_local("total_instances").unwrap(), json!(8));
    }

    #[test]
    fn test_invalidate_drops_local_state_keeps_identity() {
        let manifest: Manifest = serde_json::from_value(json!({
            "metadata": {"guid": "app-1"},
            "entity": {"name": "dora"}
        }))
        .unwrap();
        let mut app = Resource::from_manifest(app_schema(), manifest);
        app.set("name", json!("renamed")).unwrap();

        app.invalidate();

        assert_eq!(app.state(), LifecycleState::Persisted);
        assert!(app.manifest().is_none());
        assert!(app.diff().is_empty());
        assert!(app.changes().is_empty());
        assert!(app.cache.is_empty());
    }

    #[test]
    fn test_merge_manifest_prefers_server_copy() {
        let mut app = Resource::new(app_schema());
        app.set("name", json!("dora")).unwrap();

        let server: Manifest = serde_json::from_value(json!({
            "metadata": {"guid": "app-1"},
            "entity": {"name": "dora", "instances": 2}
        }))
        .unwrap();
        app.merge_manifest(server);

        assert_eq!(app.get_local("total_instances").unwrap(), json!(2));
        assert_eq!(app.manifest().unwrap().guid(), Some("app-1"));
    }
}
