//! The client facade: transport + schema registry + caller scope.
//!
//! [`Client`] is the single entry point for working with a controller. It
//! owns the HTTP transport, the explicit [`SchemaRegistry`], and the
//! caller's current organization/space scope, and acts as the factory for
//! [`Resource`] instances — there is no global state and no per-type
//! client surface; every registered type is served by the same generic
//! lookup methods.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::auth::{AuthToken, FieldSpec};
use crate::clients::{ApiError, CollectionPage, HttpClient};
use crate::config::ClientConfig;
use crate::resource::{parse_manifest, Resource};
use crate::schema::{Query, ResourceSchema, SchemaRegistry, ScopeParent};

/// A Cloud Controller client.
///
/// # Example
///
/// ```rust,ignore
/// use cloud_controller::{Client, ClientConfig, TargetUrl};
/// use serde_json::json;
///
/// let config = ClientConfig::builder()
///     .target(TargetUrl::new("https://api.cloud.example.com")?)
///     .build()?;
/// let client = Client::new(config);
///
/// // Look up an app and rename it.
/// let mut app = client.find("app", "app-guid-1").await?;
/// app.set("name", json!("dora-2"))?;
/// app.update(&client).await?;
/// ```
#[derive(Debug)]
pub struct Client {
    transport: HttpClient,
    registry: SchemaRegistry,
    current_organization: Option<String>,
    current_space: Option<String>,
}

impl Client {
    /// Creates a client with the default schema registry
    /// ([`crate::resources::default_registry`]).
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_registry(config, crate::resources::default_registry())
    }

    /// Creates a client with a caller-supplied schema registry.
    #[must_use]
    pub fn with_registry(config: ClientConfig, registry: SchemaRegistry) -> Self {
        Self::from_transport(HttpClient::new(config), registry)
    }

    /// Creates a client around an existing transport.
    #[must_use]
    pub const fn from_transport(transport: HttpClient, registry: SchemaRegistry) -> Self {
        Self {
            transport,
            registry,
            current_organization: None,
            current_space: None,
        }
    }

    /// Returns the HTTP transport.
    #[must_use]
    pub const fn transport(&self) -> &HttpClient {
        &self.transport
    }

    /// Returns the HTTP transport mutably, for installing an auth provider
    /// or observer.
    pub fn transport_mut(&mut self) -> &mut HttpClient {
        &mut self.transport
    }

    /// Returns the schema registry.
    #[must_use]
    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Scope
    // ------------------------------------------------------------------

    /// Sets (or clears) the current organization scope by GUID.
    pub fn set_current_organization(&mut self, guid: Option<String>) {
        self.current_organization = guid;
    }

    /// Sets (or clears) the current space scope by GUID.
    pub fn set_current_space(&mut self, guid: Option<String>) {
        self.current_space = guid;
    }

    /// Returns the current organization scope GUID.
    #[must_use]
    pub fn current_organization(&self) -> Option<&str> {
        self.current_organization.as_deref()
    }

    /// Returns the current space scope GUID.
    #[must_use]
    pub fn current_space(&self) -> Option<&str> {
        self.current_space.as_deref()
    }

    // ------------------------------------------------------------------
    // Token lifecycle
    // ------------------------------------------------------------------

    /// Returns a clone of the current token, if set.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.transport.token()
    }

    /// Replaces the current token (e.g., restored from persistence).
    pub fn set_token(&self, token: Option<AuthToken>) {
        self.transport.set_token(token);
    }

    /// Authenticates through the configured identity provider and installs
    /// the resulting token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when no provider is configured,
    /// and propagates provider failures ([`ApiError::Denied`] for rejected
    /// credentials).
    pub async fn login(
        &self,
        credentials: &HashMap<String, String>,
    ) -> Result<AuthToken, ApiError> {
        let provider = self.require_provider()?;
        let grant = provider.authenticate(credentials).await?;
        let token = AuthToken::from_provider_grant(&grant);
        self.transport.set_token(Some(token.clone()));
        Ok(token)
    }

    /// Returns the login fields the identity provider wants prompted for.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when no provider is configured.
    pub async fn login_prompts(&self) -> Result<Vec<FieldSpec>, ApiError> {
        let provider = self.require_provider()?;
        provider.prompts().await
    }

    fn require_provider(&self) -> Result<Arc<dyn crate::auth::AuthProvider>, ApiError> {
        self.transport
            .auth_provider()
            .ok_or(ApiError::Unauthorized {
                description: Some("no auth provider configured".to_string()),
                trace: None,
            })
    }

    // ------------------------------------------------------------------
    // Controller endpoints
    // ------------------------------------------------------------------

    /// Fetches the controller's `/v2/info` document.
    ///
    /// # Errors
    ///
    /// Propagates transport and classification errors.
    pub async fn info(&self) -> Result<Value, ApiError> {
        self.transport
            .get_json(["v2", "info"], Vec::new())
            .await
    }

    // ------------------------------------------------------------------
    // Resource factory and lookup
    // ------------------------------------------------------------------

    /// Creates a blank, unsaved resource of the named type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownType`] for unregistered names.
    pub fn build(&self, type_name: &str) -> Result<Resource, ApiError> {
        Ok(Resource::new(self.registry.get(type_name)?))
    }

    /// Creates a resource addressing a known GUID without fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownType`] for unregistered names.
    pub fn build_with_guid(&self, type_name: &str, guid: &str) -> Result<Resource, ApiError> {
        Ok(Resource::with_guid(self.registry.get(type_name)?, guid))
    }

    /// Fetches a resource by GUID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the GUID does not exist, and
    /// propagates transport errors.
    pub async fn find(&self, type_name: &str, guid: &str) -> Result<Resource, ApiError> {
        let schema = self.registry.get(type_name)?;
        let body = self
            .transport
            .get_json(
                ["v2".to_string(), schema.plural().to_string(), guid.to_string()],
                Vec::new(),
            )
            .await?;
        Ok(Resource::from_manifest(schema, parse_manifest(&body)?))
    }

    /// Fetches a resource by GUID with server-side relation embedding.
    ///
    /// # Errors
    ///
    /// Same as [`find`](Self::find).
    pub async fn find_with_depth(
        &self,
        type_name: &str,
        guid: &str,
        depth: u32,
    ) -> Result<Resource, ApiError> {
        let schema = self.registry.get(type_name)?;
        let body = self
            .transport
            .get_json(
                ["v2".to_string(), schema.plural().to_string(), guid.to_string()],
                vec![("inline-relations-depth".to_string(), depth.to_string())],
            )
            .await?;
        Ok(Resource::from_manifest(schema, parse_manifest(&body)?))
    }

    /// Lists every resource of the named type, following all pages.
    ///
    /// Honors the type's scope parent when the matching current scope is
    /// set.
    ///
    /// # Errors
    ///
    /// Propagates transport and classification errors.
    pub async fn all(&self, type_name: &str) -> Result<Vec<Resource>, ApiError> {
        self.find_all_by(type_name, &Query::new()).await
    }

    /// Lists resources matching a query, following all pages.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotQueryable`] when a filter references a key
    /// the type does not declare queryable, and propagates transport
    /// errors.
    pub async fn find_all_by(
        &self,
        type_name: &str,
        query: &Query,
    ) -> Result<Vec<Resource>, ApiError> {
        let schema = self.registry.get(type_name)?;
        self.check_queryable(&schema, query)?;

        let first = self
            .transport
            .get_json(self.collection_segments(&schema), query.to_params())
            .await?;
        let values = self.transport.fetch_all_pages(&first).await?;

        values
            .iter()
            .map(|value| {
                Ok(Resource::from_manifest(
                    schema.clone(),
                    parse_manifest(value)?,
                ))
            })
            .collect()
    }

    /// Returns the first resource matching a query, fetching a single
    /// page.
    ///
    /// # Errors
    ///
    /// Same as [`find_all_by`](Self::find_all_by).
    pub async fn find_by(
        &self,
        type_name: &str,
        query: &Query,
    ) -> Result<Option<Resource>, ApiError> {
        let schema = self.registry.get(type_name)?;
        self.check_queryable(&schema, query)?;

        let first = self
            .transport
            .get_json(self.collection_segments(&schema), query.to_params())
            .await?;
        let page: CollectionPage =
            serde_json::from_value(first.clone()).map_err(|_| ApiError::BadResponse {
                status: 200,
                body: first.to_string(),
                trace: None,
            })?;

        page.resources
            .first()
            .map(|value| {
                Ok(Resource::from_manifest(
                    schema.clone(),
                    parse_manifest(value)?,
                ))
            })
            .transpose()
    }

    fn check_queryable(&self, schema: &ResourceSchema, query: &Query) -> Result<(), ApiError> {
        for key in query.filter_keys() {
            if !schema.is_queryable(key) {
                return Err(ApiError::NotQueryable {
                    resource: schema.name().to_string(),
                    attribute: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the collection path, routed through the current scope when
    /// the type declares a scope parent.
    fn collection_segments(&self, schema: &ResourceSchema) -> Vec<String> {
        let scoped = match schema.scope_parent() {
            Some(ScopeParent::Organization) => self.current_organization.as_deref(),
            Some(ScopeParent::Space) => self.current_space.as_deref(),
            None => None,
        };

        match (schema.scope_parent(), scoped) {
            (Some(parent), Some(guid)) => vec![
                "v2".to_string(),
                parent.collection().to_string(),
                guid.to_string(),
                schema.plural().to_string(),
            ],
            _ => vec!["v2".to_string(), schema.plural().to_string()],
        }
    }
}
