//! # Cloud Controller Rust SDK
//!
//! A Rust SDK for the Cloud Controller API: a client-side resource mapper
//! for a versioned, paginated, JSON REST API. Remote entities
//! (applications, organizations, spaces, services, routes, users, ...)
//! are addressed as typed local objects with lazily-fetched attributes,
//! relationship graphs, and change-tracked updates, while a shared
//! transport layer handles authentication, retries, redirects, and error
//! classification.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - A declarative schema framework ([`schema`]) with typed validation,
//!   relation metadata, and query predicates
//! - Generic resource instances ([`resource`]) with lazy reads, dirty-diff
//!   tracking, and the create/update/delete/invalidate lifecycle
//! - An async HTTP transport ([`clients`]) with manual redirect following,
//!   bearer-token lifecycle, pagination, and a typed error taxonomy
//! - Identity-provider and observer capability traits ([`auth`],
//!   [`clients::RequestObserver`])
//!
//! ## Quick Start
//!
//! ```rust
//! use cloud_controller::{Client, ClientConfig, TargetUrl};
//!
//! let config = ClientConfig::builder()
//!     .target(TargetUrl::new("https://api.cloud.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = Client::new(config);
//! assert!(client.registry().get("app").is_ok());
//! ```
//!
//! ## Working with Resources
//!
//! ```rust,ignore
//! use cloud_controller::schema::{Comparator, Query};
//! use serde_json::json;
//!
//! // Create an app in the current space.
//! let mut app = client.build("app")?;
//! app.set("name", json!("dora"))?;
//! app.set("memory", json!(512))?;
//! app.create(&client).await?;           // POST /v2/apps with the diff
//!
//! // Change-tracked update: only the diff travels.
//! app.set("total_instances", json!(4))?;
//! app.update(&client).await?;           // PUT {"instances": 4}
//!
//! // Relations resolve lazily and cache.
//! let space = app.to_one(&client, "space").await?;
//! let routes = app.to_many(&client, "routes").await?;
//!
//! // Query the collection endpoint.
//! let started = client
//!     .find_all_by("app", &Query::new().filter("name", Comparator::Eq, "dora"))
//!     .await?;
//!
//! // One round trip for the whole object graph.
//! let summary = app.summarize(&client).await?;
//! ```
//!
//! ## Authentication
//!
//! The identity provider's wire protocol is not part of this crate;
//! implement [`auth::AuthProvider`] and install it on the transport. The
//! client then logs in through it and proactively refreshes tokens that
//! are about to expire:
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! client.transport_mut().set_auth_provider(Arc::new(MyUaaProvider::new(uaa_url)));
//!
//! let mut credentials = HashMap::new();
//! credentials.insert("username".to_string(), "operator".to_string());
//! credentials.insert("password".to_string(), "secret".to_string());
//! let token = client.login(&credentials).await?;
//!
//! // Persist between sessions; claims are re-derived on restore.
//! let persisted = token.to_persistable();
//! client.set_token(Some(cloud_controller::auth::AuthToken::from_persisted(&persisted)));
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`ApiError`], the unified taxonomy: `NotFound`,
//! `Unauthorized`, `Denied`, code-registered `Api` kinds, `BadResponse`,
//! `TargetRefused`, `Timeout`, `InvalidTarget`, and the client-side
//! `Mismatch` family. Exchange-derived errors carry a redacted
//! request/response trace for diagnostics.
//!
//! ## Design Principles
//!
//! - **No global state**: the schema registry and error-code registry are
//!   explicit values held by the client
//! - **Schemas are data**: one generic accessor path serves every
//!   registered type; nothing is generated per type
//! - **Fail-fast validation**: configuration newtypes and attribute writes
//!   validate before any state changes
//! - **Async-first**: designed for the Tokio runtime; one logical HTTP
//!   round trip per public operation

pub mod auth;
mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod resource;
pub mod resources;
pub mod schema;

// Re-export public types at crate root for convenience
pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder, TargetUrl};
pub use error::ConfigError;

// Re-export transport types
pub use clients::{
    ApiError, CollectionPage, ErrorCodeRegistry, HttpClient, HttpMethod, HttpRequest,
    HttpRequestBuilder, HttpResponse, InvalidRequestError, MimeType, RequestObserver,
    ResourceFingerprint,
};

// Re-export model types
pub use auth::{AuthProvider, AuthToken, PersistedToken, TokenGrant};
pub use resource::{LifecycleState, Manifest, Metadata, Resource};
pub use schema::{Query, ResourceSchema, SchemaRegistry};
