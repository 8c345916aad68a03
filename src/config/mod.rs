//! Configuration types for the Cloud Controller SDK.
//!
//! This module provides the core configuration types used to initialize
//! the client for communication with a Cloud Controller.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: The main configuration struct holding all SDK settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`TargetUrl`]: A validated controller target URL
//!
//! # Example
//!
//! ```rust
//! use cloud_controller::{ClientConfig, TargetUrl};
//!
//! let config = ClientConfig::builder()
//!     .target(TargetUrl::new("https://api.cloud.example.com").unwrap())
//!     .proxy_user("support-operator")
//!     .trace(true)
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;

pub use newtypes::TargetUrl;

use std::time::Duration;

use crate::error::ConfigError;

/// Default per-request wall-clock timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for the Cloud Controller client.
///
/// This struct holds all configuration needed for client operations: the
/// controller target, optional proxy-user impersonation, the per-request
/// correlation id, request tracing, and the request timeout. It is
/// immutable after construction; the only mutable client state is the
/// auth token slot held by the transport.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use cloud_controller::{ClientConfig, TargetUrl};
///
/// let config = ClientConfig::builder()
///     .target(TargetUrl::new("https://api.cloud.example.com").unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.target().as_ref(), "https://api.cloud.example.com");
/// assert!(!config.trace());
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    target: TargetUrl,
    proxy_user: Option<String>,
    request_id: Option<String>,
    trace: bool,
    request_timeout: Duration,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the controller target URL.
    #[must_use]
    pub const fn target(&self) -> &TargetUrl {
        &self.target
    }

    /// Returns the proxy user, if configured.
    ///
    /// When set, every request carries a `Proxy-User` header so an
    /// administrator can act on behalf of another user.
    #[must_use]
    pub fn proxy_user(&self) -> Option<&str> {
        self.proxy_user.as_deref()
    }

    /// Returns the request correlation id, if configured.
    ///
    /// When set, every request carries an `X-Request-Id` header for
    /// cross-system log correlation.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns whether request/response tracing is enabled.
    #[must_use]
    pub const fn trace(&self) -> bool {
        self.trace
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// The only required field is `target`. All other fields have sensible
/// defaults.
///
/// # Defaults
///
/// - `proxy_user`: `None`
/// - `request_id`: `None`
/// - `trace`: `false`
/// - `request_timeout`: 300 seconds
/// - `user_agent_prefix`: `None`
///
/// # Example
///
/// ```rust
/// use cloud_controller::{ClientConfig, TargetUrl};
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .target(TargetUrl::new("https://api.cloud.example.com").unwrap())
///     .request_id("deploy-7f3a")
///     .request_timeout(Duration::from_secs(30))
///     .user_agent_prefix("MyTool/1.0")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    target: Option<TargetUrl>,
    proxy_user: Option<String>,
    request_id: Option<String>,
    trace: Option<bool>,
    request_timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the controller target URL (required).
    #[must_use]
    pub fn target(mut self, target: TargetUrl) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the proxy user for administrator impersonation.
    #[must_use]
    pub fn proxy_user(mut self, user: impl Into<String>) -> Self {
        self.proxy_user = Some(user.into());
        self
    }

    /// Sets the per-request correlation id.
    #[must_use]
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Enables or disables request/response tracing.
    #[must_use]
    pub const fn trace(mut self, trace: bool) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `target` was not set,
    /// or [`ConfigError::EmptyProxyUser`] if an empty proxy user was given.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let target = self
            .target
            .ok_or(ConfigError::MissingRequiredField { field: "target" })?;

        if self.proxy_user.as_deref() == Some("") {
            return Err(ConfigError::EmptyProxyUser);
        }

        Ok(ClientConfig {
            target,
            proxy_user: self.proxy_user,
            request_id: self.request_id,
            trace: self.trace.unwrap_or(false),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_target() -> TargetUrl {
        TargetUrl::new("https://api.cloud.example.com").unwrap()
    }

    #[test]
    fn test_builder_requires_target() {
        let result = ClientConfig::builder().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "target" })
        ));
    }

    #[test]
    fn test_builder_applies_defaults() {
        let config = ClientConfig::builder().target(test_target()).build().unwrap();

        assert!(config.proxy_user().is_none());
        assert!(config.request_id().is_none());
        assert!(!config.trace());
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_builder_sets_all_fields() {
        let config = ClientConfig::builder()
            .target(test_target())
            .proxy_user("operator")
            .request_id("req-1")
            .trace(true)
            .request_timeout(Duration::from_secs(10))
            .user_agent_prefix("MyTool/1.0")
            .build()
            .unwrap();

        assert_eq!(config.proxy_user(), Some("operator"));
        assert_eq!(config.request_id(), Some("req-1"));
        assert!(config.trace());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.user_agent_prefix(), Some("MyTool/1.0"));
    }

    #[test]
    fn test_builder_rejects_empty_proxy_user() {
        let result = ClientConfig::builder()
            .target(test_target())
            .proxy_user("")
            .build();
        assert!(matches!(result, Err(ConfigError::EmptyProxyUser)));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientConfig>();
    }
}
