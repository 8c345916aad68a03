//! The identity-provider capability consumed by the client.
//!
//! The identity provider's wire protocol is not part of this crate. The
//! client only needs three operations — authenticate, refresh, and prompt
//! discovery — expressed here as the [`AuthProvider`] trait. Callers supply
//! an implementation; the transport uses it for login and for proactive
//! token refresh before expiry.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::auth::token::TokenGrant;
use crate::clients::ApiError;

/// The kind of input a login prompt expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Plain text input.
    Text,
    /// Masked input.
    Password,
}

/// One login field advertised by the identity provider.
///
/// # Example
///
/// ```rust
/// use cloud_controller::auth::{FieldSpec, PromptKind};
///
/// let field = FieldSpec {
///     key: "username".to_string(),
///     kind: PromptKind::Text,
///     label: "Email".to_string(),
/// };
/// assert_eq!(field.kind, PromptKind::Text);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// The credential key to submit the value under.
    pub key: String,
    /// The kind of input expected.
    pub kind: PromptKind,
    /// The human-readable prompt label.
    pub label: String,
}

/// Capability trait for the identity provider.
///
/// Implementations own the provider's wire protocol. Grant failures should
/// surface as [`ApiError::Denied`], which the taxonomy reserves for
/// authorization failures from either the controller or the provider.
///
/// # Example
///
/// ```rust,ignore
/// use cloud_controller::auth::{AuthProvider, AuthToken};
///
/// let provider: Arc<dyn AuthProvider> = Arc::new(MyUaaProvider::new(uaa_url));
/// let mut credentials = HashMap::new();
/// credentials.insert("username".to_string(), "operator".to_string());
/// credentials.insert("password".to_string(), "secret".to_string());
///
/// let grant = provider.authenticate(&credentials).await?;
/// let token = AuthToken::from_provider_grant(&grant);
/// ```
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchanges credentials for a token grant.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Denied`] when the provider rejects the
    /// credentials, or another [`ApiError`] for transport-level failures.
    async fn authenticate(
        &self,
        credentials: &HashMap<String, String>,
    ) -> Result<TokenGrant, ApiError>;

    /// Exchanges a refresh token for a fresh grant.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Denied`] when the refresh token is no longer
    /// valid, or another [`ApiError`] for transport-level failures.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ApiError>;

    /// Returns the login fields the provider wants prompted for.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the provider cannot be reached.
    async fn prompts(&self) -> Result<Vec<FieldSpec>, ApiError>;
}
