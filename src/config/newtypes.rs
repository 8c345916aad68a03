//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! on construction, so invalid configuration is rejected before any request
//! is made.

use crate::error::ConfigError;
use std::fmt;

/// A validated controller target URL.
///
/// The target is the base URL of the Cloud Controller, e.g.
/// `https://api.cloud.example.com`. It must be an absolute URL with an
/// `http` or `https` scheme; a trailing slash is stripped so that path
/// segments can be appended uniformly.
///
/// # Example
///
/// ```rust
/// use cloud_controller::TargetUrl;
///
/// let target = TargetUrl::new("https://api.cloud.example.com/").unwrap();
/// assert_eq!(target.as_ref(), "https://api.cloud.example.com");
///
/// assert!(TargetUrl::new("ftp://api.cloud.example.com").is_err());
/// assert!(TargetUrl::new("api.cloud.example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetUrl(String);

impl TargetUrl {
    /// Creates a validated target URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] if the value is not an
    /// absolute `http`/`https` URL.
    pub fn new(target: impl Into<String>) -> Result<Self, ConfigError> {
        let target = target.into();

        let parsed = reqwest::Url::parse(&target).map_err(|_| ConfigError::InvalidTarget {
            target: target.clone(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidTarget { target });
        }

        Ok(Self(target.trim_end_matches('/').to_string()))
    }

    /// Returns the parsed URL form of the target.
    ///
    /// # Panics
    ///
    /// Never panics in practice; the string was validated on construction.
    #[must_use]
    pub fn to_url(&self) -> reqwest::Url {
        reqwest::Url::parse(&self.0).expect("target validated on construction")
    }
}

impl AsRef<str> for TargetUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Verify TargetUrl is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TargetUrl>();
};
