//! Error types for SDK configuration.
//!
//! This module contains the error type used for configuration and
//! construction-time validation.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and
//! actionable. Runtime failures (transport, response classification,
//! attribute validation) use [`ApiError`](crate::ApiError) instead.
//!
//! # Example
//!
//! ```rust
//! use cloud_controller::{ConfigError, TargetUrl};
//!
//! let result = TargetUrl::new("not a url");
//! assert!(matches!(result, Err(ConfigError::InvalidTarget { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types. Each variant provides a clear,
/// actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The target URL could not be parsed.
    #[error("Invalid target '{target}'. Please provide an absolute URL with scheme (e.g., 'https://api.cloud.example.com').")]
    InvalidTarget {
        /// The invalid target that was provided.
        target: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The proxy user cannot be empty when set.
    #[error("Proxy user cannot be empty. Omit the field entirely to disable proxy impersonation.")]
    EmptyProxyUser,
}
