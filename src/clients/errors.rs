//! The typed error taxonomy for Cloud Controller operations.
//!
//! This module contains the unified [`ApiError`] type, the
//! [`ErrorCodeRegistry`] that maps numeric controller error codes to named
//! kinds, and the classification of completed HTTP exchanges into exactly
//! one typed error.
//!
//! # Classification
//!
//! Given a response status and, where present, a parsed
//! `{code, description}` body:
//!
//! - **404** → [`ApiError::NotFound`]
//! - **401** → [`ApiError::Unauthorized`]
//! - **400 / 403** → [`ApiError::Denied`] (also used for authorization-grant
//!   failures surfaced by an `AuthProvider`)
//! - **411 / 500 / 504** → a code-specific [`ApiError::Api`] when the body
//!   parses as `{code, description}`, else [`ApiError::BadResponse`] with
//!   the raw body
//! - any other non-success status → [`ApiError::BadResponse`]
//!
//! Transport-level failures map to [`ApiError::TargetRefused`],
//! [`ApiError::Timeout`], and [`ApiError::InvalidTarget`]; client-side
//! schema violations map to [`ApiError::Mismatch`] and its siblings.
//!
//! Every exchange-derived error carries an [`ExchangeTrace`] with the
//! `Authorization` header redacted. Traces are for diagnostics and are
//! deliberately excluded from `Display` output.
//!
//! # Example
//!
//! ```rust
//! use cloud_controller::clients::{ApiError, ErrorCodeRegistry};
//!
//! let registry = ErrorCodeRegistry::with_defaults();
//! let error = registry.classify(
//!     400,
//!     r#"{"code":30003,"description":"The organization could not be found"}"#,
//!     None,
//! );
//!
//! assert!(matches!(
//!     error,
//!     ApiError::Denied { code: 30003, ref description, .. }
//!         if description == "The organization could not be found"
//! ));
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::clients::observer::{RequestSummary, ResponseSummary};

/// Statuses the transport treats as success (including the redirect codes
/// it follows itself).
pub const SUCCESS_STATUSES: &[u16] = &[200, 201, 204, 301, 302, 307];

/// The redacted request/response pair behind a classified error.
///
/// Available for diagnostics; never part of the default error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeTrace {
    /// The redacted request summary.
    pub request: RequestSummary,
    /// The redacted response summary, when an exchange completed.
    pub response: Option<ResponseSummary>,
}

/// The unified error type for all Cloud Controller operations.
///
/// Wire-level failures, response classification, and client-side schema
/// violations all funnel into this taxonomy, so callers match on one enum
/// at API boundaries. Messages always carry the numeric code and human
/// description when available.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// The resource was not found (HTTP 404). No body is required.
    #[error("Resource not found")]
    NotFound {
        /// Redacted exchange diagnostics.
        trace: Option<Box<ExchangeTrace>>,
    },

    /// Authentication is missing or invalid (HTTP 401).
    #[error("Unauthorized: {}", unauthorized_label(.description))]
    Unauthorized {
        /// The server-provided description, when the body carried one.
        description: Option<String>,
        /// Redacted exchange diagnostics.
        trace: Option<Box<ExchangeTrace>>,
    },

    /// The request was denied (HTTP 400/403, or an authorization-grant
    /// failure from the identity provider).
    #[error("Denied ({code}): {description}")]
    Denied {
        /// The controller (or provider) error code.
        code: u64,
        /// The human-readable description.
        description: String,
        /// Redacted exchange diagnostics.
        trace: Option<Box<ExchangeTrace>>,
    },

    /// A controller API error with a structured `{code, description}` body.
    ///
    /// `kind` is the registered name for the code, when the
    /// [`ErrorCodeRegistry`] knows it; unregistered codes still produce this
    /// usable generic form.
    #[error("{} ({code}): {description}", kind_label(.kind))]
    Api {
        /// The controller error code.
        code: u64,
        /// The human-readable description.
        description: String,
        /// The registered kind name for the code, if any.
        kind: Option<&'static str>,
        /// Redacted exchange diagnostics.
        trace: Option<Box<ExchangeTrace>>,
    },

    /// A response the taxonomy has no better mapping for.
    #[error("Bad response (status {status}): {body}")]
    BadResponse {
        /// The HTTP status code.
        status: u16,
        /// The raw response body.
        body: String,
        /// Redacted exchange diagnostics.
        trace: Option<Box<ExchangeTrace>>,
    },

    /// The target refused or dropped the connection.
    #[error("Target refused connection: {message}")]
    TargetRefused {
        /// The underlying connection failure message.
        message: String,
    },

    /// The request exceeded its wall-clock timeout.
    #[error("Request timed out: {method} {uri}")]
    Timeout {
        /// The HTTP method, lowercase.
        method: String,
        /// The request URI.
        uri: String,
        /// The underlying cause's message.
        cause: Option<String>,
    },

    /// The target URL is malformed.
    #[error("Invalid target: {target}")]
    InvalidTarget {
        /// The malformed target.
        target: String,
    },

    /// A value failed validation against its declared attribute type.
    ///
    /// Application code must never silently swallow this; only the
    /// framework catches it internally during default-value bypass checks.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Description of the expected type.
        expected: String,
        /// The offending value.
        actual: serde_json::Value,
    },

    /// An attribute name is not declared on the resource type.
    #[error("Unknown attribute '{attribute}' for resource type '{resource}'")]
    UnknownAttribute {
        /// The resource type name.
        resource: String,
        /// The attribute name that was requested.
        attribute: String,
    },

    /// A relation name is not declared on the resource type.
    #[error("Unknown relation '{relation}' for resource type '{resource}'")]
    UnknownRelation {
        /// The resource type name.
        resource: String,
        /// The relation name that was requested.
        relation: String,
    },

    /// A write-only attribute was read, or a read-only attribute written.
    #[error("Attribute '{attribute}' of '{resource}' is {}", access_label(.write))]
    AccessDenied {
        /// The resource type name.
        resource: String,
        /// The attribute name.
        attribute: String,
        /// `true` when the rejected operation was a write.
        write: bool,
    },

    /// A query referenced an attribute not declared queryable.
    #[error("Attribute '{attribute}' of '{resource}' is not queryable")]
    NotQueryable {
        /// The resource type name.
        resource: String,
        /// The attribute name.
        attribute: String,
    },

    /// A resource type name is not present in the schema registry.
    #[error("Unknown resource type '{name}'")]
    UnknownType {
        /// The unregistered type name.
        name: String,
    },

    /// An operation requiring a remote identity ran on an unsaved resource.
    #[error("Resource of type '{resource}' has no identity; {operation} requires a persisted resource")]
    NotPersisted {
        /// The resource type name.
        resource: String,
        /// The operation that was attempted.
        operation: &'static str,
    },
}

impl ApiError {
    /// Convenience constructor for [`ApiError::Denied`] without a trace,
    /// used by `AuthProvider` implementations for grant failures.
    #[must_use]
    pub fn denied(code: u64, description: impl Into<String>) -> Self {
        Self::Denied {
            code,
            description: description.into(),
            trace: None,
        }
    }

    /// Returns the redacted exchange trace, when the error carries one.
    #[must_use]
    pub fn trace(&self) -> Option<&ExchangeTrace> {
        match self {
            Self::NotFound { trace }
            | Self::Unauthorized { trace, .. }
            | Self::Denied { trace, .. }
            | Self::Api { trace, .. }
            | Self::BadResponse { trace, .. } => trace.as_deref(),
            _ => None,
        }
    }

    /// Attaches an exchange trace to a classified error.
    #[must_use]
    pub fn with_trace(mut self, exchange: ExchangeTrace) -> Self {
        match &mut self {
            Self::NotFound { trace }
            | Self::Unauthorized { trace, .. }
            | Self::Denied { trace, .. }
            | Self::Api { trace, .. }
            | Self::BadResponse { trace, .. } => *trace = Some(Box::new(exchange)),
            _ => {}
        }
        self
    }
}

// Verify ApiError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiError>();
};

fn unauthorized_label(description: &Option<String>) -> &str {
    description.as_deref().unwrap_or("authentication required")
}

fn kind_label(kind: &Option<&'static str>) -> &'static str {
    kind.unwrap_or("ApiError")
}

fn access_label(write: &bool) -> &'static str {
    if *write {
        "read-only"
    } else {
        "write-only"
    }
}

/// The structured error body the controller returns for API errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: u64,
    description: String,
}

fn parse_error_body(raw: &str) -> Option<ErrorBody> {
    serde_json::from_str(raw).ok()
}

/// Maps numeric controller error codes to named error kinds.
///
/// The registry is explicit and constructed once — there is no process-wide
/// table. Unregistered codes classify as a generic [`ApiError::Api`]; a
/// registered code gets its kind name in the error message.
///
/// # Example
///
/// ```rust
/// use cloud_controller::clients::ErrorCodeRegistry;
///
/// let mut registry = ErrorCodeRegistry::with_defaults();
/// registry.register(990001, "StagingBackendUnavailable");
///
/// assert_eq!(registry.kind_for(100002), Some("AppNameTaken"));
/// assert_eq!(registry.kind_for(990001), Some("StagingBackendUnavailable"));
/// assert_eq!(registry.kind_for(424242), None);
/// ```
#[derive(Debug, Clone)]
pub struct ErrorCodeRegistry {
    kinds: HashMap<u64, &'static str>,
}

impl ErrorCodeRegistry {
    /// Creates a registry with no registered codes.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Creates a registry seeded with the well-known controller codes.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for &(code, kind) in DEFAULT_ERROR_KINDS {
            registry.register(code, kind);
        }
        registry
    }

    /// Registers (or overrides) a code → kind mapping.
    pub fn register(&mut self, code: u64, kind: &'static str) {
        self.kinds.insert(code, kind);
    }

    /// Returns the kind name registered for a code, if any.
    #[must_use]
    pub fn kind_for(&self, code: u64) -> Option<&'static str> {
        self.kinds.get(&code).copied()
    }

    /// Classifies a completed, non-success HTTP exchange into exactly one
    /// typed error.
    ///
    /// `trace` is attached to the result; pass `None` in contexts (like
    /// tests) where no exchange summary exists.
    #[must_use]
    pub fn classify(&self, status: u16, raw_body: &str, trace: Option<ExchangeTrace>) -> ApiError {
        let error = match status {
            404 => ApiError::NotFound { trace: None },
            401 => ApiError::Unauthorized {
                description: parse_error_body(raw_body).map(|body| body.description),
                trace: None,
            },
            400 | 403 => match parse_error_body(raw_body) {
                Some(body) => ApiError::Denied {
                    code: body.code,
                    description: body.description,
                    trace: None,
                },
                None => ApiError::Denied {
                    code: u64::from(status),
                    description: raw_body.to_string(),
                    trace: None,
                },
            },
            // Both branches preserved deliberately: structured bodies map
            // through the code registry, opaque bodies stay BadResponse.
            411 | 500 | 504 => match parse_error_body(raw_body) {
                Some(body) => ApiError::Api {
                    kind: self.kind_for(body.code),
                    code: body.code,
                    description: body.description,
                    trace: None,
                },
                None => ApiError::BadResponse {
                    status,
                    body: raw_body.to_string(),
                    trace: None,
                },
            },
            _ => ApiError::BadResponse {
                status,
                body: raw_body.to_string(),
                trace: None,
            },
        };

        match trace {
            Some(exchange) => error.with_trace(exchange),
            None => error,
        }
    }
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Well-known controller error codes.
const DEFAULT_ERROR_KINDS: &[(u64, &str)] = &[
    (1000, "InvalidAuthToken"),
    (1001, "MessageParseError"),
    (10002, "NotAuthenticated"),
    (10003, "NotAuthorized"),
    (10005, "BadQueryParameter"),
    (30002, "OrganizationNameTaken"),
    (30003, "OrganizationNotFound"),
    (40002, "SpaceNameTaken"),
    (60002, "ServiceInstanceNameTaken"),
    (90003, "ServiceBindingAppServiceTaken"),
    (100002, "AppNameTaken"),
    (130002, "DomainNameTaken"),
    (150001, "QuotaDefinitionNameTaken"),
    (210003, "RouteHostTaken"),
];
