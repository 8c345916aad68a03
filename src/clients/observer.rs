//! Request observation for diagnostics and tracing sinks.
//!
//! This module provides the [`RequestObserver`] capability trait and the
//! redacted [`RequestSummary`]/[`ResponseSummary`] structs handed to it.
//! The same summaries ride along inside
//! [`ExchangeTrace`](crate::clients::ExchangeTrace) on classified errors, so
//! an observer and an error consumer see identical, already-redacted data.

/// Placeholder written over the `Authorization` header value in summaries.
pub const REDACTED: &str = "[PRIVATE DATA HIDDEN]";

/// A redacted summary of an outgoing request.
///
/// The `Authorization` header value is replaced with [`REDACTED`] at
/// construction time; no unredacted copy exists in any summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    /// The HTTP method, lowercase.
    pub method: String,
    /// The full request URI.
    pub uri: String,
    /// Header pairs, with `Authorization` redacted.
    pub headers: Vec<(String, String)>,
    /// The request body, when textual.
    pub body: Option<String>,
}

impl RequestSummary {
    /// Creates a summary, redacting the `Authorization` header.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            headers: redact(headers),
            body,
        }
    }
}

/// A redacted summary of a completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSummary {
    /// The HTTP status code.
    pub status: u16,
    /// Header pairs.
    pub headers: Vec<(String, String)>,
    /// The response body, when textual.
    pub body: Option<String>,
}

impl ResponseSummary {
    /// Creates a summary, redacting any echoed `Authorization` header.
    #[must_use]
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Option<String>) -> Self {
        Self {
            status,
            headers: redact(headers),
            body,
        }
    }
}

fn redact(headers: Vec<(String, String)>) -> Vec<(String, String)> {
    headers
        .into_iter()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case("authorization") {
                (name, REDACTED.to_string())
            } else {
                (name, value)
            }
        })
        .collect()
}

/// Capability trait for logging/tracing sinks.
///
/// The transport invokes `on_request` immediately before the HTTP exchange
/// and `on_response` after it completes, both with redacted summaries.
/// Implementations must not block for long; they run inline on the request
/// path.
///
/// # Example
///
/// ```rust
/// use cloud_controller::clients::{RequestObserver, RequestSummary, ResponseSummary};
///
/// struct StdoutObserver;
///
/// impl RequestObserver for StdoutObserver {
///     fn on_request(&self, request: &RequestSummary) {
///         println!(">>> {} {}", request.method, request.uri);
///     }
///
///     fn on_response(&self, response: &ResponseSummary) {
///         println!("<<< {}", response.status);
///     }
/// }
/// ```
pub trait RequestObserver: Send + Sync {
    /// Called before the HTTP exchange with the redacted request summary.
    fn on_request(&self, request: &RequestSummary);

    /// Called after the HTTP exchange with the redacted response summary.
    fn on_response(&self, response: &ResponseSummary);
}
