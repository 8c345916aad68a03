//! HTTP transport types for Cloud Controller communication.
//!
//! This module provides the transport layer of the SDK:
//!
//! - [`HttpClient`]: authenticated request execution with redirect
//!   following, retry semantics, pagination, and error classification
//! - [`HttpRequest`]/[`HttpRequestBuilder`]: requests built from path
//!   segments with MIME negotiation and payload encoding
//! - [`HttpResponse`]/[`CollectionPage`]: completed responses and the
//!   paginated collection wire shape
//! - [`ApiError`]/[`ErrorCodeRegistry`]: the typed error taxonomy and the
//!   controller code → kind mapping behind it
//! - [`RequestObserver`]: the structured before/after request sink
//!
//! # Architecture
//!
//! The transport depends only on the error taxonomy and the auth token; the
//! resource model sits on top of it. One logical operation performs at most
//! one HTTP round trip — redirects and pagination are internal sequential
//! follow-ups, never concurrent fan-out.

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod observer;

pub use errors::{ApiError, ErrorCodeRegistry, ExchangeTrace, SUCCESS_STATUSES};
pub use http_client::{HttpClient, ResourceFingerprint, SDK_VERSION};
pub use http_request::{
    HttpMethod, HttpRequest, HttpRequestBuilder, InvalidRequestError, MimeType, MultipartPart,
    Payload,
};
pub use http_response::{CollectionPage, HttpResponse};
pub use observer::{RequestObserver, RequestSummary, ResponseSummary, REDACTED};
