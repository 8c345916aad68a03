//! HTTP request types for the Cloud Controller SDK.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! constructing requests from path segments, with MIME negotiation and
//! payload encoding handled declaratively.

use std::fmt;

use thiserror::Error;

/// HTTP methods used against the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP HEAD method for metadata probes.
    Head,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for updating resources and relation links.
    Put,
    /// HTTP DELETE method for removing resources and relation links.
    Delete,
}

impl HttpMethod {
    /// Returns `true` for methods the transport may transparently re-issue
    /// as a GET when following a redirect.
    #[must_use]
    pub const fn is_redirect_safe(self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Head => write!(f, "head"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Content negotiation entry for `Accept`/`Content-Type` headers.
///
/// The two well-known entries cover the controller's JSON bodies and the
/// identity provider's form posts; anything else passes through verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MimeType {
    /// JSON (`application/json`).
    Json,
    /// URL-encoded form (`application/x-www-form-urlencoded`).
    Form,
    /// A verbatim MIME string.
    Custom(String),
}

impl MimeType {
    /// Returns the MIME string for this entry.
    #[must_use]
    pub fn as_content_type(&self) -> &str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Custom(mime) => mime,
        }
    }
}

/// One part of a multipart payload.
///
/// Parts own their bytes so a broken upload can be rebuilt and re-sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartPart {
    /// The form field name.
    pub name: String,
    /// The file name, for file-like parts.
    pub filename: Option<String>,
    /// The part's MIME type.
    pub content_type: Option<String>,
    /// The part's bytes.
    pub data: Vec<u8>,
}

/// A request payload in one of the wire encodings the controller accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A pre-encoded string body, passed through untouched.
    Raw(String),
    /// A JSON body, serialized per [`MimeType::Json`].
    Json(serde_json::Value),
    /// Form fields, URL-encoded per [`MimeType::Form`].
    Form(Vec<(String, String)>),
    /// Multipart parts (application bits upload).
    Multipart(Vec<MultipartPart>),
}

/// Error returned when an [`HttpRequest`] fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidRequestError {
    /// A raw payload was provided without a content type.
    #[error("Cannot send a raw body without a content type.")]
    MissingContentType,

    /// A POST or PUT request was built without a payload.
    #[error("Cannot use {method} without a payload.")]
    MissingBody {
        /// The HTTP method that requires a payload.
        method: String,
    },
}

/// An HTTP request to be sent to the controller.
///
/// Use [`HttpRequest::builder`] to construct requests. The path is held as
/// segments and only joined (with per-segment percent-encoding) when the
/// request is executed.
///
/// # Example
///
/// ```rust
/// use cloud_controller::clients::{HttpMethod, HttpRequest, Payload};
/// use serde_json::json;
///
/// // GET request with a query parameter
/// let get = HttpRequest::builder(HttpMethod::Get, ["v2", "apps"])
///     .query_param("q", "name:dora")
///     .build()
///     .unwrap();
/// assert_eq!(get.wire_path(), "/v2/apps");
///
/// // POST request with a JSON body
/// let post = HttpRequest::builder(HttpMethod::Post, ["v2", "apps"])
///     .json(json!({"name": "dora"}))
///     .build()
///     .unwrap();
/// assert!(matches!(post.payload, Some(Payload::Json(_))));
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub method: HttpMethod,
    /// The path segments, joined and encoded by [`wire_path`](Self::wire_path).
    pub segments: Vec<String>,
    /// Query parameters to append to the URL.
    pub query: Vec<(String, String)>,
    /// The request payload, if any.
    pub payload: Option<Payload>,
    /// The `Content-Type` negotiation entry, if any.
    pub content_type: Option<MimeType>,
    /// The `Accept` negotiation entry, if any.
    pub accept: Option<MimeType>,
    /// Additional headers; caller-supplied headers win on conflict.
    pub extra_headers: Vec<(String, String)>,
    /// Whether the transport may follow 301/302/307 responses.
    pub follow_redirects: bool,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder<I, S>(method: HttpMethod, segments: I) -> HttpRequestBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HttpRequestBuilder::new(method, segments)
    }

    /// Joins the path segments into the wire path.
    ///
    /// Each segment is percent-encoded independently. Two pass-through
    /// forms exist for server-provided locations: a sole segment that is a
    /// full absolute URL, and a leading `/`-prefixed segment (already
    /// wire-encoded, possibly carrying a query — the `next_url` re-entry
    /// case), both used verbatim.
    #[must_use]
    pub fn wire_path(&self) -> String {
        if let [only] = self.segments.as_slice() {
            if only.starts_with("http://") || only.starts_with("https://") {
                return only.clone();
            }
        }

        let mut parts: Vec<String> = Vec::with_capacity(self.segments.len());
        for (index, segment) in self.segments.iter().enumerate() {
            if index == 0 && segment.starts_with('/') {
                parts.push(segment.trim_matches('/').to_string());
            } else {
                parts.push(urlencoding::encode(segment).into_owned());
            }
        }

        format!("/{}", parts.join("/"))
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] if:
    /// - a raw payload is present without a `content_type`
    /// - the method is `Post` or `Put` but no payload is set
    pub fn verify(&self) -> Result<(), InvalidRequestError> {
        if matches!(self.payload, Some(Payload::Raw(_))) && self.content_type.is_none() {
            return Err(InvalidRequestError::MissingContentType);
        }

        if matches!(self.method, HttpMethod::Post | HttpMethod::Put) && self.payload.is_none() {
            return Err(InvalidRequestError::MissingBody {
                method: self.method.to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
///
/// Setting a JSON or form payload also sets the matching `Content-Type`
/// entry; a raw payload requires an explicit content type.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: HttpMethod,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    payload: Option<Payload>,
    content_type: Option<MimeType>,
    accept: Option<MimeType>,
    extra_headers: Vec<(String, String)>,
    follow_redirects: bool,
}

impl HttpRequestBuilder {
    fn new<I, S>(method: HttpMethod, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            payload: None,
            content_type: None,
            accept: Some(MimeType::Json),
            extra_headers: Vec::new(),
            follow_redirects: true,
        }
    }

    /// Sets a JSON payload and the JSON content type.
    #[must_use]
    pub fn json(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.payload = Some(Payload::Json(body.into()));
        self.content_type = Some(MimeType::Json);
        self
    }

    /// Sets a form payload and the form content type.
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.payload = Some(Payload::Form(fields));
        self.content_type = Some(MimeType::Form);
        self
    }

    /// Sets a raw string payload; requires an explicit content type.
    #[must_use]
    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.payload = Some(Payload::Raw(body.into()));
        self
    }

    /// Sets a multipart payload.
    #[must_use]
    pub fn multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.payload = Some(Payload::Multipart(parts));
        self
    }

    /// Sets the `Content-Type` negotiation entry.
    #[must_use]
    pub fn content_type(mut self, mime: MimeType) -> Self {
        self.content_type = Some(mime);
        self
    }

    /// Sets the `Accept` negotiation entry (defaults to JSON).
    #[must_use]
    pub fn accept(mut self, mime: MimeType) -> Self {
        self.accept = Some(mime);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Adds a single extra header. Caller headers win on conflict with the
    /// transport's defaults.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((key.into(), value.into()));
        self
    }

    /// Enables or disables redirect following (default: enabled).
    #[must_use]
    pub const fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidRequestError> {
        let request = HttpRequest {
            method: self.method,
            segments: self.segments,
            query: self.query,
            payload: self.payload,
            content_type: self.content_type,
            accept: self.accept,
            extra_headers: self.extra_headers,
            follow_redirects: self.follow_redirects,
        };
        request.verify()?;
        Ok(request)
    }
}
