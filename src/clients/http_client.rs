//! HTTP transport for Cloud Controller communication.
//!
//! This module provides the [`HttpClient`] type: request construction from
//! path segments, header/MIME negotiation, manual redirect following,
//! bearer-token lifecycle (including proactive refresh through an
//! [`AuthProvider`]), pagination, the bits upload with its single silent
//! retry, and classification of failures into the typed taxonomy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::auth::{AuthProvider, AuthToken, TokenGrant};
use crate::clients::errors::{ApiError, ErrorCodeRegistry, ExchangeTrace};
use crate::clients::http_request::{HttpMethod, HttpRequest, MimeType, MultipartPart, Payload};
use crate::clients::http_response::{CollectionPage, HttpResponse};
use crate::clients::observer::{RequestObserver, RequestSummary, ResponseSummary};
use crate::config::ClientConfig;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One entry of the dedup resource manifest sent alongside a bits upload.
///
/// The controller skips re-uploading files it already has; the manifest
/// tells it which fingerprints to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceFingerprint {
    /// The file path inside the application archive.
    #[serde(rename = "fn")]
    pub path: String,
    /// The file size in bytes.
    pub size: u64,
    /// The SHA-1 fingerprint of the file contents.
    pub sha1: String,
}

/// HTTP transport for making authenticated requests to the controller.
///
/// The transport handles:
/// - URL construction from percent-encoded path segments
/// - Default headers (`Authorization`, `Proxy-User`, `X-Request-Id`,
///   `Accept`/`Content-Type` from the MIME table, `User-Agent`)
/// - Manual 301/302/307 following, re-issued as GET with the original
///   query parameters
/// - Proactive token refresh through an [`AuthProvider`] before expiry
/// - Mapping wire-level failures into the typed error taxonomy
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`. Configuration is immutable after
/// construction; the only mutable state is the token slot, guarded by a
/// mutex that is never held across an await. Callers must not race a
/// refresh against an in-flight request that expects the old token.
///
/// # Example
///
/// ```rust,ignore
/// use cloud_controller::clients::{HttpClient, HttpRequest, HttpMethod};
/// use cloud_controller::{ClientConfig, TargetUrl};
///
/// let config = ClientConfig::builder()
///     .target(TargetUrl::new("https://api.cloud.example.com")?)
///     .build()?;
/// let transport = HttpClient::new(config);
///
/// let request = HttpRequest::builder(HttpMethod::Get, ["v2", "info"]).build()?;
/// let response = transport.request(request).await?;
/// ```
pub struct HttpClient {
    /// The internal reqwest HTTP client, with redirects disabled.
    client: reqwest::Client,
    /// Immutable-after-construction configuration.
    config: ClientConfig,
    /// The current token. Guarded; never locked across an await.
    token: Mutex<Option<AuthToken>>,
    /// Identity provider for proactive refresh, if configured.
    auth_provider: Option<Arc<dyn AuthProvider>>,
    /// Structured before/after request sink, if configured.
    observer: Option<Arc<dyn RequestObserver>>,
    /// Controller error-code registry used for classification.
    registry: ErrorCodeRegistry,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_token", &self.token.lock().map(|t| t.is_some()).unwrap_or(false))
            .field("has_auth_provider", &self.auth_provider.is_some())
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a transport with the default error-code registry.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This
    /// should only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_registry(config, ErrorCodeRegistry::with_defaults())
    }

    /// Creates a transport with a caller-supplied error-code registry.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created.
    #[must_use]
    pub fn with_registry(config: ClientConfig, registry: ErrorCodeRegistry) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            token: Mutex::new(None),
            auth_provider: None,
            observer: None,
            registry,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the error-code registry used for classification.
    #[must_use]
    pub const fn error_registry(&self) -> &ErrorCodeRegistry {
        &self.registry
    }

    /// Returns a clone of the current token, if set.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.token.lock().expect("token slot poisoned").clone()
    }

    /// Replaces the current token.
    pub fn set_token(&self, token: Option<AuthToken>) {
        *self.token.lock().expect("token slot poisoned") = token;
    }

    /// Installs the identity provider used for proactive token refresh.
    pub fn set_auth_provider(&mut self, provider: Arc<dyn AuthProvider>) {
        self.auth_provider = Some(provider);
    }

    /// Returns the configured identity provider, if any.
    #[must_use]
    pub fn auth_provider(&self) -> Option<Arc<dyn AuthProvider>> {
        self.auth_provider.clone()
    }

    /// Installs the request observer.
    pub fn set_observer(&mut self, observer: Arc<dyn RequestObserver>) {
        self.observer = Some(observer);
    }

    /// Sends a request to the controller.
    ///
    /// Follows the full §request contract: token refresh, header and
    /// payload negotiation, redirect following (re-issued as GET with the
    /// originally supplied params, for redirect-safe methods only), and
    /// classification of non-success responses.
    ///
    /// Exactly one of three things results: a response with a parsed JSON
    /// body, a response with only the raw body, or a typed error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TargetRefused`] for socket-level failures,
    /// [`ApiError::Timeout`] for wall-clock timeouts,
    /// [`ApiError::InvalidTarget`] for malformed URLs, and the classified
    /// taxonomy error for non-success statuses.
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.refresh_token_if_needed().await?;

        let mut method = request.method;
        let mut url = self.resolve_url(&request.wire_path())?;

        loop {
            let (response, trace) = self.execute_once(method, &url, &request).await?;
            let status = response.status;

            if matches!(status, 301 | 302 | 307) {
                if request.follow_redirects && method.is_redirect_safe() {
                    let location = response.location().map(ToString::to_string);
                    let Some(location) = location else {
                        return Err(ApiError::BadResponse {
                            status,
                            body: response.raw_body,
                            trace: None,
                        }
                        .with_trace(trace));
                    };
                    // Re-issue as GET against Location; the original query
                    // params are re-applied by execute_once. Recursion is
                    // bounded only by the server not looping.
                    url = self.resolve_url(&location)?;
                    method = HttpMethod::Get;
                    continue;
                }
                return Ok(response);
            }

            if response.is_ok() {
                return Ok(response);
            }

            return Err(self
                .registry
                .classify(status, &response.raw_body, Some(trace)));
        }
    }

    /// GET convenience: sends the request and returns the parsed JSON body.
    ///
    /// # Errors
    ///
    /// Propagates [`request`](Self::request) errors; a 2xx response whose
    /// body is not JSON classifies as [`ApiError::BadResponse`].
    pub async fn get_json<I, S>(
        &self,
        segments: I,
        query: Vec<(String, String)>,
    ) -> Result<serde_json::Value, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = Self::bare_get(segments.into_iter().map(Into::into).collect(), query);
        let response = self.request(request).await?;
        response.body.clone().ok_or(ApiError::BadResponse {
            status: response.status,
            body: response.raw_body,
            trace: None,
        })
    }

    /// Follows `next_url` page-by-page, concatenating `resources` arrays.
    ///
    /// N pages of M resources yield N×M values, in original order, from
    /// exactly N requests (the first of which produced `first_page`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadResponse`] when a page does not carry the
    /// collection shape, and propagates transport errors from page fetches.
    pub async fn fetch_all_pages(
        &self,
        first_page: &serde_json::Value,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        let mut page = Self::parse_page(first_page)?;
        let mut resources = std::mem::take(&mut page.resources);

        while let Some(next_url) = page.next_url.take() {
            let request = Self::bare_get(vec![next_url], Vec::new());
            let response = self.request(request).await?;
            let body = response.body.as_ref().ok_or_else(|| ApiError::BadResponse {
                status: response.status,
                body: response.raw_body.clone(),
                trace: None,
            })?;
            page = Self::parse_page(body)?;
            resources.append(&mut page.resources);
        }

        Ok(resources)
    }

    /// Uploads application bits: a multipart PUT carrying the dedup
    /// resource manifest and the zipped application.
    ///
    /// A transient server-side connection reset mid-write is expected and
    /// tolerated exactly once — the upload is silently retried a single
    /// time, never in a loop.
    ///
    /// # Errors
    ///
    /// Propagates [`request`](Self::request) errors; a second connection
    /// failure surfaces as [`ApiError::TargetRefused`].
    pub async fn upload_bits(
        &self,
        guid: &str,
        archive: Vec<u8>,
        resources: &[ResourceFingerprint],
    ) -> Result<(), ApiError> {
        let manifest = serde_json::to_string(resources).unwrap_or_else(|_| "[]".to_string());

        let build = || HttpRequest {
            method: HttpMethod::Put,
            segments: vec![
                "v2".to_string(),
                "apps".to_string(),
                guid.to_string(),
                "bits".to_string(),
            ],
            query: Vec::new(),
            payload: Some(Payload::Multipart(vec![
                MultipartPart {
                    name: "resources".to_string(),
                    filename: None,
                    content_type: Some("application/json".to_string()),
                    data: manifest.clone().into_bytes(),
                },
                MultipartPart {
                    name: "application".to_string(),
                    filename: Some("application.zip".to_string()),
                    content_type: Some("application/zip".to_string()),
                    data: archive.clone(),
                },
            ])),
            content_type: None,
            accept: Some(MimeType::Json),
            extra_headers: Vec::new(),
            follow_redirects: true,
        };

        match self.request(build()).await {
            Err(ApiError::TargetRefused { message }) => {
                tracing::warn!(%message, "connection dropped during bits upload; retrying once");
                self.request(build()).await.map(|_| ())
            }
            other => other.map(|_| ()),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn bare_get(segments: Vec<String>, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            segments,
            query,
            payload: None,
            content_type: None,
            accept: Some(MimeType::Json),
            extra_headers: Vec::new(),
            follow_redirects: true,
        }
    }

    fn parse_page(value: &serde_json::Value) -> Result<CollectionPage, ApiError> {
        serde_json::from_value(value.clone()).map_err(|_| ApiError::BadResponse {
            status: 200,
            body: value.to_string(),
            trace: None,
        })
    }

    fn resolve_url(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return reqwest::Url::parse(path).map_err(|_| ApiError::InvalidTarget {
                target: path.to_string(),
            });
        }
        self.config
            .target()
            .to_url()
            .join(path)
            .map_err(|_| ApiError::InvalidTarget {
                target: format!("{}{path}", self.config.target()),
            })
    }

    /// Refreshes the token through the provider when it is about to expire.
    async fn refresh_token_if_needed(&self) -> Result<(), ApiError> {
        let Some(provider) = &self.auth_provider else {
            return Ok(());
        };

        let refresh_token = {
            let guard = self.token.lock().expect("token slot poisoned");
            match guard.as_ref() {
                Some(token) if token.expires_soon() => {
                    token.refresh_token().map(ToString::to_string)
                }
                _ => None,
            }
        };
        let Some(refresh_token) = refresh_token else {
            return Ok(());
        };

        tracing::debug!("access token expires soon; refreshing through the auth provider");
        let grant = provider.refresh(&refresh_token).await?;
        // A grant without a rotated refresh token keeps the old one.
        let grant = TokenGrant {
            refresh_token: grant.refresh_token.clone().or(Some(refresh_token)),
            ..grant
        };
        self.set_token(Some(AuthToken::from_provider_grant(&grant)));
        Ok(())
    }

    /// Builds the header set for a request: transport defaults first,
    /// caller-supplied headers last so they win on conflict.
    fn build_headers(&self, request: &HttpRequest) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = Vec::new();

        let user_agent_prefix = self
            .config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        headers.push((
            "User-Agent".to_string(),
            format!("{user_agent_prefix}Cloud Controller API Library v{SDK_VERSION} | Rust {rust_version}"),
        ));

        if let Some(token) = self.token.lock().expect("token slot poisoned").as_ref() {
            headers.push(("Authorization".to_string(), token.auth_header().to_string()));
        }
        if let Some(proxy_user) = self.config.proxy_user() {
            headers.push(("Proxy-User".to_string(), proxy_user.to_string()));
        }
        if let Some(request_id) = self.config.request_id() {
            headers.push(("X-Request-Id".to_string(), request_id.to_string()));
        }
        if let Some(accept) = &request.accept {
            headers.push(("Accept".to_string(), accept.as_content_type().to_string()));
        }
        if let Some(content_type) = &request.content_type {
            headers.push((
                "Content-Type".to_string(),
                content_type.as_content_type().to_string(),
            ));
        }

        for (name, value) in &request.extra_headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        headers
    }

    /// Executes one HTTP exchange: no redirects, no classification.
    async fn execute_once(
        &self,
        method: HttpMethod,
        url: &reqwest::Url,
        request: &HttpRequest,
    ) -> Result<(HttpResponse, ExchangeTrace), ApiError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(method), url.clone())
            .timeout(self.config.request_timeout());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let headers = self.build_headers(request);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }

        let mut body_text: Option<String> = None;
        match &request.payload {
            None => {
                // Content-Length is always present; reqwest sets it for
                // bodies, the empty case is made explicit here.
                builder = builder.header("Content-Length", "0");
            }
            Some(Payload::Raw(body)) => {
                body_text = Some(body.clone());
                builder = builder.body(body.clone());
            }
            Some(Payload::Json(value)) => {
                let encoded =
                    serde_json::to_string(value).map_err(|_| ApiError::BadResponse {
                        status: 0,
                        body: "unserializable JSON payload".to_string(),
                        trace: None,
                    })?;
                body_text = Some(encoded.clone());
                builder = builder.body(encoded);
            }
            Some(Payload::Form(fields)) => {
                let encoded = encode_form(fields);
                body_text = Some(encoded.clone());
                builder = builder.body(encoded);
            }
            Some(Payload::Multipart(parts)) => {
                builder = builder.multipart(multipart_form(parts)?);
            }
        }

        let request_summary =
            RequestSummary::new(method.to_string(), url.to_string(), headers, body_text);
        if self.config.trace() {
            tracing::debug!(
                method = %request_summary.method,
                uri = %request_summary.uri,
                "controller request"
            );
        }
        if let Some(observer) = &self.observer {
            observer.on_request(&request_summary);
        }

        let result = builder.send().await;
        let res = match result {
            Ok(res) => res,
            Err(err) => return Err(map_transport_error(&err, method, url)),
        };

        let status = res.status().as_u16();
        let response_headers = parse_response_headers(res.headers());
        let raw_body = res.text().await.unwrap_or_default();
        let response = HttpResponse::new(status, response_headers, raw_body);

        let header_pairs: Vec<(String, String)> = response
            .headers
            .iter()
            .flat_map(|(name, values)| {
                values
                    .iter()
                    .map(move |value| (name.clone(), value.clone()))
            })
            .collect();
        let response_summary = ResponseSummary::new(
            status,
            header_pairs,
            (!response.raw_body.is_empty()).then(|| response.raw_body.clone()),
        );
        if self.config.trace() {
            tracing::debug!(status, "controller response");
        }
        if let Some(observer) = &self.observer {
            observer.on_response(&response_summary);
        }

        let trace = ExchangeTrace {
            request: request_summary,
            response: Some(response_summary),
        };
        Ok((response, trace))
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn map_transport_error(err: &reqwest::Error, method: HttpMethod, url: &reqwest::Url) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout {
            method: method.to_string(),
            uri: url.to_string(),
            cause: Some(err.to_string()),
        };
    }
    if err.is_builder() {
        return ApiError::InvalidTarget {
            target: url.to_string(),
        };
    }
    // Connection refused, reset mid-write, and other socket-level failures.
    ApiError::TargetRefused {
        message: err.to_string(),
    }
}

fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn multipart_form(parts: &[MultipartPart]) -> Result<reqwest::multipart::Form, ApiError> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        let mut piece = reqwest::multipart::Part::bytes(part.data.clone());
        if let Some(filename) = &part.filename {
            piece = piece.file_name(filename.clone());
        }
        if let Some(content_type) = &part.content_type {
            piece = piece
                .mime_str(content_type)
                .map_err(|_| ApiError::Mismatch {
                    expected: "a valid MIME type".to_string(),
                    actual: serde_json::Value::String(content_type.clone()),
                })?;
        }
        form = form.part(part.name.clone(), piece);
    }
    Ok(form)
}

/// Parses response headers into a `HashMap` keyed by lowercase name.
fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let value = value.to_str().unwrap_or_default().to_string();
        result.entry(key).or_default().push(value);
    }
    result
}
