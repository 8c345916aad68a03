//! HTTP response types for the Cloud Controller SDK.
//!
//! This module provides the [`HttpResponse`] type and the paginated
//! [`CollectionPage`] wire shape (`{resources, next_url, ...}`) used by
//! every collection endpoint.

use std::collections::HashMap;

use serde::Deserialize;

/// A completed HTTP response from the controller.
///
/// Holds the status, headers, the raw body, and — when the body parsed as
/// JSON — the parsed value. The raw body is kept so classification can
/// fall back to it for opaque 5xx responses.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers, lowercase names (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub raw_body: String,
    /// The parsed JSON body, when the raw body parsed.
    pub body: Option<serde_json::Value>,
}

impl HttpResponse {
    /// Creates a response, attempting to parse the body as JSON.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, Vec<String>>, raw_body: String) -> Self {
        let body = serde_json::from_str(&raw_body).ok();
        Self {
            status,
            headers,
            raw_body,
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the first value of a header, by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Location` header, present on redirects.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Deserializes the parsed JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the body is absent or does not match.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.body {
            Some(value) => serde_json::from_value(value.clone()),
            None => serde_json::from_str(&self.raw_body),
        }
    }
}

/// One page of a paginated collection response.
///
/// Collection endpoints return `{resources: [...], next_url: string|null}`
/// plus optional bookkeeping fields. [`fetch_all_pages`]
/// (crate::clients::HttpClient::fetch_all_pages) follows `next_url` until a
/// page omits it.
///
/// # Example
///
/// ```rust
/// use cloud_controller::clients::CollectionPage;
/// use serde_json::json;
///
/// let page: CollectionPage = serde_json::from_value(json!({
///     "total_results": 3,
///     "next_url": "/v2/apps?page=2",
///     "resources": [{"metadata": {"guid": "a-1"}, "entity": {}}]
/// })).unwrap();
///
/// assert_eq!(page.resources.len(), 1);
/// assert_eq!(page.next_url.as_deref(), Some("/v2/apps?page=2"));
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CollectionPage {
    /// The resources on this page.
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
    /// The absolute path (with query) of the next page, if any.
    #[serde(default)]
    pub next_url: Option<String>,
    /// The absolute path of the previous page, if any.
    #[serde(default)]
    pub prev_url: Option<String>,
    /// The server-reported total, if any.
    #[serde(default)]
    pub total_results: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(status, HashMap::new(), body.to_string())
    }

    #[test]
    fn test_parses_json_body() {
        let res = response(200, r#"{"metadata":{"guid":"a-1"}}"#);
        assert!(res.is_ok());
        assert_eq!(res.body.as_ref().unwrap()["metadata"]["guid"], "a-1");
    }

    #[test]
    fn test_keeps_raw_body_when_unparsable() {
        let res = response(500, "oops");
        assert!(res.body.is_none());
        assert_eq!(res.raw_body, "oops");
    }

    #[test]
    fn test_is_ok_for_2xx_only() {
        assert!(response(200, "{}").is_ok());
        assert!(response(201, "{}").is_ok());
        assert!(response(204, "").is_ok());
        assert!(!response(301, "").is_ok());
        assert!(!response(404, "").is_ok());
        assert!(!response(500, "").is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert(
            "location".to_string(),
            vec!["https://api.cloud.example.com/v2/info".to_string()],
        );
        let res = HttpResponse::new(302, headers, String::new());

        assert_eq!(
            res.header("Location"),
            Some("https://api.cloud.example.com/v2/info")
        );
        assert_eq!(res.location(), res.header("location"));
    }

    #[test]
    fn test_collection_page_deserializes_wire_shape() {
        let page: CollectionPage = serde_json::from_value(json!({
            "total_results": 2,
            "total_pages": 2,
            "prev_url": null,
            "next_url": "/v2/apps?page=2",
            "resources": [
                {"metadata": {"guid": "a-1"}, "entity": {"name": "dora"}},
            ]
        }))
        .unwrap();

        assert_eq!(page.resources.len(), 1);
        assert_eq!(page.next_url.as_deref(), Some("/v2/apps?page=2"));
        assert!(page.prev_url.is_none());
        assert_eq!(page.total_results, Some(2));
    }

    #[test]
    fn test_collection_page_final_page_omits_next_url() {
        let page: CollectionPage = serde_json::from_value(json!({
            "resources": []
        }))
        .unwrap();
        assert!(page.next_url.is_none());
        assert!(page.resources.is_empty());
    }

    #[test]
    fn test_parse_deserializes_into_type() {
        #[derive(Deserialize)]
        struct Info {
            name: String,
        }

        let res = response(200, r#"{"name":"cloud-controller"}"#);
        let info: Info = res.parse().unwrap();
        assert_eq!(info.name, "cloud-controller");
    }
}
