//! Bearer token handling for Cloud Controller authentication.
//!
//! This module provides the [`AuthToken`] type: the `Authorization` header
//! value, the optional refresh token, and a best-effort decode of the claim
//! payload embedded in the access token.
//!
//! # Claim Decoding
//!
//! Controller access tokens are JWT-shaped but the client never validates
//! signatures — it only needs the claim payload for the user identity and
//! the expiry time. The token material is base64-decoded and the second of
//! two back-to-back JSON objects in the decoded bytes is parsed (the first
//! is the algorithm header, the tail is an opaque signature). Decoding is
//! fallible internally ([`try_decode_claims`]) but collapses to an empty
//! claim map at the public surface — a token the client cannot read is
//! still a token it can send.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded claim payload, keyed by claim name.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// How long before the `exp` claim a token is considered due for refresh.
pub const REFRESH_WINDOW_SECONDS: i64 = 60;

/// Why a claim payload could not be decoded.
///
/// Never escapes the public API; [`AuthToken`] collapses every variant to
/// an empty claim map. Exposed for the internal decode path and its tests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsDecodeError {
    /// The token material was not decodable base64.
    #[error("token material is not valid base64")]
    InvalidBase64,

    /// Fewer than two JSON objects were found in the decoded bytes.
    #[error("decoded token does not contain a claim payload")]
    MissingPayload,

    /// The claim payload was not a JSON object.
    #[error("claim payload is not a JSON object")]
    InvalidPayload,
}

/// The persisted shape of a token, for storage between sessions.
///
/// Claims are derived from the access token and are never persisted.
///
/// # Example
///
/// ```rust
/// use cloud_controller::auth::PersistedToken;
///
/// let json = r#"{"token":"bearer abc","refresh_token":null}"#;
/// let persisted: PersistedToken = serde_json::from_str(json).unwrap();
/// assert_eq!(persisted.token, "bearer abc");
/// assert!(persisted.refresh_token.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedToken {
    /// The full `Authorization` header value (`<scheme> <token>`).
    pub token: String,
    /// The refresh token, if the grant included one.
    pub refresh_token: Option<String>,
}

/// A grant returned by an [`AuthProvider`](crate::auth::AuthProvider).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    /// The raw access token.
    pub access_token: String,
    /// The token scheme, e.g. `bearer`.
    pub token_type: String,
    /// The refresh token, if issued.
    pub refresh_token: Option<String>,
}

/// An authentication token for Cloud Controller API calls.
///
/// Holds the `Authorization` header value, the optional refresh token, and
/// the best-effort decoded claims. All three construction paths —
/// [`from_provider_grant`](Self::from_provider_grant),
/// [`from_wire`](Self::from_wire), and
/// [`from_persisted`](Self::from_persisted) — yield the same uniform value.
///
/// # Example
///
/// ```rust
/// use cloud_controller::auth::AuthToken;
///
/// let token = AuthToken::from_wire("bearer opaque-token");
/// assert_eq!(token.auth_header(), "bearer opaque-token");
/// assert!(token.claims().is_empty()); // not JWT-shaped, decode collapses to empty
/// assert!(!token.expires_soon());     // no exp claim, never considered expiring
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    auth_header: String,
    refresh_token: Option<String>,
    claims: Claims,
}

impl AuthToken {
    /// Creates a token from an [`AuthProvider`](crate::auth::AuthProvider) grant.
    #[must_use]
    pub fn from_provider_grant(grant: &TokenGrant) -> Self {
        let auth_header = format!("{} {}", grant.token_type, grant.access_token);
        let claims = decode_claims(&grant.access_token);
        Self {
            auth_header,
            refresh_token: grant.refresh_token.clone(),
            claims,
        }
    }

    /// Creates a token from a raw `Authorization` header value.
    #[must_use]
    pub fn from_wire(header: impl Into<String>) -> Self {
        let auth_header = header.into();
        let claims = decode_claims(&auth_header);
        Self {
            auth_header,
            refresh_token: None,
            claims,
        }
    }

    /// Restores a token from its persisted shape.
    #[must_use]
    pub fn from_persisted(persisted: &PersistedToken) -> Self {
        let claims = decode_claims(&persisted.token);
        Self {
            auth_header: persisted.token.clone(),
            refresh_token: persisted.refresh_token.clone(),
            claims,
        }
    }

    /// Serializes the token for storage between sessions.
    #[must_use]
    pub fn to_persistable(&self) -> PersistedToken {
        PersistedToken {
            token: self.auth_header.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    /// Returns the refresh token, if present.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the decoded claims.
    ///
    /// Empty when the access token carried no readable claim payload.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Returns the `user_id` claim, if present.
    #[must_use]
    pub fn user_guid(&self) -> Option<&str> {
        self.claims.get("user_id").and_then(serde_json::Value::as_str)
    }

    /// Returns the expiry time from the `exp` claim, if present.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.claims.get("exp")?.as_i64()?;
        Utc.timestamp_opt(exp, 0).single()
    }

    /// Returns `true` if the token expires within the refresh window.
    ///
    /// Tokens without an `exp` claim never report as expiring; there is
    /// nothing to refresh against.
    #[must_use]
    pub fn expires_soon(&self) -> bool {
        self.expires_at().is_some_and(|expires| {
            expires - chrono::Duration::seconds(REFRESH_WINDOW_SECONDS) <= Utc::now()
        })
    }
}

// Verify AuthToken is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthToken>();
};

/// Decodes the claim payload of an access token, yielding an empty map on
/// any failure.
#[must_use]
pub fn decode_claims(access_token: &str) -> Claims {
    try_decode_claims(access_token).unwrap_or_default()
}

/// Fallible claim decode.
///
/// The token material is the last whitespace-separated part of the input,
/// so both bare tokens and full `<scheme> <token>` header values decode.
/// Base64 decoding is lenient the way the controller ecosystem's tooling
/// is: characters outside the base64 alphabet (JWT dot separators, url-safe
/// padding) are skipped and a trailing partial group is dropped.
///
/// # Errors
///
/// Returns [`ClaimsDecodeError`] when no claim payload can be located or
/// parsed. Callers wanting the never-fails contract use [`decode_claims`].
pub fn try_decode_claims(access_token: &str) -> Result<Claims, ClaimsDecodeError> {
    let material = access_token.split_whitespace().last().unwrap_or_default();
    let bytes = lenient_base64_decode(material)?;
    let decoded = String::from_utf8_lossy(&bytes);

    // First object is the algorithm header, second is the claim payload.
    let header = scan_json_object(&decoded, 0).ok_or(ClaimsDecodeError::MissingPayload)?;
    let payload = scan_json_object(&decoded, header.end).ok_or(ClaimsDecodeError::MissingPayload)?;

    match serde_json::from_str(&decoded[payload.start..payload.end]) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        _ => Err(ClaimsDecodeError::InvalidPayload),
    }
}

/// Decodes token material the forgiving way: well-formed (padded) base64
/// decodes directly; otherwise characters outside the alphabet (JWT dot
/// separators, url-safe leftovers) are skipped and a trailing partial
/// group is dropped.
fn lenient_base64_decode(material: &str) -> Result<Vec<u8>, ClaimsDecodeError> {
    let filtered: String = material
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();

    if let Ok(bytes) = STANDARD.decode(filtered.as_bytes()) {
        return Ok(bytes);
    }

    let unpadded: String = filtered.chars().filter(|&c| c != '=').collect();
    let complete = &unpadded[..unpadded.len() - unpadded.len() % 4];
    STANDARD_NO_PAD
        .decode(complete)
        .map_err(|_| ClaimsDecodeError::InvalidBase64)
}

struct ObjectSpan {
    start: usize,
    end: usize,
}

/// Finds the span of the next balanced `{...}` object at or after `from`.
///
/// Tracks string literals so braces inside claim values do not unbalance
/// the scan.
fn scan_json_object(text: &str, from: usize) -> Option<ObjectSpan> {
    let bytes = text.as_bytes();
    let start = from + text.get(from..)?.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(ObjectSpan {
                        start,
                        end: start + offset + 1,
                    });
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;

    fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_decode_extracts_second_json_object() {
        let raw = br#"{"alg":"x"}{"user_id":"a6","email":"a@b.com"}garbage"#;
        let claims = decode_claims(&encode(raw));

        assert_eq!(claims.get("user_id"), Some(&json!("a6")));
        assert_eq!(claims.get("email"), Some(&json!("a@b.com")));
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn test_decode_handles_scheme_prefix() {
        let raw = br#"{"alg":"x"}{"user_id":"a6"}sig"#;
        let header = format!("bearer {}", encode(raw));
        let claims = decode_claims(&header);

        assert_eq!(claims.get("user_id"), Some(&json!("a6")));
    }

    #[test]
    fn test_decode_of_non_json_bytes_yields_empty() {
        let claims = decode_claims(&encode(b"definitely not json"));
        assert!(claims.is_empty());
    }

    #[test]
    fn test_decode_of_non_base64_yields_empty() {
        // Whatever survives character filtering decodes to bytes with no
        // JSON objects in them.
        let claims = decode_claims("!!!not-base64!!!");
        assert!(claims.is_empty());
    }

    #[test]
    fn test_decode_of_single_object_yields_empty() {
        let claims = decode_claims(&encode(br#"{"alg":"x"}"#));
        assert!(claims.is_empty());
    }

    #[test]
    fn test_try_decode_reports_missing_payload() {
        let result = try_decode_claims(&encode(br#"{"alg":"x"}"#));
        assert_eq!(result, Err(ClaimsDecodeError::MissingPayload));
    }

    #[test]
    fn test_decode_survives_braces_inside_strings() {
        let raw = br#"{"alg":"{odd}"}{"user_id":"a6","note":"{not a header}"}"#;
        let claims = decode_claims(&encode(raw));

        assert_eq!(claims.get("user_id"), Some(&json!("a6")));
        assert_eq!(claims.get("note"), Some(&json!("{not a header}")));
    }

    #[test]
    fn test_construction_paths_yield_uniform_value() {
        let raw = br#"{"alg":"x"}{"user_id":"a6"}"#;
        let access = encode(raw);

        let grant = TokenGrant {
            access_token: access.clone(),
            token_type: "bearer".to_string(),
            refresh_token: Some("refresh-1".to_string()),
        };
        let from_grant = AuthToken::from_provider_grant(&grant);
        assert_eq!(from_grant.auth_header(), format!("bearer {access}"));
        assert_eq!(from_grant.refresh_token(), Some("refresh-1"));
        assert_eq!(from_grant.user_guid(), Some("a6"));

        let from_wire = AuthToken::from_wire(format!("bearer {access}"));
        assert_eq!(from_wire.auth_header(), from_grant.auth_header());
        assert_eq!(from_wire.user_guid(), Some("a6"));
        assert!(from_wire.refresh_token().is_none());

        let from_persisted = AuthToken::from_persisted(&from_grant.to_persistable());
        assert_eq!(from_persisted, from_grant);
    }

    #[test]
    fn test_persisted_round_trip() {
        let token = AuthToken {
            auth_header: "bearer abc".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            claims: Claims::new(),
        };

        let persisted = token.to_persistable();
        assert_eq!(persisted.token, "bearer abc");
        assert_eq!(persisted.refresh_token, Some("refresh-1".to_string()));

        let json = serde_json::to_value(&persisted).unwrap();
        assert_eq!(json, json!({"token": "bearer abc", "refresh_token": "refresh-1"}));

        let restored = AuthToken::from_persisted(&persisted);
        assert_eq!(restored.auth_header(), "bearer abc");
        assert_eq!(restored.refresh_token(), Some("refresh-1"));
    }

    #[test]
    fn test_expires_at_reads_exp_claim() {
        let exp = Utc::now().timestamp() + 3600;
        let raw = format!(r#"{{"alg":"x"}}{{"user_id":"a6","exp":{exp}}}"#);
        let token = AuthToken::from_wire(format!("bearer {}", encode(raw.as_bytes())));

        assert_eq!(token.expires_at().map(|t| t.timestamp()), Some(exp));
        assert!(!token.expires_soon());
    }

    #[test]
    fn test_expires_soon_within_refresh_window() {
        let exp = Utc::now().timestamp() + 30; // inside the 60 s window
        let raw = format!(r#"{{"alg":"x"}}{{"exp":{exp}}}"#);
        let token = AuthToken::from_wire(format!("bearer {}", encode(raw.as_bytes())));

        assert!(token.expires_soon());
    }

    #[test]
    fn test_no_exp_claim_never_expires_soon() {
        let token = AuthToken::from_wire("bearer opaque");
        assert!(token.expires_at().is_none());
        assert!(!token.expires_soon());
    }
}
