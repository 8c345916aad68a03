//! The server-side resource representation.
//!
//! Single-resource responses carry `{metadata, entity}`: identity and
//! timestamps under `metadata`, domain attributes under `entity`. The
//! [`Manifest`] is the client's last-known copy of that shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity and bookkeeping metadata of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// The opaque resource GUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// The resource's own URL path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Creation timestamp, as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last-update timestamp, as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// The last-known server representation of one resource.
///
/// # Example
///
/// ```rust
/// use cloud_controller::resource::Manifest;
/// use serde_json::json;
///
/// let manifest: Manifest = serde_json::from_value(json!({
///     "metadata": {"guid": "app-1", "url": "/v2/apps/app-1"},
///     "entity": {"name": "dora", "instances": 2}
/// })).unwrap();
///
/// assert_eq!(manifest.guid(), Some("app-1"));
/// assert_eq!(manifest.entity["name"], "dora");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Identity metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Domain attributes, keyed by wire key.
    #[serde(default)]
    pub entity: serde_json::Map<String, Value>,
}

impl Manifest {
    /// Returns the GUID, if the metadata carries one.
    #[must_use]
    pub fn guid(&self) -> Option<&str> {
        self.metadata.guid.as_deref()
    }

    /// Merges a fresher manifest into this one.
    ///
    /// Metadata fields present in `other` replace the local ones; entity
    /// keys from `other` overwrite, keys absent from `other` survive (the
    /// server may omit attributes the local copy already knows).
    pub fn merge(&mut self, other: Self) {
        if other.metadata.guid.is_some() {
            self.metadata.guid = other.metadata.guid;
        }
        if other.metadata.url.is_some() {
            self.metadata.url = other.metadata.url;
        }
        if other.metadata.created_at.is_some() {
            self.metadata.created_at = other.metadata.created_at;
        }
        if other.metadata.updated_at.is_some() {
            self.metadata.updated_at = other.metadata.updated_at;
        }
        for (key, value) in other.entity {
            self.entity.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: serde_json::Value) -> Manifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserializes_wire_shape() {
        let parsed = manifest(json!({
            "metadata": {
                "guid": "app-1",
                "url": "/v2/apps/app-1",
                "created_at": "2013-03-19 18:04:26 +0000",
                "updated_at": null
            },
            "entity": {"name": "dora"}
        }));

        assert_eq!(parsed.guid(), Some("app-1"));
        assert_eq!(parsed.metadata.url.as_deref(), Some("/v2/apps/app-1"));
        assert!(parsed.metadata.updated_at.is_none());
        assert_eq!(parsed.entity["name"], "dora");
    }

    #[test]
    fn test_tolerates_missing_sections() {
        let parsed = manifest(json!({}));
        assert!(parsed.guid().is_none());
        assert!(parsed.entity.is_empty());
    }

    #[test]
    fn test_merge_overwrites_present_fields_only() {
        let mut local = manifest(json!({
            "metadata": {"guid": "app-1", "created_at": "then"},
            "entity": {"name": "dora", "instances": 2}
        }));

        local.merge(manifest(json!({
            "metadata": {"guid": "app-1", "updated_at": "now"},
            "entity": {"instances": 3}
        })));

        assert_eq!(local.metadata.created_at.as_deref(), Some("then"));
        assert_eq!(local.metadata.updated_at.as_deref(), Some("now"));
        // Overwritten by the fresher copy
        assert_eq!(local.entity["instances"], 3);
        // Survives because the server omitted it
        assert_eq!(local.entity["name"], "dora");
    }
}
