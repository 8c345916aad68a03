//! Semantic attribute types and their validation.
//!
//! Every declared attribute carries a [`SchemaType`]; writes validate the
//! candidate value against it before any state changes. JSON `null` always
//! validates — it is the "not yet set" value for every type.

use regex::Regex;
use serde_json::Value;

use crate::clients::ApiError;

/// The semantic type of a declared attribute.
///
/// Validation is structural: primitives match their JSON kind exactly,
/// pattern types regex-match string values, sequences validate element-wise,
/// and records check per-key presence plus recursive validation.
///
/// # Example
///
/// ```rust
/// use cloud_controller::schema::SchemaType;
/// use serde_json::json;
///
/// assert!(SchemaType::Str.validate(&json!("dora")).is_ok());
/// assert!(SchemaType::Str.validate(&json!(42)).is_err());
/// assert!(SchemaType::Str.validate(&json!(null)).is_ok()); // null always validates
/// ```
#[derive(Debug, Clone)]
pub enum SchemaType {
    /// A JSON string.
    Str,
    /// A JSON integer.
    Integer,
    /// Any JSON number.
    Float,
    /// `true` or `false` only.
    Bool,
    /// A string matching a regular expression.
    Pattern(Regex),
    /// A sequence whose elements all validate against the inner type.
    List(Box<SchemaType>),
    /// An object with required, typed keys.
    Record(Vec<(String, SchemaType)>),
    /// Any JSON value.
    Any,
}

impl SchemaType {
    /// Builds a pattern type from a regex literal.
    ///
    /// # Panics
    ///
    /// Panics when the pattern does not compile. Schemas are declared at
    /// startup; an invalid pattern is a programming error surfaced
    /// immediately, like an invalid configuration newtype.
    #[must_use]
    pub fn pattern(pattern: &str) -> Self {
        Self::Pattern(Regex::new(pattern).expect("invalid attribute pattern"))
    }

    /// Returns a human-readable description used in mismatch messages.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Str => "string".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Float => "number".to_string(),
            Self::Bool => "boolean".to_string(),
            Self::Pattern(regex) => format!("string matching /{}/", regex.as_str()),
            Self::List(inner) => format!("list of {}", inner.description()),
            Self::Record(fields) => {
                let keys: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
                format!("record with keys {{{}}}", keys.join(", "))
            }
            Self::Any => "any value".to_string(),
        }
    }

    /// Validates a candidate value against this type.
    ///
    /// `null` always validates: it is the universal "not yet set" value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Mismatch`] naming the expected type and the
    /// offending value. Application code must never silently swallow it.
    pub fn validate(&self, value: &Value) -> Result<(), ApiError> {
        if value.is_null() {
            return Ok(());
        }

        let valid = match self {
            Self::Str => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Pattern(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
            Self::List(inner) => match value.as_array() {
                Some(items) => {
                    for item in items {
                        inner.validate(item)?;
                    }
                    true
                }
                None => false,
            },
            Self::Record(fields) => match value.as_object() {
                Some(map) => {
                    for (name, field_type) in fields {
                        let field = map.get(name).ok_or_else(|| ApiError::Mismatch {
                            expected: self.description(),
                            actual: value.clone(),
                        })?;
                        field_type.validate(field)?;
                    }
                    true
                }
                None => false,
            },
            Self::Any => true,
        };

        if valid {
            Ok(())
        } else {
            Err(ApiError::Mismatch {
                expected: self.description(),
                actual: value.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives_match_exact_kind() {
        assert!(SchemaType::Str.validate(&json!("x")).is_ok());
        assert!(SchemaType::Str.validate(&json!(1)).is_err());

        assert!(SchemaType::Integer.validate(&json!(42)).is_ok());
        assert!(SchemaType::Integer.validate(&json!(4.2)).is_err());
        assert!(SchemaType::Integer.validate(&json!("42")).is_err());

        assert!(SchemaType::Float.validate(&json!(4.2)).is_ok());
        assert!(SchemaType::Float.validate(&json!(42)).is_ok());
        assert!(SchemaType::Float.validate(&json!("4.2")).is_err());
    }

    #[test]
    fn test_bool_matches_true_false_only() {
        assert!(SchemaType::Bool.validate(&json!(true)).is_ok());
        assert!(SchemaType::Bool.validate(&json!(false)).is_ok());
        assert!(SchemaType::Bool.validate(&json!(1)).is_err());
        assert!(SchemaType::Bool.validate(&json!("true")).is_err());
    }

    #[test]
    fn test_null_validates_against_every_type() {
        let types = [
            SchemaType::Str,
            SchemaType::Integer,
            SchemaType::Float,
            SchemaType::Bool,
            SchemaType::pattern("^[A-Z]+$"),
            SchemaType::List(Box::new(SchemaType::Str)),
            SchemaType::Record(vec![("host".to_string(), SchemaType::Str)]),
            SchemaType::Any,
        ];
        for schema_type in types {
            assert!(
                schema_type.validate(&json!(null)).is_ok(),
                "null should validate against {}",
                schema_type.description()
            );
        }
    }

    #[test]
    fn test_pattern_matches_strings() {
        let state = SchemaType::pattern("^(STARTED|STOPPED)$");
        assert!(state.validate(&json!("STARTED")).is_ok());
        assert!(state.validate(&json!("CRASHED")).is_err());
        assert!(state.validate(&json!(7)).is_err());
    }

    #[test]
    fn test_list_validates_element_wise() {
        let uris = SchemaType::List(Box::new(SchemaType::Str));
        assert!(uris.validate(&json!(["a.example.com", "b.example.com"])).is_ok());
        assert!(uris.validate(&json!([])).is_ok());
        assert!(uris.validate(&json!(["a.example.com", 7])).is_err());
        assert!(uris.validate(&json!("a.example.com")).is_err());
    }

    #[test]
    fn test_record_requires_typed_keys() {
        let endpoint = SchemaType::Record(vec![
            ("host".to_string(), SchemaType::Str),
            ("port".to_string(), SchemaType::Integer),
        ]);

        assert!(endpoint
            .validate(&json!({"host": "db.internal", "port": 5432}))
            .is_ok());
        // Missing key
        assert!(endpoint.validate(&json!({"host": "db.internal"})).is_err());
        // Wrong key type
        assert!(endpoint
            .validate(&json!({"host": "db.internal", "port": "5432"}))
            .is_err());
        // Extra keys are fine
        assert!(endpoint
            .validate(&json!({"host": "h", "port": 1, "extra": true}))
            .is_ok());
    }

    #[test]
    fn test_mismatch_carries_expected_and_actual() {
        let error = SchemaType::Str.validate(&json!(42)).unwrap_err();
        assert!(matches!(
            error,
            ApiError::Mismatch { ref expected, ref actual }
                if expected == "string" && *actual == json!(42)
        ));
    }

    #[test]
    fn test_descriptions_are_readable() {
        assert_eq!(SchemaType::Str.description(), "string");
        assert_eq!(
            SchemaType::List(Box::new(SchemaType::Integer)).description(),
            "list of integer"
        );
        assert!(SchemaType::pattern("^a$").description().contains("^a$"));
    }
}
