//! Declarative attribute metadata.
//!
//! An [`AttributeDef`] records everything the generic accessor logic needs
//! for one attribute: its semantic type, default, read/write flags, and
//! the wire key it maps to (defaulting to the attribute name).

use serde_json::Value;

use crate::clients::ApiError;
use crate::schema::types::SchemaType;

/// The declaration of one attribute on a resource type.
///
/// # Example
///
/// ```rust
/// use cloud_controller::schema::{AttributeDef, SchemaType};
/// use serde_json::json;
///
/// let attribute = AttributeDef::new("total_instances", SchemaType::Integer)
///     .at("instances")
///     .with_default(json!(1));
///
/// assert_eq!(attribute.name(), "total_instances");
/// assert_eq!(attribute.wire_key(), "instances");
/// assert_eq!(attribute.default(), &json!(1));
/// ```
#[derive(Debug, Clone)]
pub struct AttributeDef {
    name: String,
    schema_type: SchemaType,
    default: Value,
    read_only: bool,
    write_only: bool,
    wire_key: Option<String>,
}

impl AttributeDef {
    /// Declares an attribute with the given name and semantic type.
    ///
    /// The default value is `null` and the wire key defaults to the name.
    #[must_use]
    pub fn new(name: impl Into<String>, schema_type: SchemaType) -> Self {
        Self {
            name: name.into(),
            schema_type,
            default: Value::Null,
            read_only: false,
            write_only: false,
            wire_key: None,
        }
    }

    /// Overrides the wire key this attribute maps to.
    #[must_use]
    pub fn at(mut self, wire_key: impl Into<String>) -> Self {
        self.wire_key = Some(wire_key.into());
        self
    }

    /// Sets the default value returned before the attribute is set or
    /// fetched.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Marks the attribute read-only: writes are rejected.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Marks the attribute write-only: reads are rejected.
    #[must_use]
    pub const fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    /// Returns the attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wire key (the name unless overridden with
    /// [`at`](Self::at)).
    #[must_use]
    pub fn wire_key(&self) -> &str {
        self.wire_key.as_deref().unwrap_or(&self.name)
    }

    /// Returns the semantic type.
    #[must_use]
    pub const fn schema_type(&self) -> &SchemaType {
        &self.schema_type
    }

    /// Returns the declared default value.
    #[must_use]
    pub const fn default(&self) -> &Value {
        &self.default
    }

    /// Returns `true` when writes are rejected.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns `true` when reads are rejected.
    #[must_use]
    pub const fn is_write_only(&self) -> bool {
        self.write_only
    }

    /// Validates a candidate value against the attribute's type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Mismatch`] when the value does not conform.
    pub fn validate(&self, value: &Value) -> Result<(), ApiError> {
        self.schema_type.validate(value)
    }
}
