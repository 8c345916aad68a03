//! Per-type schema records and the explicit schema registry.
//!
//! A [`ResourceSchema`] is the static description of one entity kind:
//! its attribute table, relation tables, queryable keys, scope parent,
//! and summary hydration rules. Schemas are built once at startup through
//! [`SchemaBuilder`] and collected into a [`SchemaRegistry`] that the
//! client holds explicitly — there is no process-wide type table, and
//! relation targets resolve by name through the registry the client was
//! constructed with.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::clients::ApiError;
use crate::resource::Resource;
use crate::schema::attribute::AttributeDef;
use crate::schema::relation::{ToManyDef, ToOneDef};

/// The parent kind a resource type is scoped to.
///
/// When a type declares a scope parent and the client has the matching
/// "current" scope set, collection lookups route through the parent's
/// collection endpoint (`/v2/spaces/{guid}/apps` instead of `/v2/apps`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeParent {
    /// Scoped to the client's current organization.
    Organization,
    /// Scoped to the client's current space.
    Space,
}

impl ScopeParent {
    /// Returns the parent's collection path segment.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Organization => "organizations",
            Self::Space => "spaces",
        }
    }

    /// Returns the foreign-key wire key auto-populated on creation.
    #[must_use]
    pub const fn guid_key(self) -> &'static str {
        match self {
            Self::Organization => "organization_guid",
            Self::Space => "space_guid",
        }
    }
}

/// A custom hydration action: applied to the resource with the raw summary
/// value for its key.
pub type SummaryFn = Arc<dyn Fn(&mut Resource, &serde_json::Value) + Send + Sync>;

/// How one summary-body key hydrates into the resource.
///
/// Keys without a rule fall through the generic path: plain attribute
/// assignment, recursive to-one hydration, or per-member to-many
/// hydration, matched against the schema's tables.
#[derive(Clone)]
pub enum SummaryRule {
    /// Drop the key entirely.
    Ignore,
    /// Write the value into the named attribute.
    AssignTo(String),
    /// Run a custom action.
    Custom(SummaryFn),
}

impl fmt::Debug for SummaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "Ignore"),
            Self::AssignTo(attribute) => f.debug_tuple("AssignTo").field(attribute).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// The static schema record for one entity kind.
///
/// Built once through [`ResourceSchema::builder`]; consumed by the generic
/// accessor logic on [`Resource`] — no per-type code is generated.
///
/// # Example
///
/// ```rust
/// use cloud_controller::schema::{AttributeDef, ResourceSchema, SchemaType, ToOneDef};
///
/// let schema = ResourceSchema::builder("route", "routes")
///     .attribute(AttributeDef::new("host", SchemaType::Str))
///     .to_one(ToOneDef::new("domain", "domain"))
///     .queryable(["host", "domain_guid"])
///     .build();
///
/// assert_eq!(schema.name(), "route");
/// assert!(schema.attribute("host").is_some());
/// assert!(schema.is_queryable("host"));
/// ```
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    name: String,
    plural: String,
    attributes: Vec<AttributeDef>,
    to_ones: Vec<ToOneDef>,
    to_manys: Vec<ToManyDef>,
    queryable: Vec<String>,
    scope_parent: Option<ScopeParent>,
    summary_rules: HashMap<String, SummaryRule>,
    has_summary: bool,
}

impl ResourceSchema {
    /// Starts building a schema for the named type.
    ///
    /// `name` is the singular type name (`"app"`), `plural` the collection
    /// path segment (`"apps"`).
    #[must_use]
    pub fn builder(name: impl Into<String>, plural: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                name: name.into(),
                plural: plural.into(),
                attributes: Vec::new(),
                to_ones: Vec::new(),
                to_manys: Vec::new(),
                queryable: Vec::new(),
                scope_parent: None,
                summary_rules: HashMap::new(),
                has_summary: false,
            },
        }
    }

    /// Returns the singular type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the collection path segment.
    #[must_use]
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// Returns the ordered attribute table.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|def| def.name() == name)
    }

    /// Looks up an attribute by its wire key.
    #[must_use]
    pub fn attribute_by_wire_key(&self, wire_key: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|def| def.wire_key() == wire_key)
    }

    /// Returns the to-one relation table.
    #[must_use]
    pub fn to_ones(&self) -> &[ToOneDef] {
        &self.to_ones
    }

    /// Looks up a to-one relation by name.
    #[must_use]
    pub fn to_one(&self, name: &str) -> Option<&ToOneDef> {
        self.to_ones.iter().find(|def| def.name() == name)
    }

    /// Returns the to-many relation table.
    #[must_use]
    pub fn to_manys(&self) -> &[ToManyDef] {
        &self.to_manys
    }

    /// Looks up a to-many relation by plural name.
    #[must_use]
    pub fn to_many(&self, plural: &str) -> Option<&ToManyDef> {
        self.to_manys.iter().find(|def| def.plural() == plural)
    }

    /// Returns `true` when the wire key was declared queryable.
    #[must_use]
    pub fn is_queryable(&self, wire_key: &str) -> bool {
        self.queryable.iter().any(|key| key == wire_key)
    }

    /// Returns the queryable wire keys.
    #[must_use]
    pub fn queryable_keys(&self) -> &[String] {
        &self.queryable
    }

    /// Returns the scope parent, if the type declares one.
    #[must_use]
    pub const fn scope_parent(&self) -> Option<ScopeParent> {
        self.scope_parent
    }

    /// Returns `true` when the type declares a `/summary` endpoint.
    #[must_use]
    pub const fn has_summary(&self) -> bool {
        self.has_summary
    }

    /// Returns the hydration rule for a summary-body key, if declared.
    #[must_use]
    pub fn summary_rule(&self, key: &str) -> Option<&SummaryRule> {
        self.summary_rules.get(key)
    }
}

/// Builder for [`ResourceSchema`] records.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: ResourceSchema,
}

impl SchemaBuilder {
    /// Declares an attribute.
    #[must_use]
    pub fn attribute(mut self, def: AttributeDef) -> Self {
        self.schema.attributes.push(def);
        self
    }

    /// Declares a to-one relation.
    #[must_use]
    pub fn to_one(mut self, def: ToOneDef) -> Self {
        self.schema.to_ones.push(def);
        self
    }

    /// Declares a to-many relation.
    #[must_use]
    pub fn to_many(mut self, def: ToManyDef) -> Self {
        self.schema.to_manys.push(def);
        self
    }

    /// Declares which wire keys can appear in query filters.
    #[must_use]
    pub fn queryable<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema
            .queryable
            .extend(keys.into_iter().map(Into::into));
        self
    }

    /// Scopes collection lookups to the given parent kind.
    #[must_use]
    pub const fn scoped_to(mut self, parent: ScopeParent) -> Self {
        self.schema.scope_parent = Some(parent);
        self
    }

    /// Declares the `/summary` endpoint for this type.
    #[must_use]
    pub const fn summary(mut self) -> Self {
        self.schema.has_summary = true;
        self
    }

    /// Adds a summary hydration rule for one body key (implies
    /// [`summary`](Self::summary)).
    #[must_use]
    pub fn summary_rule(mut self, key: impl Into<String>, rule: SummaryRule) -> Self {
        self.schema.has_summary = true;
        self.schema.summary_rules.insert(key.into(), rule);
        self
    }

    /// Finishes the schema.
    #[must_use]
    pub fn build(self) -> ResourceSchema {
        self.schema
    }
}

/// The explicit, constructed-once mapping from type name to schema.
///
/// The registry is plain data passed to (or held by) the client; relation
/// targets resolve against it rather than any global state.
///
/// # Example
///
/// ```rust
/// use cloud_controller::schema::{ResourceSchema, SchemaRegistry};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(ResourceSchema::builder("app", "apps").build());
///
/// assert!(registry.get("app").is_ok());
/// assert!(registry.get("droplet").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: HashMap<String, Arc<ResourceSchema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a type's schema.
    pub fn register(&mut self, schema: ResourceSchema) {
        self.types
            .insert(schema.name().to_string(), Arc::new(schema));
    }

    /// Resolves a type by name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownType`] when the name is not registered.
    pub fn get(&self, name: &str) -> Result<Arc<ResourceSchema>, ApiError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Looks up a type by name without erroring.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<ResourceSchema>> {
        self.types.get(name).cloned()
    }

    /// Returns the registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
