//! Declarative relation metadata.
//!
//! Relations connect resource types by name through the schema registry:
//! a [`ToOneDef`] maps to a foreign-key wire key (`<name>_guid`) and a
//! relation URL (`<name>_url`); a [`ToManyDef`] maps to an inline
//! collection key and a collection URL (`<plural>_url`).

/// The declaration of a single-valued relation.
///
/// # Example
///
/// ```rust
/// use cloud_controller::schema::ToOneDef;
///
/// let relation = ToOneDef::new("space", "space");
/// assert_eq!(relation.guid_key(), "space_guid");
/// assert_eq!(relation.url_key(), "space_url");
/// ```
#[derive(Debug, Clone)]
pub struct ToOneDef {
    name: String,
    target: String,
    guid_key: Option<String>,
}

impl ToOneDef {
    /// Declares a to-one relation to the named target type.
    #[must_use]
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            guid_key: None,
        }
    }

    /// Overrides the foreign-key wire key (default `<name>_guid`).
    #[must_use]
    pub fn guid_key_at(mut self, guid_key: impl Into<String>) -> Self {
        self.guid_key = Some(guid_key.into());
        self
    }

    /// Returns the relation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the target type name, resolved through the registry.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the foreign-key wire key.
    #[must_use]
    pub fn guid_key(&self) -> String {
        self.guid_key
            .clone()
            .unwrap_or_else(|| format!("{}_guid", self.name))
    }

    /// Returns the relation URL wire key.
    #[must_use]
    pub fn url_key(&self) -> String {
        format!("{}_url", self.name)
    }
}

/// The declaration of a collection-valued relation.
///
/// # Example
///
/// ```rust
/// use cloud_controller::schema::ToManyDef;
///
/// let relation = ToManyDef::new("service_bindings", "service_binding");
/// assert_eq!(relation.collection_key(), "service_bindings");
/// assert_eq!(relation.url_key(), "service_bindings_url");
/// ```
#[derive(Debug, Clone)]
pub struct ToManyDef {
    plural: String,
    target: String,
    collection_key: Option<String>,
}

impl ToManyDef {
    /// Declares a to-many relation to the named target type.
    #[must_use]
    pub fn new(plural: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            plural: plural.into(),
            target: target.into(),
            collection_key: None,
        }
    }

    /// Overrides the inline collection wire key (default: the plural name).
    #[must_use]
    pub fn collection_key_at(mut self, collection_key: impl Into<String>) -> Self {
        self.collection_key = Some(collection_key.into());
        self
    }

    /// Returns the plural relation name.
    #[must_use]
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// Returns the target type name, resolved through the registry.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the inline collection wire key.
    #[must_use]
    pub fn collection_key(&self) -> &str {
        self.collection_key.as_deref().unwrap_or(&self.plural)
    }

    /// Returns the collection URL wire key.
    #[must_use]
    pub fn url_key(&self) -> String {
        format!("{}_url", self.plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_one_default_keys() {
        let relation = ToOneDef::new("organization", "organization");
        assert_eq!(relation.guid_key(), "organization_guid");
        assert_eq!(relation.url_key(), "organization_url");
        assert_eq!(relation.target(), "organization");
    }

    #[test]
    fn test_to_one_guid_key_override() {
        let relation = ToOneDef::new("owning_organization", "organization")
            .guid_key_at("owning_organization_guid");
        assert_eq!(relation.guid_key(), "owning_organization_guid");
        assert_eq!(relation.target(), "organization");
    }

    #[test]
    fn test_to_many_default_keys() {
        let relation = ToManyDef::new("routes", "route");
        assert_eq!(relation.collection_key(), "routes");
        assert_eq!(relation.url_key(), "routes_url");
        assert_eq!(relation.target(), "route");
    }

    #[test]
    fn test_to_many_collection_key_override() {
        let relation = ToManyDef::new("managers", "user").collection_key_at("manager_users");
        assert_eq!(relation.collection_key(), "manager_users");
        assert_eq!(relation.url_key(), "managers_url");
    }
}
