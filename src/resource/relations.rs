//! Relation traversal and link mutation.
//!
//! To-one relations resolve lazily: an inline entity in the manifest is
//! materialized, else a relation URL is fetched, else the default (`None`)
//! is returned. To-many relations materialize inline collections or fetch
//! the relation's collection endpoint through full pagination.
//!
//! Link mutations (`add_to`/`remove_from`) call the relation-link
//! endpoints and update the local cache only after the remote call
//! confirms — a failed call leaves the cache exactly as it was.

use serde_json::Value;

use crate::client::Client;
use crate::clients::{ApiError, HttpMethod, HttpRequest, MimeType, Payload};
use crate::resource::instance::{parse_manifest, Resource};
use crate::schema::{ToManyDef, ToOneDef};

impl Resource {
    /// Resolves a to-one relation: inline entity, else relation URL, else
    /// the default `None`. The result is cached until invalidation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownRelation`] for undeclared names and
    /// propagates fetch errors.
    pub async fn to_one(
        &mut self,
        client: &Client,
        name: &str,
    ) -> Result<Option<Resource>, ApiError> {
        let def = self.to_one_def(name)?;

        if let Some(resolved) = self.relation_cache.get(name) {
            return Ok(resolved.first().cloned());
        }

        self.ensure_manifest(client).await?;
        let target_schema = client.registry().get(def.target())?;

        // Inline entity embedded by inline-relations-depth.
        let inline = self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.entity.get(def.name()))
            .filter(|value| value.is_object())
            .cloned();
        if let Some(value) = inline {
            let related = Resource::from_manifest(target_schema, parse_manifest(&value)?);
            self.relation_cache
                .insert(name.to_string(), vec![related.clone()]);
            return Ok(Some(related));
        }

        // Relation URL present: fetch it.
        let url = self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.entity.get(&def.url_key()))
            .and_then(Value::as_str)
            .map(ToString::to_string);
        if let Some(url) = url {
            let body = client.transport().get_json([url], Vec::new()).await?;
            let related = Resource::from_manifest(target_schema, parse_manifest(&body)?);
            self.relation_cache
                .insert(name.to_string(), vec![related.clone()]);
            return Ok(Some(related));
        }

        self.relation_cache.insert(name.to_string(), Vec::new());
        Ok(None)
    }

    /// Assigns (or clears) a to-one relation.
    ///
    /// Records the prior related object — reconstructed from the bare
    /// foreign-key GUID when it was never resolved — into the change log,
    /// and writes the foreign-key wire key into both the manifest entity
    /// and the diff. No I/O happens until `create`/`update`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownRelation`] for undeclared names and
    /// [`ApiError::Mismatch`] when the target's type does not match the
    /// declaration.
    pub fn set_to_one(&mut self, name: &str, target: Option<&Resource>) -> Result<(), ApiError> {
        let def = self.to_one_def(name)?;

        if let Some(resource) = target {
            if resource.type_name() != def.target() {
                return Err(ApiError::Mismatch {
                    expected: format!("resource of type '{}'", def.target()),
                    actual: Value::String(resource.type_name().to_string()),
                });
            }
        }

        let guid_key = def.guid_key();
        let old = self
            .relation_cache
            .get(name)
            .and_then(|resolved| resolved.first())
            .and_then(Resource::guid)
            .map(ToString::to_string)
            .map_or_else(
                || {
                    // Never resolved: reconstruct the prior object from the
                    // bare foreign-key GUID.
                    self.manifest
                        .as_ref()
                        .and_then(|manifest| manifest.entity.get(&guid_key))
                        .cloned()
                        .unwrap_or(Value::Null)
                },
                Value::String,
            );

        let new = target
            .and_then(Resource::guid)
            .map_or(Value::Null, |guid| Value::String(guid.to_string()));

        self.changes
            .insert(name.to_string(), (old, new.clone()));
        self.manifest
            .get_or_insert_with(Default::default)
            .entity
            .insert(guid_key.clone(), new.clone());
        self.diff.insert(guid_key, new);
        self.relation_cache
            .insert(name.to_string(), target.cloned().into_iter().collect());
        Ok(())
    }

    /// Resolves a to-many relation: cached collection, else inline
    /// collection, else the relation's collection endpoint followed
    /// through every page.
    ///
    /// An unsaved instance with nothing inline resolves to an empty
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownRelation`] for undeclared names and
    /// propagates fetch errors.
    pub async fn to_many(
        &mut self,
        client: &Client,
        plural: &str,
    ) -> Result<Vec<Resource>, ApiError> {
        let def = self.to_many_def(plural)?;

        if let Some(resolved) = self.relation_cache.get(plural) {
            return Ok(resolved.clone());
        }

        self.ensure_manifest(client).await?;
        let target_schema = client.registry().get(def.target())?;

        // Inline collection embedded by inline-relations-depth.
        let inline = self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.entity.get(def.collection_key()))
            .and_then(Value::as_array)
            .cloned();
        if let Some(values) = inline {
            let mut members = Vec::with_capacity(values.len());
            for value in &values {
                members.push(Resource::from_manifest(
                    target_schema.clone(),
                    parse_manifest(value)?,
                ));
            }
            self.relation_cache
                .insert(plural.to_string(), members.clone());
            return Ok(members);
        }

        let Some(url) = self.collection_url(&def) else {
            self.relation_cache.insert(plural.to_string(), Vec::new());
            return Ok(Vec::new());
        };

        let first = client.transport().get_json([url], Vec::new()).await?;
        let values = client.transport().fetch_all_pages(&first).await?;
        let mut members = Vec::with_capacity(values.len());
        for value in &values {
            members.push(Resource::from_manifest(
                target_schema.clone(),
                parse_manifest(value)?,
            ));
        }
        self.relation_cache
            .insert(plural.to_string(), members.clone());
        Ok(members)
    }

    /// Links a resource into a to-many relation.
    ///
    /// The local cache is updated only after the remote call succeeds;
    /// linking an already-present member never duplicates the cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotPersisted`] when either side lacks a GUID,
    /// and propagates link-call errors (leaving the cache untouched).
    pub async fn add_to(
        &mut self,
        client: &Client,
        plural: &str,
        other: &Resource,
    ) -> Result<(), ApiError> {
        let (owner_guid, other_guid) = self.link_guids(plural, other)?;

        let request = link_request(
            HttpMethod::Put,
            self.schema.plural(),
            &owner_guid,
            plural,
            &other_guid,
        );
        client.transport().request(request).await?;

        if let Some(resolved) = self.relation_cache.get_mut(plural) {
            let already_present = resolved
                .iter()
                .any(|member| member.guid() == Some(other_guid.as_str()));
            if !already_present {
                resolved.push(other.clone());
            }
        }
        Ok(())
    }

    /// Unlinks a resource from a to-many relation.
    ///
    /// The local cache is updated only after the remote call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotPersisted`] when either side lacks a GUID,
    /// and propagates link-call errors (leaving the cache untouched).
    pub async fn remove_from(
        &mut self,
        client: &Client,
        plural: &str,
        other: &Resource,
    ) -> Result<(), ApiError> {
        let (owner_guid, other_guid) = self.link_guids(plural, other)?;

        let request = link_request(
            HttpMethod::Delete,
            self.schema.plural(),
            &owner_guid,
            plural,
            &other_guid,
        );
        client.transport().request(request).await?;

        if let Some(resolved) = self.relation_cache.get_mut(plural) {
            resolved.retain(|member| member.guid() != Some(other_guid.as_str()));
        }
        Ok(())
    }

    fn to_one_def(&self, name: &str) -> Result<ToOneDef, ApiError> {
        self.schema
            .to_one(name)
            .cloned()
            .ok_or_else(|| ApiError::UnknownRelation {
                resource: self.type_name().to_string(),
                relation: name.to_string(),
            })
    }

    fn to_many_def(&self, plural: &str) -> Result<ToManyDef, ApiError> {
        self.schema
            .to_many(plural)
            .cloned()
            .ok_or_else(|| ApiError::UnknownRelation {
                resource: self.type_name().to_string(),
                relation: plural.to_string(),
            })
    }

    fn collection_url(&self, def: &ToManyDef) -> Option<String> {
        let from_manifest = self
            .manifest
            .as_ref()
            .and_then(|manifest| manifest.entity.get(&def.url_key()))
            .and_then(Value::as_str)
            .map(ToString::to_string);
        if from_manifest.is_some() {
            return from_manifest;
        }
        self.guid.as_ref().map(|guid| {
            format!(
                "/v2/{}/{}/{}",
                self.schema.plural(),
                guid,
                def.plural()
            )
        })
    }

    fn link_guids(&self, plural: &str, other: &Resource) -> Result<(String, String), ApiError> {
        self.to_many_def(plural)?;
        let owner_guid = self
            .guid
            .clone()
            .ok_or_else(|| self.not_persisted("link"))?;
        let other_guid = other
            .guid()
            .map(ToString::to_string)
            .ok_or_else(|| other.not_persisted("link"))?;
        Ok((owner_guid, other_guid))
    }
}

fn link_request(
    method: HttpMethod,
    owner_plural: &str,
    owner_guid: &str,
    relation: &str,
    other_guid: &str,
) -> HttpRequest {
    HttpRequest {
        method,
        segments: vec![
            "v2".to_string(),
            owner_plural.to_string(),
            owner_guid.to_string(),
            relation.to_string(),
            other_guid.to_string(),
        ],
        query: Vec::new(),
        // Link endpoints take no body; an empty JSON body keeps
        // Content-Length explicit for PUT.
        payload: match method {
            HttpMethod::Put => Some(Payload::Raw(String::new())),
            _ => None,
        },
        content_type: match method {
            HttpMethod::Put => Some(MimeType::Json),
            _ => None,
        },
        accept: Some(MimeType::Json),
        extra_headers: Vec::new(),
        follow_redirects: true,
    }
}
