//! Lookup-or-create resolution of source URIs to remote identifiers.

use tracing::debug;

use crate::cache::IdentifierCache;
use crate::client::{response, WikibaseApi};
use crate::entity::{EntityDocument, EntityId, EntityKind, PropertyDatatype};
use crate::errors::{ImportError, Result};

/// Resolves URIs through the [`IdentifierCache`], creating the minimal remote
/// entity on a miss.
///
/// A minimal entity carries the URI as label and description and nothing
/// else. Failures propagate and leave the cache untouched for that URI.
pub struct EntityResolver<'a, A> {
    api: &'a A,
    cache: &'a IdentifierCache,
    language: &'a str,
}

impl<'a, A: WikibaseApi> EntityResolver<'a, A> {
    pub fn new(api: &'a A, cache: &'a IdentifierCache, language: &'a str) -> Self {
        Self { api, cache, language }
    }

    /// Language code used for labels and descriptions.
    pub fn language(&self) -> &'a str {
        self.language
    }

    pub fn cache(&self) -> &'a IdentifierCache {
        self.cache
    }

    /// Resolve a property URI, creating a `string` property on a miss.
    pub async fn resolve_property(&self, uri: &str) -> Result<EntityId> {
        let (id, _) = self.resolve_property_typed(uri, PropertyDatatype::String).await?;
        Ok(id)
    }

    /// Resolve a property URI, creating it with `datatype` on a miss.
    ///
    /// `datatype` is ignored when the URI is cached already; the datatype the
    /// property was first resolved with is returned next to its identifier.
    pub async fn resolve_property_typed(
        &self,
        uri: &str,
        datatype: PropertyDatatype,
    ) -> Result<(EntityId, PropertyDatatype)> {
        let document = EntityDocument::property(self.language, uri, datatype);
        let id = self
            .cache
            .get_or_try_create(EntityKind::Property, uri, move || async move {
                let id = self.persist(&document).await?;
                self.cache.set_property_datatype(uri, datatype);
                Ok::<_, ImportError>(id)
            })
            .await?;

        let resolved = self
            .cache
            .property_datatype(uri)
            .unwrap_or_else(|| self.cache.set_property_datatype(uri, datatype));
        Ok((id, resolved))
    }

    /// Resolve a resource URI, creating an empty item on a miss.
    pub async fn resolve_item(&self, uri: &str) -> Result<EntityId> {
        let document = EntityDocument::item(self.language, uri);
        self.cache
            .get_or_try_create(EntityKind::Item, uri, move || async move {
                self.persist(&document).await
            })
            .await
    }

    /// Persist the item for a source resource.
    ///
    /// If `uri` is cached already (an earlier statement referenced it), the
    /// claims are added to that item by an edit. Otherwise the item is
    /// created under the resource's cache slot.
    pub async fn persist_item(&self, uri: &str, document: EntityDocument) -> Result<EntityId> {
        if let Some(existing) = self.cache.get(EntityKind::Item, uri) {
            debug!(resource = uri, id = %existing, "resource already has an item, editing it");
            self.persist(&document.with_id(existing.clone())).await?;
            return Ok(existing);
        }

        self.cache
            .get_or_try_create(EntityKind::Item, uri, move || async move {
                self.persist(&document).await
            })
            .await
    }

    /// Submit `document` and return the identifier of the entity it produced.
    ///
    /// Bypasses the cache. A document with an `id` is sent as an edit of
    /// that entity, any other is created. For properties a recoverable label
    /// conflict yields the identifier of the existing property.
    pub async fn persist(&self, document: &EntityDocument) -> Result<EntityId> {
        let label = document.display_label();
        debug!(
            entity = label,
            kind = %document.kind,
            id = ?document.id,
            claims = document.claim_count(),
            "submitting entity"
        );

        let raw = match document.id {
            Some(_) => self.api.edit_entity(document).await?,
            None => self.api.create_entity(document).await?,
        };
        let outcome = response::interpret(&raw, label, document.kind)?;
        let id = response::created_entity_id(outcome, label, document.kind)?;

        debug!(entity = label, %id, "entity stored");
        Ok(id)
    }
}
