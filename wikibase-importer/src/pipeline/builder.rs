//! Assembly and persistence of one item per source resource.

use tracing::debug;

use super::translate::StatementTranslator;
use crate::client::WikibaseApi;
use crate::entity::document::group_claims;
use crate::entity::{EntityDocument, EntityId};
use crate::errors::Result;
use crate::source::SourceResource;

/// Result of persisting one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltItem {
    pub id: EntityId,
    /// Claims submitted with the item.
    pub claims: usize,
    /// Statements that produced no claim.
    pub skipped: usize,
}

pub struct EntityBuilder<'a, A> {
    translator: StatementTranslator<'a, A>,
}

impl<'a, A: WikibaseApi> EntityBuilder<'a, A> {
    pub fn new(translator: StatementTranslator<'a, A>) -> Self {
        Self { translator }
    }

    /// Build the item document for `resource` without submitting it.
    ///
    /// Referenced properties and items are created as a side effect.
    pub async fn build_document(&self, resource: &SourceResource) -> Result<(EntityDocument, usize)> {
        let mut claims = Vec::with_capacity(resource.statements.len());
        let mut skipped = 0;

        for statement in &resource.statements {
            match self.translator.translate_statement(statement).await? {
                Some(claim) => claims.push(claim),
                None => skipped += 1,
            }
        }

        let language = self.translator.resolver().language();
        let document = EntityDocument::item(language, &resource.uri).with_statements(group_claims(claims));
        Ok((document, skipped))
    }

    /// Translate every statement of `resource` and persist the item.
    ///
    /// The item is created unless an earlier statement (possibly one of this
    /// resource's own) referenced the resource; then the cached item is
    /// edited, so each URI maps to exactly one remote item.
    pub async fn build_item(&self, resource: &SourceResource) -> Result<BuiltItem> {
        let (document, skipped) = self.build_document(resource).await?;
        let claims = document.claim_count();

        let id = self
            .translator
            .resolver()
            .persist_item(&resource.uri, document)
            .await?;
        debug!(resource = %resource.uri, %id, claims, skipped, "item persisted");

        Ok(BuiltItem { id, claims, skipped })
    }
}
