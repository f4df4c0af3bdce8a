//! Source statement → Wikibase claim translation.

use tracing::warn;

use super::resolve::EntityResolver;
use crate::client::WikibaseApi;
use crate::entity::{Claim, DataValue, PropertyDatatype, Snak};
use crate::errors::Result;
use crate::source::{ObjectNode, Qualifiers, SourceStatement};
use crate::utils::literal_or_placeholder;

/// Property URIs under which statement provenance is stored.
pub const CONFIDENCE_QUALIFIER: &str = "confidence";
pub const EVIDENCE_QUALIFIER: &str = "evidence";
pub const ORDER_QUALIFIER: &str = "order";
pub const UUID_QUALIFIER: &str = "statement uuid";

/// Object of a statement, narrowed to what can be translated.
enum Target<'s> {
    Literal(&'s str),
    Item(&'s str),
}

pub struct StatementTranslator<'a, A> {
    resolver: EntityResolver<'a, A>,
}

impl<'a, A: WikibaseApi> StatementTranslator<'a, A> {
    pub fn new(resolver: EntityResolver<'a, A>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &EntityResolver<'a, A> {
        &self.resolver
    }

    /// Translate one statement into a claim.
    ///
    /// Returns `Ok(None)` for objects that are neither literals nor resources
    /// (the predicate is not resolved in that case) and for objects whose kind
    /// does not fit the datatype the predicate was first resolved with.
    /// Failing to resolve the predicate or a resource object is fatal. Failing
    /// to resolve a qualifier property only drops that qualifier.
    pub async fn translate_statement(&self, statement: &SourceStatement) -> Result<Option<Claim>> {
        let target = match &statement.object {
            ObjectNode::Literal { value } => Target::Literal(value),
            ObjectNode::Resource { uri } => Target::Item(uri),
            ObjectNode::Unsupported => {
                warn!(
                    predicate = %statement.predicate,
                    object = statement.object.kind(),
                    "skipping statement with untranslatable object"
                );
                return Ok(None);
            }
        };

        let datatype = match target {
            Target::Literal(_) => PropertyDatatype::String,
            Target::Item(_) => PropertyDatatype::WikibaseItem,
        };
        let (property, resolved) = self
            .resolver
            .resolve_property_typed(&statement.predicate, datatype)
            .await?;
        if resolved != datatype {
            warn!(
                predicate = %statement.predicate,
                %property,
                expected = ?resolved,
                object = statement.object.kind(),
                "skipping statement whose object does not fit the property datatype"
            );
            return Ok(None);
        }

        let value = match target {
            Target::Literal(text) => DataValue::String(literal_or_placeholder(text).to_string()),
            Target::Item(uri) => DataValue::Item(self.resolver.resolve_item(uri).await?),
        };

        let qualifiers = self.qualifier_snaks(&statement.qualifiers).await;
        Ok(Some(Claim::new(Snak::new(property, value), qualifiers)))
    }

    async fn qualifier_snaks(&self, qualifiers: &Qualifiers) -> Vec<Snak> {
        let present = [
            (CONFIDENCE_QUALIFIER, &qualifiers.confidence),
            (EVIDENCE_QUALIFIER, &qualifiers.evidence),
            (ORDER_QUALIFIER, &qualifiers.order),
            (UUID_QUALIFIER, &qualifiers.uuid),
        ];

        let mut snaks = Vec::new();
        for (name, value) in present {
            let Some(value) = value else { continue };
            match self.resolver.resolve_property(name).await {
                Ok(property) => snaks.push(Snak::new(
                    property,
                    DataValue::String(literal_or_placeholder(value).to_string()),
                )),
                Err(e) => warn!(qualifier = name, error = %e, "dropping qualifier"),
            }
        }
        snaks
    }
}
