//! Target knowledge-base entities.
//!
//! - [`document::EntityDocument`]: the `data` payload of a `wbeditentity` call
//! - [`document::Claim`], [`document::Snak`], [`document::DataValue`]: statement parts

pub mod document;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use document::{Claim, DataValue, EntityDocument, Snak, StatementGroup};

/// The two entity kinds a Wikibase instance stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Property,
}

impl EntityKind {
    /// Value of the `new` parameter of `wbeditentity`.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::Property => "property",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier assigned by the remote API (`Q42`, `P7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of the identifier, if it has the usual letter+digits shape.
    pub fn numeric_id(&self) -> Option<u64> {
        let mut chars = self.0.chars();
        chars.next().filter(|c| c.is_ascii_alphabetic())?;
        chars.as_str().parse().ok()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyDatatype {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "wikibase-item")]
    WikibaseItem,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_parses_prefixed_ids() {
        assert_eq!(EntityId::new("Q42").numeric_id(), Some(42));
        assert_eq!(EntityId::new("P7").numeric_id(), Some(7));
        assert_eq!(EntityId::new("42").numeric_id(), None);
        assert_eq!(EntityId::new("Q").numeric_id(), None);
    }

    #[test]
    fn kind_and_datatype_wire_names() {
        assert_eq!(EntityKind::Item.as_str(), "item");
        assert_eq!(EntityKind::Property.to_string(), "property");
        assert_eq!(serde_json::to_string(&PropertyDatatype::String).unwrap(), r#""string""#);
        assert_eq!(
            serde_json::to_string(&PropertyDatatype::WikibaseItem).unwrap(),
            r#""wikibase-item""#
        );
    }
}
