//! Source graph model.
//!
//! The shape of the records the importer consumes: resources identified by a
//! URI, each carrying statements whose objects are literals, resource
//! references, or node kinds the importer does not translate (blank nodes).
//!
//! - [`gdm`] reads the d:swarm GDM JSON serialization into these types.

pub mod gdm;

use serde::{Deserialize, Serialize};

/// A graph resource with its outgoing statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResource {
    pub uri: String,
    pub statements: Vec<SourceStatement>,
}

impl SourceResource {
    /// Build a resource, dropping duplicate statements while keeping the
    /// order of first appearance.
    pub fn new(uri: impl Into<String>, statements: impl IntoIterator<Item = SourceStatement>) -> Self {
        let mut unique: Vec<SourceStatement> = Vec::new();
        for statement in statements {
            if !unique.contains(&statement) {
                unique.push(statement);
            }
        }
        Self {
            uri: uri.into(),
            statements: unique,
        }
    }
}

/// One statement `subject -predicate-> object` with optional provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatement {
    pub subject: ObjectNode,
    pub predicate: String,
    pub object: ObjectNode,
    #[serde(default)]
    pub qualifiers: Qualifiers,
}

impl SourceStatement {
    /// Statement without qualifiers, subject given as a resource URI.
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: ObjectNode) -> Self {
        Self {
            subject: ObjectNode::resource(subject),
            predicate: predicate.into(),
            object,
            qualifiers: Qualifiers::default(),
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }
}

/// A node in subject or object position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectNode {
    Literal {
        #[serde(rename = "v")]
        value: String,
    },
    Resource {
        uri: String,
    },
    /// Blank nodes and any other node kind; skipped during translation.
    #[serde(other)]
    Unsupported,
}

impl ObjectNode {
    pub fn literal(value: impl Into<String>) -> Self {
        ObjectNode::Literal { value: value.into() }
    }

    pub fn resource(uri: impl Into<String>) -> Self {
        ObjectNode::Resource { uri: uri.into() }
    }

    /// Short name of the node kind, for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectNode::Literal { .. } => "literal",
            ObjectNode::Resource { .. } => "resource",
            ObjectNode::Unsupported => "unsupported",
        }
    }
}

/// Provenance attached to a statement. Each value is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifiers {
    pub confidence: Option<String>,
    pub evidence: Option<String>,
    pub order: Option<String>,
    pub uuid: Option<String>,
}

impl Qualifiers {
    pub fn is_empty(&self) -> bool {
        self.confidence.is_none()
            && self.evidence.is_none()
            && self.order.is_none()
            && self.uuid.is_none()
    }
}
