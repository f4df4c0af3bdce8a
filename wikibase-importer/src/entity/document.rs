//! Entity documents and their `wbeditentity` JSON form.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use super::{EntityId, EntityKind, PropertyDatatype};

/// An item or property as submitted to the API.
///
/// `id` is `None` for documents submitted for creation and names the target
/// entity for edits.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDocument {
    pub kind: EntityKind,
    pub id: Option<EntityId>,
    /// language code → label
    pub labels: BTreeMap<String, String>,
    /// language code → description
    pub descriptions: BTreeMap<String, String>,
    /// language code → aliases
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Only meaningful for properties.
    pub datatype: Option<PropertyDatatype>,
    pub statements: Vec<StatementGroup>,
}

impl EntityDocument {
    fn termed(kind: EntityKind, language: &str, text: &str) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(language.to_string(), text.to_string());
        Self {
            kind,
            id: None,
            descriptions: labels.clone(),
            labels,
            aliases: BTreeMap::new(),
            datatype: None,
            statements: Vec::new(),
        }
    }

    /// Item with `text` as both label and description, and no statements.
    pub fn item(language: &str, text: &str) -> Self {
        Self::termed(EntityKind::Item, language, text)
    }

    /// Property with `text` as both label and description.
    pub fn property(language: &str, text: &str, datatype: PropertyDatatype) -> Self {
        Self {
            datatype: Some(datatype),
            ..Self::termed(EntityKind::Property, language, text)
        }
    }

    /// Target the existing entity `id` instead of creating a new one.
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_statements(mut self, statements: Vec<StatementGroup>) -> Self {
        self.statements = statements;
        self
    }

    /// Label in `language`, falling back to any label at all.
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels
            .get(language)
            .or_else(|| self.labels.values().next())
            .map(String::as_str)
    }

    /// Any label, for log output and error context.
    pub fn display_label(&self) -> &str {
        self.labels.values().next().map(String::as_str).unwrap_or_default()
    }

    /// Total number of claims over all statement groups.
    pub fn claim_count(&self) -> usize {
        self.statements.iter().map(|g| g.claims.len()).sum()
    }
}

/// All claims of one entity that share a property.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementGroup {
    pub property: EntityId,
    pub claims: Vec<Claim>,
}

/// Group claims by main-snak property.
///
/// Groups appear in order of each property's first claim; claims keep their
/// relative order inside a group.
pub fn group_claims(claims: impl IntoIterator<Item = Claim>) -> Vec<StatementGroup> {
    let mut groups: Vec<StatementGroup> = Vec::new();
    for claim in claims {
        match groups
            .iter()
            .position(|g| g.property == claim.main_snak.property)
        {
            Some(index) => groups[index].claims.push(claim),
            None => groups.push(StatementGroup {
                property: claim.main_snak.property.clone(),
                claims: vec![claim],
            }),
        }
    }
    groups
}

/// A property-value assertion with an optional qualifier group.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub main_snak: Snak,
    qualifiers: Option<Vec<Snak>>,
}

impl Claim {
    /// Build a claim. An empty qualifier list yields no qualifier group.
    pub fn new(main_snak: Snak, qualifiers: Vec<Snak>) -> Self {
        let qualifiers = if qualifiers.is_empty() {
            None
        } else {
            Some(qualifiers)
        };
        Self {
            main_snak,
            qualifiers,
        }
    }

    /// The qualifier group; never `Some` of an empty list.
    pub fn qualifiers(&self) -> Option<&[Snak]> {
        self.qualifiers.as_deref()
    }
}

/// A single property-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Snak {
    pub property: EntityId,
    pub value: DataValue,
}

impl Snak {
    pub fn new(property: EntityId, value: DataValue) -> Self {
        Self { property, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(String),
    Item(EntityId),
}

// ── Wire serialization ────────────────────────────────────────────────────────

struct Terms<'a>(&'a BTreeMap<String, String>);

impl Serialize for Terms<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (language, value) in self.0 {
            map.serialize_entry(language, &Term { language, value })?;
        }
        map.end()
    }
}

struct Aliases<'a>(&'a BTreeMap<String, Vec<String>>);

impl Serialize for Aliases<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (language, values) in self.0 {
            let terms: Vec<Term<'_>> = values.iter().map(|value| Term { language, value }).collect();
            map.serialize_entry(language, &terms)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct Term<'a> {
    language: &'a str,
    value: &'a str,
}

/// Snaks keyed by property id, in order of first appearance.
struct SnaksByProperty<'a>(Vec<(&'a EntityId, Vec<&'a Snak>)>);

impl<'a> SnaksByProperty<'a> {
    fn from_snaks(snaks: &'a [Snak]) -> Self {
        let mut grouped: Vec<(&EntityId, Vec<&Snak>)> = Vec::new();
        for snak in snaks {
            match grouped.iter().position(|(p, _)| *p == &snak.property) {
                Some(index) => grouped[index].1.push(snak),
                None => grouped.push((&snak.property, vec![snak])),
            }
        }
        Self(grouped)
    }

    fn order(&self) -> Vec<&'a EntityId> {
        self.0.iter().map(|(p, _)| *p).collect()
    }
}

impl Serialize for SnaksByProperty<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (property, snaks) in &self.0 {
            map.serialize_entry(property.as_str(), snaks)?;
        }
        map.end()
    }
}

struct Claims<'a>(&'a [StatementGroup]);

impl Serialize for Claims<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for group in self.0 {
            map.serialize_entry(group.property.as_str(), &group.claims)?;
        }
        map.end()
    }
}

impl Serialize for EntityDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("labels", &Terms(&self.labels))?;
        map.serialize_entry("descriptions", &Terms(&self.descriptions))?;
        if !self.aliases.is_empty() {
            map.serialize_entry("aliases", &Aliases(&self.aliases))?;
        }
        if self.kind == EntityKind::Property {
            map.serialize_entry("datatype", &self.datatype.unwrap_or_default())?;
        }
        if !self.statements.is_empty() {
            map.serialize_entry("claims", &Claims(&self.statements))?;
        }
        map.end()
    }
}

impl Serialize for Claim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("mainsnak", &self.main_snak)?;
        map.serialize_entry("type", "statement")?;
        map.serialize_entry("rank", "normal")?;
        if let Some(qualifiers) = &self.qualifiers {
            let grouped = SnaksByProperty::from_snaks(qualifiers);
            map.serialize_entry("qualifiers-order", &grouped.order())?;
            map.serialize_entry("qualifiers", &grouped)?;
        }
        map.end()
    }
}

impl Serialize for Snak {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Snak", 3)?;
        state.serialize_field("snaktype", "value")?;
        state.serialize_field("property", &self.property)?;
        state.serialize_field("datavalue", &self.value)?;
        state.end()
    }
}

#[derive(Serialize)]
struct EntityIdValue<'a> {
    #[serde(rename = "entity-type")]
    entity_type: &'static str,
    id: &'a EntityId,
    #[serde(rename = "numeric-id", skip_serializing_if = "Option::is_none")]
    numeric_id: Option<u64>,
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DataValue", 2)?;
        match self {
            DataValue::String(text) => {
                state.serialize_field("value", text)?;
                state.serialize_field("type", "string")?;
            }
            DataValue::Item(id) => {
                state.serialize_field(
                    "value",
                    &EntityIdValue {
                        entity_type: "item",
                        id,
                        numeric_id: id.numeric_id(),
                    },
                )?;
                state.serialize_field("type", "wikibase-entityid")?;
            }
        }
        state.end()
    }
}
