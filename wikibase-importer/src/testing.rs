//! In-memory Wikibase stand-in for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::json;

use crate::client::{ApiResponse, WikibaseApi};
use crate::entity::{EntityDocument, EntityKind};
use crate::errors::Result;

#[derive(Default)]
struct State {
    next_item: u64,
    next_property: u64,
    created: Vec<EntityDocument>,
    edited: Vec<EntityDocument>,
    rejected_labels: HashSet<String>,
    existing_properties: HashMap<String, String>,
}

/// Answers `create_entity` and `edit_entity` like a Wikibase instance would.
///
/// Labels registered with [`FakeWikibase::rejecting`] get an unrecoverable
/// error payload; labels registered with [`FakeWikibase::with_existing_property`]
/// get a property label conflict pointing at the given id.
#[derive(Default)]
pub(crate) struct FakeWikibase {
    state: Mutex<State>,
}

impl FakeWikibase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rejecting(self, label: &str) -> Self {
        self.state.lock().unwrap().rejected_labels.insert(label.to_string());
        self
    }

    pub(crate) fn with_existing_property(self, label: &str, id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .existing_properties
            .insert(label.to_string(), id.to_string());
        self
    }

    pub(crate) fn stop_rejecting(&self, label: &str) {
        self.state.lock().unwrap().rejected_labels.remove(label);
    }

    /// Every document submitted for creation, in call order.
    pub(crate) fn created(&self) -> Vec<EntityDocument> {
        self.state.lock().unwrap().created.clone()
    }

    /// Every document submitted as an edit, in call order.
    pub(crate) fn edited(&self) -> Vec<EntityDocument> {
        self.state.lock().unwrap().edited.clone()
    }

    pub(crate) fn creations_labelled(&self, label: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .created
            .iter()
            .filter(|doc| doc.display_label() == label)
            .count()
    }
}

impl WikibaseApi for FakeWikibase {
    async fn create_entity(&self, entity: &EntityDocument) -> Result<ApiResponse> {
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap();
        state.created.push(entity.clone());
        let label = entity.display_label().to_string();

        if state.rejected_labels.contains(&label) {
            return Ok(ApiResponse::ok(
                json!({"error": {"code": "failed-save", "messages": [{"name": "some-other-error", "parameters": []}]}})
                    .to_string(),
            ));
        }

        if entity.kind == EntityKind::Property {
            if let Some(existing) = state.existing_properties.get(&label) {
                return Ok(ApiResponse::ok(
                    json!({"error": {
                        "code": "failed-save",
                        "messages": [{
                            "name": "wikibase-validator-label-conflict",
                            "parameters": [label, "en", format!("[[Property:{existing}|{existing}]]")]
                        }]
                    }})
                    .to_string(),
                ));
            }
        }

        let id = match entity.kind {
            EntityKind::Item => {
                state.next_item += 1;
                format!("Q{}", state.next_item)
            }
            EntityKind::Property => {
                state.next_property += 1;
                format!("P{}", state.next_property)
            }
        };

        Ok(ApiResponse::ok(
            json!({"success": 1, "entity": {"id": id, "type": entity.kind.as_str()}}).to_string(),
        ))
    }

    async fn edit_entity(&self, entity: &EntityDocument) -> Result<ApiResponse> {
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap();
        state.edited.push(entity.clone());
        if state.rejected_labels.contains(entity.display_label()) {
            return Ok(ApiResponse::ok(
                json!({"error": {"code": "failed-save", "messages": [{"name": "some-other-error", "parameters": []}]}})
                    .to_string(),
            ));
        }
        let id = entity.id.as_ref().map(|id| id.as_str()).unwrap_or_default();

        Ok(ApiResponse::ok(
            json!({"success": 1, "entity": {"id": id, "type": entity.kind.as_str()}}).to_string(),
        ))
    }
}
